use crate::error::LaunchError;
use integrity_level::UntrustedIdentity;
use libc::{c_int, gid_t, uid_t};
use log::{debug, error, info, warn};
use std::io::{Error, Result};

/// Primitive identity operations on the calling process. Each one maps to a
/// single system call so that their ordering can be observed and tested.
pub trait Credentials {
    fn set_groups(&self, groups: &[gid_t]) -> Result<()>;
    fn groups(&self) -> Result<Vec<gid_t>>;
    /// Whether permitted capabilities survive the transition of all UIDs away from 0
    fn keep_capabilities(&self, keep: bool) -> Result<()>;
    fn set_uids(&self, uid: uid_t) -> Result<()>;
    /// Real, effective and saved UIDs
    fn uids(&self) -> Result<(uid_t, uid_t, uid_t)>;
    /// Makes CAP_SETGID effective again, if it is still permitted
    fn raise_setgid_capability(&self) -> Result<()>;
    fn set_gids(&self, gid: gid_t) -> Result<()>;
    /// Real, effective and saved GIDs
    fn gids(&self) -> Result<(gid_t, gid_t, gid_t)>;
    /// Empties the effective, permitted and inheritable capability sets
    fn clear_capabilities(&self) -> Result<()>;
}

fn transition_failed(operation: &'static str, err: Error) -> LaunchError {
    error!("{}() failed: {}", operation, err);
    LaunchError::IdentityTransition {
        operation,
        os_code: err.raw_os_error().unwrap_or(0),
    }
}

fn verify(
    kind: &'static str,
    expected: u32,
    actual: (u32, u32, u32),
) -> std::result::Result<(), LaunchError> {
    if actual != (expected, expected, expected) {
        error!(
            "{} transition not applied: expected {}, got {:?}",
            kind, expected, actual
        );
        return Err(LaunchError::IdentityVerification {
            kind,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Irreversibly moves the calling process to `identity`: supplementary groups
/// first, then real/effective/saved UIDs, then real/effective/saved GIDs,
/// each step verified before the next one. On error the process must not run
/// anything on behalf of the untrusted principal.
pub fn drop_identity(
    credentials: &dyn Credentials,
    identity: &UntrustedIdentity,
) -> std::result::Result<(), LaunchError> {
    let (uid, gid) = (identity.uid(), identity.gid());
    let pid = std::process::id();

    if let Err(e) = credentials.set_groups(&[gid]) {
        // Not fatal if there was nothing to drop in the first place
        let current = credentials
            .groups()
            .map_err(|e| transition_failed("getgroups", e))?;
        if current.iter().any(|g| *g != gid) {
            return Err(transition_failed("setgroups", e));
        }
        warn!(
            "Unable to reset supplementary groups ({}), process {} has none to drop",
            e, pid
        );
    }

    credentials
        .keep_capabilities(true)
        .map_err(|e| transition_failed("prctl(PR_SET_KEEPCAPS)", e))?;
    credentials
        .set_uids(uid)
        .map_err(|e| transition_failed("setresuid", e))?;
    let uids = credentials
        .uids()
        .map_err(|e| transition_failed("getresuid", e))?;
    verify("UID", uid, uids)?;
    info!("Process {} now runs with UID {}", pid, uid);

    credentials
        .raise_setgid_capability()
        .map_err(|e| transition_failed("capset", e))?;
    credentials
        .set_gids(gid)
        .map_err(|e| transition_failed("setresgid", e))?;
    let gids = credentials
        .gids()
        .map_err(|e| transition_failed("getresgid", e))?;
    verify("GID", gid, gids)?;
    info!("Process {} now runs with GID {}", pid, gid);

    credentials
        .clear_capabilities()
        .map_err(|e| transition_failed("capset", e))?;
    credentials
        .keep_capabilities(false)
        .map_err(|e| transition_failed("prctl(PR_SET_KEEPCAPS)", e))?;
    debug!("Process {} dropped all its capabilities", pid);
    Ok(())
}

// Kernel ABI of capget()/capset(), see linux/capability.h
const LINUX_CAPABILITY_VERSION_3: u32 = 0x2008_0522;
const CAP_SETGID: u32 = 6;

#[repr(C)]
struct CapUserHeader {
    version: u32,
    pid: c_int,
}

#[repr(C)]
#[derive(Default, Clone, Copy)]
struct CapUserData {
    effective: u32,
    permitted: u32,
    inheritable: u32,
}

/// Credentials of the calling process, changed with setres[ug]id() and friends.
#[derive(Debug, Default)]
pub struct ResIdCredentials {
    _private: (),
}

impl ResIdCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    fn capget(&self) -> Result<[CapUserData; 2]> {
        let mut header = CapUserHeader {
            version: LINUX_CAPABILITY_VERSION_3,
            pid: 0,
        };
        let mut data = [CapUserData::default(); 2];
        let res = unsafe {
            libc::syscall(
                libc::SYS_capget,
                &mut header as *mut CapUserHeader,
                data.as_mut_ptr(),
            )
        };
        if res != 0 {
            return Err(Error::last_os_error());
        }
        Ok(data)
    }

    fn capset(&self, data: &[CapUserData; 2]) -> Result<()> {
        let mut header = CapUserHeader {
            version: LINUX_CAPABILITY_VERSION_3,
            pid: 0,
        };
        let res = unsafe {
            libc::syscall(
                libc::SYS_capset,
                &mut header as *mut CapUserHeader,
                data.as_ptr(),
            )
        };
        if res != 0 {
            return Err(Error::last_os_error());
        }
        Ok(())
    }
}

fn check(res: c_int) -> Result<()> {
    if res != 0 {
        return Err(Error::last_os_error());
    }
    Ok(())
}

impl Credentials for ResIdCredentials {
    fn set_groups(&self, groups: &[gid_t]) -> Result<()> {
        check(unsafe { libc::setgroups(groups.len(), groups.as_ptr()) })
    }

    fn groups(&self) -> Result<Vec<gid_t>> {
        let count = unsafe { libc::getgroups(0, std::ptr::null_mut()) };
        if count < 0 {
            return Err(Error::last_os_error());
        }
        let mut groups: Vec<gid_t> = vec![0; count as usize];
        let count = unsafe { libc::getgroups(count, groups.as_mut_ptr()) };
        if count < 0 {
            return Err(Error::last_os_error());
        }
        groups.truncate(count as usize);
        Ok(groups)
    }

    fn keep_capabilities(&self, keep: bool) -> Result<()> {
        let zero: libc::c_ulong = 0;
        check(unsafe { libc::prctl(libc::PR_SET_KEEPCAPS, keep as libc::c_ulong, zero, zero, zero) })
    }

    fn set_uids(&self, uid: uid_t) -> Result<()> {
        check(unsafe { libc::setresuid(uid, uid, uid) })
    }

    fn uids(&self) -> Result<(uid_t, uid_t, uid_t)> {
        let (mut real, mut effective, mut saved) = (0, 0, 0);
        check(unsafe { libc::getresuid(&mut real, &mut effective, &mut saved) })?;
        Ok((real, effective, saved))
    }

    fn raise_setgid_capability(&self) -> Result<()> {
        let mut data = self.capget()?;
        data[0].effective |= data[0].permitted & (1 << CAP_SETGID);
        self.capset(&data)
    }

    fn set_gids(&self, gid: gid_t) -> Result<()> {
        check(unsafe { libc::setresgid(gid, gid, gid) })
    }

    fn gids(&self) -> Result<(gid_t, gid_t, gid_t)> {
        let (mut real, mut effective, mut saved) = (0, 0, 0);
        check(unsafe { libc::getresgid(&mut real, &mut effective, &mut saved) })?;
        Ok((real, effective, saved))
    }

    fn clear_capabilities(&self) -> Result<()> {
        self.capset(&[CapUserData::default(); 2])
    }
}
