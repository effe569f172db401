use crate::error::LevelError;
use crate::identity::UntrustedIdentity;
use crate::level::{Classification, IntegrityLevel};
use crate::last_os_error;
use libc::{c_int, gid_t, uid_t};
use log::{debug, warn};
use std::ffi::CStr;
use std::os::unix::io::RawFd;
use std::path::Path;

// Shared sinks and sources which carry no integrity-relevant state:
// writing to them from the untrusted side can never affect the privileged side.
pub(crate) const ALWAYS_LOW_PATHS: [&str; 5] = [
    "/dev/null",
    "/dev/zero",
    "/dev/full",
    "/dev/random",
    "/dev/urandom",
];

/// A resource whose integrity level can be queried.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Subject<'a> {
    Descriptor(RawFd),
    Path(&'a CStr),
}

/// Classifies resources and reclassifies them on request. Implementations must be
/// usable while the process still runs with its privileged identity.
pub trait LevelOracle {
    fn classify(&self, subject: Subject<'_>) -> Classification;

    /// Reclassifies the object behind `fd` as `Low`, keeping `fd` usable.
    fn downgrade(&self, fd: RawFd) -> Result<(), LevelError>;
}

/// Oracle backed by file ownership: an object is `Low` when it is owned by the
/// untrusted user or group-owned by the untrusted group, `High` otherwise.
/// Downgrading hands group ownership over to the untrusted group.
#[derive(Debug, Clone)]
pub struct OwnershipOracle {
    identity: UntrustedIdentity,
}

impl OwnershipOracle {
    pub fn new(identity: UntrustedIdentity) -> Self {
        Self { identity }
    }

    fn level_of(&self, owner: uid_t, group: gid_t) -> IntegrityLevel {
        if owner == self.identity.uid() || group == self.identity.gid() {
            IntegrityLevel::Low
        } else {
            IntegrityLevel::High
        }
    }

    fn classify_fd(&self, fd: RawFd) -> Result<IntegrityLevel, LevelError> {
        if fd < 0 {
            return Err(LevelError::InvalidDescriptor { fd });
        }
        if let Ok(target) = std::fs::read_link(format!("/proc/self/fd/{}", fd)) {
            if is_always_low(&target) {
                return Ok(IntegrityLevel::Low);
            }
        }
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        let res = unsafe { libc::fstat(fd, &mut st as *mut _) };
        if res != 0 {
            return Err(LevelError::OsOperationFailed {
                operation: "fstat",
                fd,
                os_code: last_os_error(),
            });
        }
        Ok(self.level_of(st.st_uid, st.st_gid))
    }

    fn classify_path(&self, path: &CStr) -> Result<IntegrityLevel, LevelError> {
        if let Ok(utf8) = path.to_str() {
            if is_always_low(Path::new(utf8)) {
                return Ok(IntegrityLevel::Low);
            }
        }
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        let res = unsafe { libc::stat(path.as_ptr(), &mut st as *mut _) };
        if res != 0 {
            return Err(LevelError::OsOperationFailed {
                operation: "stat",
                fd: libc::AT_FDCWD,
                os_code: last_os_error(),
            });
        }
        Ok(self.level_of(st.st_uid, st.st_gid))
    }
}

fn is_always_low(target: &Path) -> bool {
    ALWAYS_LOW_PATHS.iter().any(|p| target == Path::new(p))
}

impl LevelOracle for OwnershipOracle {
    fn classify(&self, subject: Subject<'_>) -> Classification {
        let res = match subject {
            Subject::Descriptor(fd) => self.classify_fd(fd),
            Subject::Path(path) => self.classify_path(path),
        };
        match &res {
            Ok(level) => debug!("{:?} classified as {:?}", subject, level),
            Err(e) => warn!("Unable to classify {:?} ({}), treating it as high integrity", subject, e),
        }
        res.into()
    }

    fn downgrade(&self, fd: RawFd) -> Result<(), LevelError> {
        if fd < 0 {
            return Err(LevelError::InvalidDescriptor { fd });
        }
        // (uid_t)-1 leaves the owner unchanged
        let res = unsafe { libc::fchown(fd as c_int, uid_t::MAX, self.identity.gid()) };
        if res != 0 {
            return Err(LevelError::OsOperationFailed {
                operation: "fchown",
                fd,
                os_code: last_os_error(),
            });
        }
        Ok(())
    }
}
