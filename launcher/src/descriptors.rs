use crate::error::LaunchError;
use crate::last_os_error;
use integrity_level::AccessMode;
use libc::c_int;
use std::ffi::CStr;
use std::os::unix::io::RawFd;

/// The set of file descriptors the untrusted program would inherit.
pub trait DescriptorTable {
    /// Returns the descriptors open at the time of the call. The snapshot does not
    /// include any descriptor used internally to produce it.
    fn snapshot(&mut self) -> Result<Vec<RawFd>, LaunchError>;

    fn access_mode(&self, fd: RawFd) -> AccessMode;

    /// Whether the descriptor survives image replacement, i.e. is not marked
    /// close-on-exec. Descriptors whose flags cannot be read count as inherited.
    fn is_inherited(&self, fd: RawFd) -> bool;

    fn close(&mut self, fd: RawFd) -> std::io::Result<()>;
}

/// This process' own descriptor table, enumerated through /proc/self/fd/.
#[derive(Debug, Default)]
pub struct ProcessDescriptors {
    _private: (),
}

impl ProcessDescriptors {
    pub fn new() -> Self {
        Self::default()
    }
}

fn reset_errno() {
    unsafe {
        *(libc::__errno_location()) = 0;
    }
}

impl DescriptorTable for ProcessDescriptors {
    fn snapshot(&mut self) -> Result<Vec<RawFd>, LaunchError> {
        let fds_path = unsafe { CStr::from_ptr(b"/proc/self/fd/\0".as_ptr() as *const _) };
        let fds_fd = unsafe {
            libc::open(
                fds_path.as_ptr(),
                libc::O_RDONLY | libc::O_DIRECTORY | libc::O_CLOEXEC,
            )
        };
        if fds_fd < 0 {
            return Err(LaunchError::DescriptorEnumeration {
                description: "open(/proc/self/fd/)".to_owned(),
                os_code: last_os_error(),
            });
        }
        let fds_dir = unsafe { libc::fdopendir(fds_fd) };
        if fds_dir.is_null() {
            let os_code = last_os_error();
            unsafe {
                libc::close(fds_fd);
            }
            return Err(LaunchError::DescriptorEnumeration {
                description: "fdopendir(/proc/self/fd/)".to_owned(),
                os_code,
            });
        }
        let mut fds = vec![];
        let res = loop {
            reset_errno();
            let entry = unsafe { libc::readdir(fds_dir) };
            if entry.is_null() {
                let os_code = last_os_error();
                if os_code != 0 {
                    break Err(LaunchError::DescriptorEnumeration {
                        description: "readdir(/proc/self/fd/)".to_owned(),
                        os_code,
                    });
                }
                break Ok(());
            }
            let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) }.to_bytes();
            if name == b"." || name == b".." {
                continue;
            }
            let fd = match std::str::from_utf8(name).ok().and_then(|s| s.parse::<c_int>().ok()) {
                Some(n) => n,
                None => {
                    break Err(LaunchError::DescriptorEnumeration {
                        description: format!(
                            "parsing /proc/self/fd/{}",
                            String::from_utf8_lossy(name)
                        ),
                        os_code: 0,
                    })
                }
            };
            // The directory stream itself is closed right below
            if fd == fds_fd {
                continue;
            }
            fds.push(fd);
        };
        unsafe {
            libc::closedir(fds_dir);
        }
        res.map(|()| fds)
    }

    fn access_mode(&self, fd: RawFd) -> AccessMode {
        AccessMode::from_status_flags(unsafe { libc::fcntl(fd, libc::F_GETFL) })
    }

    fn is_inherited(&self, fd: RawFd) -> bool {
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
        flags < 0 || (flags & libc::FD_CLOEXEC) == 0
    }

    fn close(&mut self, fd: RawFd) -> std::io::Result<()> {
        let res = unsafe { libc::close(fd) };
        if res != 0 {
            let err = std::io::Error::last_os_error();
            // Linux releases the descriptor even when close() is interrupted
            if err.raw_os_error() != Some(libc::EINTR) {
                return Err(err);
            }
        }
        Ok(())
    }
}
