use libc::c_int;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LevelError {
    InvalidDescriptor {
        fd: c_int,
    },
    OsOperationFailed {
        operation: &'static str,
        fd: c_int,
        os_code: i32,
    },
}

impl core::fmt::Display for LevelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDescriptor { fd } => write!(f, "invalid file descriptor {}", fd),
            Self::OsOperationFailed {
                operation,
                fd,
                os_code,
            } => write!(
                f,
                "{}() on file descriptor {} failed with errno {}",
                operation, fd, os_code
            ),
        }
    }
}

impl std::error::Error for LevelError {}
