use crate::stage::LaunchStage;
use integrity_level::LevelError;
use std::os::unix::io::RawFd;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    MissingProgram,
    InvalidArgument {
        position: usize,
    },
    DescriptorEnumeration {
        description: String,
        os_code: i32,
    },
    SanitizationFailed {
        fd: RawFd,
        downgrade: LevelError,
        close_os_code: i32,
    },
    IdentityTransition {
        operation: &'static str,
        os_code: i32,
    },
    IdentityVerification {
        kind: &'static str,
        expected: u32,
        actual: (u32, u32, u32),
    },
    ImageReplacement {
        program: String,
        os_code: i32,
    },
    OutOfOrder {
        from: LaunchStage,
        to: LaunchStage,
    },
}

impl core::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingProgram => write!(f, "no program to run"),
            Self::InvalidArgument { position } => {
                write!(f, "argument {} contains a NUL byte", position)
            }
            Self::DescriptorEnumeration {
                description,
                os_code,
            } => write!(
                f,
                "unable to enumerate open file descriptors: {} failed with errno {}",
                description, os_code
            ),
            Self::SanitizationFailed {
                fd,
                downgrade,
                close_os_code,
            } => write!(
                f,
                "high integrity file descriptor {} open for writing: downgrade failed ({}), close() failed with errno {}",
                fd, downgrade, close_os_code
            ),
            Self::IdentityTransition { operation, os_code } => {
                write!(f, "{}() failed with errno {}", operation, os_code)
            }
            Self::IdentityVerification {
                kind,
                expected,
                actual: (real, effective, saved),
            } => write!(
                f,
                "{} transition not applied: expected {}, got real={} effective={} saved={}",
                kind, expected, real, effective, saved
            ),
            Self::ImageReplacement { program, os_code } => write!(
                f,
                "execvp({}) failed: {}",
                program,
                std::io::Error::from_raw_os_error(*os_code)
            ),
            Self::OutOfOrder { from, to } => {
                write!(f, "launch cannot go from {:?} to {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for LaunchError {}
