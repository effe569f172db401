// Common modules
mod error;
mod identity;
mod level;
mod oracle;

pub use error::LevelError;
pub use identity::{UntrustedIdentity, UNTRUSTED_IDENTITY};
pub use level::{AccessMode, Classification, IntegrityLevel};
pub use oracle::{LevelOracle, OwnershipOracle, Subject};

pub(crate) fn last_os_error() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
