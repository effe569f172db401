// Common modules

mod command;
mod credentials;
mod descriptors;
mod error;
mod image;
mod launch;
mod sanitizer;
mod stage;

pub use command::UntrustedCommand;
pub use credentials::{drop_identity, Credentials, ResIdCredentials};
pub use descriptors::{DescriptorTable, ProcessDescriptors};
pub use error::LaunchError;
pub use image::{ExecImage, ProcessImage};
pub use launch::Launcher;
pub use sanitizer::{DescriptorRecord, SanitizationReport, Sanitizer};
pub use stage::LaunchStage;

// Re-exported from sub-crates
pub use integrity_level::{
    AccessMode, Classification, IntegrityLevel, LevelError, LevelOracle, OwnershipOracle,
    Subject, UntrustedIdentity, UNTRUSTED_IDENTITY,
};

pub(crate) fn last_os_error() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
