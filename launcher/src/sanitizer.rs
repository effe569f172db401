use crate::descriptors::DescriptorTable;
use crate::error::LaunchError;
use integrity_level::{AccessMode, Classification, IntegrityLevel, LevelOracle, Subject};
use log::{debug, error, info};
use std::os::unix::io::RawFd;

/// What was learnt about one inherited descriptor during a sanitization pass.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DescriptorRecord {
    pub fd: RawFd,
    pub access: AccessMode,
    /// `None` for read-only descriptors, which are never submitted to the oracle
    pub classification: Option<Classification>,
}

impl DescriptorRecord {
    /// Whether the descriptor must be downgraded or closed before the
    /// untrusted program may inherit it.
    pub fn requires_action(&self) -> bool {
        match self.classification {
            Some(c) => c.level() == IntegrityLevel::High,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SanitizationReport {
    /// Marked close-on-exec: gone once the program image is replaced
    pub close_on_exec: Vec<RawFd>,
    pub downgraded: Vec<RawFd>,
    pub closed: Vec<RawFd>,
    pub untouched: Vec<RawFd>,
}

/// Makes sure no descriptor open for writing on a high integrity object
/// survives into the untrusted program.
pub struct Sanitizer<'a> {
    oracle: &'a dyn LevelOracle,
}

impl<'a> Sanitizer<'a> {
    pub fn new(oracle: &'a dyn LevelOracle) -> Self {
        Self { oracle }
    }

    pub fn inspect(&self, table: &dyn DescriptorTable, fd: RawFd) -> DescriptorRecord {
        let access = table.access_mode(fd);
        let classification = match access {
            AccessMode::ReadOnly => None,
            // We cannot tell what this descriptor allows, assume the worst
            AccessMode::Unknown => Some(Classification::Unknown),
            AccessMode::WriteOnly | AccessMode::ReadWrite => {
                Some(self.oracle.classify(Subject::Descriptor(fd)))
            }
        };
        DescriptorRecord {
            fd,
            access,
            classification,
        }
    }

    /// Single pass over the descriptor table. Stops at the first descriptor
    /// which can be neither downgraded nor closed.
    pub fn run(&self, table: &mut dyn DescriptorTable) -> Result<SanitizationReport, LaunchError> {
        let pid = std::process::id();
        let mut report = SanitizationReport::default();
        for fd in table.snapshot()? {
            if !table.is_inherited(fd) {
                debug!(
                    "Ignoring close-on-exec file descriptor {} in process {}",
                    fd, pid
                );
                report.close_on_exec.push(fd);
                continue;
            }
            let record = self.inspect(table, fd);
            if !record.requires_action() {
                debug!(
                    "Keeping file descriptor {} ({:?}, {:?}) in process {}",
                    fd, record.access, record.classification, pid
                );
                report.untouched.push(fd);
                continue;
            }
            let downgrade_err = match self.oracle.downgrade(fd) {
                Ok(()) => {
                    info!(
                        "Downgraded file descriptor {} to low integrity in process {}",
                        fd, pid
                    );
                    report.downgraded.push(fd);
                    continue;
                }
                Err(e) => e,
            };
            match table.close(fd) {
                Ok(()) => {
                    info!(
                        "Closed high integrity file descriptor {} in process {} (downgrade failed: {})",
                        fd, pid, downgrade_err
                    );
                    report.closed.push(fd);
                }
                Err(close_err) => {
                    error!(
                        "Aborting launch: file descriptor {} in process {} can neither be downgraded ({}) nor closed ({})",
                        fd, pid, downgrade_err, close_err
                    );
                    return Err(LaunchError::SanitizationFailed {
                        fd,
                        downgrade: downgrade_err,
                        close_os_code: close_err.raw_os_error().unwrap_or(0),
                    });
                }
            }
        }
        Ok(report)
    }
}
