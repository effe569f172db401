use crate::command::UntrustedCommand;
use crate::credentials::{self, Credentials};
use crate::descriptors::DescriptorTable;
use crate::error::LaunchError;
use crate::image::ProcessImage;
use crate::sanitizer::{SanitizationReport, Sanitizer};
use crate::stage::LaunchStage;
use integrity_level::{LevelOracle, UntrustedIdentity};
use log::{error, info};

/// Drives one launch through its stages. Each step is only allowed once the
/// previous one succeeded, and any failure moves the launch to `Aborted`.
pub struct Launcher<'a> {
    stage: LaunchStage,
    identity: UntrustedIdentity,
    command: UntrustedCommand,
    oracle: &'a dyn LevelOracle,
    descriptors: &'a mut dyn DescriptorTable,
    credentials: &'a dyn Credentials,
    image: &'a dyn ProcessImage,
}

impl<'a> Launcher<'a> {
    pub fn new(
        identity: UntrustedIdentity,
        command: UntrustedCommand,
        oracle: &'a dyn LevelOracle,
        descriptors: &'a mut dyn DescriptorTable,
        credentials: &'a dyn Credentials,
        image: &'a dyn ProcessImage,
    ) -> Self {
        Self {
            stage: LaunchStage::Init,
            identity,
            command,
            oracle,
            descriptors,
            credentials,
            image,
        }
    }

    pub fn stage(&self) -> LaunchStage {
        self.stage
    }

    fn abort(&mut self, err: LaunchError) -> LaunchError {
        if !self.stage.is_terminal() {
            self.stage = LaunchStage::Aborted;
        }
        err
    }

    /// Fails, aborting the launch, unless `next` directly follows the current stage.
    fn expect_next(&mut self, next: LaunchStage) -> Result<(), LaunchError> {
        if self.stage.can_advance_to(next) {
            return Ok(());
        }
        let err = LaunchError::OutOfOrder {
            from: self.stage,
            to: next,
        };
        error!("{}", err);
        Err(self.abort(err))
    }

    pub fn sanitize(&mut self) -> Result<SanitizationReport, LaunchError> {
        self.expect_next(LaunchStage::Sanitized)?;
        let report = Sanitizer::new(self.oracle)
            .run(self.descriptors)
            .map_err(|e| self.abort(e))?;
        self.stage.advance(LaunchStage::Sanitized)?;
        Ok(report)
    }

    pub fn drop_identity(&mut self) -> Result<(), LaunchError> {
        self.expect_next(LaunchStage::IdentityDropped)?;
        credentials::drop_identity(self.credentials, &self.identity)
            .map_err(|e| self.abort(e))?;
        self.stage.advance(LaunchStage::IdentityDropped)
    }

    /// Replaces the process image. Returns only on failure.
    pub fn replace(&mut self) -> LaunchError {
        if let Err(e) = self.expect_next(LaunchStage::Replaced) {
            return e;
        }
        let err = self
            .image
            .replace(self.command.program(), self.command.argv());
        self.abort(err)
    }

    /// Runs every step in order. Returns only on failure.
    pub fn run(&mut self) -> LaunchError {
        info!(
            "Running program {} as untrusted UID {} GID {}",
            self.command.program().to_string_lossy(),
            self.identity.uid(),
            self.identity.gid()
        );
        if let Err(e) = self.sanitize() {
            return e;
        }
        if let Err(e) = self.drop_identity() {
            return e;
        }
        self.replace()
    }
}
