use crate::error::LaunchError;

/// Progression of a launch. Transitions only go forward, each stage is entered
/// at most once, and `Aborted` is reachable from every non-terminal stage.
///
/// `Replaced` is only ever reached by the new process image: the launcher
/// checks that it may enter it, then execs, and never observes it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LaunchStage {
    Init,
    Sanitized,
    IdentityDropped,
    Replaced,
    Aborted,
}

impl LaunchStage {
    pub fn can_advance_to(self, next: LaunchStage) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Sanitized)
                | (Self::Sanitized, Self::IdentityDropped)
                | (Self::IdentityDropped, Self::Replaced)
                | (Self::Init | Self::Sanitized | Self::IdentityDropped, Self::Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Replaced | Self::Aborted)
    }

    pub(crate) fn advance(&mut self, next: LaunchStage) -> Result<(), LaunchError> {
        if !self.can_advance_to(next) {
            return Err(LaunchError::OutOfOrder {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}
