use crate::error::LaunchError;
use std::ffi::{CStr, CString, OsString};
use std::os::unix::ffi::OsStringExt;

/// Program and argument vector handed to the untrusted process, unmodified.
/// `argv[0]` is the program exactly as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntrustedCommand {
    argv: Vec<CString>,
}

impl UntrustedCommand {
    /// Builds the command from the launcher's own command line
    /// (`launcher PROGRAM [ARGS...]`, including the launcher's `argv[0]`).
    pub fn from_args<I>(args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut argv = vec![];
        for (position, arg) in args.into_iter().enumerate().skip(1) {
            let arg = CString::new(arg.into_vec())
                .map_err(|_| LaunchError::InvalidArgument { position })?;
            argv.push(arg);
        }
        if argv.is_empty() {
            return Err(LaunchError::MissingProgram);
        }
        Ok(Self { argv })
    }

    pub fn program(&self) -> &CStr {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[CString] {
        &self.argv
    }
}
