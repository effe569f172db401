use crate::error::LaunchError;
use crate::last_os_error;
use log::error;
use std::ffi::{CStr, CString};

/// Replaces the running program. Only ever returns on failure.
pub trait ProcessImage {
    fn replace(&self, program: &CStr, argv: &[CString]) -> LaunchError;
}

/// Replaces the process image with execvp(), looking `program` up in PATH
/// when it contains no slash. Descriptors without O_CLOEXEC and the current
/// credentials are inherited by the new image.
#[derive(Debug, Default)]
pub struct ExecImage {
    _private: (),
}

impl ExecImage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessImage for ExecImage {
    fn replace(&self, program: &CStr, argv: &[CString]) -> LaunchError {
        let mut argv_ptrs: Vec<*const libc::c_char> = argv.iter().map(|a| a.as_ptr()).collect();
        argv_ptrs.push(std::ptr::null());
        unsafe {
            libc::execvp(program.as_ptr(), argv_ptrs.as_ptr());
        }
        let os_code = last_os_error();
        let program = program.to_string_lossy().into_owned();
        error!(
            "Unable to run {}: {}",
            program,
            std::io::Error::from_raw_os_error(os_code)
        );
        LaunchError::ImageReplacement { program, os_code }
    }
}
