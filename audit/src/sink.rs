use crate::stackbuffer::StackBuffer;
use core::fmt::Write;
use libc::c_int;
use log::{debug, LevelFilter, Log, Metadata, Record};
use std::ffi::CStr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Once;

/// Target of every record describing an intercepted call.
pub(crate) const AUDIT_TARGET: &str = "integrity::audit";

const FD_VARIABLE: &[u8] = b"INTEGRITY_AUDIT_FD\0";
const LEVEL_VARIABLE: &[u8] = b"INTEGRITY_AUDIT_LEVEL\0";
const RECORD_CAPACITY: usize = 1024;

static SINK_FD: AtomicI32 = AtomicI32::new(libc::STDERR_FILENO);
static INIT: Once = Once::new();
static LOGGER: AuditLogger = AuditLogger;

/// Writes each record as one line to the audit descriptor, with the raw
/// write system call: going through libc would re-enter the interposed
/// write() and could allocate.
struct AuditLogger;

impl Log for AuditLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut buf = StackBuffer::<RECORD_CAPACITY>::new();
        let _ = write!(
            &mut buf,
            "integrity-audit[{}] {} {}",
            std::process::id(),
            record.level(),
            record.args()
        );
        buf.end_line();
        write_all(SINK_FD.load(Ordering::Relaxed), buf.as_bytes());
    }

    fn flush(&self) {}
}

fn write_all(fd: c_int, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        let res = unsafe {
            libc::syscall(
                libc::SYS_write,
                fd,
                bytes.as_ptr() as *const libc::c_void,
                bytes.len(),
            )
        };
        if res < 0 {
            if crate::intercept::errno() == libc::EINTR {
                continue;
            }
            // Nowhere left to report this: the record is lost
            return;
        }
        bytes = &bytes[usize::min(res as usize, bytes.len())..];
    }
}

fn env_var(name: &'static [u8]) -> Option<&'static str> {
    let value = unsafe { libc::getenv(name.as_ptr() as *const libc::c_char) };
    if value.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(value) }.to_str().ok()
}

fn configured_fd() -> Option<c_int> {
    env_var(FD_VARIABLE)
        .and_then(|s| s.trim().parse::<c_int>().ok())
        .filter(|fd| *fd >= 0)
}

fn configured_level() -> LevelFilter {
    env_var(LEVEL_VARIABLE)
        .and_then(|s| s.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Sets the audit sink up, exactly once per process. Safe to call
/// concurrently: late callers wait for the first one to finish.
pub(crate) fn init() {
    INIT.call_once(|| {
        if let Some(fd) = configured_fd() {
            SINK_FD.store(fd, Ordering::Relaxed);
        }
        // Fails if the untrusted program registered its own logger through
        // this same copy of the log crate, which cannot happen from a
        // preloaded object. Records are then silently dropped.
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(configured_level());
        }
        debug!(
            "Audit sink ready on file descriptor {}, {} symbols interposed",
            SINK_FD.load(Ordering::Relaxed),
            crate::intercepted_symbols().count()
        );
    });
}

/// Redirects audit records, returning the previous descriptor.
#[cfg(test)]
pub(crate) fn set_sink_fd(fd: c_int) -> c_int {
    SINK_FD.swap(fd, Ordering::Relaxed)
}
