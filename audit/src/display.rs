// Renderings of C arguments for audit records. Pointers come from the
// caller and may be invalid, in which case the genuine function fails with
// EFAULT: they are never dereferenced, memory is copied out with
// process_vm_readv() on ourselves, which reports bad addresses instead of
// faulting. Unreadable arguments are rendered as their address.

use libc::{c_char, c_int, c_void, mode_t};
use std::fmt;
use std::mem::size_of;

// execve() argument vectors can be huge, only the start is recorded
const MAX_ARGV_ENTRIES: usize = 8;

// Longer paths are cut, records are truncated well before that anyway
const MAX_PATH_BYTES: usize = 1024;

// Smallest page size of the supported targets. A single copy never crosses
// a multiple of it, so a readable prefix is never lost because the page
// after it is unmapped.
const MIN_PAGE_SIZE: usize = 4096;

/// Copies bytes at `addr` into `buf` until it is full or memory stops being
/// readable. Returns how many bytes were copied.
fn copy_from_caller(addr: usize, buf: &mut [u8]) -> usize {
    let pid = unsafe { libc::getpid() };
    let mut copied = 0;
    while copied < buf.len() {
        let start = addr.wrapping_add(copied);
        let len = (buf.len() - copied).min(MIN_PAGE_SIZE - start % MIN_PAGE_SIZE);
        let local = libc::iovec {
            iov_base: buf[copied..].as_mut_ptr() as *mut c_void,
            iov_len: len,
        };
        let remote = libc::iovec {
            iov_base: start as *mut c_void,
            iov_len: len,
        };
        let res = unsafe { libc::process_vm_readv(pid, &local, 1, &remote, 1, 0) };
        if res <= 0 {
            break;
        }
        copied += res as usize;
    }
    copied
}

fn read_pointer(addr: usize) -> Option<*const c_char> {
    let mut bytes = [0u8; size_of::<usize>()];
    if copy_from_caller(addr, &mut bytes) == bytes.len() {
        Some(usize::from_ne_bytes(bytes) as *const c_char)
    } else {
        None
    }
}

/// NUL-terminated path, quoted and escaped, or `NULL`.
pub(crate) struct CPath(pub(crate) *const c_char);

impl fmt::Display for CPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_null() {
            return f.write_str("NULL");
        }
        let mut chunk = [0u8; 64];
        let mut offset = 0;
        while offset < MAX_PATH_BYTES {
            let copied = copy_from_caller(self.0 as usize + offset, &mut chunk);
            if copied == 0 {
                break;
            }
            if offset == 0 {
                f.write_str("\"")?;
            }
            let bytes = &chunk[..copied];
            if let Some(end) = bytes.iter().position(|&b| b == 0) {
                return write!(f, "{}\"", bytes[..end].escape_ascii());
            }
            write!(f, "{}", bytes.escape_ascii())?;
            offset += copied;
        }
        if offset == 0 {
            write!(f, "{:p}", self.0)
        } else {
            // Too long, or not terminated before unreadable memory
            f.write_str("\"...")
        }
    }
}

/// Directory descriptor of the *at() family.
pub(crate) struct DirFd(pub(crate) c_int);

impl fmt::Display for DirFd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == libc::AT_FDCWD {
            f.write_str("AT_FDCWD")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// NULL-terminated argument vector.
pub(crate) struct Argv(pub(crate) *const *const c_char);

impl Argv {
    fn entry(&self, index: usize) -> Option<*const c_char> {
        read_pointer((self.0 as usize).wrapping_add(index * size_of::<*const c_char>()))
    }
}

impl fmt::Display for Argv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_null() {
            return f.write_str("NULL");
        }
        if self.entry(0).is_none() {
            return write!(f, "{:p}", self.0);
        }
        f.write_str("[")?;
        for i in 0.. {
            let arg = self.entry(i);
            if arg.map_or(false, |arg| arg.is_null()) {
                break;
            }
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                Some(arg) if i < MAX_ARGV_ENTRIES => write!(f, "{}", CPath(arg))?,
                // Too many entries, or unreadable memory before the terminator
                _ => {
                    f.write_str("...")?;
                    break;
                }
            }
        }
        f.write_str("]")
    }
}

/// Creation mode of the open() family, only present when one was passed.
pub(crate) struct CreationMode(pub(crate) Option<mode_t>);

impl fmt::Display for CreationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(mode) => write!(f, ", {:#o}", mode),
            None => Ok(()),
        }
    }
}
