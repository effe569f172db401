// The open() family. open(), openat() and their 64-bit offset aliases are
// variadic in C: the mode is only passed, and may only be read, when the
// flags ask for a file to be created. Variadic functions cannot be defined
// on stable Rust, so they are exported with the mode as a regular trailing
// argument, which is the same calling convention on the supported targets.
// That argument holds garbage unless a file is being created, and is
// ignored in that case.

use crate::display::{CPath, CreationMode, DirFd};
use crate::genuine::Genuine;
use crate::intercept::intercept;
use libc::{c_char, c_int, c_uint, mode_t};

type OpenFn = unsafe extern "C" fn(*const c_char, c_int, ...) -> c_int;
type OpenatFn = unsafe extern "C" fn(c_int, *const c_char, c_int, ...) -> c_int;
type CreatFn = unsafe extern "C" fn(*const c_char, mode_t) -> c_int;

pub(crate) const OPEN_SYMBOLS: &[&str] =
    &["open", "open64", "openat", "openat64", "creat", "creat64"];

/// Whether `flags` make open() consume its variadic mode argument.
pub(crate) fn needs_mode(flags: c_int) -> bool {
    (flags & libc::O_CREAT) != 0 || (flags & libc::O_TMPFILE) == libc::O_TMPFILE
}

fn creation_mode(flags: c_int, mode: mode_t) -> Option<mode_t> {
    if needs_mode(flags) {
        Some(mode)
    } else {
        None
    }
}

// Variadic arguments narrower than int are promoted: the mode is passed as
// an unsigned int, and only when the genuine function will read it
unsafe fn intercept_open(
    genuine: &Genuine<OpenFn>,
    path: *const c_char,
    flags: c_int,
    mode: mode_t,
) -> c_int {
    let mode = creation_mode(flags, mode);
    intercept(
        genuine,
        format_args!("{}, {:#x}{}", CPath(path), flags, CreationMode(mode)),
        |genuine| unsafe {
            match mode {
                Some(mode) => genuine(path, flags, mode as c_uint),
                None => genuine(path, flags),
            }
        },
    )
}

unsafe fn intercept_openat(
    genuine: &Genuine<OpenatFn>,
    dirfd: c_int,
    path: *const c_char,
    flags: c_int,
    mode: mode_t,
) -> c_int {
    let mode = creation_mode(flags, mode);
    intercept(
        genuine,
        format_args!(
            "{}, {}, {:#x}{}",
            DirFd(dirfd),
            CPath(path),
            flags,
            CreationMode(mode)
        ),
        |genuine| unsafe {
            match mode {
                Some(mode) => genuine(dirfd, path, flags, mode as c_uint),
                None => genuine(dirfd, path, flags),
            }
        },
    )
}

// Not variadic: creat() always creates, with an explicit mode
unsafe fn intercept_creat(genuine: &Genuine<CreatFn>, path: *const c_char, mode: mode_t) -> c_int {
    intercept(
        genuine,
        format_args!("{}{}", CPath(path), CreationMode(Some(mode))),
        |genuine| unsafe { genuine(path, mode) },
    )
}

#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn open(path: *const c_char, flags: c_int, mode: mode_t) -> c_int {
    static GENUINE: Genuine<OpenFn> = Genuine::new("open\0");
    intercept_open(&GENUINE, path, flags, mode)
}

#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn open64(path: *const c_char, flags: c_int, mode: mode_t) -> c_int {
    static GENUINE: Genuine<OpenFn> = Genuine::new("open64\0");
    intercept_open(&GENUINE, path, flags, mode)
}

#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn openat(
    dirfd: c_int,
    path: *const c_char,
    flags: c_int,
    mode: mode_t,
) -> c_int {
    static GENUINE: Genuine<OpenatFn> = Genuine::new("openat\0");
    intercept_openat(&GENUINE, dirfd, path, flags, mode)
}

#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn openat64(
    dirfd: c_int,
    path: *const c_char,
    flags: c_int,
    mode: mode_t,
) -> c_int {
    static GENUINE: Genuine<OpenatFn> = Genuine::new("openat64\0");
    intercept_openat(&GENUINE, dirfd, path, flags, mode)
}

#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn creat(path: *const c_char, mode: mode_t) -> c_int {
    static GENUINE: Genuine<CreatFn> = Genuine::new("creat\0");
    intercept_creat(&GENUINE, path, mode)
}

#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn creat64(path: *const c_char, mode: mode_t) -> c_int {
    static GENUINE: Genuine<CreatFn> = Genuine::new("creat64\0");
    intercept_creat(&GENUINE, path, mode)
}
