use crate::genuine::Genuine;
use crate::sink::{self, AUDIT_TARGET};
use libc::{c_int, ssize_t};
use log::info;
use std::cell::Cell;
use std::fmt;

pub(crate) fn errno() -> c_int {
    unsafe { *(libc::__errno_location()) }
}

pub(crate) fn set_errno(value: c_int) {
    unsafe {
        *(libc::__errno_location()) = value;
    }
}

/// What an intercepted function returns when its genuine implementation
/// could not be found, along with `errno = ENOSYS`.
pub(crate) trait FailureValue {
    fn failure() -> Self;
}

impl FailureValue for c_int {
    fn failure() -> Self {
        -1
    }
}

impl FailureValue for ssize_t {
    fn failure() -> Self {
        -1
    }
}

// uid_t and gid_t: (uid_t)-1 is never a valid identifier
impl FailureValue for u32 {
    fn failure() -> Self {
        u32::MAX
    }
}

impl<T> FailureValue for *mut T {
    fn failure() -> Self {
        std::ptr::null_mut()
    }
}

thread_local! {
    static INSIDE_INTERPOSER: Cell<bool> = const { Cell::new(false) };
}

/// Held while the current thread runs interposer code. Calls intercepted
/// while it is held (made by the audit sink, the dynamic linker, etc.)
/// are forwarded without being recorded.
struct ReentrancyGuard;

impl ReentrancyGuard {
    fn enter() -> Option<Self> {
        // Thread-local storage is gone while the thread exits: stay silent
        INSIDE_INTERPOSER
            .try_with(|inside| {
                if inside.replace(true) {
                    None
                } else {
                    Some(ReentrancyGuard)
                }
            })
            .ok()
            .flatten()
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        let _ = INSIDE_INTERPOSER.try_with(|inside| inside.set(false));
    }
}

/// A call observed by the interposer, rendered as `symbol(arguments)`.
pub(crate) struct InterceptedCall<'a> {
    pub(crate) symbol: &'static str,
    pub(crate) arguments: fmt::Arguments<'a>,
}

impl fmt::Display for InterceptedCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.symbol, self.arguments)
    }
}

/// Records the call, then forwards it to the genuine implementation and
/// hands its result back untouched. The caller's errno is preserved up to
/// the point where the genuine implementation runs.
pub(crate) fn intercept<F, R>(
    genuine: &Genuine<F>,
    arguments: fmt::Arguments<'_>,
    forward: impl FnOnce(F) -> R,
) -> R
where
    F: Copy,
    R: FailureValue,
{
    let saved_errno = errno();
    let target = {
        let guard = ReentrancyGuard::enter();
        if guard.is_some() {
            sink::init();
            info!(
                target: AUDIT_TARGET,
                "{}",
                InterceptedCall {
                    symbol: genuine.symbol(),
                    arguments,
                }
            );
        }
        genuine.get()
    };
    match target {
        Some(function) => {
            set_errno(saved_errno);
            forward(function)
        }
        None => {
            set_errno(libc::ENOSYS);
            R::failure()
        }
    }
}

/// Declares intercepted functions with a fixed, non-variadic signature. Each
/// entry lists the C signature and how to render its salient arguments:
///
/// ```ignore
/// fn unlink(path: *const c_char) -> c_int => "{}", CPath(path);
/// ```
///
/// The generated entry point records the call, resolves the next definition
/// of the same symbol once, and forwards every argument unmodified.
macro_rules! interpose {
    ($(fn $name:ident($($arg:ident: $ty:ty),*) -> $ret:ty => $fmt:literal $(, $log:expr)*;)*) => {
        $(
            #[cfg_attr(not(test), no_mangle)]
            pub unsafe extern "C" fn $name($($arg: $ty),*) -> $ret {
                static GENUINE: $crate::genuine::Genuine<unsafe extern "C" fn($($ty),*) -> $ret> =
                    $crate::genuine::Genuine::new(concat!(stringify!($name), "\0"));
                $crate::intercept::intercept(
                    &GENUINE,
                    format_args!($fmt $(, $log)*),
                    |genuine| unsafe { genuine($($arg),*) },
                )
            }
        )*

        pub(crate) const TABLE_SYMBOLS: &[&str] = &[$(stringify!($name)),*];
    };
}
