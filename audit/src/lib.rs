// Syscall audit interposer, loaded into untrusted programs with LD_PRELOAD.
// Every exported function records the call it intercepts, then forwards it
// unmodified to the next definition of the same symbol (usually libc's).
#![cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]

mod display;
mod genuine;
#[macro_use]
mod intercept;
mod open;
mod sink;
mod stackbuffer;
mod symbols;

pub use open::{creat, creat64, open, open64, openat, openat64};
pub use symbols::*;

/// Names of every function this library interposes.
pub fn intercepted_symbols() -> impl Iterator<Item = &'static str> {
    symbols::TABLE_SYMBOLS
        .iter()
        .chain(open::OPEN_SYMBOLS.iter())
        .copied()
}
