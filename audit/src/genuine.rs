use libc::c_void;
use log::{debug, error, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Write-once slot holding the next definition of an intercepted symbol
/// (usually libc's). `F` is the function pointer type of that definition.
pub(crate) struct Genuine<F> {
    /// NUL-terminated symbol name
    name: &'static str,
    slot: OnceLock<Option<F>>,
    resolutions: AtomicUsize,
}

impl<F: Copy> Genuine<F> {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceLock::new(),
            resolutions: AtomicUsize::new(0),
        }
    }

    pub(crate) fn symbol(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }

    /// Resolves the symbol on first use. Concurrent first uses block until
    /// one of them has filled the slot, so every caller gets the same answer.
    pub(crate) fn get(&self) -> Option<F> {
        *self.slot.get_or_init(|| self.resolve())
    }

    fn resolve(&self) -> Option<F> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        if std::mem::size_of::<F>() != std::mem::size_of::<*mut c_void>()
            || !self.name.ends_with('\0')
        {
            error!("Invalid interposer declaration for {}", self.symbol());
            return None;
        }
        let address = unsafe { libc::dlsym(libc::RTLD_NEXT, self.name.as_ptr() as *const _) };
        if address.is_null() {
            warn!(
                "No genuine implementation of {}(), calls will fail with ENOSYS",
                self.symbol()
            );
            return None;
        }
        if is_own_symbol(address) {
            error!(
                "Next definition of {}() is the interposer itself, calls will fail with ENOSYS",
                self.symbol()
            );
            return None;
        }
        debug!("Genuine {}() found at {:p}", self.symbol(), address);
        Some(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&address) })
    }

    #[cfg(test)]
    pub(crate) fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }
}

/// Whether `address` belongs to the object this code is loaded from.
pub(crate) fn is_own_symbol(address: *const c_void) -> bool {
    let mut target: libc::Dl_info = unsafe { std::mem::zeroed() };
    let mut own: libc::Dl_info = unsafe { std::mem::zeroed() };
    let here = is_own_symbol as fn(*const c_void) -> bool as *const c_void;
    unsafe {
        if libc::dladdr(address, &mut target) == 0 || libc::dladdr(here, &mut own) == 0 {
            return false;
        }
    }
    !target.dli_fbase.is_null() && target.dli_fbase == own.dli_fbase
}
