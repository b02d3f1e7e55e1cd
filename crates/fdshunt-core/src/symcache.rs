//! Once-per-name symbol cache.
//!
//! Each interposed syscall keeps one [`SymbolSlot`] holding the address of
//! the next implementation in dynamic-link order. The slot starts empty,
//! is populated by the first successful lookup, and never changes after
//! that. The lookup itself is injected as a closure: the ABI crate passes
//! `dlsym(RTLD_NEXT, ...)`, tests pass counting doubles.
//!
//! This is the same manual-atomic shape used elsewhere in the tree instead
//! of `OnceLock`: a preloaded library cannot afford a blocking futex path
//! during early process initialization, and the race it allows is benign
//! (both threads look up the same name, one result wins, both callers use
//! the published value).

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Lazily-populated cache slot for one resolved symbol address.
pub struct SymbolSlot {
    target: AtomicPtr<c_void>,
}

impl SymbolSlot {
    /// An empty slot. `const` so slots can sit in statics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// The cached address, or null if no resolution has succeeded yet.
    #[must_use]
    pub fn get(&self) -> *mut c_void {
        self.target.load(Ordering::Acquire)
    }

    /// Return the cached address, running `lookup` first if the slot is
    /// still empty.
    ///
    /// A null `lookup` result is returned as-is and *not* cached, so a
    /// later call gets another chance; callers treat null as "this call
    /// cannot take the kernel path". When two threads race the first
    /// resolution, the first published address wins and both callers
    /// return it.
    pub fn resolve_with(&self, lookup: impl FnOnce() -> *mut c_void) -> *mut c_void {
        let cached = self.target.load(Ordering::Acquire);
        if !cached.is_null() {
            return cached;
        }
        let found = lookup();
        if found.is_null() {
            return ptr::null_mut();
        }
        match self.target.compare_exchange(
            ptr::null_mut(),
            found,
            Ordering::SeqCst,
            Ordering::Acquire,
        ) {
            Ok(_) => found,
            Err(published) => published,
        }
    }
}

impl Default for SymbolSlot {
    fn default() -> Self {
        Self::new()
    }
}
