//! Watermark control surface.
//!
//! `set_fd_start` is the only mutator of the partition and the one piece
//! of setup an embedding application must run before alternate-stack
//! traffic starts. Reservation diagnostics beyond the C return value are
//! available in-process through `fdshunt_core::fdspace::last_reservation`.

use std::ffi::c_int;

use fdshunt_core::fdspace;

use crate::ustack;

/// Raise the descriptor-space watermark to `fdstart` (never lowering it),
/// then reserve the alternate stack's low allocator range by allocating
/// one stack kqueue per watermark slot. Returns the highest raw
/// descriptor value observed during the reservation; with an exact
/// reservation of watermark `W` that is `W - 1`.
///
/// The reservation runs even when `fdstart` does not raise anything, and
/// the allocations are intentionally never released.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn set_fd_start(fdstart: c_int) -> c_int {
    fdspace::raise_fd_start(fdstart);
    let record = fdspace::reserve_with(|| unsafe { ustack::us_kqueue() });
    record.highest
}
