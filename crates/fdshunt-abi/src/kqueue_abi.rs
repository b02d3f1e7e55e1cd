//! kqueue surface.
//!
//! The alternate stack speaks kqueue natively, so `kqueue()` has no kernel
//! branch at all: every queue it creates is a stack queue (this is also
//! what makes it usable as the reservation allocator). `kevent` still
//! classifies, so a hypothetical kernel queue descriptor would be
//! forwarded to a next definition — on hosts without one, that branch
//! fails with `ENOSYS` instead.

use std::ffi::c_int;

use fdshunt_core::fdspace;

use crate::nextsym;
use crate::ustack::{self, UsEvent};
use crate::util::missing_next_int;

/// BSD `kqueue`: always an alternate-stack queue.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn kqueue() -> c_int {
    unsafe { ustack::us_kqueue() }
}

/// BSD `kevent`, routed on the queue descriptor.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn kevent(
    kq: c_int,
    changelist: *const UsEvent,
    nchanges: c_int,
    eventlist: *mut UsEvent,
    nevents: c_int,
    timeout: *const libc::timespec,
) -> c_int {
    if fdspace::is_alternate(kq) {
        return unsafe { ustack::us_kevent(kq, changelist, nchanges, eventlist, nevents, timeout) };
    }
    match nextsym::real_kevent() {
        Some(real) => unsafe { real(kq, changelist, nchanges, eventlist, nevents, timeout) },
        None => missing_next_int(),
    }
}
