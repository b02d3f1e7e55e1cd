//! epoll surface.
//!
//! `epoll_create` is deliberately kernel-only: a kernel epoll instance can
//! watch kernel descriptors, and the alternate stack's instances come from
//! the dedicated factory below. `epoll_ctl`/`epoll_wait` route on the
//! epoll descriptor itself, so each instance keeps seeing its own kind.

use std::ffi::c_int;

use fdshunt_core::fdspace;

use crate::nextsym;
use crate::ustack;
use crate::util::{missing_next_int, reject_reserved};

/// POSIX `epoll_create`, kernel-only, with the reserved-region collision
/// check.
// TODO: intercept epoll_create1 the same way once a caller needs it; until
// then a flag-bearing create can still hand out a descriptor that collides
// with the reserved region.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn epoll_create(size: c_int) -> c_int {
    let Some(real) = nextsym::real_epoll_create() else {
        return missing_next_int();
    };
    let fd = unsafe { real(size) };
    reject_reserved(fd)
}

/// Alternate-stack epoll factory: always allocates from the stack, never
/// from the kernel. Not part of the standard surface; callers opt in by
/// name.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn ustack_epoll_create(size: c_int) -> c_int {
    unsafe { ustack::us_epoll_create(size) }
}

/// POSIX `epoll_ctl`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn epoll_ctl(
    epfd: c_int,
    op: c_int,
    fd: c_int,
    event: *mut libc::epoll_event,
) -> c_int {
    if fdspace::is_alternate(epfd) {
        return unsafe { ustack::us_epoll_ctl(epfd, op, fd, event) };
    }
    match nextsym::real_epoll_ctl() {
        Some(real) => unsafe { real(epfd, op, fd, event) },
        None => missing_next_int(),
    }
}

/// POSIX `epoll_wait`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn epoll_wait(
    epfd: c_int,
    events: *mut libc::epoll_event,
    maxevents: c_int,
    timeout: c_int,
) -> c_int {
    if fdspace::is_alternate(epfd) {
        return unsafe { ustack::us_epoll_wait(epfd, events, maxevents, timeout) };
    }
    match nextsym::real_epoll_wait() {
        Some(real) => unsafe { real(epfd, events, maxevents, timeout) },
        None => missing_next_int(),
    }
}
