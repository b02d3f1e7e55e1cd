//! `select`, routed on the highest descriptor the caller's range covers.

use std::ffi::c_int;

use fdshunt_core::fdspace;
use fdshunt_core::route::{self, Backend};

use crate::nextsym;
use crate::ustack;
use crate::util::missing_next_int;

/// POSIX `select`.
///
/// When `nfds - 1` classifies as alternate the whole call goes to the
/// stack, and the caller's timeout is replaced with a zero timeval: the
/// stack's select is a poll step inside a larger event loop, and blocking
/// in it would starve the kernel descriptors the caller may be watching
/// elsewhere. Kernel-path calls keep their timeout untouched.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn select(
    nfds: c_int,
    readfds: *mut libc::fd_set,
    writefds: *mut libc::fd_set,
    errorfds: *mut libc::fd_set,
    timeout: *mut libc::timeval,
) -> c_int {
    match route::select_backend(fdspace::fd_start(), nfds) {
        Backend::Stack => {
            let mut poll_now = libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            };
            unsafe { ustack::us_select(nfds, readfds, writefds, errorfds, &mut poll_now) }
        }
        Backend::Kernel => match nextsym::real_select() {
            Some(real) => unsafe { real(nfds, readfds, writefds, errorfds, timeout) },
            None => missing_next_int(),
        },
    }
}
