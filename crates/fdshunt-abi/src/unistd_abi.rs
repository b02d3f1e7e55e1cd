//! Byte-transfer and lifecycle surface: `open`, `read`, `write`, `readv`,
//! `writev`, `close`, `ioctl`.
//!
//! `open` is the one kernel-only call here (the alternate stack has no
//! files); the rest classify their descriptor and forward verbatim.

use std::ffi::{c_char, c_int, c_ulong, c_void};

use fdshunt_core::fdspace;

use crate::nextsym;
use crate::ustack;
use crate::util::{missing_next_int, missing_next_ssize, reject_reserved};

// ---------------------------------------------------------------------------
// open
// ---------------------------------------------------------------------------

/// POSIX `open`, kernel-only, with the reserved-region collision check.
///
/// The traditional variadic mode is an explicit third parameter. Callers
/// that omit it leave garbage in that register, which the kernel ignores
/// unless `O_CREAT`/`O_TMPFILE` is set — the same contract the C
/// prototype has always had.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn open(pathname: *const c_char, flags: c_int, mode: libc::mode_t) -> c_int {
    let Some(real) = nextsym::real_open() else {
        return missing_next_int();
    };
    let fd = unsafe { real(pathname, flags, mode) };
    reject_reserved(fd)
}

// ---------------------------------------------------------------------------
// read / write
// ---------------------------------------------------------------------------

/// POSIX `read`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn read(fd: c_int, buf: *mut c_void, count: usize) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_read(fd, buf, count) };
    }
    match nextsym::real_read() {
        Some(real) => unsafe { real(fd, buf, count) },
        None => missing_next_ssize(),
    }
}

/// POSIX `write`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn write(fd: c_int, buf: *const c_void, count: usize) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_write(fd, buf, count) };
    }
    match nextsym::real_write() {
        Some(real) => unsafe { real(fd, buf, count) },
        None => missing_next_ssize(),
    }
}

/// POSIX `readv`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn readv(fd: c_int, iov: *const libc::iovec, iovcnt: c_int) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_readv(fd, iov, iovcnt) };
    }
    match nextsym::real_readv() {
        Some(real) => unsafe { real(fd, iov, iovcnt) },
        None => missing_next_ssize(),
    }
}

/// POSIX `writev`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn writev(
    fd: c_int,
    iov: *const libc::iovec,
    iovcnt: c_int,
) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_writev(fd, iov, iovcnt) };
    }
    match nextsym::real_writev() {
        Some(real) => unsafe { real(fd, iov, iovcnt) },
        None => missing_next_ssize(),
    }
}

// ---------------------------------------------------------------------------
// close / ioctl
// ---------------------------------------------------------------------------

/// POSIX `close`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn close(fd: c_int) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_close(fd) };
    }
    match nextsym::real_close() {
        Some(real) => unsafe { real(fd) },
        None => missing_next_int(),
    }
}

/// POSIX `ioctl`, with the variadic argument as an explicit pointer.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn ioctl(fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_ioctl(fd, request, arg) };
    }
    match nextsym::real_ioctl() {
        Some(real) => unsafe { real(fd, request, arg) },
        None => missing_next_int(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
