//! Socket surface: creation, naming, connection, transfer.
//!
//! Every entry point classifies the governing descriptor (or, for
//! `socket`, the request itself) and forwards all arguments verbatim to
//! exactly one backend. Socket addresses crossing to the alternate stack
//! go through the adapter in `ustack`; results and errno come back
//! unchanged from whichever backend ran.

use std::ffi::{c_int, c_void};

use fdshunt_core::fdspace;
use fdshunt_core::route::{self, Backend};

use crate::nextsym;
use crate::ustack;
use crate::util::{missing_next_int, missing_next_ssize, reject_reserved};

// ---------------------------------------------------------------------------
// socket / socket_raw
// ---------------------------------------------------------------------------

/// POSIX `socket`, routed by the socket law: a non-zero watermark and an
/// exact `AF_INET` stream/datagram request go to the alternate stack;
/// everything else is a kernel socket.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn socket(domain: c_int, sock_type: c_int, protocol: c_int) -> c_int {
    match route::socket_backend(fdspace::fd_start(), domain, sock_type) {
        Backend::Stack => unsafe { ustack::us_socket(domain, sock_type, protocol) },
        Backend::Kernel => unsafe { socket_raw(domain, sock_type, protocol) },
    }
}

/// Kernel socket, unconditionally: the escape hatch for callers that need
/// a real kernel descriptor even where the routing law would pick the
/// stack. Takes the reserved-region collision check like every kernel
/// allocation.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn socket_raw(domain: c_int, sock_type: c_int, protocol: c_int) -> c_int {
    let Some(real) = nextsym::real_socket() else {
        return missing_next_int();
    };
    let fd = unsafe { real(domain, sock_type, protocol) };
    reject_reserved(fd)
}

// ---------------------------------------------------------------------------
// bind / connect / listen
// ---------------------------------------------------------------------------

/// POSIX `bind`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn bind(
    fd: c_int,
    addr: *const libc::sockaddr,
    addrlen: libc::socklen_t,
) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_bind(fd, ustack::sockaddr_for_stack(addr), addrlen) };
    }
    match nextsym::real_bind() {
        Some(real) => unsafe { real(fd, addr, addrlen) },
        None => missing_next_int(),
    }
}

/// POSIX `connect`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn connect(
    fd: c_int,
    addr: *const libc::sockaddr,
    addrlen: libc::socklen_t,
) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_connect(fd, ustack::sockaddr_for_stack(addr), addrlen) };
    }
    match nextsym::real_connect() {
        Some(real) => unsafe { real(fd, addr, addrlen) },
        None => missing_next_int(),
    }
}

/// POSIX `listen`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn listen(fd: c_int, backlog: c_int) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_listen(fd, backlog) };
    }
    match nextsym::real_listen() {
        Some(real) => unsafe { real(fd, backlog) },
        None => missing_next_int(),
    }
}

// ---------------------------------------------------------------------------
// accept / accept4
// ---------------------------------------------------------------------------

fn accept_impl(fd: c_int, addr: *mut libc::sockaddr, addrlen: *mut libc::socklen_t) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_accept(fd, ustack::sockaddr_for_stack_mut(addr), addrlen) };
    }
    let Some(real) = nextsym::real_accept() else {
        return missing_next_int();
    };
    let accepted = unsafe { real(fd, addr, addrlen) };
    reject_reserved(accepted)
}

/// POSIX `accept`. A kernel-path result takes the collision check: the
/// accepted descriptor must not land in the reserved region.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn accept(
    fd: c_int,
    addr: *mut libc::sockaddr,
    addrlen: *mut libc::socklen_t,
) -> c_int {
    accept_impl(fd, addr, addrlen)
}

/// POSIX `accept4`. The flags argument is ignored on both paths; the call
/// behaves exactly as `accept`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn accept4(
    fd: c_int,
    addr: *mut libc::sockaddr,
    addrlen: *mut libc::socklen_t,
    _flags: c_int,
) -> c_int {
    accept_impl(fd, addr, addrlen)
}

// ---------------------------------------------------------------------------
// send / recv and the addressed pair
// ---------------------------------------------------------------------------

/// POSIX `send`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn send(
    fd: c_int,
    buf: *const c_void,
    len: usize,
    flags: c_int,
) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_send(fd, buf, len, flags) };
    }
    match nextsym::real_send() {
        Some(real) => unsafe { real(fd, buf, len, flags) },
        None => missing_next_ssize(),
    }
}

/// POSIX `sendto`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn sendto(
    fd: c_int,
    buf: *const c_void,
    len: usize,
    flags: c_int,
    to: *const libc::sockaddr,
    tolen: libc::socklen_t,
) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe {
            ustack::us_sendto(fd, buf, len, flags, ustack::sockaddr_for_stack(to), tolen)
        };
    }
    match nextsym::real_sendto() {
        Some(real) => unsafe { real(fd, buf, len, flags, to, tolen) },
        None => missing_next_ssize(),
    }
}

/// POSIX `recv`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn recv(
    fd: c_int,
    buf: *mut c_void,
    len: usize,
    flags: c_int,
) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_recv(fd, buf, len, flags) };
    }
    match nextsym::real_recv() {
        Some(real) => unsafe { real(fd, buf, len, flags) },
        None => missing_next_ssize(),
    }
}

/// POSIX `recvfrom`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn recvfrom(
    fd: c_int,
    buf: *mut c_void,
    len: usize,
    flags: c_int,
    from: *mut libc::sockaddr,
    fromlen: *mut libc::socklen_t,
) -> libc::ssize_t {
    if fdspace::is_alternate(fd) {
        return unsafe {
            ustack::us_recvfrom(
                fd,
                buf,
                len,
                flags,
                ustack::sockaddr_for_stack_mut(from),
                fromlen,
            )
        };
    }
    match nextsym::real_recvfrom() {
        Some(real) => unsafe { real(fd, buf, len, flags, from, fromlen) },
        None => missing_next_ssize(),
    }
}

// ---------------------------------------------------------------------------
// socket options and names
// ---------------------------------------------------------------------------

/// POSIX `setsockopt`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn setsockopt(
    fd: c_int,
    level: c_int,
    optname: c_int,
    optval: *const c_void,
    optlen: libc::socklen_t,
) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_setsockopt(fd, level, optname, optval, optlen) };
    }
    match nextsym::real_setsockopt() {
        Some(real) => unsafe { real(fd, level, optname, optval, optlen) },
        None => missing_next_int(),
    }
}

/// POSIX `getsockopt`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn getsockopt(
    fd: c_int,
    level: c_int,
    optname: c_int,
    optval: *mut c_void,
    optlen: *mut libc::socklen_t,
) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe { ustack::us_getsockopt(fd, level, optname, optval, optlen) };
    }
    match nextsym::real_getsockopt() {
        Some(real) => unsafe { real(fd, level, optname, optval, optlen) },
        None => missing_next_int(),
    }
}

/// POSIX `getsockname`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn getsockname(
    fd: c_int,
    name: *mut libc::sockaddr,
    namelen: *mut libc::socklen_t,
) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe {
            ustack::us_getsockname(fd, ustack::sockaddr_for_stack_mut(name), namelen)
        };
    }
    match nextsym::real_getsockname() {
        Some(real) => unsafe { real(fd, name, namelen) },
        None => missing_next_int(),
    }
}

/// POSIX `getpeername`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn getpeername(
    fd: c_int,
    name: *mut libc::sockaddr,
    namelen: *mut libc::socklen_t,
) -> c_int {
    if fdspace::is_alternate(fd) {
        return unsafe {
            ustack::us_getpeername(fd, ustack::sockaddr_for_stack_mut(name), namelen)
        };
    }
    match nextsym::real_getpeername() {
        Some(real) => unsafe { real(fd, name, namelen) },
        None => missing_next_int(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
