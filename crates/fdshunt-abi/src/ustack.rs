//! Alternate backend: the user-space network stack's entry points and the
//! data layouts shared with it.
//!
//! The stack exports one `us_`-prefixed twin per interposed call. The
//! symbols are left undefined in the produced `cdylib` and bind at load
//! time to whichever stack library the process carries; test binaries link
//! a recording double instead.

use std::ffi::{c_char, c_int, c_ulong, c_void};

// ---------------------------------------------------------------------------
// Shared layouts
// ---------------------------------------------------------------------------

/// Socket address as the alternate stack declares it: a 2-byte family
/// followed by 14 opaque data bytes, the classic `sockaddr` shape.
#[repr(C)]
pub struct UsSockaddr {
    pub sa_family: u16,
    pub sa_data: [c_char; 14],
}

/// kqueue-style event record, matching the stack's BSD-derived layout.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct UsEvent {
    pub ident: usize,
    pub filter: i16,
    pub flags: u16,
    pub fflags: u32,
    pub data: isize,
    pub udata: *mut c_void,
}

// Layout proof backing the reinterpretation below. If either assert ever
// fires, the adapter needs a real conversion instead of a cast.
const _: () = {
    assert!(size_of::<UsSockaddr>() == size_of::<libc::sockaddr>());
    assert!(align_of::<UsSockaddr>() == align_of::<libc::sockaddr>());
};

/// The one audited site where host socket addresses are reinterpreted for
/// the alternate stack. A cast, not a copy; both layouts are fixed by ABI
/// and proven identical above.
#[inline]
pub(crate) fn sockaddr_for_stack(addr: *const libc::sockaddr) -> *const UsSockaddr {
    addr.cast()
}

/// Mutable flavor of [`sockaddr_for_stack`], for the calls that write an
/// address back (`accept`, `recvfrom`, `getsockname`, `getpeername`).
#[inline]
pub(crate) fn sockaddr_for_stack_mut(addr: *mut libc::sockaddr) -> *mut UsSockaddr {
    addr.cast()
}

// ---------------------------------------------------------------------------
// Stack entry points
// ---------------------------------------------------------------------------

unsafe extern "C" {
    pub(crate) fn us_socket(domain: c_int, sock_type: c_int, protocol: c_int) -> c_int;
    pub(crate) fn us_bind(fd: c_int, addr: *const UsSockaddr, addrlen: libc::socklen_t) -> c_int;
    pub(crate) fn us_connect(fd: c_int, addr: *const UsSockaddr, addrlen: libc::socklen_t)
    -> c_int;
    pub(crate) fn us_listen(fd: c_int, backlog: c_int) -> c_int;
    pub(crate) fn us_accept(
        fd: c_int,
        addr: *mut UsSockaddr,
        addrlen: *mut libc::socklen_t,
    ) -> c_int;
    pub(crate) fn us_send(
        fd: c_int,
        buf: *const c_void,
        len: usize,
        flags: c_int,
    ) -> libc::ssize_t;
    pub(crate) fn us_sendto(
        fd: c_int,
        buf: *const c_void,
        len: usize,
        flags: c_int,
        to: *const UsSockaddr,
        tolen: libc::socklen_t,
    ) -> libc::ssize_t;
    pub(crate) fn us_recv(fd: c_int, buf: *mut c_void, len: usize, flags: c_int) -> libc::ssize_t;
    pub(crate) fn us_recvfrom(
        fd: c_int,
        buf: *mut c_void,
        len: usize,
        flags: c_int,
        from: *mut UsSockaddr,
        fromlen: *mut libc::socklen_t,
    ) -> libc::ssize_t;
    pub(crate) fn us_read(fd: c_int, buf: *mut c_void, count: usize) -> libc::ssize_t;
    pub(crate) fn us_write(fd: c_int, buf: *const c_void, count: usize) -> libc::ssize_t;
    pub(crate) fn us_readv(fd: c_int, iov: *const libc::iovec, iovcnt: c_int) -> libc::ssize_t;
    pub(crate) fn us_writev(fd: c_int, iov: *const libc::iovec, iovcnt: c_int) -> libc::ssize_t;
    pub(crate) fn us_close(fd: c_int) -> c_int;
    pub(crate) fn us_ioctl(fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int;
    pub(crate) fn us_setsockopt(
        fd: c_int,
        level: c_int,
        optname: c_int,
        optval: *const c_void,
        optlen: libc::socklen_t,
    ) -> c_int;
    pub(crate) fn us_getsockopt(
        fd: c_int,
        level: c_int,
        optname: c_int,
        optval: *mut c_void,
        optlen: *mut libc::socklen_t,
    ) -> c_int;
    pub(crate) fn us_getsockname(
        fd: c_int,
        name: *mut UsSockaddr,
        namelen: *mut libc::socklen_t,
    ) -> c_int;
    pub(crate) fn us_getpeername(
        fd: c_int,
        name: *mut UsSockaddr,
        namelen: *mut libc::socklen_t,
    ) -> c_int;
    pub(crate) fn us_select(
        nfds: c_int,
        readfds: *mut libc::fd_set,
        writefds: *mut libc::fd_set,
        errorfds: *mut libc::fd_set,
        timeout: *mut libc::timeval,
    ) -> c_int;
    pub(crate) fn us_kqueue() -> c_int;
    pub(crate) fn us_kevent(
        kq: c_int,
        changelist: *const UsEvent,
        nchanges: c_int,
        eventlist: *mut UsEvent,
        nevents: c_int,
        timeout: *const libc::timespec,
    ) -> c_int;
    pub(crate) fn us_epoll_create(size: c_int) -> c_int;
    pub(crate) fn us_epoll_ctl(
        epfd: c_int,
        op: c_int,
        fd: c_int,
        event: *mut libc::epoll_event,
    ) -> c_int;
    pub(crate) fn us_epoll_wait(
        epfd: c_int,
        events: *mut libc::epoll_event,
        maxevents: c_int,
        timeout: c_int,
    ) -> c_int;
}
