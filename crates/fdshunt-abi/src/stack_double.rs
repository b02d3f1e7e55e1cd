//! Recording stand-in for the alternate stack.
//!
//! Unit-test binaries have no stack library to bind the `us_*` family
//! against, so this module defines all of it. Each entry returns a
//! distinctive sentinel (so a test can prove which backend served a call
//! from the return value alone); allocating entries hand out descriptors
//! from a counter far above any watermark the tests establish; `us_select`
//! additionally records the timeout it was given.

use std::ffi::{c_int, c_ulong, c_void};
use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};

use crate::ustack::{UsEvent, UsSockaddr};

/// Return values that identify which double served a call.
pub(crate) mod ret {
    pub const BIND: i32 = 41;
    pub const CONNECT: i32 = 42;
    pub const LISTEN: i32 = 43;
    pub const CLOSE: i32 = 44;
    pub const IOCTL: i32 = 45;
    pub const SETSOCKOPT: i32 = 46;
    pub const GETSOCKOPT: i32 = 47;
    pub const GETSOCKNAME: i32 = 48;
    pub const GETPEERNAME: i32 = 49;
    pub const SELECT: i32 = 50;
    pub const KEVENT: i32 = 51;
    pub const EPOLL_CTL: i32 = 52;
    pub const EPOLL_WAIT: i32 = 53;

    pub const READ: isize = 1101;
    pub const WRITE: isize = 1102;
    pub const READV: isize = 1103;
    pub const WRITEV: isize = 1104;
    pub const SEND: isize = 1105;
    pub const RECV: isize = 1106;
    pub const SENDTO: isize = 1107;
    pub const RECVFROM: isize = 1108;
}

/// First descriptor the double's allocators hand out.
pub(crate) const DOUBLE_FD_BASE: i32 = 0x4000;

static NEXT_FD: AtomicI32 = AtomicI32::new(DOUBLE_FD_BASE);

pub(crate) const TIMEOUT_UNSET: i64 = i64::MIN;
pub(crate) static LAST_SELECT_SEC: AtomicI64 = AtomicI64::new(TIMEOUT_UNSET);
pub(crate) static LAST_SELECT_USEC: AtomicI64 = AtomicI64::new(TIMEOUT_UNSET);

fn allocate_fd() -> c_int {
    NEXT_FD.fetch_add(1, Ordering::Relaxed)
}

#[unsafe(no_mangle)]
extern "C" fn us_socket(_domain: c_int, _sock_type: c_int, _protocol: c_int) -> c_int {
    allocate_fd()
}

#[unsafe(no_mangle)]
extern "C" fn us_bind(_fd: c_int, _addr: *const UsSockaddr, _addrlen: libc::socklen_t) -> c_int {
    ret::BIND
}

#[unsafe(no_mangle)]
extern "C" fn us_connect(
    _fd: c_int,
    _addr: *const UsSockaddr,
    _addrlen: libc::socklen_t,
) -> c_int {
    ret::CONNECT
}

#[unsafe(no_mangle)]
extern "C" fn us_listen(_fd: c_int, _backlog: c_int) -> c_int {
    ret::LISTEN
}

#[unsafe(no_mangle)]
extern "C" fn us_accept(
    _fd: c_int,
    _addr: *mut UsSockaddr,
    _addrlen: *mut libc::socklen_t,
) -> c_int {
    allocate_fd()
}

#[unsafe(no_mangle)]
extern "C" fn us_send(_fd: c_int, _buf: *const c_void, _len: usize, _flags: c_int) -> isize {
    ret::SEND
}

#[unsafe(no_mangle)]
extern "C" fn us_sendto(
    _fd: c_int,
    _buf: *const c_void,
    _len: usize,
    _flags: c_int,
    _to: *const UsSockaddr,
    _tolen: libc::socklen_t,
) -> isize {
    ret::SENDTO
}

#[unsafe(no_mangle)]
extern "C" fn us_recv(_fd: c_int, _buf: *mut c_void, _len: usize, _flags: c_int) -> isize {
    ret::RECV
}

#[unsafe(no_mangle)]
extern "C" fn us_recvfrom(
    _fd: c_int,
    _buf: *mut c_void,
    _len: usize,
    _flags: c_int,
    _from: *mut UsSockaddr,
    _fromlen: *mut libc::socklen_t,
) -> isize {
    ret::RECVFROM
}

#[unsafe(no_mangle)]
extern "C" fn us_read(_fd: c_int, _buf: *mut c_void, _count: usize) -> isize {
    ret::READ
}

#[unsafe(no_mangle)]
extern "C" fn us_write(_fd: c_int, _buf: *const c_void, _count: usize) -> isize {
    ret::WRITE
}

#[unsafe(no_mangle)]
extern "C" fn us_readv(_fd: c_int, _iov: *const libc::iovec, _iovcnt: c_int) -> isize {
    ret::READV
}

#[unsafe(no_mangle)]
extern "C" fn us_writev(_fd: c_int, _iov: *const libc::iovec, _iovcnt: c_int) -> isize {
    ret::WRITEV
}

#[unsafe(no_mangle)]
extern "C" fn us_close(_fd: c_int) -> c_int {
    ret::CLOSE
}

#[unsafe(no_mangle)]
extern "C" fn us_ioctl(_fd: c_int, _request: c_ulong, _arg: *mut c_void) -> c_int {
    ret::IOCTL
}

#[unsafe(no_mangle)]
extern "C" fn us_setsockopt(
    _fd: c_int,
    _level: c_int,
    _optname: c_int,
    _optval: *const c_void,
    _optlen: libc::socklen_t,
) -> c_int {
    ret::SETSOCKOPT
}

#[unsafe(no_mangle)]
extern "C" fn us_getsockopt(
    _fd: c_int,
    _level: c_int,
    _optname: c_int,
    _optval: *mut c_void,
    _optlen: *mut libc::socklen_t,
) -> c_int {
    ret::GETSOCKOPT
}

#[unsafe(no_mangle)]
extern "C" fn us_getsockname(
    _fd: c_int,
    _name: *mut UsSockaddr,
    _namelen: *mut libc::socklen_t,
) -> c_int {
    ret::GETSOCKNAME
}

#[unsafe(no_mangle)]
extern "C" fn us_getpeername(
    _fd: c_int,
    _name: *mut UsSockaddr,
    _namelen: *mut libc::socklen_t,
) -> c_int {
    ret::GETPEERNAME
}

#[unsafe(no_mangle)]
extern "C" fn us_select(
    _nfds: c_int,
    _readfds: *mut libc::fd_set,
    _writefds: *mut libc::fd_set,
    _errorfds: *mut libc::fd_set,
    timeout: *mut libc::timeval,
) -> c_int {
    if timeout.is_null() {
        LAST_SELECT_SEC.store(TIMEOUT_UNSET, Ordering::Relaxed);
        LAST_SELECT_USEC.store(TIMEOUT_UNSET, Ordering::Relaxed);
    } else {
        // SAFETY: the dispatcher always passes a valid timeval here.
        let tv = unsafe { &*timeout };
        LAST_SELECT_SEC.store(tv.tv_sec, Ordering::Relaxed);
        LAST_SELECT_USEC.store(tv.tv_usec, Ordering::Relaxed);
    }
    ret::SELECT
}

#[unsafe(no_mangle)]
extern "C" fn us_kqueue() -> c_int {
    allocate_fd()
}

#[unsafe(no_mangle)]
extern "C" fn us_kevent(
    _kq: c_int,
    _changelist: *const UsEvent,
    _nchanges: c_int,
    _eventlist: *mut UsEvent,
    _nevents: c_int,
    _timeout: *const libc::timespec,
) -> c_int {
    ret::KEVENT
}

#[unsafe(no_mangle)]
extern "C" fn us_epoll_create(_size: c_int) -> c_int {
    allocate_fd()
}

#[unsafe(no_mangle)]
extern "C" fn us_epoll_ctl(
    _epfd: c_int,
    _op: c_int,
    _fd: c_int,
    _event: *mut libc::epoll_event,
) -> c_int {
    ret::EPOLL_CTL
}

#[unsafe(no_mangle)]
extern "C" fn us_epoll_wait(
    _epfd: c_int,
    _events: *mut libc::epoll_event,
    _maxevents: c_int,
    _timeout: c_int,
) -> c_int {
    ret::EPOLL_WAIT
}
