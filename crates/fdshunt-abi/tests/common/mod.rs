//! In-process double of the alternate network stack.
//!
//! Integration binaries link the dispatcher as a plain rlib, and the rlib
//! leaves every `us_*` entry point undefined; this module provides them.
//! Descriptor factories allocate from a range far above any watermark a
//! test raises, each non-allocating entry returns its own sentinel, and a
//! couple of entries record what crossed the boundary so tests can assert
//! on it.

// Each binary pulls in the whole double but exercises only its slice.
#![allow(dead_code)]

use std::ffi::{c_int, c_ulong, c_void};
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU32, Ordering};

use fdshunt_abi::{UsEvent, UsSockaddr};

/// First descriptor the double hands out. High enough that no watermark
/// used by the tests can classify these as kernel descriptors.
pub const DOUBLE_FD_BASE: c_int = 0x4000;

/// Recorded select timeout value meaning "caller passed a null timeout".
pub const TIMEOUT_UNSET: i64 = i64::MIN;

/// Sentinel return values, one per non-allocating entry point.
pub mod ret {
    use std::ffi::c_int;

    pub const BIND: c_int = 41;
    pub const CONNECT: c_int = 42;
    pub const LISTEN: c_int = 43;
    pub const CLOSE: c_int = 44;
    pub const IOCTL: c_int = 45;
    pub const SETSOCKOPT: c_int = 46;
    pub const GETSOCKOPT: c_int = 47;
    pub const GETSOCKNAME: c_int = 48;
    pub const GETPEERNAME: c_int = 49;
    pub const SELECT: c_int = 50;
    pub const KEVENT: c_int = 51;
    pub const EPOLL_CTL: c_int = 52;
    pub const EPOLL_WAIT: c_int = 53;

    pub const READ: isize = 1101;
    pub const WRITE: isize = 1102;
    pub const READV: isize = 1103;
    pub const WRITEV: isize = 1104;
    pub const SEND: isize = 1105;
    pub const RECV: isize = 1106;
    pub const SENDTO: isize = 1107;
    pub const RECVFROM: isize = 1108;
}

static NEXT_FD: AtomicI32 = AtomicI32::new(DOUBLE_FD_BASE);
static KQUEUE_CALLS: AtomicU32 = AtomicU32::new(0);
static LAST_SELECT_SEC: AtomicI64 = AtomicI64::new(TIMEOUT_UNSET);
static LAST_SELECT_USEC: AtomicI64 = AtomicI64::new(TIMEOUT_UNSET);

fn alloc_fd() -> c_int {
    NEXT_FD.fetch_add(1, Ordering::Relaxed)
}

/// How many times the dispatcher has called `us_kqueue`.
pub fn kqueue_calls() -> u32 {
    KQUEUE_CALLS.load(Ordering::Acquire)
}

/// The timeout the last `us_select` call observed.
pub fn last_select_timeout() -> (i64, i64) {
    (
        LAST_SELECT_SEC.load(Ordering::Acquire),
        LAST_SELECT_USEC.load(Ordering::Acquire),
    )
}

/// errno as the host libc last set it on this thread.
pub fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// us_* definitions
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
extern "C" fn us_socket(_domain: c_int, _sock_type: c_int, _protocol: c_int) -> c_int {
    alloc_fd()
}

#[unsafe(no_mangle)]
extern "C" fn us_bind(_fd: c_int, _addr: *const UsSockaddr, _addrlen: libc::socklen_t) -> c_int {
    ret::BIND
}

#[unsafe(no_mangle)]
extern "C" fn us_connect(_fd: c_int, _addr: *const UsSockaddr, _addrlen: libc::socklen_t) -> c_int {
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
    alloc_fd()
}

#[unsafe(no_mangle)]
extern "C" fn us_send(
    _fd: c_int,
    _buf: *const c_void,
    _len: usize,
    _flags: c_int,
) -> libc::ssize_t {
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
) -> libc::ssize_t {
    ret::SENDTO
}

#[unsafe(no_mangle)]
extern "C" fn us_recv(_fd: c_int, _buf: *mut c_void, _len: usize, _flags: c_int) -> libc::ssize_t {
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
) -> libc::ssize_t {
    ret::RECVFROM
}

#[unsafe(no_mangle)]
extern "C" fn us_read(_fd: c_int, _buf: *mut c_void, _count: usize) -> libc::ssize_t {
    ret::READ
}

#[unsafe(no_mangle)]
extern "C" fn us_write(_fd: c_int, _buf: *const c_void, _count: usize) -> libc::ssize_t {
    ret::WRITE
}

#[unsafe(no_mangle)]
extern "C" fn us_readv(_fd: c_int, _iov: *const libc::iovec, _iovcnt: c_int) -> libc::ssize_t {
    ret::READV
}

#[unsafe(no_mangle)]
extern "C" fn us_writev(_fd: c_int, _iov: *const libc::iovec, _iovcnt: c_int) -> libc::ssize_t {
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
        LAST_SELECT_SEC.store(TIMEOUT_UNSET, Ordering::Release);
        LAST_SELECT_USEC.store(TIMEOUT_UNSET, Ordering::Release);
    } else {
        let tv = unsafe { &*timeout };
        LAST_SELECT_SEC.store(tv.tv_sec, Ordering::Release);
        LAST_SELECT_USEC.store(tv.tv_usec, Ordering::Release);
    }
    ret::SELECT
}

#[unsafe(no_mangle)]
extern "C" fn us_kqueue() -> c_int {
    KQUEUE_CALLS.fetch_add(1, Ordering::AcqRel);
    alloc_fd()
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
    alloc_fd()
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
