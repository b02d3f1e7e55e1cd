//! Kernel backend: typed accessors for the next definition of each
//! interposed symbol in dynamic-link order.
//!
//! With this library preloaded, `dlsym(RTLD_NEXT, "socket")` skips our own
//! export and lands on the host libc's. Each symbol gets one
//! [`SymbolSlot`]: the first successful lookup is cached for the process
//! lifetime, a failed lookup is reported as `None` and retried on the next
//! call. This module is the only `dlsym` caller in the crate.

use std::ffi::{c_char, c_int, c_ulong, c_void};

use fdshunt_core::symcache::SymbolSlot;

use crate::ustack::UsEvent;

macro_rules! next_fn {
    ($getter:ident, $name:literal, fn($($arg:ty),* $(,)?) -> $ret:ty) => {
        pub(crate) fn $getter() -> Option<unsafe extern "C" fn($($arg),*) -> $ret> {
            static SLOT: SymbolSlot = SymbolSlot::new();
            let target = SLOT.resolve_with(|| {
                // SAFETY: RTLD_NEXT lookup with a static NUL-terminated name.
                unsafe { libc::dlsym(libc::RTLD_NEXT, $name.as_ptr()) }
            });
            if target.is_null() {
                None
            } else {
                // SAFETY: non-null address of a symbol declared with
                // exactly this signature by the host.
                Some(unsafe {
                    std::mem::transmute::<*mut c_void, unsafe extern "C" fn($($arg),*) -> $ret>(
                        target,
                    )
                })
            }
        }
    };
}

// -- files and bytes --------------------------------------------------------

next_fn!(real_open, c"open", fn(*const c_char, c_int, libc::mode_t) -> c_int);
next_fn!(real_read, c"read", fn(c_int, *mut c_void, usize) -> libc::ssize_t);
next_fn!(real_write, c"write", fn(c_int, *const c_void, usize) -> libc::ssize_t);
next_fn!(real_readv, c"readv", fn(c_int, *const libc::iovec, c_int) -> libc::ssize_t);
next_fn!(real_writev, c"writev", fn(c_int, *const libc::iovec, c_int) -> libc::ssize_t);
next_fn!(real_close, c"close", fn(c_int) -> c_int);
next_fn!(real_ioctl, c"ioctl", fn(c_int, c_ulong, *mut c_void) -> c_int);

// -- sockets ----------------------------------------------------------------

next_fn!(real_socket, c"socket", fn(c_int, c_int, c_int) -> c_int);
next_fn!(real_bind, c"bind", fn(c_int, *const libc::sockaddr, libc::socklen_t) -> c_int);
next_fn!(real_connect, c"connect", fn(c_int, *const libc::sockaddr, libc::socklen_t) -> c_int);
next_fn!(real_listen, c"listen", fn(c_int, c_int) -> c_int);
next_fn!(real_accept, c"accept", fn(c_int, *mut libc::sockaddr, *mut libc::socklen_t) -> c_int);
next_fn!(real_send, c"send", fn(c_int, *const c_void, usize, c_int) -> libc::ssize_t);
next_fn!(
    real_sendto,
    c"sendto",
    fn(c_int, *const c_void, usize, c_int, *const libc::sockaddr, libc::socklen_t) -> libc::ssize_t
);
next_fn!(real_recv, c"recv", fn(c_int, *mut c_void, usize, c_int) -> libc::ssize_t);
next_fn!(
    real_recvfrom,
    c"recvfrom",
    fn(c_int, *mut c_void, usize, c_int, *mut libc::sockaddr, *mut libc::socklen_t) -> libc::ssize_t
);
next_fn!(
    real_setsockopt,
    c"setsockopt",
    fn(c_int, c_int, c_int, *const c_void, libc::socklen_t) -> c_int
);
next_fn!(
    real_getsockopt,
    c"getsockopt",
    fn(c_int, c_int, c_int, *mut c_void, *mut libc::socklen_t) -> c_int
);
next_fn!(
    real_getsockname,
    c"getsockname",
    fn(c_int, *mut libc::sockaddr, *mut libc::socklen_t) -> c_int
);
next_fn!(
    real_getpeername,
    c"getpeername",
    fn(c_int, *mut libc::sockaddr, *mut libc::socklen_t) -> c_int
);

// -- readiness --------------------------------------------------------------

next_fn!(
    real_select,
    c"select",
    fn(c_int, *mut libc::fd_set, *mut libc::fd_set, *mut libc::fd_set, *mut libc::timeval) -> c_int
);
// Resolves only on hosts that actually have kqueue; Linux callers reaching
// the kernel branch of kevent get None and an ENOSYS failure.
next_fn!(
    real_kevent,
    c"kevent",
    fn(c_int, *const UsEvent, c_int, *mut UsEvent, c_int, *const libc::timespec) -> c_int
);
next_fn!(real_epoll_create, c"epoll_create", fn(c_int) -> c_int);
next_fn!(
    real_epoll_ctl,
    c"epoll_ctl",
    fn(c_int, c_int, c_int, *mut libc::epoll_event) -> c_int
);
next_fn!(
    real_epoll_wait,
    c"epoll_wait",
    fn(c_int, *mut libc::epoll_event, c_int, c_int) -> c_int
);
