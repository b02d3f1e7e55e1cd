//! Backend selection.
//!
//! Most intercepted calls route purely on descriptor classification
//! (`fdspace::is_alternate` on the governing descriptor). Two calls have
//! their own laws, kept here as pure functions so the decisions can be
//! tested and benchmarked without a live descriptor in sight: `socket`,
//! which routes on its arguments rather than a descriptor, and `select`,
//! which routes on the highest descriptor its `nfds` bound can cover.

use crate::socket;

/// Where a call goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The real host implementation, next in link order.
    Kernel,
    /// The alternate user-space stack (`us_*` entry points).
    Stack,
}

/// Routing law for `socket(domain, type, protocol)`.
///
/// The alternate stack gets the call only when the watermark is non-zero
/// (zero means stack sockets are switched off) and the request is exactly
/// an `AF_INET` stream or datagram socket. Flag bits in the type disqualify
/// it; so does every other domain. Everything else is a kernel socket.
#[must_use]
pub fn socket_backend(fd_start: i32, domain: i32, sock_type: i32) -> Backend {
    if fd_start != 0 && socket::stack_eligible(domain, sock_type) {
        Backend::Stack
    } else {
        Backend::Kernel
    }
}

/// Routing law for `select(nfds, ...)`.
///
/// `nfds` is an exclusive bound, so the highest descriptor the caller can
/// be watching is `nfds - 1`; if that one classifies as alternate, the
/// whole call goes to the stack. An empty range always goes to the kernel.
#[must_use]
pub fn select_backend(fd_start: i32, nfds: i32) -> Backend {
    if nfds > 0 && nfds - 1 >= fd_start {
        Backend::Stack
    } else {
        Backend::Kernel
    }
}
