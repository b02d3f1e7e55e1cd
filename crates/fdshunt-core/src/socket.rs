//! Socket constants and stack-eligibility rules.
//!
//! `<sys/socket.h>` constants that the routing layer compares against,
//! defined locally so this crate stays dependency-free. Actual socket
//! calls live in the ABI crate; this module only answers "could the
//! alternate stack serve this request at all".

// ---------------------------------------------------------------------------
// Address families (AF_*)
// ---------------------------------------------------------------------------

/// Unspecified address family.
pub const AF_UNSPEC: i32 = 0;
/// Unix domain sockets.
pub const AF_UNIX: i32 = 1;
/// IPv4 Internet protocols. The only family the alternate stack serves.
pub const AF_INET: i32 = 2;
/// IPv6 Internet protocols.
pub const AF_INET6: i32 = 10;

// ---------------------------------------------------------------------------
// Socket types (SOCK_*)
// ---------------------------------------------------------------------------

/// Byte-stream socket.
pub const SOCK_STREAM: i32 = 1;
/// Datagram socket.
pub const SOCK_DGRAM: i32 = 2;
/// Raw network protocol access.
pub const SOCK_RAW: i32 = 3;

// ---------------------------------------------------------------------------
// Socket type flags (ORed into `socket()` type argument)
// ---------------------------------------------------------------------------

/// Set O_NONBLOCK on the new socket.
pub const SOCK_NONBLOCK: i32 = 0x800;
/// Set FD_CLOEXEC on the new socket.
pub const SOCK_CLOEXEC: i32 = 0x80000;

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Returns `true` if a `socket(domain, stype, ...)` request is one the
/// alternate stack can serve: `AF_INET`, and a type that is *exactly*
/// `SOCK_STREAM` or `SOCK_DGRAM`.
///
/// The comparison is deliberately exact. `SOCK_STREAM | SOCK_CLOEXEC` is
/// not eligible; the stack's creation path does not honor the modifier
/// flags, so flag-bearing requests fall through to the kernel where they
/// mean what the caller asked for.
#[inline]
pub fn stack_eligible(domain: i32, stype: i32) -> bool {
    domain == AF_INET && (stype == SOCK_STREAM || stype == SOCK_DGRAM)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
