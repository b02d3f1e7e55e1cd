// Every extern "C" entry point takes raw pointers straight from a C caller
// and forwards them verbatim to one backend; per-function safety prose would
// restate that one forwarding contract everywhere.
#![allow(clippy::missing_safety_doc)]
//! # fdshunt-abi
//!
//! The interposition surface of fdshunt. This crate produces a `cdylib`
//! meant to be preloaded in front of libc: it exports the unprefixed POSIX
//! socket/IO names, and routes every call to exactly one of two backends.
//!
//! ```text
//! C caller -> exported entry (this crate)
//!          -> routing decision (fdshunt-core)
//!          -> kernel backend:         dlsym(RTLD_NEXT) target
//!             or alternate backend:   us_* symbol from the network stack
//! ```
//!
//! Descriptors at or above the watermark belong to the alternate stack,
//! everything below stays with the kernel; `fdshunt-core` holds the
//! partitioning and routing logic, this crate only binds it to the C ABI.
//!
//! Exports carry `#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]`:
//! in debug builds (where unit and integration tests run) the symbols stay
//! mangled, so the test binary's own libc calls are not captured by the
//! very dispatcher under test. Release builds export the real surface.

mod nextsym;
mod ustack;
mod util;

pub mod epoll_abi;
pub mod fdspace_abi;
pub mod kqueue_abi;
pub mod poll_abi;
pub mod socket_abi;
pub mod unistd_abi;

pub use ustack::{UsEvent, UsSockaddr};

// Unit-test builds have no alternate stack to link against; this double
// satisfies the us_* references and records what the dispatcher sent it.
#[cfg(test)]
mod stack_double;
