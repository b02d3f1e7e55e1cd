//! Core logic for the fdshunt interposition layer.
//!
//! Everything in this crate is pure, safe Rust: the descriptor-space
//! watermark and its reservation protocol, the routing decisions that pick
//! a backend for each intercepted call, the socket eligibility rules, and
//! the once-per-name symbol cache. The `fdshunt-abi` crate binds these to
//! the actual C surface; nothing here touches `dlsym`, descriptors, or the
//! host libc, which is what keeps the decision logic unit-testable without
//! preloading anything.

#![deny(unsafe_code)]

pub mod fdspace;
pub mod route;
pub mod socket;
pub mod symcache;
