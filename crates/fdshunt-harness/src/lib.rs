//! Self-verification harness for fdshunt.
//!
//! Runs named scenarios against the routing and partitioning laws in
//! `fdshunt-core` and renders the outcome as markdown or JSON. Everything
//! executes in-process against library APIs; the harness never preloads
//! the dispatcher and never owns real descriptors, so it can run anywhere
//! `cargo run` can.

#![forbid(unsafe_code)]

pub mod report;
pub mod scenarios;

pub use report::{HarnessError, VerificationReport, VerificationSummary};
pub use scenarios::{CheckOutcome, Scenario, ScenarioResult};
