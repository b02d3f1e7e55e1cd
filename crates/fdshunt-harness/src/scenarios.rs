//! Executable scenarios over the routing and partitioning laws.
//!
//! Each scenario exercises `fdshunt-core` directly, in-process; nothing
//! here preloads the dispatcher or talks to a kernel. A scenario records
//! every check it made, so a report can show the failing expectation
//! instead of a bare verdict.

use std::cell::Cell;
use std::ffi::c_void;

use parking_lot::Mutex;
use serde::Serialize;

use fdshunt_core::fdspace::{FdSpace, Reservation};
use fdshunt_core::route::{self, Backend};
use fdshunt_core::socket::{
    AF_INET, AF_INET6, AF_UNIX, SOCK_CLOEXEC, SOCK_DGRAM, SOCK_NONBLOCK, SOCK_RAW, SOCK_STREAM,
};
use fdshunt_core::symcache::SymbolSlot;

/// One expectation inside a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub label: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Everything a scenario observed.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub passed: bool,
    pub checks: Vec<CheckOutcome>,
}

impl ScenarioResult {
    fn collect(name: &str, checks: Vec<CheckOutcome>) -> Self {
        let passed = checks.iter().all(|check| check.passed);
        Self {
            scenario: name.to_string(),
            passed,
            checks,
        }
    }
}

/// A named, runnable scenario.
pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    entry: fn() -> Vec<CheckOutcome>,
}

impl Scenario {
    /// Execute and wrap the outcome.
    #[must_use]
    pub fn run(&self) -> ScenarioResult {
        ScenarioResult::collect(self.name, (self.entry)())
    }
}

/// Every scenario the harness knows, in execution order.
#[must_use]
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "watermark_monotonic",
            summary: "watermark raises win, lowerings are refused",
            entry: watermark_monotonic,
        },
        Scenario {
            name: "partition_boundary",
            summary: "classification splits exactly at the watermark",
            entry: partition_boundary,
        },
        Scenario {
            name: "reservation_exact",
            summary: "a cooperative allocator reserves the whole low range",
            entry: reservation_exact,
        },
        Scenario {
            name: "reservation_shortfall",
            summary: "failed and overshooting allocations are reported",
            entry: reservation_shortfall,
        },
        Scenario {
            name: "socket_matrix",
            summary: "socket routing over families, types and flags",
            entry: socket_matrix,
        },
        Scenario {
            name: "select_law",
            summary: "select routes on the highest coverable descriptor",
            entry: select_law,
        },
        Scenario {
            name: "resolver_idempotent",
            summary: "symbol resolution runs one lookup and caches it",
            entry: resolver_idempotent,
        },
        Scenario {
            name: "resolver_race",
            summary: "racing resolvers agree on one published target",
            entry: resolver_race,
        },
    ]
}

/// Look up one scenario by name.
#[must_use]
pub fn by_name(name: &str) -> Option<Scenario> {
    all().into_iter().find(|scenario| scenario.name == name)
}

fn check<T: PartialEq + std::fmt::Debug>(
    checks: &mut Vec<CheckOutcome>,
    label: &str,
    expected: T,
    actual: T,
) {
    checks.push(CheckOutcome {
        label: label.to_string(),
        passed: expected == actual,
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    });
}

// ---------------------------------------------------------------------------
// Scenario bodies
// ---------------------------------------------------------------------------

fn watermark_monotonic() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();
    let space = FdSpace::with_start(128);
    check(&mut checks, "installed start", 128, space.start());
    check(&mut checks, "lowering refused", 128, space.raise(64));
    check(&mut checks, "negative refused", 128, space.raise(-1));
    check(&mut checks, "raise wins", 4096, space.raise(4096));
    check(&mut checks, "raise sticks", 4096, space.start());
    check(&mut checks, "old value cannot return", 4096, space.raise(256));
    checks
}

fn partition_boundary() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();
    let space = FdSpace::with_start(128);
    check(&mut checks, "below stays kernel", false, space.is_alternate(127));
    check(&mut checks, "watermark is alternate", true, space.is_alternate(128));
    check(&mut checks, "zero stays kernel", false, space.is_alternate(0));
    check(&mut checks, "negative stays kernel", false, space.is_alternate(-1));
    check(&mut checks, "high values are alternate", true, space.is_alternate(i32::MAX));

    let disabled = FdSpace::with_start(0);
    check(&mut checks, "zero watermark absorbs all", true, disabled.is_alternate(0));
    checks
}

fn reservation_exact() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();
    let space = FdSpace::with_start(32);
    let mut next = 0;
    let record = space.reserve_with(|| {
        let fd = next;
        next += 1;
        fd
    });
    check(&mut checks, "one allocation per slot", 32, next);
    check(
        &mut checks,
        "whole low range reserved",
        Reservation {
            highest: 31,
            shortfall: 0,
        },
        record,
    );
    check(&mut checks, "record is kept", Some(record), space.last_reservation());
    checks
}

fn reservation_shortfall() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();

    // Allocator that fails every fourth call: indexes 3, 7, 11, 15.
    let failing = FdSpace::with_start(16);
    let mut index = 0;
    let record = failing.reserve_with(|| {
        let fd = if index % 4 == 3 { -1 } else { index };
        index += 1;
        fd
    });
    check(&mut checks, "failures are counted", 4, record.shortfall);
    check(&mut checks, "highest skips failures", 14, record.highest);

    // Allocator already past part of the low range: returns 6..=13
    // against a watermark of 8, so six land at or above it.
    let overshooting = FdSpace::with_start(8);
    let mut next = 6;
    let record = overshooting.reserve_with(|| {
        let fd = next;
        next += 1;
        fd
    });
    check(&mut checks, "overshoots are counted", 6, record.shortfall);
    check(&mut checks, "highest tracks overshoots", 13, record.highest);
    checks
}

fn socket_matrix() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();
    let start = 128;
    check(
        &mut checks,
        "inet stream",
        Backend::Stack,
        route::socket_backend(start, AF_INET, SOCK_STREAM),
    );
    check(
        &mut checks,
        "inet dgram",
        Backend::Stack,
        route::socket_backend(start, AF_INET, SOCK_DGRAM),
    );
    check(
        &mut checks,
        "inet raw",
        Backend::Kernel,
        route::socket_backend(start, AF_INET, SOCK_RAW),
    );
    check(
        &mut checks,
        "unix stream",
        Backend::Kernel,
        route::socket_backend(start, AF_UNIX, SOCK_STREAM),
    );
    check(
        &mut checks,
        "inet6 stream",
        Backend::Kernel,
        route::socket_backend(start, AF_INET6, SOCK_STREAM),
    );
    check(
        &mut checks,
        "nonblock flag disqualifies",
        Backend::Kernel,
        route::socket_backend(start, AF_INET, SOCK_STREAM | SOCK_NONBLOCK),
    );
    check(
        &mut checks,
        "cloexec flag disqualifies",
        Backend::Kernel,
        route::socket_backend(start, AF_INET, SOCK_DGRAM | SOCK_CLOEXEC),
    );
    check(
        &mut checks,
        "zero watermark disables stack sockets",
        Backend::Kernel,
        route::socket_backend(0, AF_INET, SOCK_STREAM),
    );
    checks
}

fn select_law() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();
    let start = 128;
    check(&mut checks, "empty range", Backend::Kernel, route::select_backend(start, 0));
    check(&mut checks, "negative nfds", Backend::Kernel, route::select_backend(start, -3));
    check(
        &mut checks,
        "all coverable descriptors below watermark",
        Backend::Kernel,
        route::select_backend(start, start),
    );
    check(
        &mut checks,
        "watermark itself coverable",
        Backend::Stack,
        route::select_backend(start, start + 1),
    );
    check(&mut checks, "far above", Backend::Stack, route::select_backend(start, 4096));
    checks
}

fn resolver_idempotent() -> Vec<CheckOutcome> {
    let mut checks = Vec::new();
    let slot = SymbolSlot::new();
    let lookups = Cell::new(0u32);
    let target = 0u8;
    let target_ptr = (&raw const target).cast_mut().cast::<c_void>();

    let first = slot.resolve_with(|| {
        lookups.set(lookups.get() + 1);
        target_ptr
    });
    let second = slot.resolve_with(|| {
        lookups.set(lookups.get() + 1);
        target_ptr
    });
    check(&mut checks, "resolution returns the target", target_ptr.addr(), first.addr());
    check(&mut checks, "second resolution hits the cache", first.addr(), second.addr());
    check(&mut checks, "exactly one lookup ran", 1, lookups.get());

    let empty = SymbolSlot::new();
    let missing = empty.resolve_with(|| std::ptr::null_mut());
    check(&mut checks, "failed lookup stays null", true, missing.is_null());
    let retried = empty.resolve_with(|| target_ptr);
    check(&mut checks, "failure is not cached", target_ptr.addr(), retried.addr());
    checks
}

fn resolver_race() -> Vec<CheckOutcome> {
    const LANES: usize = 8;
    let mut checks = Vec::new();
    let slot = SymbolSlot::new();
    let targets = [0u8; LANES];
    let observed = Mutex::new(Vec::with_capacity(LANES));

    std::thread::scope(|scope| {
        for lane in 0..LANES {
            let slot = &slot;
            let targets = &targets;
            let observed = &observed;
            scope.spawn(move || {
                let mine = (&raw const targets[lane]).cast_mut().cast::<c_void>();
                let seen = slot.resolve_with(|| mine).addr();
                observed.lock().push(seen);
            });
        }
    });

    let observed = observed.into_inner();
    let candidates: Vec<usize> = targets
        .iter()
        .map(|byte| std::ptr::from_ref(byte).addr())
        .collect();

    check(&mut checks, "every lane resolved", LANES, observed.len());
    let all_agree = observed.windows(2).all(|pair| pair[0] == pair[1]);
    check(&mut checks, "every lane saw the same target", true, all_agree);
    let winner_raced = observed.first().is_some_and(|addr| candidates.contains(addr));
    check(&mut checks, "the winner came from a racing lane", true, winner_raced);
    checks
}
