//! Descriptor-space partitioning.
//!
//! The process-wide descriptor space is split by a single integer
//! watermark: descriptors below it belong to the kernel, descriptors at or
//! above it belong to the alternate stack. Classification is arithmetic on
//! the descriptor value; there is no per-descriptor table.
//!
//! The watermark starts at [`DEFAULT_FD_START`], can be raised (never
//! lowered) through [`FdSpace::raise`], and may be raised once more at
//! startup by the `FDSHUNT_FD_START` environment variable. Every write
//! goes through `fetch_max`, so monotonicity holds under any interleaving
//! of raises and the lazy environment read.
//!
//! Raising the watermark is only half of the partition: the alternate
//! stack's own allocator must also be walked past the low range, so that
//! real stack descriptors come out at or above the watermark. That is
//! [`FdSpace::reserve_with`]; the burned low-range descriptors are never
//! released.

use std::sync::atomic::{AtomicI32, AtomicU8, AtomicU64, Ordering};

/// Watermark value a process starts with when nothing overrides it.
pub const DEFAULT_FD_START: i32 = 128;

/// Environment variable consulted once, lazily, for an initial raise.
pub const FD_START_ENV: &str = "FDSHUNT_FD_START";

const ENV_UNRESOLVED: u8 = 0;
const ENV_RESOLVING: u8 = 1;
const ENV_RESOLVED: u8 = 2;

/// Packed `last_reservation` value meaning "no reservation has run yet".
/// A real record never collides with it: the high half holds a
/// non-negative `i32`, so bit 63 is always clear.
const NO_RESERVATION: u64 = u64::MAX;

/// Outcome of one reservation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// Highest raw value the allocator returned. An exact reservation of
    /// watermark `W` observes `W - 1`.
    pub highest: i32,
    /// Number of allocations that did not land in `[0, watermark)`,
    /// i.e. failures and overshoots. Zero means the low range is fully
    /// reserved.
    pub shortfall: u32,
}

/// One partitioned descriptor space.
///
/// The process uses a single static instance behind the free functions at
/// the bottom of this module; tests build their own instances with
/// [`FdSpace::with_start`] so they never touch process-global state.
pub struct FdSpace {
    env_state: AtomicU8,
    start: AtomicI32,
    last_reservation: AtomicU64,
}

impl FdSpace {
    /// Space with a fixed watermark; the environment is never consulted.
    #[must_use]
    pub const fn with_start(start: i32) -> Self {
        Self {
            env_state: AtomicU8::new(ENV_RESOLVED),
            start: AtomicI32::new(start),
            last_reservation: AtomicU64::new(NO_RESERVATION),
        }
    }

    /// Space starting at [`DEFAULT_FD_START`], with a single lazy chance
    /// for [`FD_START_ENV`] to raise it.
    #[must_use]
    pub const fn from_env() -> Self {
        Self {
            env_state: AtomicU8::new(ENV_UNRESOLVED),
            start: AtomicI32::new(DEFAULT_FD_START),
            last_reservation: AtomicU64::new(NO_RESERVATION),
        }
    }

    /// Current watermark.
    pub fn start(&self) -> i32 {
        if self.env_state.load(Ordering::Acquire) != ENV_RESOLVED {
            self.resolve_env();
        }
        self.start.load(Ordering::Acquire)
    }

    /// Does `fd` belong to the alternate stack?
    #[must_use]
    pub fn is_alternate(&self, fd: i32) -> bool {
        fd >= self.start()
    }

    /// Raise the watermark to `candidate` if that is higher; return the
    /// effective watermark either way. Lower or negative candidates leave
    /// the watermark untouched.
    pub fn raise(&self, candidate: i32) -> i32 {
        // Make sure the environment joins before any explicit raise, so
        // the two cannot reorder into a lowering.
        self.start();
        self.start.fetch_max(candidate, Ordering::AcqRel).max(candidate)
    }

    /// Walk `alloc` once per watermark slot so the alternate stack's
    /// allocator burns through its low range `[0, watermark)`.
    ///
    /// Records and returns what was observed: the highest raw value and
    /// the number of allocations that missed the low range. The caller
    /// owns the contract that `alloc` allocates (and never releases) one
    /// descriptor per call.
    pub fn reserve_with(&self, mut alloc: impl FnMut() -> i32) -> Reservation {
        let span = self.start();
        let mut highest = 0;
        let mut shortfall = 0u32;
        for _ in 0..span {
            let fd = alloc();
            if fd > highest {
                highest = fd;
            }
            if fd < 0 || fd >= span {
                shortfall += 1;
            }
        }
        let record = Reservation { highest, shortfall };
        self.last_reservation.store(pack(record), Ordering::Release);
        record
    }

    /// Record of the most recent [`reserve_with`](Self::reserve_with)
    /// pass, or `None` if none has run.
    #[must_use]
    pub fn last_reservation(&self) -> Option<Reservation> {
        match self.last_reservation.load(Ordering::Acquire) {
            NO_RESERVATION => None,
            packed => Some(unpack(packed)),
        }
    }

    /// One-shot environment read. Exactly one thread performs the read;
    /// anyone racing it sees the stored default, which is a safe answer:
    /// the variable can only raise the watermark, and the raise lands
    /// before `ENV_RESOLVED` is published.
    fn resolve_env(&self) {
        if self
            .env_state
            .compare_exchange(
                ENV_UNRESOLVED,
                ENV_RESOLVING,
                Ordering::SeqCst,
                Ordering::Relaxed,
            )
            .is_err()
        {
            return;
        }
        if let Ok(raw) = std::env::var(FD_START_ENV) {
            if let Some(value) = parse_fd_start(&raw) {
                self.start.fetch_max(value, Ordering::AcqRel);
            }
        }
        self.env_state.store(ENV_RESOLVED, Ordering::Release);
    }
}

/// Lenient parse of the override variable: decimal, non-negative,
/// surrounding whitespace tolerated. Anything else is ignored.
fn parse_fd_start(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i32>() {
        Ok(value) if value >= 0 => Some(value),
        _ => None,
    }
}

fn pack(record: Reservation) -> u64 {
    (u64::from(record.highest as u32) << 32) | u64::from(record.shortfall)
}

fn unpack(bits: u64) -> Reservation {
    Reservation {
        highest: (bits >> 32) as i32,
        shortfall: bits as u32,
    }
}

// ---------------------------------------------------------------------------
// Process-wide instance
// ---------------------------------------------------------------------------

static PROCESS: FdSpace = FdSpace::from_env();

/// Watermark of the process-wide space.
pub fn fd_start() -> i32 {
    PROCESS.start()
}

/// Classify `fd` against the process-wide watermark.
pub fn is_alternate(fd: i32) -> bool {
    PROCESS.is_alternate(fd)
}

/// Raise the process-wide watermark; returns the effective value.
pub fn raise_fd_start(candidate: i32) -> i32 {
    PROCESS.raise(candidate)
}

/// Run a reservation pass over the process-wide space.
pub fn reserve_with(alloc: impl FnMut() -> i32) -> Reservation {
    PROCESS.reserve_with(alloc)
}

/// Most recent process-wide reservation record.
pub fn last_reservation() -> Option<Reservation> {
    PROCESS.last_reservation()
}
