//! # Sale Phase Clock
//!
//! Derives the current sale phase from the current time, the configured
//! start time, and four fixed offsets.
//!
//! ## Phases
//!
//! ```text
//!   start            start+W          start+W+G        start+S        start+S+R
//!     │                 │                 │               │               │
//! ────┼─────────────────┼─────────────────┼───────────────┼───────────────┼────▶ now
//! Before │  Whitelist   │     Between     │    Public     │   Finished    │ Reveal
//! ```
//!
//! `W` = whitelist duration, `G` = gap duration, `S = W + G + P` (total sale
//! duration, `P` = public duration), `R` = reveal delay. Every lower bound is
//! inclusive and every upper bound exclusive.
//!
//! The phase is computed on every call and never stored. Moving the start
//! time re-phases every caller at once. Boundary arithmetic is widened to
//! `i128`, so no configuration can overflow.

use serde::{Deserialize, Serialize};

use mintgate_core::Timestamp;

const HOUR: u64 = 3_600;

// ─── Phase ───────────────────────────────────────────────────────────

/// The six sale phases, in time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Sale has not started.
    Before = 0,
    /// Allow-list members may mint.
    Whitelist = 1,
    /// Gap between the allow-list and public sales.
    Between = 2,
    /// Anyone may mint.
    Public = 3,
    /// Sale over, assets not yet revealed.
    Finished = 4,
    /// Metadata revealed.
    Reveal = 5,
}

impl Phase {
    /// All phases in time order.
    pub const ALL: [Phase; 6] = [
        Phase::Before,
        Phase::Whitelist,
        Phase::Between,
        Phase::Public,
        Phase::Finished,
        Phase::Reveal,
    ];

    /// The numeric step reported to external callers (0..=5).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Whether the public sale has ended.
    pub fn is_sale_over(&self) -> bool {
        matches!(self, Self::Finished | Self::Reveal)
    }

    /// Whether asset metadata may be revealed.
    pub fn is_revealed(&self) -> bool {
        matches!(self, Self::Reveal)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::Whitelist => "WHITELIST_SALE",
            Self::Between => "BETWEEN",
            Self::Public => "PUBLIC_SALE",
            Self::Finished => "FINISHED",
            Self::Reveal => "REVEAL",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ─── Schedule ────────────────────────────────────────────────────────

/// Phase offsets, in seconds. Constant for the lifetime of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSchedule {
    /// Length of the allow-list phase.
    pub whitelist_duration_secs: u64,
    /// Gap between the allow-list and public phases.
    pub gap_duration_secs: u64,
    /// Length of the public phase.
    pub public_duration_secs: u64,
    /// Delay between the end of the sale and the reveal.
    pub reveal_delay_secs: u64,
}

impl Default for PhaseSchedule {
    /// 12 h allow-list, 12 h gap, 24 h public, reveal 168 h after the sale
    /// ends (216 h after the start).
    fn default() -> Self {
        Self {
            whitelist_duration_secs: 12 * HOUR,
            gap_duration_secs: 12 * HOUR,
            public_duration_secs: 24 * HOUR,
            reveal_delay_secs: 168 * HOUR,
        }
    }
}

impl PhaseSchedule {
    /// Total sale duration: allow-list + gap + public.
    pub fn total_sale_secs(&self) -> i128 {
        i128::from(self.whitelist_duration_secs)
            + i128::from(self.gap_duration_secs)
            + i128::from(self.public_duration_secs)
    }

    /// Absolute phase boundaries for a given start time.
    pub fn boundaries(&self, start: Timestamp) -> PhaseBoundaries {
        let sale_start = i128::from(start.epoch_secs());
        let whitelist_end = sale_start + i128::from(self.whitelist_duration_secs);
        let public_start = whitelist_end + i128::from(self.gap_duration_secs);
        let sale_end = sale_start + self.total_sale_secs();
        let reveal_start = sale_end + i128::from(self.reveal_delay_secs);
        PhaseBoundaries {
            sale_start,
            whitelist_end,
            public_start,
            sale_end,
            reveal_start,
        }
    }

    /// The phase at `now` for a sale starting at `start`.
    pub fn phase_at(&self, start: Timestamp, now: Timestamp) -> Phase {
        self.boundaries(start).phase_at(i128::from(now.epoch_secs()))
    }
}

/// Compute the sale phase. Pure: depends only on its arguments.
pub fn phase(now: Timestamp, start: Timestamp, schedule: &PhaseSchedule) -> Phase {
    schedule.phase_at(start, now)
}

// ─── Boundaries ──────────────────────────────────────────────────────

/// Absolute phase boundaries, in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBoundaries {
    /// First second of the allow-list phase.
    pub sale_start: i128,
    /// First second of the gap.
    pub whitelist_end: i128,
    /// First second of the public phase.
    pub public_start: i128,
    /// First second of the finished phase.
    pub sale_end: i128,
    /// First second of the reveal phase.
    pub reveal_start: i128,
}

impl PhaseBoundaries {
    /// Classify an instant, given as Unix seconds.
    pub fn phase_at(&self, now: i128) -> Phase {
        if now < self.sale_start {
            Phase::Before
        } else if now < self.whitelist_end {
            Phase::Whitelist
        } else if now < self.public_start {
            Phase::Between
        } else if now < self.sale_end {
            Phase::Public
        } else if now < self.reveal_start {
            Phase::Finished
        } else {
            Phase::Reveal
        }
    }

    /// The first second of `phase`, or `None` for `Before` (unbounded).
    pub fn starts_at(&self, phase: Phase) -> Option<i128> {
        match phase {
            Phase::Before => None,
            Phase::Whitelist => Some(self.sale_start),
            Phase::Between => Some(self.whitelist_end),
            Phase::Public => Some(self.public_start),
            Phase::Finished => Some(self.sale_end),
            Phase::Reveal => Some(self.reveal_start),
        }
    }

    /// The start of `phase` as a timestamp, if it is representable.
    pub fn start_timestamp(&self, phase: Phase) -> Option<Timestamp> {
        let secs = i64::try_from(self.starts_at(phase)?).ok()?;
        Timestamp::from_epoch_secs(secs).ok()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
