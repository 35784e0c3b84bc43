//! Execution counters
//!
//! Per-cadence activation and run counts, and per-family overload counts.
//! Counters wrap silently; they are diagnostics, not scheduling inputs.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{CADENCE_COUNT, FAMILY_COUNT};
use crate::task::{CadenceId, Family};

/// Live counters owned by the scheduler.
pub(crate) struct Stats {
    activations: [AtomicU32; CADENCE_COUNT],
    runs: [AtomicU32; CADENCE_COUNT],
    overloads: [AtomicU32; FAMILY_COUNT],
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            activations: [const { AtomicU32::new(0) }; CADENCE_COUNT],
            runs: [const { AtomicU32::new(0) }; CADENCE_COUNT],
            overloads: [const { AtomicU32::new(0) }; FAMILY_COUNT],
        }
    }

    #[inline]
    pub fn record_activation(&self, id: CadenceId) {
        self.activations[id.index()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_run(&self, id: CadenceId) {
        self.runs[id.index()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_overload(&self, family: Family) {
        self.overloads[family.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for counter in self
            .activations
            .iter()
            .chain(self.runs.iter())
            .chain(self.overloads.iter())
        {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            activations: self.activations.each_ref().map(|c| c.load(Ordering::Relaxed)),
            runs: self.runs.each_ref().map(|c| c.load(Ordering::Relaxed)),
            overloads: self.overloads.each_ref().map(|c| c.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time copy of the scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    activations: [u32; CADENCE_COUNT],
    runs: [u32; CADENCE_COUNT],
    overloads: [u32; FAMILY_COUNT],
}

impl StatsSnapshot {
    /// Times the tick handler activated `id`.
    pub fn activations(&self, id: CadenceId) -> u32 {
        self.activations[id.index()]
    }

    /// Times the dispatcher ran the body of `id`.
    pub fn runs(&self, id: CadenceId) -> u32 {
        self.runs[id.index()]
    }

    /// Overruns detected for `family`.
    pub fn overloads(&self, family: Family) -> u32 {
        self.overloads[family.index()]
    }

    /// Sum of activations over all cadences. Equals the number of ticks
    /// handled since the last reset, modulo 2^32 like the counters
    /// themselves (about 24.8 days at 2 kHz).
    pub fn total_activations(&self) -> u32 {
        self.activations.iter().fold(0, |sum, n| sum.wrapping_add(*n))
    }
}
