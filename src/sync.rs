//! # Synchronization Primitives
//!
//! The tick interrupt and the dispatcher loop share a handful of small
//! slots. Each slot is a single atomic word, and every read-modify-write on
//! one is a single atomic operation (`swap`, `compare_exchange`), so the
//! handoff does not depend on the tick being the only writer.
//!
//! Multi-field updates (a full scheduler reset, a consistent state
//! snapshot) go through [`critical_section`].

use core::sync::atomic::{AtomicU8, Ordering};

use crate::task::CadenceId;

/// Execute a closure within a critical section (interrupts disabled on
/// target, a global lock on host).
///
/// Keep critical sections short: the tick interrupt is blocked for their
/// whole duration.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(::critical_section::CriticalSection<'_>) -> R,
{
    ::critical_section::with(f)
}

/// Raw value marking an empty slot.
const NONE: u8 = 0xFF;

/// Single-producer/single-consumer slot holding at most one cadence
/// identity.
///
/// The tick handler is the producer of the activation slot and overwrites
/// it unconditionally. The dispatcher consumes it with
/// [`clear_if`](Self::clear_if), which fails if the producer wrote again in
/// between.
pub struct ActivationSlot(AtomicU8);

impl ActivationSlot {
    /// An empty slot.
    pub const fn new() -> Self {
        Self(AtomicU8::new(NONE))
    }

    #[inline]
    pub fn load(&self) -> Option<CadenceId> {
        CadenceId::from_index(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, id: Option<CadenceId>) {
        self.0.store(encode(id), Ordering::Release);
    }

    /// Empty the slot, returning what it held.
    #[inline]
    pub fn take(&self) -> Option<CadenceId> {
        CadenceId::from_index(self.0.swap(NONE, Ordering::AcqRel))
    }

    /// Empty the slot only if it still holds `expected`.
    ///
    /// Returns `false` when the slot was overwritten since `expected` was
    /// read; the slot is then left untouched.
    #[inline]
    pub fn clear_if(&self, expected: CadenceId) -> bool {
        self.0
            .compare_exchange(
                expected.index() as u8,
                NONE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for ActivationSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn encode(id: Option<CadenceId>) -> u8 {
    match id {
        Some(id) => id.index() as u8,
        None => NONE,
    }
}
