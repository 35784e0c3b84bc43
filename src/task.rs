//! # Task Model
//!
//! Defines the two kinds of tasks Tickslot dispatches:
//!
//! - **Time-triggered cadences**: six fixed task lists activated purely by
//!   elapsed ticks (1ms, 2ms-A, 2ms-B, 10ms, 50ms, 100ms).
//! - **Priority-triggered tasks**: five tasks (P1..P5) that only run as a
//!   fan-out from a schedule point inside a cadence body. A cadence's
//!   priority number selects which of them fire.
//!
//! Task bodies are opaque to the scheduler. They implement [`Runnable`],
//! run to completion and never block.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::{
    CADENCE_COUNT, FIFTY_MS_THRESHOLD, HUNDRED_MS_THRESHOLD, MAX_PRIORITY, PRIORITY_TASK_COUNT,
    TEN_MS_THRESHOLD,
};
use crate::scheduler::{Scheduler, Status};

// ---------------------------------------------------------------------------
// Task state machine
// ---------------------------------------------------------------------------

/// Run state of a time-triggered cadence.
///
/// ```text
///   ┌───────────┐   activate()   ┌─────────┐   start_task()   ┌─────────┐
///   │ Suspended │ ─────────────► │  Ready  │ ───────────────► │ Running │
///   └───────────┘                └─────────┘                  └─────────┘
///        ▲                                                         │
///        └──────────────────── body returns ───────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TaskState {
    /// Not due. Initial state of every cadence.
    Suspended = 0,
    /// Activated by the tick handler, waiting for the dispatcher.
    Ready = 1,
    /// Body is executing. At most one cadence is in this state.
    Running = 2,
}

impl TaskState {
    pub(crate) const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => TaskState::Ready,
            2 => TaskState::Running,
            _ => TaskState::Suspended,
        }
    }
}

// ---------------------------------------------------------------------------
// Cadence identities
// ---------------------------------------------------------------------------

/// Identity of a time-triggered cadence. Doubles as the index into the
/// cadence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CadenceId {
    OneMs = 0,
    TwoMsA = 1,
    TwoMsB = 2,
    TenMs = 3,
    FiftyMs = 4,
    HundredMs = 5,
}

impl CadenceId {
    /// All cadences in table order.
    pub const ALL: [CadenceId; CADENCE_COUNT] = [
        CadenceId::OneMs,
        CadenceId::TwoMsA,
        CadenceId::TwoMsB,
        CadenceId::TenMs,
        CadenceId::FiftyMs,
        CadenceId::HundredMs,
    ];

    /// Table index of this cadence.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`index`](Self::index). Out-of-range values map to `None`.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(CadenceId::OneMs),
            1 => Some(CadenceId::TwoMsA),
            2 => Some(CadenceId::TwoMsB),
            3 => Some(CadenceId::TenMs),
            4 => Some(CadenceId::FiftyMs),
            5 => Some(CadenceId::HundredMs),
            _ => None,
        }
    }

    /// The tick family this cadence belongs to.
    pub const fn family(self) -> Family {
        match self {
            CadenceId::OneMs | CadenceId::HundredMs => Family::OneMs,
            CadenceId::TwoMsA | CadenceId::FiftyMs => Family::TwoMsA,
            CadenceId::TwoMsB | CadenceId::TenMs => Family::TwoMsB,
        }
    }

    /// Nominal period in milliseconds.
    pub const fn period_ms(self) -> u32 {
        match self {
            CadenceId::OneMs => 1,
            CadenceId::TwoMsA | CadenceId::TwoMsB => 2,
            CadenceId::TenMs => 10,
            CadenceId::FiftyMs => 50,
            CadenceId::HundredMs => 100,
        }
    }
}

impl fmt::Display for CadenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CadenceId::OneMs => "1ms",
            CadenceId::TwoMsA => "2ms-A",
            CadenceId::TwoMsB => "2ms-B",
            CadenceId::TenMs => "10ms",
            CadenceId::FiftyMs => "50ms",
            CadenceId::HundredMs => "100ms",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Tick families
// ---------------------------------------------------------------------------

/// One of the three mutually exclusive tick families.
///
/// | Family   | Ticks (`T`)      | Base cadence | Derived cadence | Threshold |
/// |----------|------------------|--------------|-----------------|-----------|
/// | `OneMs`  | odd              | 1ms          | 100ms           | 100       |
/// | `TwoMsA` | `T mod 4 == 2`   | 2ms-A        | 50ms            | 25        |
/// | `TwoMsB` | `T mod 4 == 0`   | 2ms-B        | 10ms            | 5         |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Family {
    OneMs,
    TwoMsA,
    TwoMsB,
}

impl Family {
    /// Family owning tick number `tick`. Only the two low bits matter.
    #[inline]
    pub const fn of_tick(tick: u8) -> Self {
        if tick & 0x01 == 0x01 {
            Family::OneMs
        } else if tick & 0x02 == 0x02 {
            Family::TwoMsA
        } else {
            Family::TwoMsB
        }
    }

    /// Index of this family's sub-counter.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Cadence that runs on every slot of this family.
    pub const fn base(self) -> CadenceId {
        match self {
            Family::OneMs => CadenceId::OneMs,
            Family::TwoMsA => CadenceId::TwoMsA,
            Family::TwoMsB => CadenceId::TwoMsB,
        }
    }

    /// Cadence that replaces the base activation once the threshold is hit.
    pub const fn derived(self) -> CadenceId {
        match self {
            Family::OneMs => CadenceId::HundredMs,
            Family::TwoMsA => CadenceId::FiftyMs,
            Family::TwoMsB => CadenceId::TenMs,
        }
    }

    /// Family ticks per derived activation.
    pub const fn threshold(self) -> u8 {
        match self {
            Family::OneMs => HUNDRED_MS_THRESHOLD,
            Family::TwoMsA => FIFTY_MS_THRESHOLD,
            Family::TwoMsB => TEN_MS_THRESHOLD,
        }
    }

    /// Status code recorded when a slot of this family overruns.
    pub const fn overload_status(self) -> Status {
        match self {
            Family::OneMs => Status::Overload1Ms,
            Family::TwoMsA => Status::Overload2MsA,
            Family::TwoMsB => Status::Overload2MsB,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.derived())
    }
}

// ---------------------------------------------------------------------------
// Priority task identities
// ---------------------------------------------------------------------------

/// Identity of a priority-triggered task. Doubles as its table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PriorityTaskId {
    P1 = 0,
    P2 = 1,
    P3 = 2,
    P4 = 3,
    P5 = 4,
}

impl PriorityTaskId {
    /// All priority tasks in table order.
    pub const ALL: [PriorityTaskId; PRIORITY_TASK_COUNT] = [
        PriorityTaskId::P1,
        PriorityTaskId::P2,
        PriorityTaskId::P3,
        PriorityTaskId::P4,
        PriorityTaskId::P5,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PriorityTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.index() + 1)
    }
}

// ---------------------------------------------------------------------------
// Task bodies
// ---------------------------------------------------------------------------

/// A task body: runs to completion, takes no input beyond the scheduler
/// context and returns nothing.
///
/// Cadence bodies use the context to reach the schedule point
/// ([`Scheduler::schedule_point`]). Priority-task bodies must not call the
/// schedule point themselves.
///
/// Any `Fn(&Scheduler)` closure or function item is a `Runnable`:
///
/// ```ignore
/// fn tasks_1ms(scheduler: &Scheduler<'_>) {
///     scheduler.schedule_point();
/// }
/// ```
pub trait Runnable: Sync {
    fn run(&self, scheduler: &Scheduler<'_>);
}

impl<F> Runnable for F
where
    F: Fn(&Scheduler<'_>) + Sync,
{
    #[inline]
    fn run(&self, scheduler: &Scheduler<'_>) {
        self(scheduler)
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Descriptor of a time-triggered cadence: identity, body, run state and the
/// priority number used to select priority tasks at its schedule points.
pub struct CadenceTask<'a> {
    id: CadenceId,
    body: &'a dyn Runnable,
    state: AtomicU8,
    priority: u8,
}

impl<'a> CadenceTask<'a> {
    /// A suspended cadence.
    pub const fn new(id: CadenceId, body: &'a dyn Runnable, priority: u8) -> Self {
        Self {
            id,
            body,
            state: AtomicU8::new(TaskState::Suspended as u8),
            priority,
        }
    }

    #[inline]
    pub const fn id(&self) -> CadenceId {
        self.id
    }

    /// Correlation key into the priority table.
    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        TaskState::from_raw(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn set_state(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub(crate) fn body(&self) -> &'a dyn Runnable {
        self.body
    }
}

/// Descriptor of a priority-triggered task.
///
/// The priority number is atomic so it can be reassigned at runtime
/// (see [`Scheduler::cycle_priority`]); membership of the table is fixed.
pub struct PriorityTask<'a> {
    id: PriorityTaskId,
    body: &'a dyn Runnable,
    priority: AtomicU8,
}

impl<'a> PriorityTask<'a> {
    pub const fn new(id: PriorityTaskId, body: &'a dyn Runnable, priority: u8) -> Self {
        Self {
            id,
            body,
            priority: AtomicU8::new(priority),
        }
    }

    #[inline]
    pub const fn id(&self) -> PriorityTaskId {
        self.id
    }

    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority.load(Ordering::Relaxed)
    }

    /// Advance the priority number 1 → 2 → … → `MAX_PRIORITY` → 1.
    /// Returns the new number.
    pub(crate) fn cycle_priority(&self) -> u8 {
        let previous = self
            .priority
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |p| {
                Some(next_priority(p))
            })
            .unwrap_or_else(|p| p);
        next_priority(previous)
    }

    #[inline]
    pub(crate) fn run(&self, scheduler: &Scheduler<'_>) {
        self.body.run(scheduler);
    }
}

#[inline]
const fn next_priority(priority: u8) -> u8 {
    if priority >= MAX_PRIORITY {
        1
    } else {
        priority + 1
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
