//! # Scheduler
//!
//! Dispatch and bookkeeping logic for Tickslot. A single [`Scheduler`]
//! context object is shared between two execution contexts:
//!
//! - **Tick handler** ([`Scheduler::tick`]): runs in the SysTick interrupt,
//!   decides which cadence is due and marks it activated. It never calls a
//!   task body.
//! - **Dispatcher** ([`Scheduler::dispatch`]): polled from the main loop,
//!   runs the bodies of the activated time slot and detects overload.
//!
//! ## Time Slots
//!
//! Every base tick (500µs at 2 kHz) belongs to exactly one of three
//! families, chosen by the two low bits of the tick counter:
//!
//! ```text
//! tick  1   2   3   4   5   6   7   8   9  10  11  12 ...
//!       A   B   A   C   A   B   A   C   A   B   A   C
//! A: 1ms   (100ms every 100th A tick)
//! B: 2ms-A (50ms  every  25th B tick)
//! C: 2ms-B (10ms  every   5th C tick)
//! ```
//!
//! A slot runs its family's base cadence and, when the derived cadence was
//! the one activated, the derived cadence right after it.
//!
//! ## Overload Detection
//!
//! Before running a slot the dispatcher snapshots the activated identity.
//! Afterwards it clears the activation with a compare-and-swap against that
//! snapshot. If the tick handler fired in between, the swap fails, the
//! family's overload status is recorded and the new activation is left for
//! the next poll.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::arch::TickSource;
use crate::config::{
    BASE_TICK_HZ, CADENCE_COUNT, CADENCE_PRIORITIES, FAMILY_COUNT, PRIORITY_TASK_COUNT,
    PRIORITY_TASK_PRIORITIES,
};
use crate::error::{Error, Result};
use crate::stats::{Stats, StatsSnapshot};
use crate::sync::{self, ActivationSlot};
use crate::task::{
    CadenceId, CadenceTask, Family, PriorityTask, PriorityTaskId, Runnable, TaskState,
};
use crate::{log_error, log_info, log_trace, log_warn};

// ---------------------------------------------------------------------------
// Scheduler status
// ---------------------------------------------------------------------------

/// Externally observable health of the scheduler.
///
/// The discriminants are the raw status codes reported to diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    /// Reset to baseline, tick source not armed yet.
    Init = 0x00,
    /// Tick source armed, slots are being serviced.
    Running = 0x01,
    /// A 1ms/100ms slot overran its tick. Sticky.
    Overload1Ms = 0x02,
    /// A 2ms-A/50ms slot overran its tick. Sticky.
    Overload2MsA = 0x03,
    /// A 2ms-B/10ms slot overran its tick. Sticky.
    Overload2MsB = 0x04,
    /// Stopped. Activations are discarded until restarted.
    Halted = 0xAA,
}

impl Status {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0x01 => Status::Running,
            0x02 => Status::Overload1Ms,
            0x03 => Status::Overload2MsA,
            0x04 => Status::Overload2MsB,
            0xAA => Status::Halted,
            _ => Status::Init,
        }
    }

    /// Raw status code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_overload(self) -> bool {
        matches!(
            self,
            Status::Overload1Ms | Status::Overload2MsA | Status::Overload2MsB
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Init => "init",
            Status::Running => "running",
            Status::Overload1Ms => "overload 1ms",
            Status::Overload2MsA => "overload 2ms-A",
            Status::Overload2MsB => "overload 2ms-B",
            Status::Halted => "halted",
        };
        f.write_str(name)
    }
}

/// Result of one dispatcher poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Nothing was activated.
    Idle,
    /// The family's slot ran and finished before the next tick.
    Completed(Family),
    /// The family's slot ran but a new tick landed meanwhile.
    Overrun(Family),
    /// The scheduler is halted; the pending activation was dropped.
    Discarded(CadenceId),
}

/// Consistent copy of the scheduler's bookkeeping, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerState {
    pub status: Status,
    pub tick_count: u8,
    /// Sub-counters indexed by [`Family::index`].
    pub family_counters: [u8; FAMILY_COUNT],
    pub activated: Option<CadenceId>,
    pub running: Option<CadenceId>,
    pub snapshot: Option<CadenceId>,
    pub task_states: [TaskState; CADENCE_COUNT],
}

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// The scheduler context. Owns both task tables and all shared state.
///
/// ## Design Notes
///
/// - Every field is atomic, so the tick handler and the dispatcher share
///   the scheduler by `&` reference
/// - Both tables are fixed arrays indexed by [`CadenceId`] and
///   [`PriorityTaskId`]; no runtime registration
/// - `tick_count` is a `u8`; only its two low bits are ever read
pub struct Scheduler<'a> {
    cadences: [CadenceTask<'a>; CADENCE_COUNT],
    priority_tasks: [PriorityTask<'a>; PRIORITY_TASK_COUNT],

    status: AtomicU8,
    tick_count: AtomicU8,
    family_counters: [AtomicU8; FAMILY_COUNT],

    /// Written by the tick handler, consumed by the dispatcher.
    activated: ActivationSlot,
    /// Cadence whose body is executing; read by the schedule point.
    running: ActivationSlot,
    /// Activation seen by the dispatcher when the current slot started.
    snapshot: ActivationSlot,

    stats: Stats,
}

impl<'a> Scheduler<'a> {
    /// Build a scheduler from explicit task tables.
    ///
    /// # Panics
    /// If a descriptor sits at the wrong table index. In a `static`
    /// initializer this is a compile-time error.
    pub const fn new(
        cadences: [CadenceTask<'a>; CADENCE_COUNT],
        priority_tasks: [PriorityTask<'a>; PRIORITY_TASK_COUNT],
    ) -> Self {
        let mut i = 0;
        while i < CADENCE_COUNT {
            assert!(
                cadences[i].id() as usize == i,
                "cadence table out of order"
            );
            i += 1;
        }
        let mut i = 0;
        while i < PRIORITY_TASK_COUNT {
            assert!(
                priority_tasks[i].id() as usize == i,
                "priority table out of order"
            );
            i += 1;
        }

        Self {
            cadences,
            priority_tasks,
            status: AtomicU8::new(Status::Init as u8),
            tick_count: AtomicU8::new(0),
            family_counters: [const { AtomicU8::new(0) }; FAMILY_COUNT],
            activated: ActivationSlot::new(),
            running: ActivationSlot::new(),
            snapshot: ActivationSlot::new(),
            stats: Stats::new(),
        }
    }

    /// Build a scheduler with the default priority numbers from `config`.
    ///
    /// `cadence_bodies` is indexed by [`CadenceId`], `priority_bodies` by
    /// [`PriorityTaskId`].
    pub const fn with_default_priorities(
        cadence_bodies: [&'a dyn Runnable; CADENCE_COUNT],
        priority_bodies: [&'a dyn Runnable; PRIORITY_TASK_COUNT],
    ) -> Self {
        let c = CADENCE_PRIORITIES;
        let p = PRIORITY_TASK_PRIORITIES;
        Self::new(
            [
                CadenceTask::new(CadenceId::OneMs, cadence_bodies[0], c[0]),
                CadenceTask::new(CadenceId::TwoMsA, cadence_bodies[1], c[1]),
                CadenceTask::new(CadenceId::TwoMsB, cadence_bodies[2], c[2]),
                CadenceTask::new(CadenceId::TenMs, cadence_bodies[3], c[3]),
                CadenceTask::new(CadenceId::FiftyMs, cadence_bodies[4], c[4]),
                CadenceTask::new(CadenceId::HundredMs, cadence_bodies[5], c[5]),
            ],
            [
                PriorityTask::new(PriorityTaskId::P1, priority_bodies[0], p[0]),
                PriorityTask::new(PriorityTaskId::P2, priority_bodies[1], p[1]),
                PriorityTask::new(PriorityTaskId::P3, priority_bodies[2], p[2]),
                PriorityTask::new(PriorityTaskId::P4, priority_bodies[3], p[3]),
                PriorityTask::new(PriorityTaskId::P5, priority_bodies[4], p[4]),
            ],
        )
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Reset counters, slots, statistics and status to the baseline.
    ///
    /// Must be called before [`start`](Self::start). Idempotent. Priority
    /// numbers reassigned through [`cycle_priority`](Self::cycle_priority)
    /// are kept.
    pub fn init(&self) {
        sync::critical_section(|_cs| {
            self.tick_count.store(0, Ordering::Relaxed);
            for counter in &self.family_counters {
                counter.store(0, Ordering::Relaxed);
            }
            self.activated.store(None);
            self.running.store(None);
            self.snapshot.store(None);
            for cadence in &self.cadences {
                cadence.set_state(TaskState::Suspended);
            }
            self.stats.reset();
            self.set_status(Status::Init);
        });
    }

    /// Arm `source` at [`BASE_TICK_HZ`] and mark the scheduler running.
    ///
    /// Valid from `Init` and `Halted`. If arming fails the status is left
    /// unchanged and nothing will ever be scheduled.
    pub fn start(&self, source: &mut impl TickSource) -> Result<()> {
        let status = self.status();
        if status != Status::Init && status != Status::Halted {
            return Err(Error::AlreadyStarted);
        }

        source.arm(BASE_TICK_HZ).inspect_err(|err| {
            log_error!("tick source arming failed: {}", err);
        })?;

        self.set_status(Status::Running);
        log_info!("scheduler running at {} Hz", BASE_TICK_HZ);
        Ok(())
    }

    /// Mark the scheduler halted.
    ///
    /// The tick source keeps firing; the dispatcher drops activations
    /// until the scheduler is started again.
    pub fn stop(&self) {
        self.set_status(Status::Halted);
        log_info!("scheduler halted");
    }

    // -----------------------------------------------------------------------
    // Tick handler (interrupt context)
    // -----------------------------------------------------------------------

    /// Advance one base tick and activate exactly one cadence.
    ///
    /// The choice depends only on the tick counter's two low bits and the
    /// family's sub-counter. Both counters advance with single atomic
    /// read-modify-writes, so concurrent callers never lose a step.
    /// Returns the activated cadence.
    pub fn tick(&self) -> CadenceId {
        let tick = self.tick_count.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        let family = Family::of_tick(tick);
        let threshold = family.threshold();

        let previous = self.family_counters[family.index()]
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                Some(if count + 1 >= threshold { 0 } else { count + 1 })
            })
            .unwrap_or_else(|count| count);
        let id = if previous + 1 >= threshold {
            family.derived()
        } else {
            family.base()
        };

        self.activate(id);
        id
    }

    /// Mark `id` ready and publish it as the pending activation,
    /// overwriting whatever was pending.
    pub fn activate(&self, id: CadenceId) {
        self.cadences[id.index()].set_state(TaskState::Ready);
        self.activated.store(Some(id));
        self.stats.record_activation(id);
    }

    // -----------------------------------------------------------------------
    // Dispatcher (main-loop context)
    // -----------------------------------------------------------------------

    /// Service the pending activation, if any.
    ///
    /// Runs at most one family slot per call: the base cadence always, the
    /// derived cadence too when it was the one activated.
    ///
    /// Overload is detected by comparing identities. If the slot overruns
    /// several ticks and the last of them re-activates the same cadence,
    /// the comparison matches: no overload is recorded and that
    /// re-activation is consumed with the slot.
    pub fn dispatch(&self) -> DispatchOutcome {
        let Some(activated) = self.activated.load() else {
            return DispatchOutcome::Idle;
        };

        if self.status() == Status::Halted {
            return DispatchOutcome::Discarded(self.discard_pending(activated));
        }

        let family = activated.family();
        self.snapshot.store(Some(activated));
        log_trace!("slot {} ({})", family, activated);

        self.start_task(family.base());
        if activated == family.derived() {
            self.start_task(family.derived());
        }

        if self.activated.clear_if(activated) {
            DispatchOutcome::Completed(family)
        } else {
            let overload = family.overload_status();
            self.record_overload(overload);
            self.stats.record_overload(family);
            log_warn!("{}: slot {} overran its tick", overload, family);
            DispatchOutcome::Overrun(family)
        }
    }

    /// Drop whatever is pending and return every cadence to `Suspended`.
    ///
    /// Runs with the tick interrupt masked, so no activation can slip in
    /// between emptying the slot and resetting the states. Returns the
    /// cadence that was pending, `seen` if the slot was already empty.
    fn discard_pending(&self, seen: CadenceId) -> CadenceId {
        sync::critical_section(|_cs| {
            let pending = self.activated.take().unwrap_or(seen);
            for cadence in &self.cadences {
                cadence.set_state(TaskState::Suspended);
            }
            pending
        })
    }

    /// Run the body of `id` to completion.
    ///
    /// The cadence is `Running` and published as the running cadence for
    /// the duration of the call, then `Suspended`.
    pub fn start_task(&self, id: CadenceId) {
        let task = &self.cadences[id.index()];
        task.set_state(TaskState::Running);
        self.running.store(Some(id));

        task.body().run(self);

        self.running.store(None);
        task.set_state(TaskState::Suspended);
        self.stats.record_run(id);
    }

    /// Poll the dispatcher forever.
    pub fn run(&self) -> ! {
        loop {
            self.dispatch();
        }
    }

    // -----------------------------------------------------------------------
    // Schedule point
    // -----------------------------------------------------------------------

    /// Run every priority task whose number matches the running cadence's
    /// priority, in table order.
    ///
    /// Outside a running cadence, or with no match, this does nothing.
    pub fn schedule_point(&self) {
        let Some(running) = self.running.load() else {
            return;
        };
        let priority = self.cadences[running.index()].priority();

        for task in self
            .priority_tasks
            .iter()
            .filter(|task| task.priority() == priority)
        {
            task.run(self);
        }
    }

    /// Current priority number of a priority task.
    pub fn priority_of(&self, id: PriorityTaskId) -> u8 {
        self.priority_tasks[id.index()].priority()
    }

    /// Move a priority task to the next priority number (wrapping after
    /// `MAX_PRIORITY`). Returns the new number.
    pub fn cycle_priority(&self, id: PriorityTaskId) -> u8 {
        let priority = self.priority_tasks[id.index()].cycle_priority();
        log_info!("{} now at priority {}", id, priority);
        priority
    }

    // -----------------------------------------------------------------------
    // Status readout
    // -----------------------------------------------------------------------

    #[inline]
    pub fn status(&self) -> Status {
        Status::from_raw(self.status.load(Ordering::Acquire))
    }

    #[inline]
    fn set_status(&self, status: Status) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// Store an overload status unless the scheduler is halted. A `stop`
    /// that lands during an overrunning slot must stay in effect.
    fn record_overload(&self, overload: Status) {
        let _ = self
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (Status::from_raw(raw) != Status::Halted).then_some(overload as u8)
            });
    }

    /// Return an overload status to `Running`.
    ///
    /// Returns `false` (and changes nothing) when no overload is recorded.
    pub fn clear_overload(&self) -> bool {
        let cleared = self
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                Status::from_raw(raw)
                    .is_overload()
                    .then_some(Status::Running as u8)
            })
            .is_ok();
        if cleared {
            log_info!("overload cleared");
        }
        cleared
    }

    /// Run state of one cadence.
    #[inline]
    pub fn task_state(&self, id: CadenceId) -> TaskState {
        self.cadences[id.index()].state()
    }

    /// Pending activation, if any.
    #[inline]
    pub fn activated(&self) -> Option<CadenceId> {
        self.activated.load()
    }

    /// Cadence whose body is executing, if any.
    #[inline]
    pub fn running(&self) -> Option<CadenceId> {
        self.running.load()
    }

    /// Copy of the execution counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Copy of all bookkeeping, taken with the tick interrupt masked.
    pub fn snapshot(&self) -> SchedulerState {
        sync::critical_section(|_cs| SchedulerState {
            status: self.status(),
            tick_count: self.tick_count.load(Ordering::Relaxed),
            family_counters: self
                .family_counters
                .each_ref()
                .map(|c| c.load(Ordering::Relaxed)),
            activated: self.activated.load(),
            running: self.running.load(),
            snapshot: self.snapshot.load(),
            task_states: self.cadences.each_ref().map(|c| c.state()),
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
