//! # Kernel
//!
//! Process-wide access to the one scheduler of the controller.
//!
//! The firmware owns the [`Scheduler`] as a `static` (its task tables are
//! fixed at compile time) and registers it here with [`init`]. The SysTick
//! handler and the main loop then reach it through the free functions of
//! this module.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init(&SCHEDULER)  ← Register + reset to baseline
//!         ├─► kernel::start(&mut tick)  ← Arm SysTick at BASE_TICK_HZ
//!         └─► kernel::run()             ← Poll the dispatcher forever
//!
//! SysTick (every 500µs)
//!   └─► kernel::tick()                  ← Activate exactly one cadence
//! ```

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::arch::TickSource;
use crate::error::{Error, Result};
use crate::scheduler::{DispatchOutcome, Scheduler, Status};
use crate::task::CadenceId;

// ---------------------------------------------------------------------------
// Global scheduler instance
// ---------------------------------------------------------------------------

/// The registered scheduler. Null until [`init`] runs.
///
/// Only ever holds a `&'static Scheduler<'static>`, which is `Sync`, so
/// the ISR and the main loop may both dereference it.
static SCHEDULER_PTR: AtomicPtr<Scheduler<'static>> = AtomicPtr::new(ptr::null_mut());

fn scheduler() -> Option<&'static Scheduler<'static>> {
    // Safety: the pointer is either null or derived from a
    // `&'static Scheduler<'static>` in `init`.
    unsafe { SCHEDULER_PTR.load(Ordering::Acquire).as_ref() }
}

// ---------------------------------------------------------------------------
// Kernel API
// ---------------------------------------------------------------------------

/// Register `scheduler` as the controller's scheduler and reset it to its
/// baseline. Must be called before [`start`]. Calling it again re-registers
/// and resets.
pub fn init(scheduler: &'static Scheduler<'static>) {
    scheduler.init();
    SCHEDULER_PTR.store(ptr::from_ref(scheduler).cast_mut(), Ordering::Release);
}

/// Arm `source` and start scheduling.
///
/// On [`Error::TickSource`] nothing will ever be scheduled; the caller
/// decides whether to halt.
pub fn start(source: &mut impl TickSource) -> Result<()> {
    scheduler().ok_or(Error::NotInitialized)?.start(source)
}

/// Flag the scheduler halted. No-op before [`init`].
pub fn stop() {
    if let Some(scheduler) = scheduler() {
        scheduler.stop();
    }
}

/// Tick handler entry point. Call from the tick interrupt only.
///
/// Returns the activated cadence, or `None` before [`init`].
pub fn tick() -> Option<CadenceId> {
    scheduler().map(Scheduler::tick)
}

/// One dispatcher poll.
pub fn dispatch() -> DispatchOutcome {
    scheduler().map_or(DispatchOutcome::Idle, Scheduler::dispatch)
}

/// Poll the dispatcher forever. **Does not return.**
///
/// Spins idle if no scheduler was registered.
pub fn run() -> ! {
    loop {
        if let Some(scheduler) = scheduler() {
            scheduler.run();
        }
        core::hint::spin_loop();
    }
}

/// Current scheduler status; `Status::Init` before [`init`].
pub fn status() -> Status {
    scheduler().map_or(Status::Init, Scheduler::status)
}

/// Clear a recorded overload. See [`Scheduler::clear_overload`].
pub fn clear_overload() -> bool {
    scheduler().is_some_and(Scheduler::clear_overload)
}

#[cfg(test)]
pub(crate) fn reset() {
    SCHEDULER_PTR.store(ptr::null_mut(), Ordering::Release);
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
