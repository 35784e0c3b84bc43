//! # Tickslot Example Firmware
//!
//! Demonstrates the time-triggered scheduler with the classic table of six
//! task lists and five priority tasks:
//!
//! | Cadence | Priority number | Priority tasks reached |
//! |---------|-----------------|------------------------|
//! | 1ms     | 5 | P5 |
//! | 2ms-A   | 4 | P4 |
//! | 2ms-B   | 4 | P4 |
//! | 10ms    | 3 | P3 |
//! | 50ms    | 2 | P2 |
//! | 100ms   | 1 | P1 |
//!
//! Every task list only calls the schedule point. Priority tasks count
//! their executions. Once per second the 100ms list reports the counters
//! and cycles P1 to the next priority number, so P1 visits every cadence.
//!
//! On a host build the same tables run against a simulated tick for
//! 2000 ticks (one second) and the counters are printed.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

use core::sync::atomic::{AtomicU32, Ordering};

use tickslot::config::PRIORITY_TASK_COUNT;
use tickslot::{PriorityTaskId, Scheduler};

// ---------------------------------------------------------------------------
// Time-triggered task lists
// ---------------------------------------------------------------------------

fn tasks_1ms(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();
}

fn tasks_2ms_a(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();
}

fn tasks_2ms_b(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();
}

fn tasks_10ms(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();
}

fn tasks_50ms(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();
}

/// Runs the schedule point, then once a second reports and rotates P1.
fn tasks_100ms(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();

    let runs = HUNDRED_MS_RUNS.fetch_add(1, Ordering::Relaxed) + 1;
    if runs % 10 == 0 {
        report(scheduler);
        scheduler.cycle_priority(PriorityTaskId::P1);
    }
}

// ---------------------------------------------------------------------------
// Priority-triggered tasks
// ---------------------------------------------------------------------------

static EXECUTIONS: [AtomicU32; PRIORITY_TASK_COUNT] =
    [const { AtomicU32::new(0) }; PRIORITY_TASK_COUNT];

static HUNDRED_MS_RUNS: AtomicU32 = AtomicU32::new(0);

fn count(id: PriorityTaskId) {
    EXECUTIONS[id.index()].fetch_add(1, Ordering::Relaxed);
}

fn task_p1(_: &Scheduler<'_>) {
    count(PriorityTaskId::P1);
}

fn task_p2(_: &Scheduler<'_>) {
    count(PriorityTaskId::P2);
}

fn task_p3(_: &Scheduler<'_>) {
    count(PriorityTaskId::P3);
}

fn task_p4(_: &Scheduler<'_>) {
    count(PriorityTaskId::P4);
}

fn task_p5(_: &Scheduler<'_>) {
    count(PriorityTaskId::P5);
}

static SCHEDULER: Scheduler<'static> = Scheduler::with_default_priorities(
    [
        &tasks_1ms,
        &tasks_2ms_a,
        &tasks_2ms_b,
        &tasks_10ms,
        &tasks_50ms,
        &tasks_100ms,
    ],
    [&task_p1, &task_p2, &task_p3, &task_p4, &task_p5],
);

fn report(scheduler: &Scheduler<'_>) {
    for id in PriorityTaskId::ALL {
        tickslot::log_debug!(
            "{}: priority {} executions {}",
            id,
            scheduler.priority_of(id),
            EXECUTIONS[id.index()].load(Ordering::Relaxed)
        );
    }
    tickslot::log_info!("status {}", scheduler.status());
}

// ---------------------------------------------------------------------------
// Target entry point
// ---------------------------------------------------------------------------

#[cfg(target_os = "none")]
mod firmware {
    use cortex_m_rt::{entry, exception};
    use panic_halt as _;

    #[cfg(feature = "defmt")]
    use defmt_rtt as _;

    use tickslot::arch::cortex_m7::SysTickSource;
    use tickslot::kernel;

    /// Firmware entry point. Registers the scheduler, arms SysTick and
    /// polls the dispatcher. Does not return.
    #[entry]
    fn main() -> ! {
        let cp = cortex_m::Peripherals::take().unwrap();

        tickslot::log_info!("-- Starting tickslot scheduler --");

        kernel::init(&super::SCHEDULER);

        let mut tick = SysTickSource::new(cp.SYST);
        if let Err(err) = kernel::start(&mut tick) {
            // No scheduling without a tick
            tickslot::log_error!("scheduler start failed: {}", err);
            loop {
                cortex_m::asm::wfi();
            }
        }

        kernel::run()
    }

    /// SysTick exception handler, the scheduler tick entry point.
    #[exception]
    fn SysTick() {
        kernel::tick();
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "none"))]
fn main() {
    use tickslot::arch::mock::MockTickSource;
    use tickslot::config::BASE_TICK_HZ;
    use tickslot::{kernel, CadenceId};

    kernel::init(&SCHEDULER);
    if let Err(err) = kernel::start(&mut MockTickSource::new()) {
        eprintln!("scheduler start failed: {err}");
        std::process::exit(1);
    }

    for _ in 0..BASE_TICK_HZ {
        kernel::tick();
        kernel::dispatch();
    }

    let stats = SCHEDULER.stats();
    println!("status: {}", kernel::status());
    for id in CadenceId::ALL {
        println!(
            "{:>6}: {:>4} activations, {:>4} runs",
            id.to_string(),
            stats.activations(id),
            stats.runs(id)
        );
    }
    for id in PriorityTaskId::ALL {
        println!(
            "{:>6}: priority {}, {:>4} executions",
            id.to_string(),
            SCHEDULER.priority_of(id),
            EXECUTIONS[id.index()].load(Ordering::Relaxed)
        );
    }
}
