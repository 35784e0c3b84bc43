//! Tick-sweep tests: replay the tick handler over long runs and check the
//! activation pattern, run counts and overload behaviour end to end.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;

use tickslot::arch::mock::MockTickSource;
use tickslot::config::{CADENCE_COUNT, PRIORITY_TASK_COUNT};
use tickslot::{
    CadenceId, DispatchOutcome, Family, PriorityTaskId, Runnable, Scheduler, Status, TaskState,
};

fn noop(_: &Scheduler<'_>) {}

fn schedule(scheduler: &Scheduler<'_>) {
    scheduler.schedule_point();
}

const NOOP: &dyn Runnable = &noop;
const SCHEDULE: &dyn Runnable = &schedule;

fn body<F: Fn(&Scheduler<'_>) + Sync>(f: F) -> F {
    f
}

fn started(scheduler: &Scheduler<'_>) {
    scheduler.init();
    scheduler.start(&mut MockTickSource::new()).unwrap();
}

/// Activation expected on 1-based tick `t`, written out from the cadence
/// periods rather than from the family counters.
fn expected_activation(t: u32) -> CadenceId {
    match t % 4 {
        1 | 3 if t % 200 == 199 => CadenceId::HundredMs,
        1 | 3 => CadenceId::OneMs,
        2 if t % 100 == 98 => CadenceId::FiftyMs,
        2 => CadenceId::TwoMsA,
        _ if t % 20 == 0 => CadenceId::TenMs,
        _ => CadenceId::TwoMsB,
    }
}

#[test]
fn sweep_matches_precomputed_table() {
    let scheduler = Scheduler::with_default_priorities([NOOP; CADENCE_COUNT], [NOOP; PRIORITY_TASK_COUNT]);
    started(&scheduler);

    let mut derived = Vec::new();
    for t in 1..=1000u32 {
        let id = scheduler.tick();
        assert_eq!(id, expected_activation(t), "tick {t}");
        if matches!(id, CadenceId::TenMs | CadenceId::FiftyMs | CadenceId::HundredMs) {
            derived.push((t, id));
        }
        assert_eq!(scheduler.dispatch(), DispatchOutcome::Completed(id.family()));
    }

    let hundred: Vec<u32> = derived
        .iter()
        .filter(|(_, id)| *id == CadenceId::HundredMs)
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(hundred, [199, 399, 599, 799, 999]);

    let fifty: Vec<u32> = derived
        .iter()
        .filter(|(_, id)| *id == CadenceId::FiftyMs)
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(fifty, (0..10).map(|k| 98 + 100 * k).collect::<Vec<_>>());

    let ten: Vec<u32> = derived
        .iter()
        .filter(|(_, id)| *id == CadenceId::TenMs)
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(ten, (1..=50).map(|k| 20 * k).collect::<Vec<_>>());
}

#[test]
fn exactly_one_activation_per_tick() {
    let scheduler = Scheduler::with_default_priorities([NOOP; CADENCE_COUNT], [NOOP; PRIORITY_TASK_COUNT]);
    started(&scheduler);

    // Crosses the u8 tick counter wrap several times
    for t in 1..=2000u32 {
        scheduler.tick();
        assert_eq!(scheduler.stats().total_activations(), t);
        scheduler.dispatch();
    }

    let stats = scheduler.stats();
    assert_eq!(stats.activations(CadenceId::HundredMs), 10);
    assert_eq!(stats.activations(CadenceId::OneMs), 990);
    assert_eq!(stats.activations(CadenceId::FiftyMs), 20);
    assert_eq!(stats.activations(CadenceId::TwoMsA), 480);
    assert_eq!(stats.activations(CadenceId::TenMs), 100);
    assert_eq!(stats.activations(CadenceId::TwoMsB), 400);
}

#[test]
fn two_hundred_one_ticks_with_noop_bodies() {
    let scheduler = Scheduler::with_default_priorities([NOOP; CADENCE_COUNT], [NOOP; PRIORITY_TASK_COUNT]);
    started(&scheduler);

    for _ in 0..201 {
        scheduler.tick();
        scheduler.dispatch();
    }

    let stats = scheduler.stats();
    assert_eq!(stats.activations(CadenceId::OneMs), 100);
    assert_eq!(stats.activations(CadenceId::HundredMs), 1);
    // The base cadence runs in the 100ms slot too
    assert_eq!(stats.runs(CadenceId::OneMs), 101);
    assert_eq!(stats.runs(CadenceId::HundredMs), 1);
    assert_eq!(scheduler.status(), Status::Running);
    assert_eq!(stats.overloads(Family::OneMs), 0);
}

#[test]
fn priority_tasks_follow_cadence_rates() {
    let hits: [AtomicU32; PRIORITY_TASK_COUNT] = Default::default();
    let counter = |id: PriorityTaskId| {
        let hits = &hits;
        body(move |_| {
            hits[id.index()].fetch_add(1, Ordering::Relaxed);
        })
    };
    let (p1, p2, p3, p4, p5) = (
        counter(PriorityTaskId::P1),
        counter(PriorityTaskId::P2),
        counter(PriorityTaskId::P3),
        counter(PriorityTaskId::P4),
        counter(PriorityTaskId::P5),
    );
    let scheduler =
        Scheduler::with_default_priorities([SCHEDULE; CADENCE_COUNT], [&p1, &p2, &p3, &p4, &p5]);
    started(&scheduler);

    for _ in 0..2000 {
        scheduler.tick();
        scheduler.dispatch();
    }

    let hits = hits.each_ref().map(|h| h.load(Ordering::Relaxed));
    // P5 follows 1ms (1000 slots), P4 both 2ms groups, P3 10ms, P2 50ms, P1 100ms
    assert_eq!(hits, [10, 20, 100, 1000, 1000]);
}

#[test]
fn overload_set_exactly_once_and_sticky() {
    let fired = AtomicBool::new(false);
    let mut transitions = Vec::new();
    let overrun_once = body(|s: &Scheduler<'_>| {
        s.schedule_point();
        if !fired.swap(true, Ordering::Relaxed) {
            // The next tick fires before this slot is done
            s.tick();
        }
    });
    let scheduler = Scheduler::with_default_priorities(
        [&overrun_once, SCHEDULE, SCHEDULE, SCHEDULE, SCHEDULE, SCHEDULE],
        [NOOP; PRIORITY_TASK_COUNT],
    );
    started(&scheduler);

    let mut last = scheduler.status();
    for _ in 0..50 {
        scheduler.tick();
        while scheduler.activated().is_some() {
            scheduler.dispatch();
            let status = scheduler.status();
            if status != last {
                transitions.push(status);
                last = status;
            }
        }
    }

    assert_eq!(transitions, [Status::Overload1Ms]);
    assert_eq!(scheduler.stats().overloads(Family::OneMs), 1);
    // Every activation was still serviced
    assert_eq!(
        scheduler.stats().total_activations(),
        scheduler.stats().runs(CadenceId::OneMs)
            + scheduler.stats().runs(CadenceId::TwoMsA)
            + scheduler.stats().runs(CadenceId::TwoMsB)
    );

    assert!(scheduler.clear_overload());
    assert_eq!(scheduler.status(), Status::Running);
}

#[test]
fn no_cadence_left_ready_after_dispatch() {
    let scheduler = Scheduler::with_default_priorities([SCHEDULE; CADENCE_COUNT], [NOOP; PRIORITY_TASK_COUNT]);
    started(&scheduler);

    for _ in 0..400 {
        let id = scheduler.tick();
        assert_eq!(scheduler.task_state(id), TaskState::Ready);
        scheduler.dispatch();
        assert!(CadenceId::ALL
            .iter()
            .all(|c| scheduler.task_state(*c) == TaskState::Suspended));
    }
}

#[test]
fn concurrent_ticks_lose_no_activation() {
    const THREADS: u32 = 2;
    const TICKS_PER_THREAD: u32 = 100_000;

    let scheduler = Scheduler::with_default_priorities([NOOP; CADENCE_COUNT], [NOOP; PRIORITY_TASK_COUNT]);
    started(&scheduler);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..TICKS_PER_THREAD {
                    scheduler.tick();
                }
            });
        }
    });

    // 200_000 ticks: 100_000 family A, 50_000 each of families B and C
    let stats = scheduler.stats();
    assert_eq!(stats.total_activations(), THREADS * TICKS_PER_THREAD);
    assert_eq!(stats.activations(CadenceId::HundredMs), 1_000);
    assert_eq!(stats.activations(CadenceId::OneMs), 99_000);
    assert_eq!(stats.activations(CadenceId::FiftyMs), 2_000);
    assert_eq!(stats.activations(CadenceId::TwoMsA), 48_000);
    assert_eq!(stats.activations(CadenceId::TenMs), 10_000);
    assert_eq!(stats.activations(CadenceId::TwoMsB), 40_000);
}
