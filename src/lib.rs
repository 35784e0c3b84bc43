//! # Tickslot: Time-Triggered Cooperative Scheduler
//!
//! A non-preemptive, single-core task scheduler for resource-constrained
//! ARM Cortex-M controllers.
//!
//! ## Overview
//!
//! One hardware tick (2 kHz, 500µs) drives six periodic cadences:
//!
//! | Cadence | Period | Priority number |
//! |---------|--------|-----------------|
//! | 1ms     | 2 ticks   | 5 |
//! | 2ms-A   | 4 ticks   | 4 |
//! | 2ms-B   | 4 ticks   | 4 |
//! | 10ms    | 20 ticks  | 3 |
//! | 50ms    | 100 ticks | 2 |
//! | 100ms   | 200 ticks | 1 |
//!
//! Exactly one cadence is activated per tick. Inside a cadence body, a
//! **schedule point** fans out to the priority-triggered tasks (P1..P5)
//! whose priority number matches the cadence's.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │          Application task lists & priority tasks        │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │         init() · start() · stop() · run() · tick()      │
//! ├───────────────────────────┬────────────────────────────┤
//! │  Scheduler (scheduler.rs) │  Sync (sync.rs)            │
//! │  ─ tick()       [ISR]     │  ─ ActivationSlot          │
//! │  ─ dispatch()   [main]    │  ─ critical_section        │
//! │  ─ schedule_point()       │  Stats (stats.rs)          │
//! ├───────────────────────────┴────────────────────────────┤
//! │              Task Model (task.rs)                       │
//! │    CadenceId · Family · TaskState · Runnable            │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m7.rs)                │
//! │              SysTick tick source                        │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution Model
//!
//! - **No preemption**: bodies run to completion; nothing blocks or yields
//! - **One slot per tick**: each slot must finish within 500µs, otherwise
//!   the family's sticky overload status is raised
//! - **Static tables**: six cadences and five priority tasks, fixed at
//!   compile time
//!
//! ## Memory Model
//!
//! - **No heap**: all state lives in the [`Scheduler`](scheduler::Scheduler)
//!   context, usually a `static`
//! - **No `alloc`**: pure `core` outside of tests
//! - **Lock-free handoff**: every slot shared between the tick interrupt
//!   and the main loop is a single atomic word

#![cfg_attr(not(test), no_std)]

pub mod logging;

pub mod arch;
pub mod config;
pub mod error;
pub mod kernel;
pub mod scheduler;
pub mod stats;
pub mod sync;
pub mod task;

pub use error::{ArmError, Error, Result};
pub use scheduler::{DispatchOutcome, Scheduler, SchedulerState, Status};
pub use task::{CadenceId, CadenceTask, Family, PriorityTask, PriorityTaskId, Runnable, TaskState};
