//! # Tickslot Configuration
//!
//! Compile-time constants governing the scheduler and its task tables.
//! All limits are fixed at compile time. No dynamic allocation.

/// Base tick frequency in Hz. Every tick opens one 500µs time slot and
/// activates exactly one cadence.
pub const BASE_TICK_HZ: u32 = 2000;

/// Core clock feeding SysTick (SAMV71 at 300 MHz).
pub const SYSTEM_CLOCK_HZ: u32 = 300_000_000;

/// Number of time-triggered cadences (1ms, 2ms-A, 2ms-B, 10ms, 50ms, 100ms).
pub const CADENCE_COUNT: usize = 6;

/// Number of priority-triggered tasks (P1..P5).
pub const PRIORITY_TASK_COUNT: usize = 5;

/// Number of tick families. Each family owns one base and one derived cadence.
pub const FAMILY_COUNT: usize = 3;

/// Odd ticks counted before the 100ms cadence replaces the 1ms cadence.
pub const HUNDRED_MS_THRESHOLD: u8 = 100;

/// Family-B ticks (`T mod 4 == 2`) counted before 50ms replaces 2ms-A.
pub const FIFTY_MS_THRESHOLD: u8 = 25;

/// Family-C ticks (`T mod 4 == 0`) counted before 10ms replaces 2ms-B.
pub const TEN_MS_THRESHOLD: u8 = 5;

/// Default priority numbers of the cadences, indexed by `CadenceId`.
/// Faster cadences fan out to higher-numbered priority tasks.
pub const CADENCE_PRIORITIES: [u8; CADENCE_COUNT] = [5, 4, 4, 3, 2, 1];

/// Default priority numbers of P1..P5.
pub const PRIORITY_TASK_PRIORITIES: [u8; PRIORITY_TASK_COUNT] = [1, 2, 3, 4, 5];

/// Highest priority number reachable through `Scheduler::cycle_priority`.
pub const MAX_PRIORITY: u8 = 5;
