//! # Cortex-M Port Layer
//!
//! SysTick-based tick source for ARMv7E-M cores (Cortex-M4/M7, e.g. the
//! SAMV71). Only the tick lives here: the scheduler never switches
//! context, so there is no PendSV handler and no per-task stack.
//!
//! ## Interrupt Priorities
//!
//! SysTick is set to the lowest priority (0xFF). The tick handler only
//! touches atomics and must never delay application interrupts.
//!
//! ## Handler
//!
//! The `SysTick` exception handler itself belongs in the firmware binary
//! so the linker always keeps it:
//!
//! ```ignore
//! #[exception]
//! fn SysTick() {
//!     tickslot::kernel::tick();
//! }
//! ```

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use super::{systick_reload, TickSource};
use crate::config::SYSTEM_CLOCK_HZ;
use crate::error::ArmError;

// ---------------------------------------------------------------------------
// SysTick tick source
// ---------------------------------------------------------------------------

/// Drives the scheduler tick from the SysTick timer on the core clock.
pub struct SysTickSource {
    syst: SYST,
}

impl SysTickSource {
    /// Take ownership of the SysTick peripheral.
    pub fn new(syst: SYST) -> Self {
        Self { syst }
    }
}

impl TickSource for SysTickSource {
    /// Set the reload for `frequency_hz`, then start the counter with its
    /// interrupt enabled. Fails without touching the timer if the rate
    /// cannot be reached from `SYSTEM_CLOCK_HZ`.
    fn arm(&mut self, frequency_hz: u32) -> Result<(), ArmError> {
        let reload = systick_reload(SYSTEM_CLOCK_HZ, frequency_hz)?;

        set_systick_priority();

        self.syst.disable_counter();
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
        Ok(())
    }
}

/// Put SysTick at the lowest exception priority.
fn set_systick_priority() {
    // Safety: priority changes of a system handler cannot break memory
    // safety; SysTick is not yet enabled at this point.
    unsafe {
        let mut peripherals = cortex_m::Peripherals::steal();
        peripherals.SCB.set_priority(SystemHandler::SysTick, 0xFF);
    }
}
