//! # Architecture Abstraction Layer
//!
//! The scheduler only needs one thing from the hardware: a periodic tick
//! that calls [`kernel::tick`](crate::kernel::tick). [`TickSource`] is that
//! boundary. The Cortex-M port drives it from SysTick; the mock records
//! arming requests for host tests and simulation.

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod cortex_m7;
pub mod mock;

use crate::error::ArmError;

/// A periodic interrupt source driving the tick handler.
pub trait TickSource {
    /// Configure the source to fire at `frequency_hz` and enable it.
    fn arm(&mut self, frequency_hz: u32) -> Result<(), ArmError>;
}

/// Largest reload value of the 24-bit SysTick counter.
pub const SYSTICK_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// SysTick reload value for a tick at `frequency_hz` from `clock_hz`.
///
/// The counter wraps after `reload + 1` clock cycles.
pub const fn systick_reload(clock_hz: u32, frequency_hz: u32) -> Result<u32, ArmError> {
    if frequency_hz == 0 || frequency_hz > clock_hz {
        return Err(ArmError::InvalidFrequency);
    }
    let reload = clock_hz / frequency_hz - 1;
    if reload == 0 || reload > SYSTICK_MAX_RELOAD {
        return Err(ArmError::ReloadOutOfRange);
    }
    Ok(reload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BASE_TICK_HZ, SYSTEM_CLOCK_HZ};

    #[test]
    fn test_reload_for_base_tick() {
        // 300 MHz / 2 kHz = 150_000 cycles per tick
        assert_eq!(systick_reload(SYSTEM_CLOCK_HZ, BASE_TICK_HZ), Ok(149_999));
    }

    #[test]
    fn test_reload_rejects_bad_frequencies() {
        assert_eq!(
            systick_reload(SYSTEM_CLOCK_HZ, 0),
            Err(ArmError::InvalidFrequency)
        );
        assert_eq!(
            systick_reload(1_000, 2_000),
            Err(ArmError::InvalidFrequency)
        );
        assert_eq!(
            systick_reload(1_000, 1_000),
            Err(ArmError::ReloadOutOfRange)
        );
        // 300 MHz / 10 Hz needs a 25-bit reload
        assert_eq!(
            systick_reload(SYSTEM_CLOCK_HZ, 10),
            Err(ArmError::ReloadOutOfRange)
        );
    }
}
