//! Mock tick source
//!
//! Records arming requests instead of touching hardware. The simulation
//! drives ticks by calling the tick handler directly.

use super::TickSource;
use crate::error::ArmError;

/// Tick source for host tests and simulation.
#[derive(Debug, Default)]
pub struct MockTickSource {
    armed_at: Option<u32>,
    arm_calls: u32,
    failure: Option<ArmError>,
}

impl MockTickSource {
    /// A source that accepts any frequency.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose arming always fails with `err`.
    pub fn failing(err: ArmError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    /// Frequency of the last successful arming.
    pub fn armed_at(&self) -> Option<u32> {
        self.armed_at
    }

    /// Number of arming attempts, successful or not.
    pub fn arm_calls(&self) -> u32 {
        self.arm_calls
    }
}

impl TickSource for MockTickSource {
    fn arm(&mut self, frequency_hz: u32) -> Result<(), ArmError> {
        self.arm_calls += 1;
        if let Some(err) = self.failure {
            return Err(err);
        }
        self.armed_at = Some(frequency_hz);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_arming() {
        let mut source = MockTickSource::new();
        assert_eq!(source.armed_at(), None);
        source.arm(2000).unwrap();
        assert_eq!(source.armed_at(), Some(2000));
        assert_eq!(source.arm_calls(), 1);
    }

    #[test]
    fn test_failing_mock() {
        let mut source = MockTickSource::failing(ArmError::Unavailable);
        assert_eq!(source.arm(2000), Err(ArmError::Unavailable));
        assert_eq!(source.armed_at(), None);
        assert_eq!(source.arm_calls(), 1);
    }
}
