//! Startup configuration for a [`Rack`](crate::rack::Rack).

use crate::error::{RackError, Result};

pub const DEFAULT_STEPS: usize = 16;
pub const DEFAULT_BPM: f64 = 128.0;
pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 240.0;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Rack builder settings
///
/// ```
/// use rebirth_rack::config::RackConfig;
///
/// let config = RackConfig::new().bpm(140.0).steps(32);
/// assert_eq!(config.initial_bpm(), 140.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RackConfig {
    pub steps: usize,
    pub bpm: f64,
    pub min_bpm: f64,
    pub max_bpm: f64,
    pub bass_level: f32,
    pub kick_level: f32,
    pub master_gain: f32,
    pub queue_capacity: usize,
}

impl Default for RackConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            bpm: DEFAULT_BPM,
            min_bpm: MIN_BPM,
            max_bpm: MAX_BPM,
            bass_level: 0.8,
            kick_level: 0.9,
            master_gain: 1.0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl RackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Set the number of steps in both patterns
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Tempo bounds enforced on every tempo input
    pub fn tempo_range(mut self, min: f64, max: f64) -> Self {
        self.min_bpm = min.min(max);
        self.max_bpm = max.max(min);
        self
    }

    pub fn levels(mut self, bass: f32, kick: f32) -> Self {
        self.bass_level = bass;
        self.kick_level = kick;
        self
    }

    pub fn master_gain(mut self, gain: f32) -> Self {
        self.master_gain = gain;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Clamp a tempo into the configured bounds
    ///
    /// NaN falls back to the lower bound.
    pub fn clamp_bpm(&self, bpm: f64) -> f64 {
        if bpm.is_nan() {
            return self.min_bpm;
        }
        bpm.clamp(self.min_bpm, self.max_bpm)
    }

    /// Starting tempo after clamping
    pub fn initial_bpm(&self) -> f64 {
        self.clamp_bpm(self.bpm)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(RackError::InvalidStepCount(self.steps));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RackConfig::new();
        assert_eq!(c.steps, 16);
        assert_eq!(c.bpm, 128.0);
        assert_eq!((c.min_bpm, c.max_bpm), (40.0, 240.0));
        assert_eq!((c.bass_level, c.kick_level), (0.8, 0.9));
        assert_eq!(c.master_gain, 1.0);
        assert_eq!(c.queue_capacity, 64);
    }

    #[test]
    fn tempo_is_clamped_to_bounds() {
        let c = RackConfig::new();
        assert_eq!(c.clamp_bpm(10.0), 40.0);
        assert_eq!(c.clamp_bpm(300.0), 240.0);
        assert_eq!(c.clamp_bpm(f64::NAN), 40.0);
        assert_eq!(RackConfig::new().bpm(500.0).initial_bpm(), 240.0);
    }

    #[test]
    fn swapped_tempo_range_is_ordered() {
        let c = RackConfig::new().tempo_range(200.0, 60.0);
        assert_eq!((c.min_bpm, c.max_bpm), (60.0, 200.0));
    }

    #[test]
    fn zero_steps_is_rejected() {
        assert_eq!(
            RackConfig::new().steps(0).validate(),
            Err(RackError::InvalidStepCount(0))
        );
        assert!(RackConfig::new().validate().is_ok());
    }
}
