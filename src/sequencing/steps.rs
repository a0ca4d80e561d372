/*
Step Patterns
=============

A step pattern is the data a step sequencer walks through: one value per
step, in order, always the same length. The sequencer reads the value at its
current step and emits it on its output cable, then moves on.

Every value lives in [0, 1]. What a value *means* depends on the lane:

  Cv lane (bass):    the value is a normalized pitch amount.
                     0.0 = base frequency, 1.0 = base + pitch range.

  Gate lane (kick):  the value is on/off. Anything above 0.5 is a hit.

    index:   0    1    2    3    4    5    6    7  ...
    bass:  0.00 0.18 0.35 0.62 0.00 0.18 0.35 0.62
    kick:    1    0    0    0    1    0    0    0

Both lanes share one representation so a gate lane can be edited with
sliders and still be handed to the sequencer as strict 0/1 values through
`normalized()`, without losing what the user actually dialled in.

Writes never reject a value: anything outside [0, 1] is clamped (NaN reads
as 0). The only rejected edit is an index past the end of the pattern.
*/

use crate::error::{RackError, Result};

/// Repeating contour tiled across the default bass pattern
pub const BASS_CONTOUR: [f32; 4] = [0.0, 0.18, 0.35, 0.62];

/// Threshold above which a step counts as "on"
pub const GATE_THRESHOLD: f32 = 0.5;

/// How a lane's step values are interpreted by its sequencer
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Continuous control values passed through untouched
    Cv,
    /// Binary hits; values are thresholded before reaching the sequencer
    Gate,
}

impl StepMode {
    /// Values to hand to the sequencer for this lane
    pub fn sequencer_steps(self, pattern: &StepPattern) -> Vec<f32> {
        match self {
            StepMode::Cv => pattern.values().to_vec(),
            StepMode::Gate => pattern.normalized().values().to_vec(),
        }
    }
}

/// Fixed-length sequence of step values in [0, 1]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StepPattern {
    values: Vec<f32>,
}

#[inline]
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[inline]
fn gate(value: f32) -> f32 {
    if value > GATE_THRESHOLD {
        1.0
    } else {
        0.0
    }
}

impl StepPattern {
    /// Build a pattern from an index -> value rule
    pub fn from_fn(len: usize, mut generator: impl FnMut(usize) -> f32) -> Self {
        Self {
            values: (0..len).map(|i| clamp_unit(generator(i))).collect(),
        }
    }

    /// Build a pattern from raw values, clamping each into [0, 1]
    pub fn from_values(values: &[f32]) -> Self {
        Self::from_fn(values.len(), |i| values[i])
    }

    /// The bass contour `[0.0, 0.18, 0.35, 0.62]` tiled across `len` steps
    pub fn bass_default(len: usize) -> Self {
        Self::from_fn(len, |i| BASS_CONTOUR[i % BASS_CONTOUR.len()])
    }

    /// Four-on-the-floor: a hit on every fourth step starting at 0
    pub fn kick_default(len: usize) -> Self {
        Self::from_fn(len, |i| if i % 4 == 0 { 1.0 } else { 0.0 })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at `index`, if it exists
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Gate reading of one step (false past the end)
    pub fn is_on(&self, index: usize) -> bool {
        self.get(index).is_some_and(|v| v > GATE_THRESHOLD)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.values.len() {
            Ok(())
        } else {
            Err(RackError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
        }
    }

    /// Replace one step with `clamp(value, 0, 1)`
    pub fn set_step(&mut self, index: usize, value: f32) -> Result<()> {
        self.check_index(index)?;
        self.values[index] = clamp_unit(value);
        Ok(())
    }

    /// Flip one step: on (> 0.5) becomes 0, anything else becomes 1
    pub fn toggle_step(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let next = if self.values[index] > GATE_THRESHOLD { 0.0 } else { 1.0 };
        self.values[index] = next;
        Ok(())
    }

    /// Copy of this pattern with one step replaced
    pub fn with_step(&self, index: usize, value: f32) -> Result<Self> {
        let mut next = self.clone();
        next.set_step(index, value)?;
        Ok(next)
    }

    /// Copy of this pattern with one step toggled
    pub fn with_toggled(&self, index: usize) -> Result<Self> {
        let mut next = self.clone();
        next.toggle_step(index)?;
        Ok(next)
    }

    /// Strictly binary copy: every value mapped to 0 or 1 by the 0.5 rule
    pub fn normalized(&self) -> Self {
        Self {
            values: self.values.iter().map(|&v| gate(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bass_default_tiles_contour() {
        let pattern = StepPattern::bass_default(16);
        assert_eq!(
            pattern.values(),
            &[
                0.0, 0.18, 0.35, 0.62, 0.0, 0.18, 0.35, 0.62, 0.0, 0.18, 0.35, 0.62, 0.0,
                0.18, 0.35, 0.62
            ]
        );
    }

    #[test]
    fn test_kick_default_four_on_the_floor() {
        let pattern = StepPattern::kick_default(16);
        for (i, &v) in pattern.values().iter().enumerate() {
            let expected = if matches!(i, 0 | 4 | 8 | 12) { 1.0 } else { 0.0 };
            assert_eq!(v, expected, "step {i}");
        }
    }

    #[test]
    fn test_defaults_follow_requested_length() {
        assert_eq!(StepPattern::bass_default(6).values(), &[0.0, 0.18, 0.35, 0.62, 0.0, 0.18]);
        assert_eq!(StepPattern::kick_default(5).values(), &[1.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(StepPattern::kick_default(0).is_empty());
    }

    #[test]
    fn test_set_step_clamps_and_leaves_others() {
        let original = StepPattern::bass_default(16);

        for (index, value, expected) in [(0, 0.4, 0.4), (3, 1.7, 1.0), (15, -0.3, 0.0)] {
            let edited = original.with_step(index, value).unwrap();
            assert_eq!(edited.len(), original.len());
            for i in 0..original.len() {
                if i == index {
                    assert_eq!(edited.values()[i], expected);
                } else {
                    assert_eq!(edited.values()[i], original.values()[i]);
                }
            }
        }
    }

    #[test]
    fn test_set_step_nan_reads_as_zero() {
        let mut pattern = StepPattern::kick_default(4);
        pattern.set_step(0, f32::NAN).unwrap();
        assert_eq!(pattern.get(0), Some(0.0));
    }

    #[test]
    fn test_out_of_range_index_is_refused() {
        let mut pattern = StepPattern::kick_default(16);
        let before = pattern.clone();

        assert_eq!(
            pattern.set_step(16, 1.0),
            Err(RackError::IndexOutOfRange { index: 16, len: 16 })
        );
        assert!(pattern.toggle_step(99).is_err());
        assert_eq!(pattern, before);
    }

    #[test]
    fn test_toggle_flips_around_threshold() {
        let mut pattern = StepPattern::from_values(&[0.2, 0.5, 0.51, 1.0]);
        for i in 0..4 {
            pattern.toggle_step(i).unwrap();
        }
        assert_eq!(pattern.values(), &[1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_toggle_is_self_inverse_on_binary_steps() {
        let pattern = StepPattern::kick_default(16);
        for i in 0..pattern.len() {
            let twice = pattern.with_toggled(i).unwrap().with_toggled(i).unwrap();
            assert_eq!(twice, pattern);
        }
    }

    #[test]
    fn test_normalize_is_binary_and_idempotent() {
        let pattern = StepPattern::from_values(&[0.0, 0.18, 0.5, 0.50001, 0.62, 1.0]);
        let once = pattern.normalized();

        assert_eq!(once.len(), pattern.len());
        assert_eq!(once.values(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(once.normalized(), once);
        // source untouched
        assert_eq!(pattern.get(1), Some(0.18));
    }

    #[test]
    fn test_from_values_clamps() {
        let pattern = StepPattern::from_values(&[-1.0, 0.25, 3.0]);
        assert_eq!(pattern.values(), &[0.0, 0.25, 1.0]);
    }

    #[test]
    fn test_step_mode_hands_gate_lanes_binary_values() {
        let pattern = StepPattern::from_values(&[0.2, 0.8]);
        assert_eq!(StepMode::Cv.sequencer_steps(&pattern), vec![0.2, 0.8]);
        assert_eq!(StepMode::Gate.sequencer_steps(&pattern), vec![0.0, 1.0]);
        assert!(!pattern.is_on(0));
        assert!(pattern.is_on(1));
        assert!(!pattern.is_on(2));
    }
}
