use thiserror::Error;

use crate::voices::Voice;

/// Errors surfaced by the rack to its immediate caller.
///
/// Out-of-range numeric input (parameter values, step values, tempo) is never
/// an error here: it is clamped where it enters the rack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RackError {
    /// A step index outside `0..len` was addressed.
    #[error("step index {index} out of range for a {len}-step pattern")]
    IndexOutOfRange { index: usize, len: usize },

    /// The rack was configured with a step count it cannot sequence.
    #[error("step count must be at least 1, got {0}")]
    InvalidStepCount(usize),

    /// A transport command named a voice with no registered sequencer lane.
    #[error("no sequencer lane registered for the {0} voice")]
    LaneMissing(Voice),
}

pub type Result<T> = std::result::Result<T, RackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = RackError::IndexOutOfRange { index: 16, len: 16 };
        assert_eq!(err.to_string(), "step index 16 out of range for a 16-step pattern");

        let err = RackError::LaneMissing(Voice::Kick);
        assert_eq!(err.to_string(), "no sequencer lane registered for the kick voice");
    }
}
