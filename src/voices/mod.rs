//! The two fixed voices of the rack.
//!
//! Each voice is a small, fixed patch: a step sequencer drives one or two
//! envelope generators, which shape an oscillator (and, for the bass, a
//! filter) through an amplifier. The cables are allocated once when the
//! voice is assembled and never rewired; only parameters and the step
//! pattern change afterwards.
//!
//! ```text
//!   bass:  seq ─pitch_cv─────────────→ osc ─→ filter ─→ vca ─→ output
//!              └gate─┬→ amp env ─────────────────────────↑
//!                    └→ filter env ────────────↑
//!
//!   kick:  seq ─trigger─→ osc ─→ vca ─→ output
//!              └gate─→ env ──────↑
//! ```

mod bass;
mod kick;

pub use bass::{BassCables, BassParam, BassParams, BassPatch};
pub use kick::{KickCables, KickParam, KickParams, KickPatch, KICK_FREQUENCY, KICK_TRIGGER_DEPTH};

use crate::sequencing::StepMode;

/// Identifies one voice of the rack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    Bass,
    Kick,
}

impl Voice {
    pub const ALL: [Voice; 2] = [Voice::Bass, Voice::Kick];

    pub fn name(self) -> &'static str {
        match self {
            Voice::Bass => "bass",
            Voice::Kick => "kick",
        }
    }

    /// How this voice's pattern is read by its sequencer
    pub fn step_mode(self) -> StepMode {
        match self {
            Voice::Bass => StepMode::Cv,
            Voice::Kick => StepMode::Gate,
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
