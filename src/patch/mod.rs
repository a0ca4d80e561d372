//! Parameters shared by every patch, and the master section.
//!
//! A [`Param`] is one knob: a value plus the range it may take. Writes are
//! clamped into that range instead of being rejected, because control
//! surfaces routinely overshoot while a slider is being dragged.

mod master;

pub use master::{MasterPatch, MASTER_GAIN_RANGE, MIX_LEVEL_RANGE};

use crate::graph::Adsr;

/// Allowed span of a parameter, plus the increment a UI moves it by
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` inside the range, 0.0 at `min` and 1.0 at `max`
    pub fn normalized(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// A clamped scalar parameter
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param {
    value: f32,
    range: ParamRange,
}

impl Param {
    pub fn new(value: f32, range: ParamRange) -> Self {
        Self {
            value: range.clamp(value),
            range,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn range(&self) -> ParamRange {
        self.range
    }

    /// Store `value` clamped into range and return what was stored
    ///
    /// NaN leaves the current value in place.
    pub fn set(&mut self, value: f32) -> f32 {
        if !value.is_nan() {
            self.value = self.range.clamp(value);
        }
        self.value
    }

    /// Move by `steps` UI increments (negative moves down)
    pub fn nudge(&mut self, steps: i32) -> f32 {
        self.set(self.value + steps as f32 * self.range.step)
    }

    /// Knob fill position in [0, 1]
    pub fn normalized(&self) -> f32 {
        self.range.normalized(self.value)
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_value(self.value))
    }
}

/// Compact knob readout: integers from 1000 up, one decimal from 10, else three
pub fn format_value(value: f32) -> String {
    if value >= 1000.0 {
        format!("{}", value.round() as i64)
    } else if value >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.3}")
    }
}

/// Envelope time ranges (seconds) and sustain level range
pub const ATTACK_RANGE: ParamRange = ParamRange::new(0.001, 1.0, 0.001);
pub const DECAY_RANGE: ParamRange = ParamRange::new(0.001, 1.0, 0.001);
pub const SUSTAIN_RANGE: ParamRange = ParamRange::new(0.0, 1.0, 0.01);
pub const RELEASE_RANGE: ParamRange = ParamRange::new(0.001, 2.0, 0.001);

/// One stage of an ADSR envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl EnvelopeStage {
    pub const ALL: [EnvelopeStage; 4] = [
        EnvelopeStage::Attack,
        EnvelopeStage::Decay,
        EnvelopeStage::Sustain,
        EnvelopeStage::Release,
    ];

    pub fn short_label(self) -> &'static str {
        match self {
            EnvelopeStage::Attack => "A",
            EnvelopeStage::Decay => "D",
            EnvelopeStage::Sustain => "S",
            EnvelopeStage::Release => "R",
        }
    }
}

/// The four clamped parameters feeding one envelope generator
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    attack: Param,
    decay: Param,
    sustain: Param,
    release: Param,
}

impl EnvelopeParams {
    pub fn new(adsr: Adsr) -> Self {
        Self {
            attack: Param::new(adsr.attack, ATTACK_RANGE),
            decay: Param::new(adsr.decay, DECAY_RANGE),
            sustain: Param::new(adsr.sustain, SUSTAIN_RANGE),
            release: Param::new(adsr.release, RELEASE_RANGE),
        }
    }

    pub fn stage(&self, stage: EnvelopeStage) -> Param {
        match stage {
            EnvelopeStage::Attack => self.attack,
            EnvelopeStage::Decay => self.decay,
            EnvelopeStage::Sustain => self.sustain,
            EnvelopeStage::Release => self.release,
        }
    }

    pub fn stage_mut(&mut self, stage: EnvelopeStage) -> &mut Param {
        match stage {
            EnvelopeStage::Attack => &mut self.attack,
            EnvelopeStage::Decay => &mut self.decay,
            EnvelopeStage::Sustain => &mut self.sustain,
            EnvelopeStage::Release => &mut self.release,
        }
    }

    /// Current values as handed to an envelope node
    pub fn adsr(&self) -> Adsr {
        Adsr::new(
            self.attack.value(),
            self.decay.value(),
            self.sustain.value(),
            self.release.value(),
        )
    }
}
