//! Bass voice.
//!
//! An acid-style subtractive bass: a sawtooth whose pitch follows the step
//! values, pushed through a resonant low-pass filter that is swept by its own
//! envelope, then gated by an amplitude envelope.
//!
//! # How It Works
//!
//! 1. The sequencer emits the current step value on `pitch_cv` and a gate
//!    on `gate`
//! 2. The gate fires two envelopes: one for amplitude, one for the filter
//! 3. Oscillator pitch = base frequency + `pitch_cv` × pitch range
//! 4. Filter cutoff = base cutoff + filter envelope × envelope amount
//! 5. The amplifier sits at zero gain and opens only with the amp envelope
//!
//! # Sound Design
//!
//! - Resonance around 16 with envelope amount near 7000 = instant squelch
//! - Short filter decay, zero sustain = plucky, percussive notes
//! - Longer amp release = notes bleed into each other

use crate::{
    cable::{Cable, CableKind, CableRegistry},
    graph::{
        Adsr, Amplifier, AmplifierSpec, EnvelopeGenerator, EnvelopeSpec, Filter, FilterSpec,
        FilterType, NodeFactory, Oscillator, OscillatorSpec, Sequencer, SequencerSpec, Waveform,
    },
    patch::{EnvelopeParams, EnvelopeStage, Param, ParamRange},
    sequencing::{transport::StepReporter, StepMode, StepPattern},
};

/// The seven cables of the bass voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BassCables {
    pub pitch_cv: Cable,
    pub gate: Cable,
    pub amp_envelope: Cable,
    pub filter_envelope: Cable,
    pub oscillator: Cable,
    pub filtered: Cable,
    pub output: Cable,
}

impl BassCables {
    fn allocate(cables: &mut CableRegistry) -> Self {
        Self {
            pitch_cv: cables.allocate_named(CableKind::Control, "bass.pitch_cv"),
            gate: cables.allocate_named(CableKind::Control, "bass.gate"),
            amp_envelope: cables.allocate_named(CableKind::Control, "bass.amp_envelope"),
            filter_envelope: cables.allocate_named(CableKind::Control, "bass.filter_envelope"),
            oscillator: cables.allocate_named(CableKind::Audio, "bass.oscillator"),
            filtered: cables.allocate_named(CableKind::Audio, "bass.filtered"),
            output: cables.allocate_named(CableKind::Audio, "bass.output"),
        }
    }

    pub fn all(&self) -> [Cable; 7] {
        [
            self.pitch_cv,
            self.gate,
            self.amp_envelope,
            self.filter_envelope,
            self.oscillator,
            self.filtered,
            self.output,
        ]
    }
}

/// Addressable bass parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BassParam {
    BaseFrequency,
    PitchRange,
    Cutoff,
    Resonance,
    FilterEnvAmount,
    OscGain,
    AmpEnvelope(EnvelopeStage),
    FilterEnvelope(EnvelopeStage),
}

impl BassParam {
    pub const ALL: [BassParam; 14] = [
        BassParam::BaseFrequency,
        BassParam::PitchRange,
        BassParam::Cutoff,
        BassParam::Resonance,
        BassParam::FilterEnvAmount,
        BassParam::OscGain,
        BassParam::AmpEnvelope(EnvelopeStage::Attack),
        BassParam::AmpEnvelope(EnvelopeStage::Decay),
        BassParam::AmpEnvelope(EnvelopeStage::Sustain),
        BassParam::AmpEnvelope(EnvelopeStage::Release),
        BassParam::FilterEnvelope(EnvelopeStage::Attack),
        BassParam::FilterEnvelope(EnvelopeStage::Decay),
        BassParam::FilterEnvelope(EnvelopeStage::Sustain),
        BassParam::FilterEnvelope(EnvelopeStage::Release),
    ];

    pub fn label(self) -> &'static str {
        match self {
            BassParam::BaseFrequency => "Base Freq",
            BassParam::PitchRange => "Pitch Range",
            BassParam::Cutoff => "Cutoff",
            BassParam::Resonance => "Resonance",
            BassParam::FilterEnvAmount => "Env Amt",
            BassParam::OscGain => "Osc Gain",
            BassParam::AmpEnvelope(stage) => stage.short_label(),
            BassParam::FilterEnvelope(EnvelopeStage::Attack) => "fA",
            BassParam::FilterEnvelope(EnvelopeStage::Decay) => "fD",
            BassParam::FilterEnvelope(EnvelopeStage::Sustain) => "fS",
            BassParam::FilterEnvelope(EnvelopeStage::Release) => "fR",
        }
    }
}

pub const BASE_FREQUENCY_RANGE: ParamRange = ParamRange::new(40.0, 440.0, 1.0);
pub const PITCH_RANGE_RANGE: ParamRange = ParamRange::new(50.0, 2000.0, 10.0);
pub const CUTOFF_RANGE: ParamRange = ParamRange::new(60.0, 5000.0, 10.0);
pub const RESONANCE_RANGE: ParamRange = ParamRange::new(0.1, 24.0, 0.1);
pub const FILTER_ENV_AMOUNT_RANGE: ParamRange = ParamRange::new(0.0, 10_000.0, 50.0);
pub const OSC_GAIN_RANGE: ParamRange = ParamRange::new(0.0, 1.0, 0.01);

/// Current values of every bass knob
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BassParams {
    pub base_frequency: Param,
    pub pitch_range: Param,
    pub cutoff: Param,
    pub resonance: Param,
    pub filter_env_amount: Param,
    pub osc_gain: Param,
    pub amp_envelope: EnvelopeParams,
    pub filter_envelope: EnvelopeParams,
}

impl Default for BassParams {
    fn default() -> Self {
        Self {
            base_frequency: Param::new(110.0, BASE_FREQUENCY_RANGE),
            pitch_range: Param::new(880.0, PITCH_RANGE_RANGE),
            cutoff: Param::new(250.0, CUTOFF_RANGE),
            resonance: Param::new(12.0, RESONANCE_RANGE),
            filter_env_amount: Param::new(4500.0, FILTER_ENV_AMOUNT_RANGE),
            osc_gain: Param::new(0.35, OSC_GAIN_RANGE),
            amp_envelope: EnvelopeParams::new(Adsr::new(0.001, 0.12, 0.0, 0.08)),
            filter_envelope: EnvelopeParams::new(Adsr::new(0.001, 0.18, 0.0, 0.05)),
        }
    }
}

impl BassParams {
    pub fn get(&self, key: BassParam) -> Param {
        match key {
            BassParam::BaseFrequency => self.base_frequency,
            BassParam::PitchRange => self.pitch_range,
            BassParam::Cutoff => self.cutoff,
            BassParam::Resonance => self.resonance,
            BassParam::FilterEnvAmount => self.filter_env_amount,
            BassParam::OscGain => self.osc_gain,
            BassParam::AmpEnvelope(stage) => self.amp_envelope.stage(stage),
            BassParam::FilterEnvelope(stage) => self.filter_envelope.stage(stage),
        }
    }

    fn get_mut(&mut self, key: BassParam) -> &mut Param {
        match key {
            BassParam::BaseFrequency => &mut self.base_frequency,
            BassParam::PitchRange => &mut self.pitch_range,
            BassParam::Cutoff => &mut self.cutoff,
            BassParam::Resonance => &mut self.resonance,
            BassParam::FilterEnvAmount => &mut self.filter_env_amount,
            BassParam::OscGain => &mut self.osc_gain,
            BassParam::AmpEnvelope(stage) => self.amp_envelope.stage_mut(stage),
            BassParam::FilterEnvelope(stage) => self.filter_envelope.stage_mut(stage),
        }
    }
}

/// The assembled bass voice: fixed wiring, live parameters, step pattern
pub struct BassPatch {
    cables: BassCables,
    pattern: StepPattern,
    params: BassParams,
    amp_env: Box<dyn EnvelopeGenerator>,
    filter_env: Box<dyn EnvelopeGenerator>,
    osc: Box<dyn Oscillator>,
    filter: Box<dyn Filter>,
    _vca: Box<dyn Amplifier>,
}

impl BassPatch {
    /// Allocate the bass cables and ask `engine` for every node on them
    ///
    /// The sequencer is returned separately so the transport can own it.
    pub fn assemble(
        cables: &mut CableRegistry,
        engine: &mut dyn NodeFactory,
        steps: usize,
        bpm: f64,
        reporter: StepReporter,
    ) -> (Self, Box<dyn Sequencer>) {
        let c = BassCables::allocate(cables);
        let pattern = StepPattern::bass_default(steps);
        let params = BassParams::default();

        let sequencer = engine.sequencer(SequencerSpec {
            label: "bass",
            output: c.pitch_cv,
            gate: c.gate,
            num_steps: steps,
            steps: StepMode::Cv.sequencer_steps(&pattern),
            bpm,
            reporter,
        });

        // Both envelopes listen to the same gate
        let amp_env = engine.envelope(EnvelopeSpec {
            gate: c.gate,
            output: c.amp_envelope,
            adsr: params.amp_envelope.adsr(),
        });
        let filter_env = engine.envelope(EnvelopeSpec {
            gate: c.gate,
            output: c.filter_envelope,
            adsr: params.filter_envelope.adsr(),
        });

        let osc = engine.oscillator(OscillatorSpec {
            output: c.oscillator,
            waveform: Waveform::Sawtooth,
            frequency: params.base_frequency.value(),
            cv: Some(c.pitch_cv),
            cv_amount: params.pitch_range.value(),
            gain: params.osc_gain.value(),
        });

        let filter = engine.filter(FilterSpec {
            input: c.oscillator,
            output: c.filtered,
            filter_type: FilterType::Lowpass,
            cutoff_hz: params.cutoff.value(),
            resonance: params.resonance.value(),
            cv: Some(c.filter_envelope),
            cv_amount: params.filter_env_amount.value(),
        });

        // Closed VCA: only the amp envelope lets sound through
        let vca = engine.amplifier(AmplifierSpec {
            input: c.filtered,
            output: c.output,
            gain: 0.0,
            cv: Some(c.amp_envelope),
            cv_amount: 1.0,
        });

        log::debug!("assembled bass voice, {steps} steps, output {}", c.output);

        let patch = Self {
            cables: c,
            pattern,
            params,
            amp_env,
            filter_env,
            osc,
            filter,
            _vca: vca,
        };
        (patch, sequencer)
    }

    pub fn cables(&self) -> &BassCables {
        &self.cables
    }

    /// Audio output feeding the mixer
    pub fn output(&self) -> Cable {
        self.cables.output
    }

    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    pub(crate) fn pattern_mut(&mut self) -> &mut StepPattern {
        &mut self.pattern
    }

    /// Values the sequencer should play
    pub fn sequencer_steps(&self) -> Vec<f32> {
        StepMode::Cv.sequencer_steps(&self.pattern)
    }

    pub fn params(&self) -> &BassParams {
        &self.params
    }

    pub fn param(&self, key: BassParam) -> Param {
        self.params.get(key)
    }

    /// Clamp and store one parameter, then hand it to the node that reads it
    pub fn set_param(&mut self, key: BassParam, value: f32) -> f32 {
        let stored = self.params.get_mut(key).set(value);
        self.forward(key);
        stored
    }

    /// Move one parameter by `steps` UI increments
    pub fn nudge_param(&mut self, key: BassParam, steps: i32) -> f32 {
        let stored = self.params.get_mut(key).nudge(steps);
        self.forward(key);
        stored
    }

    fn forward(&mut self, key: BassParam) {
        let value = self.params.get(key).value();
        match key {
            BassParam::BaseFrequency => self.osc.set_frequency(value),
            BassParam::PitchRange => self.osc.set_cv_amount(value),
            BassParam::OscGain => self.osc.set_gain(value),
            BassParam::Cutoff => self.filter.set_cutoff(value),
            BassParam::Resonance => self.filter.set_resonance(value),
            BassParam::FilterEnvAmount => self.filter.set_cv_amount(value),
            BassParam::AmpEnvelope(_) => self.amp_env.set_adsr(self.params.amp_envelope.adsr()),
            BassParam::FilterEnvelope(_) => {
                self.filter_env.set_adsr(self.params.filter_envelope.adsr())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_the_panel() {
        let labels: Vec<_> = BassParam::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            [
                "Base Freq", "Pitch Range", "Cutoff", "Resonance", "Env Amt", "Osc Gain", "A",
                "D", "S", "R", "fA", "fD", "fS", "fR"
            ]
        );
    }

    #[test]
    fn defaults_match_the_panel() {
        let p = BassParams::default();
        assert_eq!(p.get(BassParam::BaseFrequency).value(), 110.0);
        assert_eq!(p.get(BassParam::PitchRange).value(), 880.0);
        assert_eq!(p.get(BassParam::Cutoff).value(), 250.0);
        assert_eq!(p.get(BassParam::Resonance).value(), 12.0);
        assert_eq!(p.get(BassParam::FilterEnvAmount).value(), 4500.0);
        assert_eq!(p.get(BassParam::OscGain).value(), 0.35);
        assert_eq!(p.amp_envelope.adsr(), Adsr::new(0.001, 0.12, 0.0, 0.08));
        assert_eq!(p.filter_envelope.adsr(), Adsr::new(0.001, 0.18, 0.0, 0.05));
    }

    #[test]
    fn every_param_has_a_nonempty_range() {
        let p = BassParams::default();
        for key in BassParam::ALL {
            let range = p.get(key).range();
            assert!(range.min < range.max, "{key:?}");
            assert!(range.step > 0.0, "{key:?}");
        }
    }
}
