//! Kick drum voice.
//!
//! A sine at a fixed 55 Hz. Each trigger knocks the pitch up briefly, which
//! gives the click at the front of the hit, while a short envelope opens the
//! amplifier and lets the body ring out.
//!
//! # How It Works
//!
//! 1. The sequencer plays a strictly on/off pattern: it emits `trigger` and
//!    `gate` on every active step
//! 2. One envelope follows the gate (instant attack, ~180 ms decay)
//! 3. The oscillator adds `trigger` × 15 Hz on top of 55 Hz
//! 4. The amplifier is closed until the envelope opens it
//!
//! The tuning and the click depth are part of the voice, not knobs.

use crate::{
    cable::{Cable, CableKind, CableRegistry},
    graph::{
        Adsr, Amplifier, AmplifierSpec, EnvelopeGenerator, EnvelopeSpec, NodeFactory, Oscillator,
        OscillatorSpec, Sequencer, SequencerSpec, Waveform,
    },
    patch::{EnvelopeParams, EnvelopeStage, Param, ParamRange},
    sequencing::{transport::StepReporter, StepMode, StepPattern},
};

/// Body frequency of the kick (Hz)
pub const KICK_FREQUENCY: f32 = 55.0;

/// Pitch added by a full-scale trigger (Hz)
pub const KICK_TRIGGER_DEPTH: f32 = 15.0;

pub const KICK_GAIN_RANGE: ParamRange = ParamRange::new(0.0, 1.0, 0.01);

/// The five cables of the kick voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickCables {
    pub trigger: Cable,
    pub gate: Cable,
    pub envelope: Cable,
    pub oscillator: Cable,
    pub output: Cable,
}

impl KickCables {
    fn allocate(cables: &mut CableRegistry) -> Self {
        Self {
            trigger: cables.allocate_named(CableKind::Control, "kick.trigger"),
            gate: cables.allocate_named(CableKind::Control, "kick.gate"),
            envelope: cables.allocate_named(CableKind::Control, "kick.envelope"),
            oscillator: cables.allocate_named(CableKind::Audio, "kick.oscillator"),
            output: cables.allocate_named(CableKind::Audio, "kick.output"),
        }
    }

    pub fn all(&self) -> [Cable; 5] {
        [self.trigger, self.gate, self.envelope, self.oscillator, self.output]
    }
}

/// Addressable kick parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickParam {
    Envelope(EnvelopeStage),
    OscGain,
}

impl KickParam {
    pub const ALL: [KickParam; 5] = [
        KickParam::Envelope(EnvelopeStage::Attack),
        KickParam::Envelope(EnvelopeStage::Decay),
        KickParam::Envelope(EnvelopeStage::Sustain),
        KickParam::Envelope(EnvelopeStage::Release),
        KickParam::OscGain,
    ];

    pub fn label(self) -> &'static str {
        match self {
            KickParam::Envelope(stage) => stage.short_label(),
            KickParam::OscGain => "Gain",
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickParams {
    pub envelope: EnvelopeParams,
    pub osc_gain: Param,
}

impl Default for KickParams {
    fn default() -> Self {
        Self {
            envelope: EnvelopeParams::new(Adsr::new(0.001, 0.18, 0.0, 0.02)),
            osc_gain: Param::new(0.9, KICK_GAIN_RANGE),
        }
    }
}

impl KickParams {
    pub fn get(&self, key: KickParam) -> Param {
        match key {
            KickParam::Envelope(stage) => self.envelope.stage(stage),
            KickParam::OscGain => self.osc_gain,
        }
    }

    fn get_mut(&mut self, key: KickParam) -> &mut Param {
        match key {
            KickParam::Envelope(stage) => self.envelope.stage_mut(stage),
            KickParam::OscGain => &mut self.osc_gain,
        }
    }
}

/// The assembled kick voice
pub struct KickPatch {
    cables: KickCables,
    pattern: StepPattern,
    params: KickParams,
    env: Box<dyn EnvelopeGenerator>,
    osc: Box<dyn Oscillator>,
    _vca: Box<dyn Amplifier>,
}

impl KickPatch {
    /// Allocate the kick cables and ask `engine` for every node on them
    pub fn assemble(
        cables: &mut CableRegistry,
        engine: &mut dyn NodeFactory,
        steps: usize,
        bpm: f64,
        reporter: StepReporter,
    ) -> (Self, Box<dyn Sequencer>) {
        let c = KickCables::allocate(cables);
        let pattern = StepPattern::kick_default(steps);
        let params = KickParams::default();

        let sequencer = engine.sequencer(SequencerSpec {
            label: "kick",
            output: c.trigger,
            gate: c.gate,
            num_steps: steps,
            steps: StepMode::Gate.sequencer_steps(&pattern),
            bpm,
            reporter,
        });

        let env = engine.envelope(EnvelopeSpec {
            gate: c.gate,
            output: c.envelope,
            adsr: params.envelope.adsr(),
        });

        let osc = engine.oscillator(OscillatorSpec {
            output: c.oscillator,
            waveform: Waveform::Sine,
            frequency: KICK_FREQUENCY,
            cv: Some(c.trigger),
            cv_amount: KICK_TRIGGER_DEPTH,
            gain: params.osc_gain.value(),
        });

        let vca = engine.amplifier(AmplifierSpec {
            input: c.oscillator,
            output: c.output,
            gain: 0.0,
            cv: Some(c.envelope),
            cv_amount: 1.0,
        });

        log::debug!("assembled kick voice, {steps} steps, output {}", c.output);

        let patch = Self {
            cables: c,
            pattern,
            params,
            env,
            osc,
            _vca: vca,
        };
        (patch, sequencer)
    }

    pub fn cables(&self) -> &KickCables {
        &self.cables
    }

    pub fn output(&self) -> Cable {
        self.cables.output
    }

    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    pub(crate) fn pattern_mut(&mut self) -> &mut StepPattern {
        &mut self.pattern
    }

    /// Binary view of the pattern handed to the sequencer
    pub fn sequencer_steps(&self) -> Vec<f32> {
        StepMode::Gate.sequencer_steps(&self.pattern)
    }

    pub fn params(&self) -> &KickParams {
        &self.params
    }

    pub fn param(&self, key: KickParam) -> Param {
        self.params.get(key)
    }

    pub fn set_param(&mut self, key: KickParam, value: f32) -> f32 {
        let stored = self.params.get_mut(key).set(value);
        self.forward(key);
        stored
    }

    pub fn nudge_param(&mut self, key: KickParam, steps: i32) -> f32 {
        let stored = self.params.get_mut(key).nudge(steps);
        self.forward(key);
        stored
    }

    fn forward(&mut self, key: KickParam) {
        match key {
            KickParam::Envelope(_) => self.env.set_adsr(self.params.envelope.adsr()),
            KickParam::OscGain => self.osc.set_gain(self.params.osc_gain.value()),
        }
    }
}
