use crate::cable::Cable;
use crate::sequencing::transport::StepReporter;

/// Waveform selector handed to oscillator nodes
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

/// Filter response handed to filter nodes
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
    Notch,
}

/// Attack / decay / release in seconds, sustain as a level in [0, 1]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

/// Step sequencer wiring
///
/// Emits one control value per step on `output` and a gate on `gate`.
/// Progress is reported back through `reporter`.
pub struct SequencerSpec {
    pub label: &'static str,
    pub output: Cable,
    pub gate: Cable,
    pub num_steps: usize,
    pub steps: Vec<f32>,
    pub bpm: f64,
    pub reporter: StepReporter,
}

/// Envelope generator wiring: `gate` in, envelope level out
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeSpec {
    pub gate: Cable,
    pub output: Cable,
    pub adsr: Adsr,
}

/// Oscillator wiring
///
/// Pitch is `frequency + cv * cv_amount` when a cv cable is patched.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorSpec {
    pub output: Cable,
    pub waveform: Waveform,
    pub frequency: f32,
    pub cv: Option<Cable>,
    pub cv_amount: f32,
    pub gain: f32,
}

/// Filter wiring; cutoff is modulated by `cv * cv_amount`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub input: Cable,
    pub output: Cable,
    pub filter_type: FilterType,
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub cv: Option<Cable>,
    pub cv_amount: f32,
}

/// Amplifier (VCA) wiring; gain is `gain + cv * cv_amount`
#[derive(Debug, Clone, PartialEq)]
pub struct AmplifierSpec {
    pub input: Cable,
    pub output: Cable,
    pub gain: f32,
    pub cv: Option<Cable>,
    pub cv_amount: f32,
}

/// Mixer wiring: `inputs[i]` is weighted by `levels[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct MixerSpec {
    pub inputs: Vec<Cable>,
    pub levels: Vec<f32>,
    pub output: Cable,
}

/// Output monitor wiring
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSpec {
    pub input: Cable,
    pub gain: f32,
    pub muted: bool,
}

/// Step sequencer capability
///
/// Timing lives entirely in the implementation. Step advances and play state
/// changes must be pushed through the `StepReporter` it was created with.
pub trait Sequencer {
    fn set_steps(&mut self, steps: &[f32]);

    fn set_bpm(&mut self, bpm: f64);

    fn bpm(&self) -> f64;

    fn play(&mut self);

    fn pause(&mut self);

    /// Return to step 0
    fn reset(&mut self);
}

pub trait EnvelopeGenerator {
    fn set_adsr(&mut self, adsr: Adsr);
}

pub trait Oscillator {
    fn set_frequency(&mut self, hz: f32);

    fn set_cv_amount(&mut self, amount: f32);

    fn set_gain(&mut self, gain: f32);
}

pub trait Filter {
    fn set_cutoff(&mut self, hz: f32);

    fn set_resonance(&mut self, q: f32);

    fn set_cv_amount(&mut self, amount: f32);
}

/// Amplifier capability
///
/// All amplifier settings in this rack are fixed at wiring time; the handle
/// keeps the node alive for as long as the owning patch exists.
pub trait Amplifier {}

/// Mixer capability (levels are fixed at wiring time)
pub trait Mixer {}

/// Output monitor capability
pub trait Monitor {
    fn gain(&self) -> f32;

    fn set_gain(&mut self, gain: f32);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Whether signal is currently reaching the output
    fn is_active(&self) -> bool;
}

/// Engine entry point: turns wiring specs into live nodes
///
/// Every node the rack needs is created through this trait, so any engine
/// (or a test double that only records what it was given) can sit behind it.
pub trait NodeFactory {
    fn sequencer(&mut self, spec: SequencerSpec) -> Box<dyn Sequencer>;

    fn envelope(&mut self, spec: EnvelopeSpec) -> Box<dyn EnvelopeGenerator>;

    fn oscillator(&mut self, spec: OscillatorSpec) -> Box<dyn Oscillator>;

    fn filter(&mut self, spec: FilterSpec) -> Box<dyn Filter>;

    fn amplifier(&mut self, spec: AmplifierSpec) -> Box<dyn Amplifier>;

    fn mixer(&mut self, spec: MixerSpec) -> Box<dyn Mixer>;

    fn monitor(&mut self, spec: MonitorSpec) -> Box<dyn Monitor>;
}
