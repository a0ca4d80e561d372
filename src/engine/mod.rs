//! Software engine.
//!
//! A [`NodeFactory`] that keeps every node it creates in one shared state:
//! oscillators, filters and friends simply hold the settings they were given
//! so they can be inspected, and sequencers are [`StepClock`]s driven by
//! [`SoftEngine::advance`]. Nothing is rendered to audio.

pub mod clock;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

pub use clock::{StepClock, STEPS_PER_BEAT};

use crate::graph::{
    Adsr, Amplifier, AmplifierSpec, EnvelopeGenerator, EnvelopeSpec, Filter, FilterSpec, Mixer,
    MixerSpec, Monitor, MonitorSpec, NodeFactory, Oscillator, OscillatorSpec, Sequencer,
    SequencerSpec,
};

#[derive(Default)]
struct EngineState {
    sequencers: Vec<StepClock>,
    envelopes: Vec<EnvelopeSpec>,
    oscillators: Vec<OscillatorSpec>,
    filters: Vec<FilterSpec>,
    amplifiers: Vec<AmplifierSpec>,
    mixers: Vec<MixerSpec>,
    monitors: Vec<MonitorSpec>,
}

impl EngineState {
    fn any_playing(&self) -> bool {
        self.sequencers.iter().any(StepClock::is_playing)
    }
}

type Shared = Arc<Mutex<EngineState>>;

fn lock(shared: &Shared) -> MutexGuard<'_, EngineState> {
    // Node state stays usable even if a holder panicked mid-update
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of one sequencer node
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerView {
    pub label: &'static str,
    pub steps: Vec<f32>,
    pub bpm: f64,
    pub position: usize,
    pub playing: bool,
}

/// In-process engine whose nodes record what they are told
#[derive(Clone, Default)]
pub struct SoftEngine {
    shared: Shared,
}

impl SoftEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every sequencer clock forward by `elapsed`
    pub fn advance(&self, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();
        for clock in &mut lock(&self.shared).sequencers {
            clock.advance(seconds);
        }
    }

    fn with_clock(&self, label: &str, f: impl FnOnce(&mut StepClock)) -> bool {
        let mut state = lock(&self.shared);
        match state.sequencers.iter_mut().find(|c| c.label() == label) {
            Some(clock) => {
                f(clock);
                true
            }
            None => false,
        }
    }

    /// Turn the tempo knob on one sequencer's own panel
    ///
    /// Returns false when no sequencer carries `label`.
    pub fn panel_tempo(&self, label: &str, bpm: f64) -> bool {
        self.with_clock(label, |c| c.request_tempo(bpm))
    }

    /// Redraw the pattern on one sequencer's own step editor
    pub fn panel_steps(&self, label: &str, steps: &[f32]) -> bool {
        self.with_clock(label, |c| c.request_steps(steps))
    }

    pub fn sequencer(&self, label: &str) -> Option<SequencerView> {
        lock(&self.shared)
            .sequencers
            .iter()
            .find(|c| c.label() == label)
            .map(|c| SequencerView {
                label: c.label(),
                steps: c.steps().to_vec(),
                bpm: c.bpm(),
                position: c.position(),
                playing: c.is_playing(),
            })
    }

    pub fn sequencer_count(&self) -> usize {
        lock(&self.shared).sequencers.len()
    }

    pub fn envelopes(&self) -> Vec<EnvelopeSpec> {
        lock(&self.shared).envelopes.clone()
    }

    pub fn oscillators(&self) -> Vec<OscillatorSpec> {
        lock(&self.shared).oscillators.clone()
    }

    pub fn filters(&self) -> Vec<FilterSpec> {
        lock(&self.shared).filters.clone()
    }

    pub fn amplifiers(&self) -> Vec<AmplifierSpec> {
        lock(&self.shared).amplifiers.clone()
    }

    pub fn mixers(&self) -> Vec<MixerSpec> {
        lock(&self.shared).mixers.clone()
    }

    pub fn monitors(&self) -> Vec<MonitorSpec> {
        lock(&self.shared).monitors.clone()
    }
}

// -- node handles: an index into the shared state --

struct SoftSequencer {
    shared: Shared,
    index: usize,
}

impl SoftSequencer {
    fn with<R>(&self, f: impl FnOnce(&mut StepClock) -> R) -> R {
        f(&mut lock(&self.shared).sequencers[self.index])
    }
}

impl Sequencer for SoftSequencer {
    fn set_steps(&mut self, steps: &[f32]) {
        self.with(|c| c.set_steps(steps));
    }

    fn set_bpm(&mut self, bpm: f64) {
        self.with(|c| c.set_bpm(bpm));
    }

    fn bpm(&self) -> f64 {
        self.with(|c| c.bpm())
    }

    fn play(&mut self) {
        self.with(StepClock::play);
    }

    fn pause(&mut self) {
        self.with(StepClock::pause);
    }

    fn reset(&mut self) {
        self.with(StepClock::reset);
    }
}

struct SoftEnvelope {
    shared: Shared,
    index: usize,
}

impl EnvelopeGenerator for SoftEnvelope {
    fn set_adsr(&mut self, adsr: Adsr) {
        lock(&self.shared).envelopes[self.index].adsr = adsr;
    }
}

struct SoftOscillator {
    shared: Shared,
    index: usize,
}

impl Oscillator for SoftOscillator {
    fn set_frequency(&mut self, hz: f32) {
        lock(&self.shared).oscillators[self.index].frequency = hz;
    }

    fn set_cv_amount(&mut self, amount: f32) {
        lock(&self.shared).oscillators[self.index].cv_amount = amount;
    }

    fn set_gain(&mut self, gain: f32) {
        lock(&self.shared).oscillators[self.index].gain = gain;
    }
}

struct SoftFilter {
    shared: Shared,
    index: usize,
}

impl Filter for SoftFilter {
    fn set_cutoff(&mut self, hz: f32) {
        lock(&self.shared).filters[self.index].cutoff_hz = hz;
    }

    fn set_resonance(&mut self, q: f32) {
        lock(&self.shared).filters[self.index].resonance = q;
    }

    fn set_cv_amount(&mut self, amount: f32) {
        lock(&self.shared).filters[self.index].cv_amount = amount;
    }
}

struct SoftAmplifier;

impl Amplifier for SoftAmplifier {}

struct SoftMixer;

impl Mixer for SoftMixer {}

struct SoftMonitor {
    shared: Shared,
    index: usize,
}

impl Monitor for SoftMonitor {
    fn gain(&self) -> f32 {
        lock(&self.shared).monitors[self.index].gain
    }

    fn set_gain(&mut self, gain: f32) {
        lock(&self.shared).monitors[self.index].gain = gain;
    }

    fn is_muted(&self) -> bool {
        lock(&self.shared).monitors[self.index].muted
    }

    fn set_muted(&mut self, muted: bool) {
        lock(&self.shared).monitors[self.index].muted = muted;
    }

    fn is_active(&self) -> bool {
        let state = lock(&self.shared);
        let monitor = &state.monitors[self.index];
        !monitor.muted && monitor.gain > 0.0 && state.any_playing()
    }
}

impl NodeFactory for SoftEngine {
    fn sequencer(&mut self, spec: SequencerSpec) -> Box<dyn Sequencer> {
        let mut state = lock(&self.shared);
        log::trace!("sequencer {} on {} / {}", spec.label, spec.output, spec.gate);
        state.sequencers.push(StepClock::new(
            spec.label,
            spec.output,
            spec.gate,
            spec.num_steps,
            spec.steps,
            spec.bpm,
            spec.reporter,
        ));
        Box::new(SoftSequencer {
            shared: self.shared.clone(),
            index: state.sequencers.len() - 1,
        })
    }

    fn envelope(&mut self, spec: EnvelopeSpec) -> Box<dyn EnvelopeGenerator> {
        let mut state = lock(&self.shared);
        state.envelopes.push(spec);
        Box::new(SoftEnvelope {
            shared: self.shared.clone(),
            index: state.envelopes.len() - 1,
        })
    }

    fn oscillator(&mut self, spec: OscillatorSpec) -> Box<dyn Oscillator> {
        let mut state = lock(&self.shared);
        state.oscillators.push(spec);
        Box::new(SoftOscillator {
            shared: self.shared.clone(),
            index: state.oscillators.len() - 1,
        })
    }

    fn filter(&mut self, spec: FilterSpec) -> Box<dyn Filter> {
        let mut state = lock(&self.shared);
        state.filters.push(spec);
        Box::new(SoftFilter {
            shared: self.shared.clone(),
            index: state.filters.len() - 1,
        })
    }

    fn amplifier(&mut self, spec: AmplifierSpec) -> Box<dyn Amplifier> {
        lock(&self.shared).amplifiers.push(spec);
        Box::new(SoftAmplifier)
    }

    fn mixer(&mut self, spec: MixerSpec) -> Box<dyn Mixer> {
        lock(&self.shared).mixers.push(spec);
        Box::new(SoftMixer)
    }

    fn monitor(&mut self, spec: MonitorSpec) -> Box<dyn Monitor> {
        let mut state = lock(&self.shared);
        state.monitors.push(spec);
        Box::new(SoftMonitor {
            shared: self.shared.clone(),
            index: state.monitors.len() - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cable::{CableKind, CableRegistry},
        graph::Waveform,
        sequencing::transport::lane_queue,
    };

    #[test]
    fn oscillator_handle_writes_through() {
        let mut engine = SoftEngine::new();
        let mut cables = CableRegistry::new();
        let mut osc = engine.oscillator(OscillatorSpec {
            output: cables.allocate(CableKind::Audio),
            waveform: Waveform::Sine,
            frequency: 55.0,
            cv: None,
            cv_amount: 0.0,
            gain: 0.5,
        });

        osc.set_gain(0.25);
        osc.set_frequency(60.0);

        let recorded = &engine.oscillators()[0];
        assert_eq!(recorded.gain, 0.25);
        assert_eq!(recorded.frequency, 60.0);
    }

    #[test]
    fn monitor_is_active_only_with_a_running_clock() {
        let mut engine = SoftEngine::new();
        let mut cables = CableRegistry::new();
        let (reporter, _feed) = lane_queue(8);
        let mut seq = NodeFactory::sequencer(&mut engine, SequencerSpec {
            label: "kick",
            output: cables.allocate(CableKind::Control),
            gate: cables.allocate(CableKind::Control),
            num_steps: 4,
            steps: vec![1.0, 0.0, 0.0, 0.0],
            bpm: 120.0,
            reporter,
        });
        let mut monitor = engine.monitor(MonitorSpec {
            input: cables.allocate(CableKind::Audio),
            gain: 1.0,
            muted: false,
        });

        assert!(!monitor.is_active());
        seq.play();
        assert!(monitor.is_active());
        monitor.set_muted(true);
        assert!(!monitor.is_active());
        monitor.set_muted(false);
        monitor.set_gain(0.0);
        assert!(!monitor.is_active());
    }

    #[test]
    fn advance_drives_every_clock() {
        let mut engine = SoftEngine::new();
        let mut cables = CableRegistry::new();
        let (reporter, _feed) = lane_queue(16);
        let mut seq = NodeFactory::sequencer(&mut engine, SequencerSpec {
            label: "bass",
            output: cables.allocate(CableKind::Control),
            gate: cables.allocate(CableKind::Control),
            num_steps: 16,
            steps: vec![0.0; 16],
            bpm: 120.0,
            reporter,
        });

        seq.play();
        engine.advance(Duration::from_millis(500));
        let view = engine.sequencer("bass").unwrap();
        assert_eq!(view.position, 4);
        assert!(view.playing);
    }
}
