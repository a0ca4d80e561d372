//! The control surface: two voices, a master bus and one transport.
//!
//! `Rack` is the input boundary. Everything a user can touch goes through it,
//! and it is where tempo and step values are clamped before they reach the
//! engine.

use crate::{
    cable::CableRegistry,
    config::RackConfig,
    error::Result,
    graph::NodeFactory,
    patch::MasterPatch,
    sequencing::{
        transport::{lane_queue, CompositeAction, TransportCoordinator, TransportRequest},
        StepPattern,
    },
    voices::{BassPatch, KickPatch, Voice},
};

/// A fully wired two-voice rack
pub struct Rack {
    config: RackConfig,
    cables: CableRegistry,
    bass: BassPatch,
    kick: KickPatch,
    master: MasterPatch,
    transport: TransportCoordinator,
}

impl Rack {
    /// Allocate every cable, create every node through `engine` and register
    /// both sequencers with the transport
    pub fn new(config: RackConfig, engine: &mut dyn NodeFactory) -> Result<Self> {
        config.validate()?;
        let tempo = config.initial_bpm();
        let mut cables = CableRegistry::new();

        let (bass_reporter, bass_feed) = lane_queue(config.queue_capacity);
        let (bass, bass_seq) =
            BassPatch::assemble(&mut cables, engine, config.steps, tempo, bass_reporter);

        let (kick_reporter, kick_feed) = lane_queue(config.queue_capacity);
        let (kick, kick_seq) =
            KickPatch::assemble(&mut cables, engine, config.steps, tempo, kick_reporter);

        let master = MasterPatch::assemble(
            &mut cables,
            engine,
            &[
                (bass.output(), config.bass_level),
                (kick.output(), config.kick_level),
            ],
            config.master_gain,
        );

        let mut transport = TransportCoordinator::new(tempo);
        transport.add_lane(Voice::Bass, bass_seq, bass_feed);
        transport.add_lane(Voice::Kick, kick_seq, kick_feed);

        log::info!(
            "rack ready: {} steps at {tempo} bpm, {} cables",
            config.steps,
            cables.len()
        );

        Ok(Self {
            config,
            cables,
            bass,
            kick,
            master,
            transport,
        })
    }

    pub fn config(&self) -> &RackConfig {
        &self.config
    }

    pub fn cables(&self) -> &CableRegistry {
        &self.cables
    }

    pub fn step_count(&self) -> usize {
        self.config.steps
    }

    pub fn bass(&self) -> &BassPatch {
        &self.bass
    }

    pub fn bass_mut(&mut self) -> &mut BassPatch {
        &mut self.bass
    }

    pub fn kick(&self) -> &KickPatch {
        &self.kick
    }

    pub fn kick_mut(&mut self) -> &mut KickPatch {
        &mut self.kick
    }

    pub fn master(&self) -> &MasterPatch {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut MasterPatch {
        &mut self.master
    }

    pub fn transport(&self) -> &TransportCoordinator {
        &self.transport
    }

    // -- patterns --

    pub fn pattern(&self, voice: Voice) -> &StepPattern {
        match voice {
            Voice::Bass => self.bass.pattern(),
            Voice::Kick => self.kick.pattern(),
        }
    }

    fn pattern_mut(&mut self, voice: Voice) -> &mut StepPattern {
        match voice {
            Voice::Bass => self.bass.pattern_mut(),
            Voice::Kick => self.kick.pattern_mut(),
        }
    }

    /// Write one step (clamped to [0, 1]) and hand the pattern to the sequencer
    pub fn set_step(&mut self, voice: Voice, index: usize, value: f32) -> Result<()> {
        self.pattern_mut(voice).set_step(index, value)?;
        self.sync_steps(voice)
    }

    /// Flip one step between off and on
    pub fn toggle_step(&mut self, voice: Voice, index: usize) -> Result<()> {
        self.pattern_mut(voice).toggle_step(index)?;
        self.sync_steps(voice)
    }

    fn sync_steps(&mut self, voice: Voice) -> Result<()> {
        let steps = voice.step_mode().sequencer_steps(self.pattern(voice));
        self.transport.load_steps(voice, &steps)
    }

    // -- transport --

    /// The single Play/Stop control
    pub fn toggle_playback(&mut self) -> CompositeAction {
        self.transport.toggle_all()
    }

    /// Stop both voices and rewind them to step 0
    pub fn reset(&mut self) {
        self.transport.reset();
    }

    pub fn tempo(&self) -> f64 {
        self.transport.tempo()
    }

    /// Clamp `bpm` into the configured range, broadcast it, return what was set
    pub fn set_tempo(&mut self, bpm: f64) -> f64 {
        let clamped = self.config.clamp_bpm(bpm);
        if clamped != bpm {
            log::debug!("tempo {bpm} clamped to {clamped}");
        }
        self.transport.set_tempo(clamped);
        clamped
    }

    pub fn is_running(&self, voice: Voice) -> bool {
        self.transport.is_running(voice)
    }

    /// Both voices are running
    pub fn all_running(&self) -> bool {
        self.transport.all_running()
    }

    /// Last step reported by a voice's sequencer
    pub fn current_step(&self, voice: Voice) -> usize {
        self.transport.current_step(voice).unwrap_or(0)
    }

    pub fn status_label(&self) -> String {
        self.transport.status_label()
    }

    /// Drain sequencer reports and apply anything they asked for
    ///
    /// Returns how many tempo or pattern requests were applied.
    pub fn poll(&mut self) -> Result<usize> {
        let mut applied = 0;
        for request in self.transport.poll() {
            match request {
                TransportRequest::Tempo(bpm) => {
                    self.set_tempo(bpm);
                    applied += 1;
                }
                TransportRequest::Steps { voice, values } => {
                    if values.len() != self.config.steps {
                        log::debug!(
                            "ignoring {voice} edit with {} steps, expected {}",
                            values.len(),
                            self.config.steps
                        );
                        continue;
                    }
                    *self.pattern_mut(voice) = StepPattern::from_values(&values);
                    self.sync_steps(voice)?;
                    applied += 1;
                }
            }
        }
        Ok(applied)
    }
}
