//! Shared transport for independently clocked sequencers.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    error::{RackError, Result},
    graph::Sequencer,
    voices::Voice,
};

/*
One Transport, Many Sequencers
==============================

Each voice runs its own sequencer node with its own clock. The user still
expects one Play button, one Reset button and one tempo:

                     ┌──────────────┐   play/pause/reset/bpm   ┌────────────┐
   Play ──────────→  │  Transport   │ ───────────────────────→ │ bass seq   │
   Reset ─────────→  │ Coordinator  │ ───────────────────────→ │ kick seq   │
   Tempo ─────────→  │              │ ←─── step / playing ──── │ (queues)   │
                     └──────────────┘                          └────────────┘

Commands fan out to every lane. Reports flow back through one bounded queue
per lane: the sequencer holds a `StepReporter`, the coordinator drains the
matching `StepFeed` in `poll()`. The coordinator never computes timing, it
only relays the latest reported step for display.

Per-lane state machine:

    Paused ──play()──→ Running
    Running ─pause()─→ Paused
    any ────reset()──→ Paused, step 0

Composite toggle:
-----------------
"Everything running" is derived (every lane Running), never stored. The
toggle pauses every lane when everything runs and starts every lane
otherwise. With lanes in mixed states it starts all of them rather than
resuming only the stopped one.

Commands update the model immediately; later reports from the engine
overwrite it (last write wins). Before a command is applied the lane's
queue is drained, so reports sent before the command can never land on
top of it.

Overflow:
---------
Every report is also written to a per-lane `Latest` slot before it is
queued. When the queue is full the report is not lost: the slot is marked
stale, and the next drain applies the slot after the queued reports.

    reporter ── step 80 ──→ [Latest: step 80, stale] ─┐
             ╳─ queue full                            ├─→ drain: queue, then slot
    queue: [play, 1, 2, ... 63] ──────────────────────┘
*/

/// Notification pushed by a sequencer node
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    /// The sequencer advanced to (or was moved to) this step
    StepChanged(usize),
    /// The sequencer started or stopped
    PlayingChanged(bool),
    /// The sequencer's own tempo control was moved
    TempoChanged(f64),
    /// The sequencer's own step editor changed the pattern
    StepsEdited(Vec<f32>),
}

/// Follow-up the caller must apply at its input boundary after `poll()`
#[derive(Debug, Clone, PartialEq)]
pub enum TransportRequest {
    /// A sequencer asked for a new shared tempo
    Tempo(f64),
    /// A sequencer edited its lane's pattern
    Steps { voice: Voice, values: Vec<f32> },
}

/// Most recent report of one lane, readable without the queue
#[derive(Debug, Default)]
struct Latest {
    step: AtomicUsize,
    playing: AtomicBool,
    tempo_bits: AtomicU64,
    /// A step or play-state report missed the queue
    stale: AtomicBool,
    /// A tempo report missed the queue
    tempo_dropped: AtomicBool,
}

/// Sequencer-side end of a lane queue
pub struct StepReporter {
    tx: Producer<SequencerEvent>,
    latest: Arc<Latest>,
}

/// Coordinator-side end of a lane queue
pub struct StepFeed {
    rx: Consumer<SequencerEvent>,
    latest: Arc<Latest>,
}

impl StepReporter {
    fn send(&mut self, event: SequencerEvent) {
        let Err(rtrb::PushError::Full(event)) = self.tx.push(event) else {
            return;
        };
        match event {
            SequencerEvent::StepChanged(_) | SequencerEvent::PlayingChanged(_) => {
                self.latest.stale.store(true, Ordering::Release);
            }
            SequencerEvent::TempoChanged(_) => {
                self.latest.tempo_dropped.store(true, Ordering::Release);
            }
            SequencerEvent::StepsEdited(_) => {}
        }
        log::trace!("lane queue full, coalesced {event:?}");
    }

    pub fn step_changed(&mut self, step: usize) {
        self.latest.step.store(step, Ordering::Release);
        self.send(SequencerEvent::StepChanged(step));
    }

    pub fn playing_changed(&mut self, playing: bool) {
        self.latest.playing.store(playing, Ordering::Release);
        self.send(SequencerEvent::PlayingChanged(playing));
    }

    pub fn tempo_changed(&mut self, bpm: f64) {
        self.latest.tempo_bits.store(bpm.to_bits(), Ordering::Release);
        self.send(SequencerEvent::TempoChanged(bpm));
    }

    /// Pattern edits are not coalesced; a full queue drops them
    pub fn steps_edited(&mut self, steps: &[f32]) {
        self.send(SequencerEvent::StepsEdited(steps.to_vec()));
    }
}

impl StepFeed {
    fn pop(&mut self) -> Option<SequencerEvent> {
        self.rx.pop().ok()
    }

    /// Latest step and play state, if any of them missed the queue
    fn take_stale(&self) -> Option<(usize, bool)> {
        self.latest.stale.swap(false, Ordering::AcqRel).then(|| {
            (
                self.latest.step.load(Ordering::Acquire),
                self.latest.playing.load(Ordering::Acquire),
            )
        })
    }

    fn take_dropped_tempo(&self) -> Option<f64> {
        self.latest
            .tempo_dropped
            .swap(false, Ordering::AcqRel)
            .then(|| f64::from_bits(self.latest.tempo_bits.load(Ordering::Acquire)))
    }
}

/// Create the bounded queue connecting one sequencer to the coordinator
pub fn lane_queue(capacity: usize) -> (StepReporter, StepFeed) {
    let (tx, rx) = RingBuffer::<SequencerEvent>::new(capacity.max(1));
    let latest = Arc::new(Latest::default());
    (
        StepReporter {
            tx,
            latest: latest.clone(),
        },
        StepFeed { rx, latest },
    )
}

/// Playback state of one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Paused,
    Running,
}

/// Result of the composite play/stop decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeAction {
    PauseAll,
    PlayAll,
}

/// Composite toggle rule: pause everything only when everything runs
pub fn composite_action(running: impl IntoIterator<Item = bool>) -> CompositeAction {
    if running.into_iter().all(|r| r) {
        CompositeAction::PauseAll
    } else {
        CompositeAction::PlayAll
    }
}

struct Lane {
    voice: Voice,
    sequencer: Box<dyn Sequencer>,
    feed: StepFeed,
    state: PlayState,
    current_step: usize,
    /// Requests drained ahead of a command, handed out on the next poll
    deferred: Vec<TransportRequest>,
}

impl Lane {
    fn set_playing(&mut self, playing: bool) {
        self.state = if playing {
            PlayState::Running
        } else {
            PlayState::Paused
        };
    }

    /// Apply every queued report, then whatever overflowed past the queue
    fn drain(&mut self) {
        while let Some(event) = self.feed.pop() {
            match event {
                SequencerEvent::StepChanged(step) => {
                    log::trace!("{} step {step}", self.voice);
                    self.current_step = step;
                }
                SequencerEvent::PlayingChanged(playing) => self.set_playing(playing),
                SequencerEvent::TempoChanged(bpm) => {
                    self.deferred.push(TransportRequest::Tempo(bpm));
                }
                SequencerEvent::StepsEdited(values) => {
                    self.deferred.push(TransportRequest::Steps {
                        voice: self.voice,
                        values,
                    });
                }
            }
        }
        if let Some((step, playing)) = self.feed.take_stale() {
            log::trace!("{} caught up to step {step} after overflow", self.voice);
            self.current_step = step;
            self.set_playing(playing);
        }
        if let Some(bpm) = self.feed.take_dropped_tempo() {
            self.deferred.push(TransportRequest::Tempo(bpm));
        }
    }

    fn play(&mut self) {
        self.drain();
        self.sequencer.play();
        self.state = PlayState::Running;
    }

    fn pause(&mut self) {
        self.drain();
        self.sequencer.pause();
        self.state = PlayState::Paused;
    }

    fn reset(&mut self) {
        self.drain();
        self.sequencer.pause();
        self.sequencer.reset();
        self.state = PlayState::Paused;
        self.current_step = 0;
    }
}

/// Owns per-voice playback state and the shared tempo
pub struct TransportCoordinator {
    tempo: f64,
    lanes: Vec<Lane>,
}

impl TransportCoordinator {
    pub fn new(tempo: f64) -> Self {
        Self {
            tempo,
            lanes: Vec::with_capacity(Voice::ALL.len()),
        }
    }

    /// Register the sequencer driving `voice`
    ///
    /// The lane starts Paused at step 0 and is brought to the shared tempo.
    /// Registering a voice twice replaces the earlier lane.
    pub fn add_lane(&mut self, voice: Voice, mut sequencer: Box<dyn Sequencer>, feed: StepFeed) {
        sequencer.set_bpm(self.tempo);
        let lane = Lane {
            voice,
            sequencer,
            feed,
            state: PlayState::Paused,
            current_step: 0,
            deferred: Vec::new(),
        };

        match self.lanes.iter_mut().find(|l| l.voice == voice) {
            Some(existing) => *existing = lane,
            None => self.lanes.push(lane),
        }
        log::debug!("registered {voice} lane at {} bpm", self.tempo);
    }

    fn lane(&self, voice: Voice) -> Result<&Lane> {
        self.lanes
            .iter()
            .find(|l| l.voice == voice)
            .ok_or(RackError::LaneMissing(voice))
    }

    fn lane_mut(&mut self, voice: Voice) -> Result<&mut Lane> {
        self.lanes
            .iter_mut()
            .find(|l| l.voice == voice)
            .ok_or(RackError::LaneMissing(voice))
    }

    /// Voices with a registered lane, in registration order
    pub fn voices(&self) -> impl Iterator<Item = Voice> + '_ {
        self.lanes.iter().map(|l| l.voice)
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Broadcast one tempo to every sequencer
    ///
    /// No range check happens here; callers clamp at their input boundary.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm;
        for lane in &mut self.lanes {
            lane.sequencer.set_bpm(bpm);
        }
        log::debug!("tempo -> {bpm} bpm");
    }

    /// Tempo as reported by one lane's sequencer
    pub fn lane_tempo(&self, voice: Voice) -> Result<f64> {
        Ok(self.lane(voice)?.sequencer.bpm())
    }

    pub fn state(&self, voice: Voice) -> Result<PlayState> {
        Ok(self.lane(voice)?.state)
    }

    pub fn is_running(&self, voice: Voice) -> bool {
        matches!(self.state(voice), Ok(PlayState::Running))
    }

    /// Most recently reported step of one lane
    pub fn current_step(&self, voice: Voice) -> Result<usize> {
        Ok(self.lane(voice)?.current_step)
    }

    /// Derived: every registered lane is running
    pub fn all_running(&self) -> bool {
        !self.lanes.is_empty() && self.lanes.iter().all(|l| l.state == PlayState::Running)
    }

    pub fn play(&mut self, voice: Voice) -> Result<()> {
        self.lane_mut(voice)?.play();
        Ok(())
    }

    pub fn pause(&mut self, voice: Voice) -> Result<()> {
        self.lane_mut(voice)?.pause();
        Ok(())
    }

    pub fn play_all(&mut self) {
        for lane in &mut self.lanes {
            lane.play();
        }
    }

    pub fn pause_all(&mut self) {
        for lane in &mut self.lanes {
            lane.pause();
        }
    }

    /// One Play/Stop press
    pub fn toggle_all(&mut self) -> CompositeAction {
        for lane in &mut self.lanes {
            lane.drain();
        }
        let action = composite_action(self.lanes.iter().map(|l| l.state == PlayState::Running));
        match action {
            CompositeAction::PauseAll => self.pause_all(),
            CompositeAction::PlayAll => self.play_all(),
        }
        log::debug!("transport toggle -> {action:?}");
        action
    }

    /// Stop every lane and rewind it to step 0
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.reset();
        }
        log::debug!("transport reset");
    }

    /// Hand new step values to one lane's sequencer
    pub fn load_steps(&mut self, voice: Voice, steps: &[f32]) -> Result<()> {
        self.lane_mut(voice)?.sequencer.set_steps(steps);
        Ok(())
    }

    /// Drain every lane queue in order
    ///
    /// Step and play-state reports are applied directly. Tempo and pattern
    /// edits made on a sequencer's own surface are returned so the caller can
    /// clamp them before they are fanned back out.
    pub fn poll(&mut self) -> Vec<TransportRequest> {
        let mut requests = Vec::new();
        for lane in &mut self.lanes {
            lane.drain();
            requests.append(&mut lane.deferred);
        }
        requests
    }

    /// e.g. `"bass: playing • kick: paused"`
    pub fn status_label(&self) -> String {
        self.lanes
            .iter()
            .map(|l| {
                let state = match l.state {
                    PlayState::Running => "playing",
                    PlayState::Paused => "paused",
                };
                format!("{}: {state}", l.voice)
            })
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Debug)]
    struct Calls {
        bpm: f64,
        log: Vec<&'static str>,
        steps: Vec<f32>,
    }

    /// Records every command it receives
    struct FakeSequencer(Arc<Mutex<Calls>>);

    impl Sequencer for FakeSequencer {
        fn set_steps(&mut self, steps: &[f32]) {
            self.0.lock().unwrap().steps = steps.to_vec();
        }
        fn set_bpm(&mut self, bpm: f64) {
            self.0.lock().unwrap().bpm = bpm;
        }
        fn bpm(&self) -> f64 {
            self.0.lock().unwrap().bpm
        }
        fn play(&mut self) {
            self.0.lock().unwrap().log.push("play");
        }
        fn pause(&mut self) {
            self.0.lock().unwrap().log.push("pause");
        }
        fn reset(&mut self) {
            self.0.lock().unwrap().log.push("reset");
        }
    }

    struct Harness {
        transport: TransportCoordinator,
        bass: (Arc<Mutex<Calls>>, StepReporter),
        kick: (Arc<Mutex<Calls>>, StepReporter),
    }

    fn harness() -> Harness {
        let mut transport = TransportCoordinator::new(128.0);
        let mut lane = |voice| {
            let calls = Arc::new(Mutex::new(Calls::default()));
            let (reporter, feed) = lane_queue(16);
            transport.add_lane(voice, Box::new(FakeSequencer(calls.clone())), feed);
            (calls, reporter)
        };
        let bass = lane(Voice::Bass);
        let kick = lane(Voice::Kick);
        Harness { transport, bass, kick }
    }

    #[test]
    fn lanes_start_paused_at_step_zero() {
        let h = harness();
        for voice in Voice::ALL {
            assert_eq!(h.transport.state(voice), Ok(PlayState::Paused));
            assert_eq!(h.transport.current_step(voice), Ok(0));
        }
        assert!(!h.transport.all_running());
    }

    #[test]
    fn toggle_runs_then_pauses_both() {
        let mut h = harness();

        assert_eq!(h.transport.toggle_all(), CompositeAction::PlayAll);
        assert!(h.transport.is_running(Voice::Bass));
        assert!(h.transport.is_running(Voice::Kick));

        assert_eq!(h.transport.toggle_all(), CompositeAction::PauseAll);
        assert_eq!(h.transport.state(Voice::Bass), Ok(PlayState::Paused));
        assert_eq!(h.transport.state(Voice::Kick), Ok(PlayState::Paused));

        assert_eq!(h.bass.0.lock().unwrap().log, ["play", "pause"]);
        assert_eq!(h.kick.0.lock().unwrap().log, ["play", "pause"]);
    }

    #[test]
    fn toggle_with_mixed_states_starts_everything() {
        let mut h = harness();
        h.transport.play(Voice::Kick).unwrap();

        assert_eq!(h.transport.toggle_all(), CompositeAction::PlayAll);
        assert!(h.transport.all_running());
        // the already-running lane is told to play again
        assert_eq!(h.kick.0.lock().unwrap().log, ["play", "play"]);
    }

    #[test]
    fn composite_rule_is_a_conjunction() {
        assert_eq!(composite_action([true, true]), CompositeAction::PauseAll);
        assert_eq!(composite_action([true, false]), CompositeAction::PlayAll);
        assert_eq!(composite_action([false, false]), CompositeAction::PlayAll);
    }

    #[test]
    fn reset_pauses_and_rewinds_from_any_state() {
        let mut h = harness();
        h.transport.toggle_all();
        h.bass.1.step_changed(7);
        h.kick.1.step_changed(3);
        h.transport.poll();
        assert_eq!(h.transport.current_step(Voice::Bass), Ok(7));

        h.transport.reset();

        for voice in Voice::ALL {
            assert_eq!(h.transport.state(voice), Ok(PlayState::Paused));
            assert_eq!(h.transport.current_step(voice), Ok(0));
        }
        assert_eq!(h.bass.0.lock().unwrap().log, ["play", "pause", "reset"]);
    }

    #[test]
    fn tempo_is_shared_by_every_lane() {
        let mut h = harness();
        assert_eq!(h.transport.lane_tempo(Voice::Bass), Ok(128.0));

        h.transport.set_tempo(140.0);

        assert_eq!(h.transport.tempo(), 140.0);
        assert_eq!(h.transport.lane_tempo(Voice::Bass), Ok(140.0));
        assert_eq!(h.transport.lane_tempo(Voice::Kick), Ok(140.0));
    }

    #[test]
    fn poll_relays_latest_reports() {
        let mut h = harness();
        h.bass.1.step_changed(1);
        h.bass.1.step_changed(2);
        h.kick.1.playing_changed(true);

        assert!(h.transport.poll().is_empty());
        assert_eq!(h.transport.current_step(Voice::Bass), Ok(2));
        assert!(h.transport.is_running(Voice::Kick));
        assert!(!h.transport.is_running(Voice::Bass));
    }

    #[test]
    fn poll_returns_tempo_and_step_edits() {
        let mut h = harness();
        h.kick.1.tempo_changed(300.0);
        h.bass.1.steps_edited(&[0.5, 0.25]);

        let requests = h.transport.poll();
        assert_eq!(
            requests,
            vec![
                TransportRequest::Steps {
                    voice: Voice::Bass,
                    values: vec![0.5, 0.25],
                },
                TransportRequest::Tempo(300.0),
            ]
        );
        // the coordinator itself does not adopt the tempo
        assert_eq!(h.transport.tempo(), 128.0);
    }

    #[test]
    fn overflowed_reports_catch_up_on_poll() {
        let mut transport = TransportCoordinator::new(120.0);
        let calls = Arc::new(Mutex::new(Calls::default()));
        let (mut reporter, feed) = lane_queue(2);
        transport.add_lane(Voice::Bass, Box::new(FakeSequencer(calls)), feed);

        reporter.playing_changed(true);
        reporter.step_changed(1);
        reporter.step_changed(2);
        reporter.step_changed(3);
        assert!(transport.poll().is_empty());

        assert_eq!(transport.current_step(Voice::Bass), Ok(3));
        assert!(transport.is_running(Voice::Bass));
    }

    #[test]
    fn overflowed_tempo_is_still_requested() {
        let mut transport = TransportCoordinator::new(120.0);
        let calls = Arc::new(Mutex::new(Calls::default()));
        let (mut reporter, feed) = lane_queue(1);
        transport.add_lane(Voice::Kick, Box::new(FakeSequencer(calls)), feed);

        reporter.step_changed(1);
        reporter.tempo_changed(150.0);
        reporter.tempo_changed(160.0);

        assert_eq!(transport.poll(), vec![TransportRequest::Tempo(160.0)]);
    }

    #[test]
    fn reset_is_not_undone_by_earlier_reports() {
        let mut h = harness();
        h.transport.toggle_all();
        // more reports than the queue holds, none polled yet
        for step in 1..40 {
            h.bass.1.step_changed(step % 16);
        }

        h.transport.reset();
        let requests = h.transport.poll();

        assert!(requests.is_empty());
        assert_eq!(h.transport.state(Voice::Bass), Ok(PlayState::Paused));
        assert_eq!(h.transport.current_step(Voice::Bass), Ok(0));
    }

    #[test]
    fn requests_drained_by_a_command_wait_for_poll() {
        let mut h = harness();
        h.kick.1.tempo_changed(90.0);
        h.kick.1.step_changed(5);

        h.transport.pause(Voice::Kick).unwrap();
        assert_eq!(h.transport.current_step(Voice::Kick), Ok(5));

        assert_eq!(h.transport.poll(), vec![TransportRequest::Tempo(90.0)]);
        assert!(h.transport.poll().is_empty());
    }

    #[test]
    fn load_steps_reaches_only_that_lane() {
        let mut h = harness();
        h.transport.load_steps(Voice::Kick, &[1.0, 0.0]).unwrap();

        assert_eq!(h.kick.0.lock().unwrap().steps, vec![1.0, 0.0]);
        assert!(h.bass.0.lock().unwrap().steps.is_empty());
    }

    #[test]
    fn missing_lane_is_reported() {
        let mut transport = TransportCoordinator::new(120.0);
        assert_eq!(transport.play(Voice::Kick), Err(RackError::LaneMissing(Voice::Kick)));
        assert!(!transport.is_running(Voice::Kick));
        assert!(!transport.all_running());
    }

    #[test]
    fn status_label_lists_each_lane() {
        let mut h = harness();
        h.transport.play(Voice::Bass).unwrap();
        assert_eq!(h.transport.status_label(), "bass: playing • kick: paused");
    }
}
