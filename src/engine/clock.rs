//! Step clock - the software engine's sequencer
//!
//! Converts elapsed wall time into sixteenth-note steps and reports every
//! advance through its lane queue.

use crate::{cable::Cable, sequencing::transport::StepReporter};

/// Sixteenth notes: four steps per beat
pub const STEPS_PER_BEAT: f64 = 4.0;

pub struct StepClock {
    label: &'static str,
    output: Cable,
    gate: Cable,
    steps: Vec<f32>,
    bpm: f64,
    /// Seconds per step (computed from bpm)
    step_seconds: f64,
    /// Time accumulated since the last step boundary
    elapsed: f64,
    position: usize,
    playing: bool,
    reporter: StepReporter,
}

impl StepClock {
    pub fn new(
        label: &'static str,
        output: Cable,
        gate: Cable,
        num_steps: usize,
        mut steps: Vec<f32>,
        bpm: f64,
        reporter: StepReporter,
    ) -> Self {
        steps.resize(num_steps.max(1), 0.0);
        Self {
            label,
            output,
            gate,
            steps,
            bpm,
            step_seconds: Self::compute_step_seconds(bpm),
            elapsed: 0.0,
            position: 0,
            playing: false,
            reporter,
        }
    }

    fn compute_step_seconds(bpm: f64) -> f64 {
        // beats per second = bpm / 60, four steps per beat
        60.0 / bpm.max(f64::EPSILON) / STEPS_PER_BEAT
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn output(&self) -> Cable {
        self.output
    }

    pub fn gate(&self) -> Cable {
        self.gate
    }

    pub fn steps(&self) -> &[f32] {
        &self.steps
    }

    /// Keeps the clock's own length; extra values are dropped, missing ones are 0
    pub fn set_steps(&mut self, steps: &[f32]) {
        let len = self.steps.len();
        self.steps.clear();
        self.steps.extend(steps.iter().copied().take(len));
        self.steps.resize(len, 0.0);
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
        self.step_seconds = Self::compute_step_seconds(bpm);
    }

    pub fn step_seconds(&self) -> f64 {
        self.step_seconds
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Value currently emitted on the output cable
    pub fn value(&self) -> f32 {
        self.steps.get(self.position).copied().unwrap_or(0.0)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.reporter.playing_changed(true);
        }
    }

    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.reporter.playing_changed(false);
        }
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.elapsed = 0.0;
        self.reporter.step_changed(0);
    }

    /// Tempo dialled on the sequencer's own panel
    ///
    /// Panel edits are only reported; the clock changes once the rack sends
    /// back what it accepted.
    pub fn request_tempo(&mut self, bpm: f64) {
        self.reporter.tempo_changed(bpm);
    }

    /// Pattern drawn on the sequencer's own step editor
    pub fn request_steps(&mut self, steps: &[f32]) {
        self.reporter.steps_edited(steps);
    }

    /// Move the clock forward by `seconds`, reporting each step crossed
    pub fn advance(&mut self, seconds: f64) {
        if !self.playing {
            return;
        }
        self.elapsed += seconds;
        while self.elapsed >= self.step_seconds {
            self.elapsed -= self.step_seconds;
            self.position = (self.position + 1) % self.steps.len();
            self.reporter.step_changed(self.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cable::{CableKind, CableRegistry},
        sequencing::transport::lane_queue,
    };

    fn clock(bpm: f64) -> StepClock {
        let mut cables = CableRegistry::new();
        let (reporter, _feed) = lane_queue(8);
        StepClock::new(
            "test",
            cables.allocate(CableKind::Control),
            cables.allocate(CableKind::Control),
            4,
            vec![0.1, 0.2, 0.3, 0.4],
            bpm,
            reporter,
        )
    }

    #[test]
    fn step_length_follows_tempo() {
        let mut c = clock(120.0);
        assert!((c.step_seconds() - 0.125).abs() < 1e-12);
        c.set_bpm(60.0);
        assert!((c.step_seconds() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut c = clock(120.0);
        c.advance(10.0);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn advance_wraps_at_step_count() {
        let mut c = clock(120.0);
        c.play();
        c.advance(0.125 * 5.0 + 0.01);
        assert_eq!(c.position(), 1);
        assert_eq!(c.value(), 0.2);
    }

    #[test]
    fn set_steps_keeps_length() {
        let mut c = clock(120.0);
        c.set_steps(&[1.0, 1.0]);
        assert_eq!(c.steps(), &[1.0, 1.0, 0.0, 0.0]);
        c.set_steps(&[0.5; 9]);
        assert_eq!(c.steps().len(), 4);
    }
}
