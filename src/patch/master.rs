use crate::{
    cable::{Cable, CableKind, CableRegistry},
    graph::{Mixer, MixerSpec, Monitor, MonitorSpec, NodeFactory},
};

use super::{Param, ParamRange};

/// Monitor gain: silent to +50%
pub const MASTER_GAIN_RANGE: ParamRange = ParamRange::new(0.0, 1.5, 0.01);

/// Per-input mixer weight
pub const MIX_LEVEL_RANGE: ParamRange = ParamRange::new(0.0, 1.0, 0.01);

/// Voice outputs summed onto the master bus, then into the output monitor
///
/// ```text
///   bass.output ──(0.8)──┐
///                        ├──→ [mixer] ── master ──→ [monitor]  gain / mute
///   kick.output ──(0.9)──┘
/// ```
pub struct MasterPatch {
    inputs: Vec<Cable>,
    levels: Vec<f32>,
    master: Cable,
    gain: Param,
    _mixer: Box<dyn Mixer>,
    monitor: Box<dyn Monitor>,
}

impl MasterPatch {
    /// Wire `(cable, level)` inputs into a mixer and the mix into a monitor
    pub fn assemble(
        cables: &mut CableRegistry,
        engine: &mut dyn NodeFactory,
        inputs: &[(Cable, f32)],
        gain: f32,
    ) -> Self {
        let master = cables.allocate_named(CableKind::Audio, "master");
        let levels: Vec<f32> = inputs.iter().map(|&(_, l)| MIX_LEVEL_RANGE.clamp(l)).collect();
        let inputs: Vec<Cable> = inputs.iter().map(|&(c, _)| c).collect();
        let gain = Param::new(gain, MASTER_GAIN_RANGE);

        let mixer = engine.mixer(MixerSpec {
            inputs: inputs.clone(),
            levels: levels.clone(),
            output: master,
        });
        let monitor = engine.monitor(MonitorSpec {
            input: master,
            gain: gain.value(),
            muted: false,
        });
        log::debug!("master bus {master} mixing {} inputs", inputs.len());

        Self {
            inputs,
            levels,
            master,
            gain,
            _mixer: mixer,
            monitor,
        }
    }

    /// Summed output cable feeding the monitor
    pub fn master(&self) -> Cable {
        self.master
    }

    pub fn inputs(&self) -> &[Cable] {
        &self.inputs
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    pub fn gain(&self) -> Param {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f32) -> f32 {
        let stored = self.gain.set(gain);
        self.monitor.set_gain(stored);
        stored
    }

    /// Move the gain by UI increments; the knob is locked while muted
    pub fn nudge_gain(&mut self, steps: i32) -> f32 {
        if self.is_muted() {
            return self.gain.value();
        }
        let stored = self.gain.nudge(steps);
        self.monitor.set_gain(stored);
        stored
    }

    /// Gain readout as a rounded percentage, e.g. `"85%"`
    pub fn gain_label(&self) -> String {
        format!("{:.0}%", self.gain.value() * 100.0)
    }

    pub fn is_muted(&self) -> bool {
        self.monitor.is_muted()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.monitor.set_muted(muted);
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.monitor.is_muted();
        self.monitor.set_muted(muted);
        muted
    }

    /// Whether signal is reaching the output
    pub fn is_active(&self) -> bool {
        self.monitor.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SoftEngine;

    fn master(engine: &mut SoftEngine) -> MasterPatch {
        let mut cables = CableRegistry::new();
        let bass = cables.allocate(CableKind::Audio);
        let kick = cables.allocate(CableKind::Audio);
        MasterPatch::assemble(&mut cables, engine, &[(bass, 0.8), (kick, 1.7)], 1.0)
    }

    #[test]
    fn levels_are_clamped_at_wiring() {
        let mut engine = SoftEngine::new();
        let m = master(&mut engine);
        assert_eq!(m.levels(), &[0.8, 1.0]);
        assert_eq!(engine.mixers()[0].levels, vec![0.8, 1.0]);
    }

    #[test]
    fn gain_knob_is_locked_while_muted() {
        let mut engine = SoftEngine::new();
        let mut m = master(&mut engine);

        let lowered = m.nudge_gain(-10);
        assert!((lowered - 0.9).abs() < 1e-6);

        assert!(m.toggle_mute());
        assert_eq!(m.nudge_gain(-10), lowered);
        assert_eq!(engine.monitors()[0].gain, lowered);

        assert!(!m.toggle_mute());
        assert!((m.nudge_gain(-10) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn gain_reads_as_a_percentage() {
        let mut engine = SoftEngine::new();
        let mut m = master(&mut engine);
        assert_eq!(m.gain_label(), "100%");
        m.set_gain(0.854);
        assert_eq!(m.gain_label(), "85%");
        m.set_gain(9.0);
        assert_eq!(m.gain_label(), "150%");
    }
}
