//! Capability interfaces for the nodes a patch is built from.
//!
//! The rack never renders audio itself. It describes each node it needs as a
//! spec (which cables go in, which come out, starting parameters) and asks a
//! [`NodeFactory`] to turn that spec into a live node handle. Handles are then
//! used to push parameter changes and transport commands.

/// Node specs, capability traits and the factory seam.
pub mod node;

pub use node::{
    Adsr, Amplifier, AmplifierSpec, EnvelopeGenerator, EnvelopeSpec, Filter, FilterSpec,
    FilterType, Mixer, MixerSpec, Monitor, MonitorSpec, NodeFactory, Oscillator,
    OscillatorSpec, Sequencer, SequencerSpec, Waveform,
};
