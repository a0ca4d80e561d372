//! Step patterns and the shared transport.

pub mod steps;
pub mod transport;

pub use steps::{StepMode, StepPattern, BASS_CONTOUR, GATE_THRESHOLD};
pub use transport::{
    lane_queue, CompositeAction, PlayState, SequencerEvent, StepFeed, StepReporter,
    TransportCoordinator, TransportRequest,
};
