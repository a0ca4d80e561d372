//! Control surface for a two-voice modular rack: an acid bass and a kick,
//! patched by cable into a mixer and an output monitor, sharing one transport.
//!
//! ```
//! use rebirth_rack::{config::RackConfig, engine::SoftEngine, rack::Rack, voices::Voice};
//!
//! let mut engine = SoftEngine::new();
//! let mut rack = Rack::new(RackConfig::new().bpm(128.0), &mut engine)?;
//!
//! rack.toggle_step(Voice::Kick, 2)?;
//! rack.toggle_playback();
//! assert!(rack.all_running());
//! # Ok::<(), rebirth_rack::error::RackError>(())
//! ```

pub mod cable; // Cable handles and the registry that mints them
pub mod config;
pub mod engine; // In-process node factory with step clocks
pub mod error;
pub mod graph; // Node capabilities and the factory seam
pub mod patch;
pub mod rack;
pub mod sequencing; // Step patterns and transport
pub mod voices;

pub use error::{RackError, Result};
pub use rack::Rack;
