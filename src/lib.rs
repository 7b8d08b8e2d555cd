//! Audio-reactive particle engine for live visuals.
//!
//! A fixed-capacity particle pool driven by one of four force fields,
//! nudged every frame by seven audio band energies, and thinned to a
//! render budget on the way out.

pub mod audio;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod forces;
pub mod lod;
pub mod mapping;
pub mod particle;
pub mod pool;
pub mod presets;
pub mod report;
pub mod settings;
pub mod spatial;

pub use audio::{AudioFrame, Band, SyntheticAudio, BAND_COUNT};
pub use engine::{EngineStats, ParticleEngine};
pub use error::EngineError;
pub use forces::ForceMode;
pub use mapping::{ControlMapper, ParamId};
pub use particle::Particle;
pub use settings::{BoundaryBehavior, EngineSettings};
