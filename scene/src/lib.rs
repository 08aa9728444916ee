//! Scene synthesis for the object-counting dataset: configuration, shape
//! geometry, collision-aware placement, canonical signatures for deduplication
//! and task allocation across categories.

pub mod allocator;
pub mod config;
pub mod error;
pub mod placement;
pub mod shape;
pub mod signature;
pub mod synth;

pub use allocator::{AcceptedScene, Allocation, MAX_UNIQUE_ATTEMPTS, find_unique};
pub use config::GenerationConfig;
pub use error::{ConfigError, SceneError, SceneResult};
pub use shape::{Outline, Position, Rgb, ShapeKind};
pub use signature::{Signature, SignatureSet, sign};
pub use synth::{CategoryLabel, SceneDescription, SceneObject, SceneSynthesizer, TaskType};
