//! Vizij Motion Core (engine-agnostic)
//!
//! Real-time transforms over pre-authored skeletal clips. Every operation works
//! on flat time/value sample buffers and keeps the sample count and channel
//! topology intact:
//! - energy (duration) scaling and per-part delay shifting,
//! - per-axis curve filters applied in Euler space,
//! - per-axis rotation scaling,
//! - valley-delay retiming across all rotation channels.
//!
//! Originals are captured once per load in an [`OriginalStore`]; every update
//! starts from them, so any combination of parameters can be undone by setting
//! it back to identity.

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod curves;
pub mod data;
pub mod engine;
pub mod error;
pub mod euler;
pub mod ids;
pub mod overrides;
pub mod samples;
pub mod snapshot;
pub mod space;
pub mod stored_clip;

// Re-exports for consumers (adapters)
pub use analyzer::{ChannelFilter, KeyframeAnalyzer, MovementStats, SampleValue, TimeGroup};
pub use classify::{BodyPart, ChannelProfile, EnergyPart, LimbPart};
pub use config::{CurveConfig, EngineConfig, SpaceConfig};
pub use curves::{CurveOptions, CurveRegistry};
pub use data::{AnimationClip, Channel, ChannelKind};
pub use engine::{freeze_channel, MotionEngine, UpdateReport};
pub use error::TransformError;
pub use euler::{from_euler, to_euler, Euler};
pub use ids::ClipId;
pub use overrides::{apply_overrides, UpdateContext, UpdateFlags};
pub use snapshot::{ChannelSnapshot, ClipSnapshot, OriginalStore};
pub use space::{apply_space, ValleyInterval};
pub use stored_clip::{clip_to_json, parse_clip_json};
