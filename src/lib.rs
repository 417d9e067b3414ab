//! Rubik's Cube Library
//!
//! State and interaction logic for a 3x3x3 twisty puzzle: block
//! bookkeeping, pointer-driven layer turns with lift and snap animations,
//! and solved-state detection. Rendering is left to the caller, which reads
//! block poses and supplies a [`HitTest`] for pointer picking.

pub mod animator;
pub mod block;
pub mod config;
pub mod cube;
pub mod engine;
pub mod geometry;
pub mod grid;
pub mod picking;
pub mod signal;

pub use animator::AnimationHandle;
pub use block::{Block, BlockId};
pub use config::{ConfigError, CubeConfig};
pub use cube::{InputEvent, RubiksCube};
pub use engine::{RotationPhase, Session};
pub use geometry::{Axis, Coord, Orientation};
pub use grid::{Aabb, BlockPose, CubeGrid};
pub use picking::{viewport_point, Hit, HitTest, Ray, RayPicker, ViewCamera};
pub use signal::{InteractionEvent, SubscriptionId};
