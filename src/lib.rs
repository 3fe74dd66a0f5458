//! kinebonk: raycast-driven kinematic 2D platformer controller.
//!
//! The host rebuilds a [`PhysicsWorld`] (or anything implementing [`CollisionQuery`])
//! every frame, samples an [`InputSnapshot`] and calls [`PhysicsStepper::tick`].

pub mod types;
pub mod api;
pub mod world;
pub mod narrowphase;
pub mod probe;
pub mod ground;
pub mod body;
pub mod movement;
pub mod state;
pub mod stepper;
pub mod input;
pub mod config;
pub mod error;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::world::PhysicsWorld;
pub use crate::probe::RayProbe;
pub use crate::ground::GroundDetector;
pub use crate::body::{Facing, KinematicBody};
pub use crate::state::{MovementState, StateKind, StateMachine};
pub use crate::stepper::{PhysicsStepper, TickOutput};
pub use crate::input::{InputSampler, InputSnapshot};
pub use crate::config::{Bounds, CollisionLayers, ControllerConfig, Tunables};
pub use crate::error::ConfigError;
