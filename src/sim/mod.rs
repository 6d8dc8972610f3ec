//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod ambient;
pub mod boat;
pub mod entity;
pub mod picking;
pub mod registry;
pub mod scene;
pub mod state;
pub mod tick;
pub mod wave;

pub use ambient::Weather;
pub use boat::Helm;
pub use entity::{
    Aabb, BoatRole, BoatState, Category, Entity, EntityId, EntityKind, Part, PartId, Swing,
    Transform,
};
pub use picking::{PickHit, Ray, pick};
pub use registry::EntityRegistry;
pub use scene::{SceneConfig, build_world};
pub use state::{GameEvent, GamePhase, GameState, Objective};
pub use tick::{TickInput, tick};
