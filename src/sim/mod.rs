//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in from the caller (`dt` and an absolute clock)
//! - Seeded RNG only
//! - Stable iteration order (player 1 before player 2, checkpoints by index)
//! - No rendering or platform dependencies

pub mod body;
pub mod camera;
pub mod checkpoint;
pub mod collision;
pub mod state;
pub mod tick;
pub mod world;

pub use body::{FlightTuning, KinematicBody, ShotOutcome};
pub use camera::{ChaseCamera, IntroCamera, Viewport, projection, viewports};
pub use checkpoint::Checkpoint;
pub use collision::{collides_with_terrain, count_claims, hit_scan, resolve_claims};
pub use state::{GameEvent, GamePhase, GameState, Player, Scoreboard, SetupError};
pub use tick::{TickInput, tick};
pub use world::World;
