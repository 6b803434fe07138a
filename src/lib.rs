//! Skyrace - two-player split-screen checkpoint racing over procedural terrain
//!
//! Core modules:
//! - `terrain`: Layered gradient noise, height queries and the terrain mesh
//! - `scene`: Arena-backed scene graph with transform propagation
//! - `sim`: Deterministic simulation (flight, checkpoints, collisions, match flow)
//! - `input`: Action bindings and per-player control sampling
//! - `assets`: Boundary types for externally loaded models
//! - `settings`: Data-driven game configuration

pub mod assets;
pub mod hud;
pub mod input;
pub mod math;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod terrain;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Terrain divisions along each axis (2 * TERRAIN_SIZE^2 triangles)
    pub const TERRAIN_SIZE: u32 = 50;
    /// World scale applied to the unit terrain grid (x, y, z)
    pub const WORLD_SCALE: [f32; 3] = [128.0, 20.0, 128.0];
    /// Default noise layers as (frequency, amplitude)
    pub const TERRAIN_OCTAVES: [(u32, f32); 2] = [(8, 30.0), (16, 15.0)];

    /// Checkpoints placed on the ring
    pub const CHECKPOINT_COUNT: usize = 8;
    /// Ring radius as a fraction of the terrain half-extent
    pub const CHECKPOINT_RADIUS_FACTOR: f32 = 0.8;
    /// Height above ground in unscaled terrain units
    pub const CHECKPOINT_ABOVE_GROUND: f32 = 10.0;
    pub const CHECKPOINT_SCALE: f32 = 20.0;
    /// Bob amplitude in world units
    pub const CHECKPOINT_BOB_AMPLITUDE: f32 = 15.0;
    /// Milliseconds per radian of bob phase
    pub const CHECKPOINT_BOB_PERIOD_MS: f64 = 1000.0;
    /// Milliseconds per radian of spin
    pub const CHECKPOINT_SPIN_PERIOD_MS: f64 = 2000.0;

    /// Match length in seconds
    pub const GAME_DURATION_SECS: f32 = 2.0 * 60.0;
    /// Seconds a crashed ship stays uncontrollable (also the pre-game countdown)
    pub const DEATH_TIMEOUT_SECS: f32 = 3.0;
    /// Height above terrain for the initial spawn
    pub const SPAWN_OFFSET: f32 = 500.0;
    /// Height above terrain after a crash
    pub const RESPAWN_OFFSET: f32 = 300.0;

    /// Flight model defaults
    pub const MIN_SPEED: f32 = 50.0;
    pub const MAX_SPEED: f32 = 700.0;
    pub const FRICTION: f32 = 50.0;
    pub const ACCELERATION: f32 = 100.0;
    /// Pitch rate (radians/s)
    pub const PITCH_RATE: f32 = 1.2;
    /// Roll rate (radians/s)
    pub const ROLL_RATE: f32 = 2.0;
    /// Weight of last tick's heading when smoothing travel direction
    pub const DRIFT_FACTOR: f32 = 0.75;

    /// Laser ammo
    pub const AMMO_CAP: u32 = 120;
    pub const AMMO_COST_PER_TICK: u32 = 4;
    pub const AMMO_REGEN_PER_TICK: u32 = 1;
    /// Half-width of the hit cone at unit distance scaling (atan(radius / distance))
    pub const HIT_RADIUS: f32 = 5.0;
    /// Laser beam node: scale, offset below the ship origin
    pub const LASER_SCALE: [f32; 3] = [0.75, 0.75, 10000.0];
    pub const LASER_OFFSET: [f32; 3] = [0.0, 0.9, 0.0];

    /// Chase camera
    pub const CAMERA_ROTATION_LERP: f32 = 0.9;
    pub const CAMERA_UP_OFFSET: f32 = 2.0;
    pub const CAMERA_MIN_DISTANCE: f32 = 25.0;
    pub const CAMERA_MAX_DISTANCE: f32 = 40.0;
    /// Intro camera orbit
    pub const INTRO_CAMERA_HEIGHT: f32 = 500.0;
    pub const INTRO_CAMERA_PITCH: f32 = -0.3;
    pub const INTRO_CAMERA_YAW_PERIOD_MS: f64 = 10000.0;
    /// Perspective projection
    pub const CAMERA_FOV_Y: f32 = std::f32::consts::FRAC_PI_3;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 40000.0;

    /// Skybox node scale (y flipped so the inside faces the camera)
    pub const SKYBOX_SCALE: [f32; 3] = [4000.0, -4000.0, 4000.0];

    /// Simulation tick rate for the headless runner
    pub const SIM_HZ: u32 = 60;
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Map a value in [from_min, from_max] linearly onto [to_min, to_max].
///
/// Degenerate source ranges map everything onto `to_max`.
#[inline]
pub fn remap(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let span = from_max - from_min;
    if span.abs() <= f32::EPSILON {
        return to_max;
    }
    to_min + (value - from_min) / span * (to_max - to_min)
}
