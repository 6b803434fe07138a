//! Game settings
//!
//! Every gameplay constant can be overridden from a JSON file. Missing
//! fields keep their defaults, so a settings file only needs the values it
//! changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::input::KeyBindings;
use crate::terrain::{MIN_OCTAVE_FREQUENCY, Octave};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Terrain generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Grid divisions per axis
    pub size: u32,
    /// World scale (x, y, z) applied to the unit grid
    pub scale: [f32; 3],
    /// Noise layers, summed
    pub octaves: Vec<Octave>,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            size: TERRAIN_SIZE,
            scale: WORLD_SCALE,
            octaves: TERRAIN_OCTAVES
                .iter()
                .map(|&(frequency, amplitude)| Octave::new(frequency, amplitude))
                .collect(),
        }
    }
}

/// Checkpoint ring layout and animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSettings {
    pub count: usize,
    /// Ring radius as a fraction of the terrain half-extent (0 = centre, 1 = edge)
    pub radius_factor: f32,
    /// Unscaled terrain units above ground
    pub above_ground: f32,
    pub scale: f32,
    pub bob_amplitude: f32,
    pub bob_period_ms: f64,
    pub spin_period_ms: f64,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            count: CHECKPOINT_COUNT,
            radius_factor: CHECKPOINT_RADIUS_FACTOR,
            above_ground: CHECKPOINT_ABOVE_GROUND,
            scale: CHECKPOINT_SCALE,
            bob_amplitude: CHECKPOINT_BOB_AMPLITUDE,
            bob_period_ms: CHECKPOINT_BOB_PERIOD_MS,
            spin_period_ms: CHECKPOINT_SPIN_PERIOD_MS,
        }
    }
}

/// Ship flight model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightSettings {
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed lost per second when not accelerating
    pub friction: f32,
    /// Speed gained per second while accelerating
    pub acceleration: f32,
    pub pitch_rate: f32,
    pub roll_rate: f32,
    /// Weight of last tick's heading (0 = no drift)
    pub drift_factor: f32,
    pub ammo_cap: u32,
    pub ammo_cost: u32,
    pub ammo_regen: u32,
    pub hit_radius: f32,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            friction: FRICTION,
            acceleration: ACCELERATION,
            pitch_rate: PITCH_RATE,
            roll_rate: ROLL_RATE,
            drift_factor: DRIFT_FACTOR,
            ammo_cap: AMMO_CAP,
            ammo_cost: AMMO_COST_PER_TICK,
            ammo_regen: AMMO_REGEN_PER_TICK,
            hit_radius: HIT_RADIUS,
        }
    }
}

/// Match timing and spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub duration_secs: f32,
    pub death_timeout_secs: f32,
    /// Pre-game countdown length
    pub countdown_secs: f32,
    pub spawn_offset: f32,
    pub respawn_offset: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            duration_secs: GAME_DURATION_SECS,
            death_timeout_secs: DEATH_TIMEOUT_SECS,
            countdown_secs: DEATH_TIMEOUT_SECS,
            spawn_offset: SPAWN_OFFSET,
            respawn_offset: RESPAWN_OFFSET,
        }
    }
}

/// All game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub terrain: TerrainSettings,
    pub checkpoints: CheckpointSettings,
    pub flight: FlightSettings,
    #[serde(rename = "match")]
    pub match_rules: MatchSettings,
    /// Key bindings for the first and second player
    pub controls: [KeyBindings; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            terrain: TerrainSettings::default(),
            checkpoints: CheckpointSettings::default(),
            flight: FlightSettings::default(),
            match_rules: MatchSettings::default(),
            controls: [KeyBindings::left_hand(), KeyBindings::right_hand()],
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.terrain.size == 0 {
            return invalid("terrain.size must be at least 1".into());
        }
        if let Some(octave) = self
            .terrain
            .octaves
            .iter()
            .find(|o| o.frequency < MIN_OCTAVE_FREQUENCY)
        {
            return invalid(format!(
                "terrain octave frequency {} is below {}",
                octave.frequency, MIN_OCTAVE_FREQUENCY
            ));
        }
        if self.terrain.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return invalid("terrain.scale components must be positive".into());
        }
        if self.checkpoints.count == 0 {
            return invalid("checkpoints.count must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.checkpoints.radius_factor) {
            return invalid("checkpoints.radius_factor must be within [0, 1]".into());
        }
        if self.checkpoints.bob_period_ms <= 0.0 || self.checkpoints.spin_period_ms <= 0.0 {
            return invalid("checkpoint animation periods must be positive".into());
        }
        let flight = &self.flight;
        if !flight.min_speed.is_finite() || !flight.max_speed.is_finite() {
            return invalid("flight speed bounds must be finite".into());
        }
        if flight.min_speed < 0.0 || flight.min_speed > flight.max_speed {
            return invalid(format!(
                "flight speed bounds [{}, {}] are not ordered",
                flight.min_speed, flight.max_speed
            ));
        }
        if !(0.0..1.0).contains(&flight.drift_factor) {
            return invalid("flight.drift_factor must be within [0, 1)".into());
        }
        if flight.hit_radius < 0.0 {
            return invalid("flight.hit_radius must not be negative".into());
        }
        let rules = &self.match_rules;
        if rules.duration_secs <= 0.0 || rules.death_timeout_secs < 0.0 || rules.countdown_secs < 0.0 {
            return invalid("match durations must be positive".into());
        }
        Ok(())
    }
}
