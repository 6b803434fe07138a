//! Match state and core simulation types
//!
//! Everything the tick mutates lives in [`GameState`]. All randomness is
//! drawn from a seeded `Pcg32`, so two states built from the same seed and
//! fed the same inputs stay identical.

use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::body::{FlightTuning, KinematicBody};
use super::camera::{ChaseCamera, IntroCamera};
use super::checkpoint::Checkpoint;
use super::collision::count_claims;
use super::world::World;
use crate::assets::{LoadedModel, LoadedModels, MeshData, ModelSlot};
use crate::consts::*;
use crate::input::{BoundInput, ControlIntent, KeyboardState};
use crate::scene::{ModelHandle, NodeId, SceneError, SceneGraph, TextureHandle};
use crate::settings::{ConfigError, Settings};
use crate::terrain::TerrainError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terrain generation failed: {0}")]
    Terrain(#[from] TerrainError),
    #[error("scene setup failed: {0}")]
    Scene(#[from] SceneError),
}

/// One of the two pilots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// Left half of the screen
    First,
    /// Right half of the screen
    Second,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::First, Player::Second];

    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Orbiting camera, waiting for a player to start
    Intro,
    /// Ships placed, cameras live, controls locked
    Countdown,
    /// Racing
    Playing,
    /// Match over, gameplay frozen
    GameOver,
}

/// Things that happened during a tick, for UI and audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CountdownStarted,
    MatchStarted,
    Crashed(Player),
    Revived(Player),
    CheckpointClaimed { index: usize, player: Player },
    Hit { shooter: Player },
    /// Fired once; `None` is a draw
    GameOver { winner: Option<Player> },
}

/// Values the HUD shows every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub first_player_score: usize,
    pub second_player_score: usize,
    /// Seconds left in the match
    pub time_remaining: f32,
}

impl Scoreboard {
    pub fn score(&self, player: Player) -> usize {
        match player {
            Player::First => self.first_player_score,
            Player::Second => self.second_player_score,
        }
    }

    /// Higher score wins; equal scores are a draw
    pub fn leader(&self) -> Option<Player> {
        match self.first_player_score.cmp(&self.second_player_score) {
            std::cmp::Ordering::Greater => Some(Player::First),
            std::cmp::Ordering::Less => Some(Player::Second),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Match seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub graph: SceneGraph,
    pub world: World,
    pub ships: [KinematicBody; 2],
    pub cameras: [ChaseCamera; 2],
    pub intro_camera: IntroCamera,
    /// Parent of every checkpoint node, drawn in its own pass
    pub checkpoint_group: NodeId,
    pub checkpoints: Vec<Checkpoint>,
    /// Drawn in its own pass, not under the root
    pub skybox: NodeId,
    pub phase: GamePhase,
    /// Seconds left before the match starts
    pub countdown_remaining: f32,
    pub game_started: bool,
    /// Seconds of match time played
    pub elapsed: f32,
    pub scores: Scoreboard,
    pub models: LoadedModels,
    /// Events raised since the caller last drained them
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a match: terrain, ships, cameras, lasers and the checkpoint ring
    pub fn new(seed: u64, settings: Settings) -> Result<Self, SetupError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let camera_nodes = [graph.create_node("camera 1"), graph.create_node("camera 2")];
        for node in camera_nodes {
            graph.add_child(root, node)?;
        }
        let intro_node = graph.create_node("intro camera");
        graph.add_child(root, intro_node)?;

        let world = World::new(&settings.terrain, &mut rng, &mut graph)?;

        let tuning = FlightTuning::from(&settings.flight);
        let radius_factor = settings.checkpoints.radius_factor;
        let mut spawn_ship = |player: Player, graph: &mut SceneGraph| -> Result<KinematicBody, SetupError> {
            let node = graph.create_node(format!("ship {}", player.index() + 1));
            graph.add_child(root, node)?;
            let laser = graph.create_node(format!("laser {}", player.index() + 1));
            if let Some(laser_node) = graph.get_mut(laser) {
                laser_node.transform = Self::laser_transform();
            }
            let position = world.random_position_above(
                &mut rng,
                settings.match_rules.spawn_offset,
                radius_factor,
            );
            let ship = KinematicBody::new(node, laser, position, tuning);
            ship.sync_transform(graph);
            Ok(ship)
        };
        let ships = [
            spawn_ship(Player::First, &mut graph)?,
            spawn_ship(Player::Second, &mut graph)?,
        ];

        let checkpoint_group = graph.create_node("checkpoints");
        let count = settings.checkpoints.count;
        let mut checkpoints = Vec::with_capacity(count);
        for index in 0..count {
            let anchor = world.checkpoint_anchor(
                index,
                count,
                radius_factor,
                settings.checkpoints.above_ground,
            );
            let node = graph.create_node(format!("checkpoint {}", index + 1));
            graph.add_child(checkpoint_group, node)?;
            checkpoints.push(Checkpoint::new(node, anchor, &settings.checkpoints, &mut rng));
        }

        let skybox = graph.create_node("skybox");
        if let Some(skybox_node) = graph.get_mut(skybox) {
            skybox_node.scale = Vec3::from_array(SKYBOX_SCALE);
            skybox_node.recalculate_transform();
        }

        let scores = Scoreboard {
            time_remaining: settings.match_rules.duration_secs,
            ..Default::default()
        };

        log::info!(
            "New match (seed {seed}): {} checkpoints, {:.0}s",
            count,
            settings.match_rules.duration_secs
        );

        Ok(Self {
            countdown_remaining: settings.match_rules.countdown_secs,
            settings,
            seed,
            rng,
            graph,
            world,
            ships,
            cameras: camera_nodes.map(ChaseCamera::new),
            intro_camera: IntroCamera::new(intro_node),
            checkpoint_group,
            checkpoints,
            skybox,
            phase: GamePhase::Intro,
            game_started: false,
            elapsed: 0.0,
            scores,
            models: LoadedModels::default(),
            events: Vec::new(),
        })
    }

    /// Beam pose relative to its ship: scaled long, dropped below the hull,
    /// pointing out of the nose
    fn laser_transform() -> Mat4 {
        Mat4::from_scale(Vec3::from_array(LASER_SCALE))
            * Mat4::from_translation(Vec3::from_array(LASER_OFFSET))
            * Mat4::from_rotation_y(std::f32::consts::PI)
    }

    /// Nodes that display the model in `slot`
    pub fn nodes_for(&self, slot: ModelSlot) -> Vec<NodeId> {
        match slot {
            ModelSlot::Ship(player) => vec![self.ships[player.index()].node],
            ModelSlot::Checkpoint => self.checkpoints.iter().map(|cp| cp.node).collect(),
            ModelSlot::Skybox => vec![self.skybox],
            ModelSlot::Laser => self.ships.iter().map(|s| s.laser()).collect(),
        }
    }

    /// Completion callback for an asset load
    pub fn on_model_loaded(&mut self, slot: ModelSlot, handle: ModelHandle, mesh: &MeshData) {
        self.models.set(slot, LoadedModel::new(handle, mesh));
        for node in self.nodes_for(slot) {
            if let Some(n) = self.graph.get_mut(node) {
                n.model = Some(handle);
            }
        }
        log::debug!("Model for {slot:?} loaded ({} vertices)", mesh.positions.len());
        if self.models.required_loaded() {
            log::info!("All required models loaded");
        }
    }

    /// Completion callback for a texture load
    pub fn on_texture_loaded(&mut self, slot: ModelSlot, texture: TextureHandle) {
        for node in self.nodes_for(slot) {
            if let Some(n) = self.graph.get_mut(node) {
                n.texture = Some(texture);
            }
        }
    }

    /// Read both players' intents from the shared keyboard through their
    /// configured bindings
    pub fn sample_controls(&self, keyboard: &KeyboardState) -> [ControlIntent; 2] {
        self.settings.controls.each_ref().map(|bindings| {
            ControlIntent::sample(&BoundInput { keyboard, bindings })
        })
    }

    pub fn ship(&self, player: Player) -> &KinematicBody {
        &self.ships[player.index()]
    }

    /// Recount claimed checkpoints and refresh the clock
    pub fn refresh_scores(&mut self) {
        self.scores.first_player_score = count_claims(&self.checkpoints, Player::First);
        self.scores.second_player_score = count_claims(&self.checkpoints, Player::Second);
        self.scores.time_remaining =
            (self.settings.match_rules.duration_secs - self.elapsed).max(0.0);
    }

    /// Take all events raised so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
