//! Per-frame simulation tick
//!
//! Advances the match by one frame. The phase decides what runs; during
//! play the order is fixed: checkpoints animate, terrain crashes, claims,
//! scores, ship flight, death timers, cameras, then the match clock.

use glam::Vec3;

use super::body::ShotOutcome;
use super::collision::{collides_with_terrain, resolve_claims};
use super::state::{GameEvent, GamePhase, GameState, Player};
use crate::assets::ModelSlot;
use crate::input::ControlIntent;
use crate::math::is_finite_vec3;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Per-player intents, indexed by [`Player::index`]
    pub players: [ControlIntent; 2],
    /// Start request from the intro screen (any key)
    pub start: bool,
}

/// Advance the game by `dt` seconds.
///
/// `clock_ms` is the absolute clock driving checkpoint and intro camera
/// animation. Negative or non-finite `dt` is treated as zero.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, clock_ms: f64) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    match state.phase {
        GamePhase::Intro => {
            update_intro_camera(state, clock_ms);
            if input.start {
                begin_countdown(state);
            }
        }
        GamePhase::Countdown => tick_countdown(state, dt, clock_ms),
        GamePhase::Playing => tick_playing(state, input, dt, clock_ms),
        GamePhase::GameOver => update_intro_camera(state, clock_ms),
    }
}

fn update_intro_camera(state: &mut GameState, clock_ms: f64) {
    let centre = state.world.height_at_coordinates(0.5, 0.5);
    state.intro_camera.update(clock_ms, centre, &mut state.graph);
}

fn begin_countdown(state: &mut GameState) {
    state.phase = GamePhase::Countdown;
    state.countdown_remaining = state.settings.match_rules.countdown_secs;
    for (ship, camera) in state.ships.iter().zip(state.cameras.iter_mut()) {
        ship.sync_transform(&mut state.graph);
        camera.grayscale = true;
        camera.update(ship, &mut state.graph);
    }
    state.refresh_scores();
    state.events.push(GameEvent::CountdownStarted);
    log::info!("Countdown started ({:.0}s)", state.countdown_remaining);
}

fn tick_countdown(state: &mut GameState, dt: f32, clock_ms: f64) {
    for checkpoint in &mut state.checkpoints {
        checkpoint.update(clock_ms, &mut state.graph);
    }
    for (ship, camera) in state.ships.iter().zip(state.cameras.iter_mut()) {
        camera.update(ship, &mut state.graph);
    }
    state.countdown_remaining -= dt;
    if state.countdown_remaining <= 0.0 {
        state.countdown_remaining = 0.0;
        start_match(state);
    }
}

fn start_match(state: &mut GameState) {
    state.phase = GamePhase::Playing;
    state.game_started = true;
    state.elapsed = 0.0;
    for (ship, camera) in state.ships.iter().zip(state.cameras.iter_mut()) {
        camera.grayscale = ship.dead;
    }
    state.refresh_scores();
    state.events.push(GameEvent::MatchStarted);
    log::info!("Match started");
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32, clock_ms: f64) {
    // Nothing moves until every required model has arrived
    let (Some(checkpoint_model), Some(first_model), Some(second_model), Some(_)) = (
        state.models.get(ModelSlot::Checkpoint).copied(),
        state.models.get(ModelSlot::Ship(Player::First)).copied(),
        state.models.get(ModelSlot::Ship(Player::Second)).copied(),
        state.models.get(ModelSlot::Skybox).copied(),
    ) else {
        return;
    };

    for checkpoint in &mut state.checkpoints {
        checkpoint.update(clock_ms, &mut state.graph);
    }

    let rules = &state.settings.match_rules;
    let radius_factor = state.settings.checkpoints.radius_factor;
    for player in Player::ALL {
        let ship = &mut state.ships[player.index()];
        let ground = state
            .world
            .height_at_world_coordinates(ship.translation.x, ship.translation.z);
        // A corrupted position is handled like a crash
        if !is_finite_vec3(ship.translation) || collides_with_terrain(ground, ship.translation.y) {
            let position =
                state
                    .world
                    .random_position_above(&mut state.rng, rules.respawn_offset, radius_factor);
            log::debug!(
                "{player:?} crashed at {:?}, respawning at {position:?}",
                ship.translation
            );
            ship.respawn(position, rules.death_timeout_secs, &mut state.graph);
            state.cameras[player.index()].grayscale = true;
            state.events.push(GameEvent::Crashed(player));
        }
    }

    let ship_boxes = [
        state.ships[0].bounding_box(Some(&first_model.bounds)),
        state.ships[1].bounding_box(Some(&second_model.bounds)),
    ];
    for (index, player) in resolve_claims(&mut state.checkpoints, &checkpoint_model.bounds, ship_boxes) {
        log::debug!("Checkpoint {index} claimed by {player:?}");
        state.events.push(GameEvent::CheckpointClaimed { index, player });
    }
    state.refresh_scores();

    for player in Player::ALL {
        let (i, o) = (player.index(), player.opponent().index());
        let controllable = state.game_started && !state.ships[i].dead;
        let controls = controllable.then_some(&input.players[i]);
        let opponent = state.ships[o].translation;
        let outcome = state.ships[i].update(dt, controls, opponent, &mut state.graph);
        if outcome == ShotOutcome::Hit {
            log::debug!("{player:?} hit {:?}", player.opponent());
            let target = &mut state.ships[o];
            target.translation = Vec3::ZERO;
            target.sync_transform(&mut state.graph);
            state.events.push(GameEvent::Hit { shooter: player });
        }
    }

    for player in Player::ALL {
        let i = player.index();
        if state.ships[i].tick_death_timer(dt) {
            state.cameras[i].grayscale = false;
            state.events.push(GameEvent::Revived(player));
        }
    }

    for (ship, camera) in state.ships.iter().zip(state.cameras.iter_mut()) {
        camera.update(ship, &mut state.graph);
    }

    state.elapsed += dt;
    state.refresh_scores();
    let total = state.checkpoints.len();
    let out_of_time = state.elapsed >= state.settings.match_rules.duration_secs;
    let swept = state.scores.first_player_score >= total || state.scores.second_player_score >= total;
    if out_of_time || swept {
        end_match(state);
    }
}

fn end_match(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.game_started = false;
    let winner = state.scores.leader();
    state.events.push(GameEvent::GameOver { winner });
    log::info!(
        "Game over: {} - {} ({})",
        state.scores.first_player_score,
        state.scores.second_player_score,
        match winner {
            Some(player) => format!("{player:?} wins"),
            None => "draw".to_owned(),
        }
    );
}
