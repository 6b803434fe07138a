//! Skyrace headless runner
//!
//! Plays one match with both ships on autopilot, using placeholder cube
//! models in place of the asset loader, and logs what happens.
//!
//! Usage: `skyrace [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser build drives the library from its own event loop
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use skyrace::assets::{MeshData, ModelSlot};
    use skyrace::consts::SIM_DT;
    use skyrace::hud::{HudSnapshot, result_banner};
    use skyrace::input::{Action, ControlIntent, InputSource, KeyboardState};
    use skyrace::scene::ModelHandle;
    use skyrace::sim::{GameEvent, GamePhase, GameState, Player, SetupError, TickInput, tick};
    use skyrace::Settings;

    /// Upper bound on simulated frames, in case a match never ends
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// Autopilot cruise band above the terrain
    const CRUISE_MIN: f32 = 250.0;
    const CRUISE_MAX: f32 = 700.0;

    pub fn run() -> Result<(), SetupError> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::load(&path)?,
            None => Settings::default(),
        };
        let seed = match args.next().map(|s| s.parse::<u64>()) {
            Some(Ok(seed)) => seed,
            Some(Err(e)) => {
                log::warn!("Ignoring invalid seed: {e}");
                clock_seed()
            }
            None => clock_seed(),
        };
        log::info!("Skyrace (native) starting with seed {seed}");

        let mut state = GameState::new(seed, settings)?;
        let cube = MeshData::cube(1.0);
        for (i, slot) in ModelSlot::ALL.into_iter().enumerate() {
            state.on_model_loaded(slot, ModelHandle(i as u32), &cube);
        }

        let mut input = TickInput {
            start: true,
            ..Default::default()
        };
        let mut keyboard = KeyboardState::new();
        let mut clock_ms = 0.0f64;
        for frame in 0..MAX_FRAMES {
            tick(&mut state, &input, SIM_DT, clock_ms);
            clock_ms += SIM_DT as f64 * 1000.0;
            input.start = false;
            for player in Player::ALL {
                let intent = autopilot(&state, player);
                press_keys(&mut keyboard, &state, player, &intent);
            }
            input.players = state.sample_controls(&keyboard);

            for event in state.drain_events() {
                report(&event);
                if let GameEvent::GameOver { winner } = event {
                    println!("Winner: {}", result_banner(winner));
                }
            }
            if frame % 600 == 0 {
                let hud = HudSnapshot::from_state(&state);
                log::info!(
                    "{} {:?} {} - {}",
                    hud.clock,
                    hud.phase,
                    hud.first_player_score,
                    hud.second_player_score
                );
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        let hud = HudSnapshot::from_state(&state);
        match serde_json::to_string_pretty(&hud) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("Could not serialize final scores: {e}"),
        }
        Ok(())
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn report(event: &GameEvent) {
        match event {
            GameEvent::Crashed(player) => log::info!("{player:?} crashed"),
            GameEvent::CheckpointClaimed { index, player } => {
                log::info!("{player:?} took checkpoint {}", index + 1)
            }
            GameEvent::Hit { shooter } => log::info!("{shooter:?} scored a hit"),
            other => log::debug!("{other:?}"),
        }
    }

    /// Hold or release each of the player's bound keys to match `intent`
    fn press_keys(keyboard: &mut KeyboardState, state: &GameState, player: Player, intent: &ControlIntent) {
        let bindings = &state.settings.controls[player.index()];
        for action in Action::ALL {
            let key = bindings.key_for(action);
            if intent.is_action_active(action) {
                keyboard.key_down(key);
            } else {
                keyboard.key_up(key);
            }
        }
    }

    /// Hold a cruise altitude, keep the throttle open, fire when the
    /// opponent is roughly ahead
    fn autopilot(state: &GameState, player: Player) -> ControlIntent {
        let ship = state.ship(player);
        let opponent = state.ship(player.opponent());
        let nose = ship.nose();
        let ground = state
            .world
            .height_at_world_coordinates(ship.translation.x, ship.translation.z);
        let altitude = if ground.is_finite() {
            ship.translation.y - ground
        } else {
            CRUISE_MAX
        };

        let climb = altitude < CRUISE_MIN && nose.y < 0.3;
        let dive = altitude > CRUISE_MAX && nose.y > -0.3;
        let to_opponent = (opponent.translation - ship.translation).normalize_or_zero();
        ControlIntent {
            forward: dive || (!climb && nose.y > 0.05),
            backward: climb || (!dive && nose.y < -0.05),
            left: false,
            right: false,
            accelerate: true,
            shoot: nose.dot(to_opponent) > 0.95,
        }
    }
}
