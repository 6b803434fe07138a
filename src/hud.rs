//! What the overlay shows: clock, scores, countdowns and the result banner

use serde::Serialize;

use crate::sim::{GamePhase, GameState, Player};

/// `MM:SS`, rounding down; negative time shows as `00:00`
pub fn format_clock(secs: f32) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let minutes = (secs / 60.0).floor() as u32;
    let seconds = (secs % 60.0).floor() as u32;
    format!("{minutes:02}:{seconds:02}")
}

/// Whole seconds left on a countdown, or `None` once it has run out
pub fn countdown_display(remaining: f32) -> Option<u32> {
    (remaining.is_finite() && remaining > 0.0).then(|| remaining.ceil() as u32)
}

/// Winner text for the game over screen
pub fn result_banner(winner: Option<Player>) -> &'static str {
    match winner {
        Some(Player::First) => "Left player",
        Some(Player::Second) => "Right player",
        None => "Draw",
    }
}

/// One frame of HUD content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub clock: String,
    pub first_player_score: usize,
    pub second_player_score: usize,
    /// Pre-game countdown shown over both views
    pub countdown: Option<u32>,
    /// Respawn countdown per player
    pub respawn: [Option<u32>; 2],
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let countdown = match state.phase {
            GamePhase::Countdown => countdown_display(state.countdown_remaining),
            _ => None,
        };
        let respawn = state.ships.each_ref().map(|ship| {
            if ship.dead {
                countdown_display(ship.death_timer)
            } else {
                None
            }
        });
        Self {
            phase: state.phase,
            clock: format_clock(state.scores.time_remaining),
            first_player_score: state.scores.first_player_score,
            second_player_score: state.scores.second_player_score,
            countdown,
            respawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(120.0), "02:00");
        assert_eq!(format_clock(119.99), "01:59");
        assert_eq!(format_clock(5.5), "00:05");
        assert_eq!(format_clock(-3.0), "00:00");
        assert_eq!(format_clock(f32::NAN), "00:00");
    }

    #[test]
    fn test_countdown_rounds_up() {
        assert_eq!(countdown_display(3.0), Some(3));
        assert_eq!(countdown_display(2.01), Some(3));
        assert_eq!(countdown_display(0.2), Some(1));
        assert_eq!(countdown_display(0.0), None);
        assert_eq!(countdown_display(-1.0), None);
    }

    #[test]
    fn test_result_banner() {
        assert_eq!(result_banner(Some(Player::First)), "Left player");
        assert_eq!(result_banner(None), "Draw");
    }

    #[test]
    fn test_snapshot_of_new_match() {
        let state = GameState::new(1, Settings::default()).unwrap();
        let hud = HudSnapshot::from_state(&state);
        assert_eq!(hud.clock, "02:00");
        assert_eq!(hud.countdown, None);
        assert_eq!(hud.respawn, [None, None]);
        assert_eq!((hud.first_player_score, hud.second_player_score), (0, 0));
    }

    #[test]
    fn test_snapshot_shows_respawn_timer() {
        let mut state = GameState::new(2, Settings::default()).unwrap();
        state.ships[1].dead = true;
        state.ships[1].death_timer = 1.4;
        let hud = HudSnapshot::from_state(&state);
        assert_eq!(hud.respawn, [None, Some(2)]);
    }
}
