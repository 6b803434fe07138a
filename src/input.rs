//! Player input
//!
//! Keyboard state is shared by both players; each player reads it through
//! their own [`KeyBindings`], so the same keyboard drives two ships.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Everything a ship can be told to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Pitch nose down
    Forward,
    /// Pitch nose up
    Backward,
    /// Roll left
    Left,
    /// Roll right
    Right,
    Accelerate,
    Shoot,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Accelerate,
        Action::Shoot,
    ];
}

/// Anything that can answer "is this action held right now"
pub trait InputSource {
    fn is_action_active(&self, action: Action) -> bool;
}

/// Raw key state keyed by physical key code (`"KeyW"`, `"ShiftLeft"`, ...)
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        self.pressed.insert(code.to_owned());
    }

    pub fn key_up(&mut self, code: &str) {
        self.pressed.remove(code);
    }

    pub fn is_key_pressed(&self, code: &str) -> bool {
        self.pressed.contains(code)
    }

    pub fn any_pressed(&self) -> bool {
        !self.pressed.is_empty()
    }
}

/// Action-to-key remapping for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub accelerate: String,
    pub shoot: String,
}

impl KeyBindings {
    /// Left side of the keyboard (first player)
    pub fn left_hand() -> Self {
        Self {
            forward: "KeyW".into(),
            backward: "KeyS".into(),
            left: "KeyA".into(),
            right: "KeyD".into(),
            accelerate: "ShiftLeft".into(),
            shoot: "KeyC".into(),
        }
    }

    /// Right side of the keyboard (second player)
    pub fn right_hand() -> Self {
        Self {
            forward: "KeyI".into(),
            backward: "KeyK".into(),
            left: "KeyJ".into(),
            right: "KeyL".into(),
            accelerate: "Slash".into(),
            shoot: "Space".into(),
        }
    }

    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::Forward => &self.forward,
            Action::Backward => &self.backward,
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Accelerate => &self.accelerate,
            Action::Shoot => &self.shoot,
        }
    }
}

/// A keyboard viewed through one player's bindings
#[derive(Debug, Clone, Copy)]
pub struct BoundInput<'a> {
    pub keyboard: &'a KeyboardState,
    pub bindings: &'a KeyBindings,
}

impl InputSource for BoundInput<'_> {
    fn is_action_active(&self, action: Action) -> bool {
        self.keyboard.is_key_pressed(self.bindings.key_for(action))
    }
}

/// Snapshot of one player's intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub shoot: bool,
}

impl ControlIntent {
    pub fn sample(source: &impl InputSource) -> Self {
        Self {
            forward: source.is_action_active(Action::Forward),
            backward: source.is_action_active(Action::Backward),
            left: source.is_action_active(Action::Left),
            right: source.is_action_active(Action::Right),
            accelerate: source.is_action_active(Action::Accelerate),
            shoot: source.is_action_active(Action::Shoot),
        }
    }

    /// Pitch direction: +1 nose down, -1 nose up; forward wins if both held
    pub fn pitch_axis(&self) -> f32 {
        if self.forward {
            1.0
        } else if self.backward {
            -1.0
        } else {
            0.0
        }
    }

    /// Roll direction: -1 left, +1 right; left wins if both held
    pub fn roll_axis(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

impl InputSource for ControlIntent {
    fn is_action_active(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Accelerate => self.accelerate,
            Action::Shoot => self.shoot,
        }
    }
}
