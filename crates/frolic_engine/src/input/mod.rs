//! Input management system
//!
//! Raw input is polled by the host and handed to the engine once per frame
//! as an immutable [`InputSnapshot`]. [`InputManager`] turns a stream of
//! platform key/mouse events into those snapshots.

use crate::foundation::math::{vec2, Vec2};
use std::collections::HashMap;
use std::str::FromStr;

/// State of a key or button within one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Not held
    #[default]
    Up,
    /// Went down this frame
    Pressed,
    /// Held and auto-repeated this frame
    RPressed,
    /// Held
    Down,
    /// Went up this frame
    Released,
}

impl ButtonState {
    /// Held in any form
    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::RPressed | ButtonState::Down)
    }

    /// Went down this frame (repeats excluded)
    pub fn is_pressed(self) -> bool {
        self == ButtonState::Pressed
    }

    /// Went down or repeated this frame
    pub fn is_pressed_rep(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::RPressed)
    }

    /// Went up this frame
    pub fn is_released(self) -> bool {
        self == ButtonState::Released
    }

    /// State carried into the next frame
    fn settle(self) -> Self {
        match self {
            ButtonState::Pressed | ButtonState::RPressed | ButtonState::Down => ButtonState::Down,
            ButtonState::Released | ButtonState::Up => ButtonState::Up,
        }
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Shift,
    Control,
    Alt,
    Up,
    Down,
    Left,
    Right,
    Backquote,
}

impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeyCode::*;
        const LETTERS: [KeyCode; 26] = [
            A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
        ];
        const DIGITS: [KeyCode; 10] = [Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9];
        const FKEYS: [KeyCode; 12] = [F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12];

        let lower = s.to_ascii_lowercase();
        let mut chars = lower.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() {
                return Ok(LETTERS[(c as u8 - b'a') as usize]);
            }
            if c.is_ascii_digit() {
                return Ok(DIGITS[(c as u8 - b'0') as usize]);
            }
        }
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
            if (1..=12).contains(&n) {
                return Ok(FKEYS[n - 1]);
            }
        }
        match lower.as_str() {
            "space" | " " => Ok(Space),
            "enter" => Ok(Enter),
            "escape" | "esc" => Ok(Escape),
            "tab" => Ok(Tab),
            "backspace" => Ok(Backspace),
            "delete" => Ok(Delete),
            "shift" => Ok(Shift),
            "control" | "ctrl" => Ok(Control),
            "alt" => Ok(Alt),
            "up" => Ok(Up),
            "down" => Ok(Down),
            "left" => Ok(Left),
            "right" => Ok(Right),
            "`" => Ok(Backquote),
            _ => Err(format!("unknown key '{s}'")),
        }
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Immutable per-frame input state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Raw mouse position in screen space
    pub mouse_pos: Vec2,
    /// Primary mouse button
    pub mouse: ButtonState,
    /// Keys not listed are up
    pub keys: HashMap<KeyCode, ButtonState>,
    /// Characters typed this frame
    pub chars: Vec<char>,
}

impl InputSnapshot {
    /// Empty snapshot: nothing held, mouse at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a key
    pub fn key(&self, key: KeyCode) -> ButtonState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    /// Key held
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.key(key).is_down()
    }

    /// Key went down this frame
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.key(key).is_pressed()
    }

    /// Key went down or repeated this frame
    pub fn key_pressed_rep(&self, key: KeyCode) -> bool {
        self.key(key).is_pressed_rep()
    }

    /// Key went up this frame
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.key(key).is_released()
    }

    /// Builder: set a key state
    pub fn with_key(mut self, key: KeyCode, state: ButtonState) -> Self {
        self.keys.insert(key, state);
        self
    }

    /// Builder: set the mouse
    pub fn with_mouse(mut self, pos: Vec2, state: ButtonState) -> Self {
        self.mouse_pos = pos;
        self.mouse = state;
        self
    }

    /// Builder: typed characters
    pub fn with_chars(mut self, chars: &str) -> Self {
        self.chars.extend(chars.chars());
        self
    }
}

/// Input manager
///
/// Accumulates platform events between frames and produces snapshots.
#[derive(Debug, Default)]
pub struct InputManager {
    current: InputSnapshot,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for this frame; transient states settle afterwards
    pub fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = self.current.clone();
        for state in self.current.keys.values_mut() {
            *state = state.settle();
        }
        self.current.keys.retain(|_, state| *state != ButtonState::Up);
        self.current.mouse = self.current.mouse.settle();
        self.current.chars.clear();
        snapshot
    }

    /// Handle key input; `repeat` marks OS auto-repeat presses
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool, repeat: bool) {
        let state = self.current.keys.entry(key).or_default();
        *state = match (pressed, repeat) {
            (true, true) => ButtonState::RPressed,
            (true, false) if state.is_down() => *state,
            (true, false) => ButtonState::Pressed,
            (false, _) => ButtonState::Released,
        };
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        self.current.mouse = if pressed {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        };
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.current.mouse_pos = vec2(x as f32, y as f32);
    }

    /// Handle a typed character
    pub fn handle_char(&mut self, c: char) {
        self.current.chars.push(c);
    }
}
