//! Input sampling with edge detection for the per-frame controller

use macroquad::prelude::*;
use shared::ClientCommand;

/// Everything the controller needs to know about one frame of input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub pointer: (f32, f32),
    /// Left button went down this frame.
    pub pointer_pressed: bool,
    pub left_held: bool,
    pub right_held: bool,
    /// Jump key went down this frame.
    pub jump_pressed: bool,
    pub escape_pressed: bool,
}

impl FrameInput {
    pub fn pointer_px(&self) -> (i32, i32) {
        (self.pointer.0.round() as i32, self.pointer.1.round() as i32)
    }

    /// A click at `(x, y)`, for driving the controller without a window.
    pub fn click(x: f32, y: f32) -> Self {
        Self {
            pointer: (x, y),
            pointer_pressed: true,
            ..Self::default()
        }
    }
}

/// Samples the macroquad keyboard and mouse state into [`FrameInput`]s.
pub struct InputManager {
    // Previous frame states for edge detection
    prev_pointer: bool,
    prev_jump: bool,
    prev_escape: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_pointer: false,
            prev_jump: false,
            prev_escape: false,
        }
    }

    pub fn capture(&mut self) -> FrameInput {
        // Support both arrow keys and A/D
        let left_held = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
        let right_held = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);

        let pointer_down = is_mouse_button_down(MouseButton::Left);
        let jump_down = is_key_down(KeyCode::Space);
        let escape_down = is_key_down(KeyCode::Escape);

        FrameInput {
            pointer: mouse_position(),
            pointer_pressed: rising_edge(pointer_down, &mut self.prev_pointer),
            left_held,
            right_held,
            jump_pressed: rising_edge(jump_down, &mut self.prev_jump),
            escape_pressed: rising_edge(escape_down, &mut self.prev_escape),
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

/// True only on the frame `current` flips from released to held.
fn rising_edge(current: bool, previous: &mut bool) -> bool {
    let pressed = current && !*previous;
    *previous = current;
    pressed
}

/// Horizontal intent derived from the held-key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    #[default]
    Idle,
    Left,
    Right,
}

impl Movement {
    /// Left wins when both directions are held.
    pub fn from_keys(left: bool, right: bool) -> Self {
        if left {
            Movement::Left
        } else if right {
            Movement::Right
        } else {
            Movement::Idle
        }
    }

    pub fn command(self) -> ClientCommand {
        match self {
            Movement::Idle => ClientCommand::StopMoving,
            Movement::Left => ClientCommand::MoveLeft,
            Movement::Right => ClientCommand::MoveRight,
        }
    }
}

/// Emits a movement command only when the held-key set changes direction.
#[derive(Debug, Default)]
pub struct MovementTracker {
    last: Movement,
}

impl MovementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, left: bool, right: bool) -> Option<ClientCommand> {
        let movement = Movement::from_keys(left, right);
        if movement == self.last {
            return None;
        }
        self.last = movement;
        Some(movement.command())
    }

    /// Forgets the current direction, returning `STOP_MOVING` if the player
    /// was walking.
    pub fn reset(&mut self) -> Option<ClientCommand> {
        match std::mem::take(&mut self.last) {
            Movement::Idle => None,
            _ => Some(ClientCommand::StopMoving),
        }
    }

    pub fn current(&self) -> Movement {
        self.last
    }
}
