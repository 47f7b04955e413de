//! Presentation states and the screens that implement them.
//!
//! The [`ScreenStateMachine`] only records which state is wanted; screens ask
//! for a change through [`ScreenContext::request`] and the controller applies
//! it with [`ScreenStateMachine::advance`] once per tick.

mod game_over;
mod main_menu;
mod player;
mod spectator;

pub use game_over::GameOverScreen;
pub use main_menu::MainMenuScreen;
pub use player::{Platform, PlatformKind, PlayerScreen, PLATFORMS};
pub use spectator::SpectatorScreen;

use crate::input::FrameInput;
use crate::rendering::Canvas;
use crate::session::{PlayerMirror, SessionFlags};
use macroquad::prelude::*;
use shared::{ClientCommand, PickupRecord};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenState {
    MainMenu,
    Player,
    Spectator,
    GameOver,
    Exit,
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenState::MainMenu => "main menu",
            ScreenState::Player => "player",
            ScreenState::Spectator => "spectator",
            ScreenState::GameOver => "game over",
            ScreenState::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Current/requested state pair. Any state may request any other.
#[derive(Debug)]
pub struct ScreenStateMachine {
    current: ScreenState,
    requested: ScreenState,
    changed: bool,
}

impl ScreenStateMachine {
    pub fn new() -> Self {
        Self {
            current: ScreenState::MainMenu,
            requested: ScreenState::MainMenu,
            changed: false,
        }
    }

    /// Records the wanted state. Nothing changes until the next [`advance`](Self::advance).
    pub fn request(&mut self, state: ScreenState) {
        self.requested = state;
    }

    /// Applies the pending request, if any. The changed flag stays raised
    /// only until the following call.
    pub fn advance(&mut self) -> bool {
        self.changed = self.current != self.requested;
        self.current = self.requested;
        self.changed
    }

    pub fn current(&self) -> ScreenState {
        self.current
    }

    pub fn requested(&self) -> ScreenState {
        self.requested
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }
}

impl Default for ScreenStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// What a screen may touch while handling input.
pub struct ScreenContext<'a> {
    pub machine: &'a mut ScreenStateMachine,
    /// Commands queued for the server, flushed by the controller.
    pub commands: &'a mut Vec<ClientCommand>,
    /// True when connected with an assigned identity.
    pub can_send: bool,
}

impl ScreenContext<'_> {
    pub fn request(&mut self, state: ScreenState) {
        self.machine.request(state);
    }

    /// Queues `command` if the session can send, otherwise drops it.
    pub fn send(&mut self, command: ClientCommand) {
        if self.can_send {
            self.commands.push(command);
        }
    }
}

/// Read-only data a screen draws from during one tick.
pub struct FrameView<'a> {
    pub player: PlayerMirror,
    pub flags: SessionFlags,
    pub score: i64,
    pub pickups: &'a [PickupRecord],
    pub pointer: (f32, f32),
}

/// One presentation mode. The controller forwards every call to the screen
/// matching the current state.
pub trait Screen {
    fn handle_input(&mut self, input: &FrameInput, ctx: &mut ScreenContext);

    fn update(&mut self, _view: &FrameView) {}

    fn render(&self, canvas: &mut dyn Canvas, view: &FrameView);

    /// Called once when the state machine moves away from this screen.
    fn on_exit(&mut self, _ctx: &mut ScreenContext) {}
}

/// All screens, built once and kept for the process lifetime.
pub struct ScreenSet {
    pub main_menu: MainMenuScreen,
    pub player: PlayerScreen,
    pub spectator: SpectatorScreen,
    pub game_over: GameOverScreen,
}

impl ScreenSet {
    pub fn new() -> Self {
        Self {
            main_menu: MainMenuScreen::new(),
            player: PlayerScreen::new(),
            spectator: SpectatorScreen::new(),
            game_over: GameOverScreen::new(),
        }
    }

    /// The screen for `state`. `Exit` has none.
    pub fn get_mut(&mut self, state: ScreenState) -> Option<&mut dyn Screen> {
        match state {
            ScreenState::MainMenu => Some(&mut self.main_menu),
            ScreenState::Player => Some(&mut self.player),
            ScreenState::Spectator => Some(&mut self.spectator),
            ScreenState::GameOver => Some(&mut self.game_over),
            ScreenState::Exit => None,
        }
    }

    pub fn get(&self, state: ScreenState) -> Option<&dyn Screen> {
        match state {
            ScreenState::MainMenu => Some(&self.main_menu),
            ScreenState::Player => Some(&self.player),
            ScreenState::Spectator => Some(&self.spectator),
            ScreenState::GameOver => Some(&self.game_over),
            ScreenState::Exit => None,
        }
    }
}

impl Default for ScreenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Clickable rectangle with a centred label.
#[derive(Debug, Clone, Copy)]
pub struct Button {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub label: &'static str,
    pub font_size: f32,
}

impl Button {
    pub const fn new(x: f32, y: f32, w: f32, h: f32, label: &'static str, font_size: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            label,
            font_size,
        }
    }

    /// Edges count as inside.
    pub fn contains(&self, point: (f32, f32)) -> bool {
        let (px, py) = point;
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    pub fn clicked(&self, input: &FrameInput) -> bool {
        input.pointer_pressed && self.contains(input.pointer)
    }

    pub fn render(&self, canvas: &mut dyn Canvas, pointer: (f32, f32), base: Color, hover: Color) {
        let fill = if self.contains(pointer) { hover } else { base };
        canvas.rect(self.x, self.y, self.w, self.h, fill);
        canvas.rect_lines(self.x, self.y, self.w, self.h, 2.0, WHITE);

        let text_width = canvas.text_width(self.label, self.font_size);
        canvas.text(
            self.label,
            self.x + (self.w - text_width) / 2.0,
            self.y + (self.h - self.font_size) / 2.0,
            self.font_size,
            WHITE,
        );
    }
}
