use super::{Button, FrameView, Screen, ScreenContext, ScreenState};
use crate::input::FrameInput;
use crate::rendering::{background_color, Canvas};
use macroquad::prelude::*;

const BACK: Button = Button::new(20.0, 20.0, 100.0, 40.0, "BACK", 16.0);

/// Watches the pickups without controlling a player.
pub struct SpectatorScreen;

impl SpectatorScreen {
    pub fn new() -> Self {
        SpectatorScreen
    }
}

impl Default for SpectatorScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for SpectatorScreen {
    fn handle_input(&mut self, input: &FrameInput, ctx: &mut ScreenContext) {
        if input.escape_pressed || BACK.clicked(input) {
            ctx.request(ScreenState::MainMenu);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas, view: &FrameView) {
        canvas.clear(background_color());
        BACK.render(canvas, view.pointer, DARKGRAY, GRAY);
        canvas.text("SPECTATOR MODE", 350.0, 350.0, 30.0, BLACK);
        canvas.text(
            &format!("{} fruit in play", view.pickups.len()),
            350.0,
            390.0,
            16.0,
            GRAY,
        );
    }
}
