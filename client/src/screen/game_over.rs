use super::{Button, FrameView, Screen, ScreenContext, ScreenState};
use crate::input::FrameInput;
use crate::rendering::{background_color, Canvas};
use macroquad::prelude::*;
use shared::{SCREEN_HEIGHT, SCREEN_WIDTH};

const MENU: Button = Button::new(362.0, 550.0, 300.0, 60.0, "MENU", 28.0);

pub struct GameOverScreen;

impl GameOverScreen {
    pub fn new() -> Self {
        GameOverScreen
    }
}

impl Default for GameOverScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for GameOverScreen {
    fn handle_input(&mut self, input: &FrameInput, ctx: &mut ScreenContext) {
        if input.escape_pressed || MENU.clicked(input) {
            ctx.request(ScreenState::MainMenu);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas, view: &FrameView) {
        canvas.clear(background_color());
        canvas.rect(
            0.0,
            0.0,
            SCREEN_WIDTH as f32,
            SCREEN_HEIGHT as f32,
            Color::from_rgba(0, 0, 0, 150),
        );

        canvas.text("GAME OVER", 300.0, 150.0, 80.0, RED);
        canvas.text(
            "Donkey Kong Jr has fallen!",
            250.0,
            280.0,
            40.0,
            Color::from_rgba(139, 0, 0, 255),
        );
        canvas.text(
            &format!("Final score: {}", view.score),
            300.0,
            380.0,
            32.0,
            GRAY,
        );

        MENU.render(canvas, view.pointer, DARKGRAY, GRAY);
    }
}
