use super::{Button, FrameView, Screen, ScreenContext, ScreenState};
use crate::input::FrameInput;
use crate::rendering::{background_color, Canvas};
use log::info;
use macroquad::prelude::*;

const PLAY: Button = Button::new(412.0, 350.0, 200.0, 60.0, "PLAY", 30.0);
const SPECTATE: Button = Button::new(412.0, 480.0, 200.0, 60.0, "SPECTATE", 26.0);
const EXIT: Button = Button::new(412.0, 610.0, 200.0, 60.0, "EXIT", 30.0);

pub struct MainMenuScreen;

impl MainMenuScreen {
    pub fn new() -> Self {
        MainMenuScreen
    }
}

impl Default for MainMenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for MainMenuScreen {
    fn handle_input(&mut self, input: &FrameInput, ctx: &mut ScreenContext) {
        if input.escape_pressed {
            ctx.request(ScreenState::Exit);
            return;
        }

        if PLAY.clicked(input) {
            info!("Play selected");
            ctx.request(ScreenState::Player);
        } else if SPECTATE.clicked(input) {
            info!("Spectate selected");
            ctx.request(ScreenState::Spectator);
        } else if EXIT.clicked(input) {
            ctx.request(ScreenState::Exit);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas, view: &FrameView) {
        canvas.clear(background_color());

        let title = "DONCEY KONG JR";
        let width = canvas.text_width(title, 50.0);
        canvas.text(
            title,
            (screen_center() - width / 2.0).max(0.0),
            100.0,
            50.0,
            Color::from_rgba(20, 20, 40, 255),
        );

        PLAY.render(canvas, view.pointer, DARKGREEN, GREEN);
        SPECTATE.render(canvas, view.pointer, DARKBLUE, BLUE);
        EXIT.render(canvas, view.pointer, MAROON, RED);
    }
}

fn screen_center() -> f32 {
    shared::SCREEN_WIDTH as f32 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::recording::RecordingCanvas;
    use crate::screen::ScreenStateMachine;
    use crate::session::{PlayerMirror, SessionFlags};

    fn click(screen: &mut MainMenuScreen, input: FrameInput) -> ScreenState {
        let mut machine = ScreenStateMachine::new();
        let mut commands = Vec::new();
        let mut ctx = ScreenContext {
            machine: &mut machine,
            commands: &mut commands,
            can_send: true,
        };
        screen.handle_input(&input, &mut ctx);
        assert!(commands.is_empty());
        machine.requested()
    }

    #[test]
    fn test_buttons_request_states() {
        let mut screen = MainMenuScreen::new();
        assert_eq!(
            click(&mut screen, FrameInput::click(500.0, 380.0)),
            ScreenState::Player
        );
        assert_eq!(
            click(&mut screen, FrameInput::click(412.0, 540.0)),
            ScreenState::Spectator
        );
        assert_eq!(
            click(&mut screen, FrameInput::click(600.0, 650.0)),
            ScreenState::Exit
        );
        assert_eq!(
            click(&mut screen, FrameInput::click(10.0, 10.0)),
            ScreenState::MainMenu
        );
    }

    #[test]
    fn test_escape_exits() {
        let mut screen = MainMenuScreen::new();
        let input = FrameInput {
            escape_pressed: true,
            ..FrameInput::default()
        };
        assert_eq!(click(&mut screen, input), ScreenState::Exit);
    }

    #[test]
    fn test_render_shows_all_buttons() {
        let screen = MainMenuScreen::new();
        let mut canvas = RecordingCanvas::default();
        let view = FrameView {
            player: PlayerMirror::default(),
            flags: SessionFlags::default(),
            score: 0,
            pickups: &[],
            pointer: (0.0, 0.0),
        };
        screen.render(&mut canvas, &view);

        for label in ["DONCEY KONG JR", "PLAY", "SPECTATE", "EXIT"] {
            assert!(canvas.has_text(label), "missing {}", label);
        }
    }
}
