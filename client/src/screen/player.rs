use super::{Button, FrameView, Screen, ScreenContext, ScreenState};
use crate::input::{FrameInput, MovementTracker};
use crate::rendering::{background_color, Canvas};
use crate::session::PlayerMirror;
use macroquad::prelude::*;
use shared::{ClientCommand, PLAYER_HEIGHT, PLAYER_WIDTH};

const BACK: Button = Button::new(20.0, 20.0, 100.0, 40.0, "BACK", 16.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Grass,
    Wood,
}

#[derive(Debug, Clone, Copy)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub kind: PlatformKind,
}

const fn platform(x: f32, y: f32, w: f32, kind: PlatformKind) -> Platform {
    Platform {
        x,
        y,
        w,
        h: 25.0,
        kind,
    }
}

/// Static level layout. Collision lives on the server; these are drawn only.
pub const PLATFORMS: [Platform; 10] = [
    platform(0.0, 720.0, 350.0, PlatformKind::Grass),
    platform(410.0, 680.0, 110.0, PlatformKind::Grass),
    platform(585.0, 720.0, 100.0, PlatformKind::Grass),
    platform(727.0, 640.0, 110.0, PlatformKind::Grass),
    platform(900.0, 600.0, 110.0, PlatformKind::Grass),
    platform(0.0, 210.0, 680.0, PlatformKind::Wood),
    platform(210.0, 350.0, 200.0, PlatformKind::Wood),
    platform(640.0, 240.0, 200.0, PlatformKind::Wood),
    platform(160.0, 520.0, 250.0, PlatformKind::Wood),
    platform(800.0, 420.0, 220.0, PlatformKind::Wood),
];

/// The active-player screen. Sends movement intent and draws the mirrored
/// player; the position itself only ever comes from the server.
pub struct PlayerScreen {
    player: PlayerMirror,
    movement: MovementTracker,
}

impl PlayerScreen {
    pub fn new() -> Self {
        Self {
            player: PlayerMirror::default(),
            movement: MovementTracker::new(),
        }
    }

    fn draw_platforms(canvas: &mut dyn Canvas) {
        for platform in &PLATFORMS {
            let (fill, border) = match platform.kind {
                PlatformKind::Grass => (
                    Color::from_rgba(34, 139, 34, 255),
                    Color::from_rgba(0, 60, 0, 255),
                ),
                PlatformKind::Wood => (Color::from_rgba(139, 69, 19, 255), BLACK),
            };
            canvas.rect(platform.x, platform.y, platform.w, platform.h, fill);
            canvas.rect_lines(platform.x, platform.y, platform.w, platform.h, 1.0, border);
        }
    }

    fn identity_label(&self) -> String {
        match self.player.identity {
            Some(id) => id.to_string(),
            None => "-".to_string(),
        }
    }
}

impl Default for PlayerScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for PlayerScreen {
    fn handle_input(&mut self, input: &FrameInput, ctx: &mut ScreenContext) {
        if input.escape_pressed || BACK.clicked(input) {
            ctx.request(ScreenState::MainMenu);
            return;
        }

        // The tracker only advances on frames that can actually send, so a key
        // held before ASSIGN_ID still produces its MOVE_* once it arrives.
        if !ctx.can_send {
            return;
        }
        if let Some(command) = self.movement.update(input.left_held, input.right_held) {
            ctx.send(command);
        }
        if input.jump_pressed {
            ctx.send(ClientCommand::Jump);
        }
    }

    fn update(&mut self, view: &FrameView) {
        self.player = view.player;
    }

    fn render(&self, canvas: &mut dyn Canvas, view: &FrameView) {
        canvas.clear(background_color());

        BACK.render(canvas, view.pointer, DARKGRAY, GRAY);
        Self::draw_platforms(canvas);

        let x = self.player.x as f32;
        let y = self.player.y as f32;
        let (w, h) = (PLAYER_WIDTH as f32, PLAYER_HEIGHT as f32);
        canvas.rect(x, y, w, h, RED);
        canvas.rect_lines(x, y, w, h, 2.0, Color::from_rgba(139, 0, 0, 255));
        canvas.text(
            &format!("Jr #{}", self.identity_label()),
            x - 10.0,
            y - 30.0,
            12.0,
            DARKGRAY,
        );

        canvas.text("DonCEy Kong Jr - PLAYER", 380.0, 40.0, 22.0, BLACK);
        canvas.text(
            &format!("Position: ({}, {})", self.player.x, self.player.y),
            380.0,
            80.0,
            12.0,
            GRAY,
        );
        canvas.text(
            &format!("Player ID: {}", self.identity_label()),
            380.0,
            100.0,
            12.0,
            GRAY,
        );
        canvas.text("Controls: LEFT/RIGHT (A/D)", 380.0, 730.0, 12.0, GRAY);
        canvas.text("Jump: SPACE", 380.0, 748.0, 12.0, GRAY);
    }

    fn on_exit(&mut self, ctx: &mut ScreenContext) {
        if let Some(stop) = self.movement.reset() {
            ctx.send(stop);
        }
    }
}
