//! Per-frame driver tying input, session state, screens and the network
//! together.

use crate::error::ConnectError;
use crate::input::FrameInput;
use crate::network::NetworkSession;
use crate::rendering::{Canvas, Renderer};
use crate::screen::{FrameView, ScreenContext, ScreenSet, ScreenState, ScreenStateMachine};
use crate::session::SessionState;
use log::{debug, info, warn};
use shared::{ClientCommand, CONSUME_RADIUS, SCREEN_HEIGHT, SCREEN_WIDTH};
use std::sync::Arc;

pub struct GameController {
    machine: ScreenStateMachine,
    screens: ScreenSet,
    renderer: Renderer,
    state: Arc<SessionState>,
    network: Option<NetworkSession>,
    score: i64,
    // Outgoing commands queued during the current tick
    commands: Vec<ClientCommand>,
}

impl GameController {
    /// Creates an offline controller sitting in the main menu.
    pub fn new() -> Self {
        Self {
            machine: ScreenStateMachine::new(),
            screens: ScreenSet::new(),
            renderer: Renderer::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            state: Arc::new(SessionState::new()),
            network: None,
            score: 0,
            commands: Vec::new(),
        }
    }

    /// Opens the server session. On failure the controller stays offline and
    /// the game remains playable locally.
    ///
    /// Any previous session is closed first and its identity and pickups are
    /// discarded; every connection starts from a fresh [`SessionState`].
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), ConnectError> {
        self.shutdown();
        self.state = Arc::new(SessionState::new());

        let session = NetworkSession::start(host, port, Arc::clone(&self.state))?;
        info!("Connected to {}", session.peer_addr());
        self.network = Some(session);
        Ok(())
    }

    pub fn is_online(&self) -> bool {
        self.network
            .as_ref()
            .map_or(false, NetworkSession::is_connected)
    }

    fn can_send(&self) -> bool {
        self.is_online() && self.state.local_identity().is_some()
    }

    /// Runs one frame.
    pub fn tick(&mut self, input: &FrameInput, canvas: &mut dyn Canvas) {
        let can_send = self.can_send();

        if self.machine.current() == ScreenState::Player && self.state.take_game_over() {
            info!("Server ended the round for the local player");
            self.machine.request(ScreenState::GameOver);
        }

        if self.machine.current() == ScreenState::Player && input.pointer_pressed {
            self.consume_at(input, can_send);
        }

        let previous = self.machine.current();
        {
            let mut ctx = ScreenContext {
                machine: &mut self.machine,
                commands: &mut self.commands,
                can_send,
            };
            if let Some(screen) = self.screens.get_mut(previous) {
                screen.handle_input(input, &mut ctx);
            }

            if ctx.machine.advance() {
                info!("Screen: {} -> {}", previous, ctx.machine.current());
                if let Some(screen) = self.screens.get_mut(previous) {
                    screen.on_exit(&mut ctx);
                }
            }
        }

        self.flush_commands();

        let current = self.machine.current();
        if current == ScreenState::Exit {
            return;
        }

        let pickups = self.state.pickups().snapshot();
        let flags = self.state.flags();
        let view = FrameView {
            player: self.state.player(),
            flags,
            score: self.score,
            pickups: &pickups,
            pointer: input.pointer,
        };

        if let Some(screen) = self.screens.get_mut(current) {
            screen.update(&view);
        }

        if let Some(screen) = self.screens.get(current) {
            screen.render(canvas, &view);
        }
        if matches!(current, ScreenState::Player | ScreenState::Spectator) {
            self.renderer.draw_pickups(canvas, &pickups);
            self.renderer.draw_score(canvas, self.score);
        }
        self.renderer
            .draw_connection_status(canvas, &flags, view.player.identity);
    }

    /// Optimistically eats the first pickup under the pointer. The server is
    /// told afterwards and has the final say through `REMOVE_FRUIT`.
    fn consume_at(&mut self, input: &FrameInput, can_send: bool) {
        let (x, y) = input.pointer_px();
        let Some(pickup) = self.state.pickups().remove_near(x, y, CONSUME_RADIUS) else {
            return;
        };

        self.score += i64::from(pickup.value);
        info!(
            "Ate {} #{} (+{}), score {}",
            pickup.kind, pickup.identity, pickup.value, self.score
        );

        if !can_send {
            return;
        }
        if let Some(player_id) = self.state.local_identity() {
            self.commands.push(ClientCommand::EatFruit {
                player_id,
                fruit_id: pickup.identity,
            });
        }
    }

    fn flush_commands(&mut self) {
        let network = &mut self.network;
        for command in self.commands.drain(..) {
            match network {
                Some(session) => {
                    if let Err(e) = session.send(&command) {
                        warn!("Dropping {}: {}", command, e);
                    }
                }
                None => debug!("Offline, dropping {}", command),
            }
        }
    }

    pub fn current_state(&self) -> ScreenState {
        self.machine.current()
    }

    pub fn state_changed(&self) -> bool {
        self.machine.has_changed()
    }

    pub fn request_state(&mut self, state: ScreenState) {
        self.machine.request(state);
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn should_exit(&self) -> bool {
        self.machine.current() == ScreenState::Exit
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Closes the network session, if any. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if let Some(mut session) = self.network.take() {
            info!("Disconnecting from {}", session.peer_addr());
            session.shutdown();
        }
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
