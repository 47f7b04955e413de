//! Background thread that turns server lines into session state changes.
//!
//! The thread blocks in [`LineReader::receive_line`] and has no way to be woken
//! from inside that call. Stopping it therefore takes two steps: raise the stop
//! flag, then close the [`Connection`](crate::connection::Connection) so the
//! pending read returns. [`NetworkSession::shutdown`](crate::network::NetworkSession::shutdown)
//! does both.

use crate::connection::{LineReader, Received};
use crate::registry::Upsert;
use crate::session::SessionState;
use log::{debug, error, info, trace, warn};
use shared::ServerMessage;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverStatus {
    NotStarted,
    Running,
    Stopped,
}

impl ReceiverStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ReceiverStatus::NotStarted,
            1 => ReceiverStatus::Running,
            _ => ReceiverStatus::Stopped,
        }
    }
}

pub struct Receiver {
    status: Arc<AtomicU8>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Receiver {
    pub fn new() -> Self {
        Self {
            status: Arc::new(AtomicU8::new(ReceiverStatus::NotStarted as u8)),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawns the receiver thread. A receiver only ever runs once; later calls
    /// are ignored.
    pub fn start<R>(&mut self, reader: LineReader<R>, state: Arc<SessionState>) -> io::Result<()>
    where
        R: Read + Send + 'static,
    {
        let builder = thread::Builder::new().name("receiver".to_string());
        self.start_on(builder, reader, state)
    }

    fn start_on<R>(
        &mut self,
        builder: thread::Builder,
        reader: LineReader<R>,
        state: Arc<SessionState>,
    ) -> io::Result<()>
    where
        R: Read + Send + 'static,
    {
        if self.status() != ReceiverStatus::NotStarted {
            warn!("Receiver already started");
            return Ok(());
        }

        self.status
            .store(ReceiverStatus::Running as u8, Ordering::Release);
        state.set_receiver_running(true);

        let status = Arc::clone(&self.status);
        let stop = Arc::clone(&self.stop);
        let thread_state = Arc::clone(&state);
        let spawned = builder.spawn(move || run(reader, &thread_state, &stop, &status));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!("Failed to spawn receiver thread: {}", e);
                state.set_receiver_running(false);
                self.status
                    .store(ReceiverStatus::Stopped as u8, Ordering::Release);
                Err(e)
            }
        }
    }

    pub fn status(&self) -> ReceiverStatus {
        ReceiverStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Asks the loop to exit at its next iteration. Does not interrupt a read in
    /// progress.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Waits for the thread to finish. Only call after the connection is closed
    /// or the peer has hung up, otherwise this blocks until the next line.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Receiver thread panicked");
            }
        }
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

fn run<R: Read>(
    mut reader: LineReader<R>,
    state: &SessionState,
    stop: &AtomicBool,
    status: &AtomicU8,
) {
    debug!("Receiver started");

    while !stop.load(Ordering::Acquire) {
        match reader.receive_line() {
            Ok(Received::Line(line)) => {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                match ServerMessage::decode(&line) {
                    Some(message) => apply_message(state, message),
                    None => trace!("Ignoring line {:?}", line),
                }
            }
            Ok(Received::EndOfStream) => {
                info!("Server closed the connection");
                break;
            }
            Err(e) => {
                error!("Error receiving from server: {}", e);
                break;
            }
        }
    }

    state.set_connected(false);
    state.set_receiver_running(false);
    status.store(ReceiverStatus::Stopped as u8, Ordering::Release);
    debug!("Receiver stopped");
}

/// Applies the effect of one decoded server message.
pub fn apply_message(state: &SessionState, message: ServerMessage) {
    match message {
        ServerMessage::AssignId { id } => {
            state.assign_identity(id);
            info!("Assigned player id {}", id);
        }

        ServerMessage::PlayerPos { id, x, y } => {
            if state.update_player_position(id, x, y) {
                trace!("Player {} at ({}, {})", id, x, y);
            }
        }

        ServerMessage::SpawnFruit {
            id,
            x,
            y,
            kind,
            value,
        } => match state.pickups().upsert(id, x, y, &kind, value) {
            Upsert::Dropped => warn!("Pickup table full, dropping fruit {}", id),
            _ => debug!("SPAWN_FRUIT {} ({}) at {},{} value={}", id, kind, x, y, value),
        },

        ServerMessage::RemoveFruit { id } => {
            state.pickups().remove(id);
            debug!("REMOVE_FRUIT {}", id);
        }

        // Logged only; the local score counter is never reconciled with it.
        ServerMessage::PlayerScore { id, value } => {
            info!("Player {} score reported as {}", id, value);
        }

        ServerMessage::GameOver { id } => {
            if state.mark_game_over(id) {
                info!("Game over for local player {}", id);
            } else {
                debug!("GAME_OVER for player {}", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn apply_lines(state: &SessionState, lines: &[&str]) {
        for line in lines {
            if let Some(message) = ServerMessage::decode(line) {
                apply_message(state, message);
            }
        }
    }

    #[test]
    fn test_assign_then_track_position() {
        let state = SessionState::new();
        apply_lines(&state, &["ASSIGN_ID 3", "PLAYER_POS 3 10 20"]);

        let player = state.player();
        assert_eq!(player.identity, Some(3));
        assert_eq!((player.x, player.y), (10, 20));

        apply_lines(&state, &["PLAYER_POS 9 10 20", "PLAYER_POS 9 500 600"]);
        let player = state.player();
        assert_eq!((player.x, player.y), (10, 20));
    }

    #[test]
    fn test_spawn_and_remove_fruit() {
        let state = SessionState::new();
        apply_lines(
            &state,
            &[
                "SPAWN_FRUIT 7 100 200 MANGO 50",
                "SPAWN_FRUIT 8 300 200 BANANO 20",
                "REMOVE_FRUIT 7",
            ],
        );

        let snapshot = state.pickups().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].identity, 8);
    }

    #[test]
    fn test_player_score_does_not_mutate_state() {
        let state = SessionState::new();
        apply_lines(&state, &["ASSIGN_ID 1", "PLAYER_SCORE 1 500"]);

        assert_eq!(state.player().identity, Some(1));
        assert!(state.pickups().is_empty());
        assert!(!state.flags().game_over_for_local_player);
    }

    #[test]
    fn test_game_over_addressed_to_other_player() {
        let state = SessionState::new();
        apply_lines(&state, &["ASSIGN_ID 1", "GAME_OVER 2"]);
        assert!(!state.flags().game_over_for_local_player);

        apply_lines(&state, &["GAME_OVER 1"]);
        assert!(state.flags().game_over_for_local_player);
    }

    #[test]
    fn test_receiver_not_started() {
        let receiver = Receiver::new();
        assert_eq!(receiver.status(), ReceiverStatus::NotStarted);
    }

    #[test]
    fn test_receiver_stops_at_end_of_stream() {
        let state = Arc::new(SessionState::new());
        state.set_connected(true);

        let data = b"ASSIGN_ID 4\nSPAWN_FRUIT 1 10 10 MANGO 50\nnonsense\nPLAYER_POS 4 7 8\n";
        let reader = LineReader::new(Cursor::new(data.to_vec()));

        let mut receiver = Receiver::new();
        receiver.start(reader, Arc::clone(&state)).unwrap();
        receiver.join();

        assert_eq!(receiver.status(), ReceiverStatus::Stopped);
        let flags = state.flags();
        assert!(!flags.connected);
        assert!(!flags.receiver_running);

        assert_eq!(state.local_identity(), Some(4));
        assert_eq!(state.pickups().len(), 1);
        let player = state.player();
        assert_eq!((player.x, player.y), (7, 8));
    }

    #[test]
    fn test_receiver_honours_stop_flag() {
        let state = Arc::new(SessionState::new());
        let reader = LineReader::new(Cursor::new(b"ASSIGN_ID 4\n".to_vec()));

        let mut receiver = Receiver::new();
        receiver.request_stop();
        receiver.start(reader, Arc::clone(&state)).unwrap();
        receiver.join();

        assert_eq!(receiver.status(), ReceiverStatus::Stopped);
        assert_eq!(state.local_identity(), None);
    }

    // A stack larger than the address space makes the spawn itself fail
    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_spawn_failure_clears_running_flag() {
        let state = Arc::new(SessionState::new());
        let builder = thread::Builder::new().stack_size(1 << 50);

        let mut receiver = Receiver::new();
        let result = receiver.start_on(
            builder,
            LineReader::new(Cursor::new(b"ASSIGN_ID 1\n".to_vec())),
            Arc::clone(&state),
        );

        assert!(result.is_err());
        assert_eq!(receiver.status(), ReceiverStatus::Stopped);
        assert!(!state.flags().receiver_running);
        assert_eq!(state.local_identity(), None);
    }

    #[test]
    fn test_receiver_starts_once() {
        let state = Arc::new(SessionState::new());
        let mut receiver = Receiver::new();
        receiver
            .start(LineReader::new(Cursor::new(Vec::new())), Arc::clone(&state))
            .unwrap();
        receiver.join();

        receiver
            .start(
                LineReader::new(Cursor::new(b"ASSIGN_ID 1\n".to_vec())),
                Arc::clone(&state),
            )
            .unwrap();
        receiver.join();

        assert_eq!(state.local_identity(), None);
    }
}
