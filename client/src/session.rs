//! State shared between the receiver thread and the main loop.
//!
//! One [`SessionState`] is created by the controller at startup and handed to
//! the receiver thread behind an `Arc`. The pickup table has its own lock; the
//! player mirror and session flags share a second one. Both locks are only held
//! for a copy in or out.

use crate::registry::PickupRegistry;
use shared::{PLAYER_SPAWN_X, PLAYER_SPAWN_Y};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Server-reported position of the locally controlled player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMirror {
    /// `None` until the server sends `ASSIGN_ID`.
    pub identity: Option<i32>,
    pub x: i32,
    pub y: i32,
}

impl Default for PlayerMirror {
    fn default() -> Self {
        Self {
            identity: None,
            x: PLAYER_SPAWN_X,
            y: PLAYER_SPAWN_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionFlags {
    pub connected: bool,
    pub receiver_running: bool,
    pub game_over_for_local_player: bool,
}

#[derive(Debug, Default)]
struct Shared {
    player: PlayerMirror,
    flags: SessionFlags,
}

#[derive(Default)]
pub struct SessionState {
    pickups: PickupRegistry,
    shared: Mutex<Shared>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pickups(&self) -> &PickupRegistry {
        &self.pickups
    }

    pub fn player(&self) -> PlayerMirror {
        self.shared().player
    }

    pub fn flags(&self) -> SessionFlags {
        self.shared().flags
    }

    pub fn local_identity(&self) -> Option<i32> {
        self.shared().player.identity
    }

    pub fn assign_identity(&self, identity: i32) {
        self.shared().player.identity = Some(identity);
    }

    /// Applies a position report. Reports for any player other than the local
    /// one, or arriving before an identity is assigned, are ignored.
    pub fn update_player_position(&self, identity: i32, x: i32, y: i32) -> bool {
        let mut shared = self.shared();
        if shared.player.identity != Some(identity) {
            return false;
        }
        shared.player.x = x;
        shared.player.y = y;
        true
    }

    pub fn set_connected(&self, connected: bool) {
        self.shared().flags.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.shared().flags.connected
    }

    pub fn set_receiver_running(&self, running: bool) {
        self.shared().flags.receiver_running = running;
    }

    /// Raises the game-over flag if `identity` is the local player.
    pub fn mark_game_over(&self, identity: i32) -> bool {
        let mut shared = self.shared();
        if shared.player.identity != Some(identity) {
            return false;
        }
        shared.flags.game_over_for_local_player = true;
        true
    }

    /// Clears the game-over flag, returning whether it was set.
    pub fn take_game_over(&self) -> bool {
        std::mem::take(&mut self.shared().flags.game_over_for_local_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_defaults() {
        let state = SessionState::new();
        assert_eq!(state.local_identity(), None);
        assert_eq!(state.player(), PlayerMirror::default());
        assert_eq!(state.flags(), SessionFlags::default());
        assert!(state.pickups().is_empty());
    }

    #[test]
    fn test_position_requires_matching_identity() {
        let state = SessionState::new();

        assert!(!state.update_player_position(3, 10, 20));

        state.assign_identity(3);
        assert!(state.update_player_position(3, 10, 20));
        assert!(!state.update_player_position(9, 50, 60));

        let player = state.player();
        assert_eq!(player.identity, Some(3));
        assert_eq!((player.x, player.y), (10, 20));
    }

    #[test]
    fn test_game_over_only_for_local_player() {
        let state = SessionState::new();
        state.assign_identity(2);

        assert!(!state.mark_game_over(5));
        assert!(!state.flags().game_over_for_local_player);

        assert!(state.mark_game_over(2));
        assert!(state.flags().game_over_for_local_player);

        assert!(state.take_game_over());
        assert!(!state.take_game_over());
    }

    #[test]
    fn test_connection_flags() {
        let state = SessionState::new();
        state.set_connected(true);
        state.set_receiver_running(true);
        assert!(state.is_connected());
        assert!(state.flags().receiver_running);

        state.set_connected(false);
        assert!(!state.is_connected());
    }
}
