//! Authoritative world state: fruit, players, scores and round timers.
//!
//! Nothing in here does I/O. Every mutation returns the [`Outgoing`] messages
//! it produced and the network layer decides how to deliver them.

use crate::error::ServerError;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::{
    ClientCommand, ServerMessage, PLAYER_SPAWN_X, PLAYER_SPAWN_Y, PLAYER_WIDTH, SCREEN_HEIGHT,
    SCREEN_WIDTH, WALK_SPEED,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Random spawn table: kind and points.
pub const FRUIT_KINDS: [(&str, i32); 3] = [("MANZANA", 10), ("BANANO", 20), ("MANGO", 50)];

// Keep random spawns away from the window edges
const SPAWN_MARGIN: i32 = 40;

/// One entry of a world file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitSpawn {
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub points: i32,
}

/// Reads a JSON array of [`FruitSpawn`]s.
pub fn load_world(path: &Path) -> Result<Vec<FruitSpawn>, ServerError> {
    let text = std::fs::read_to_string(path).map_err(|source| ServerError::WorldRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_world(&text)
}

pub fn parse_world(text: &str) -> Result<Vec<FruitSpawn>, ServerError> {
    Ok(serde_json::from_str(text)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fruit {
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub kind: String,
    pub points: i32,
}

impl Fruit {
    fn spawn_message(&self) -> ServerMessage {
        ServerMessage::SpawnFruit {
            id: self.id,
            x: self.x,
            y: self.y,
            kind: self.kind.clone(),
            value: self.points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Walk {
    #[default]
    Still,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub walk: Walk,
    pub score: i32,
    /// Time spent in the current round.
    pub round_time: Duration,
    pub game_over_sent: bool,
}

impl Player {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            x: PLAYER_SPAWN_X,
            y: PLAYER_SPAWN_Y,
            walk: Walk::Still,
            score: 0,
            round_time: Duration::ZERO,
            game_over_sent: false,
        }
    }

    fn walk_step(&mut self) {
        match self.walk {
            Walk::Still => return,
            Walk::Left => self.x -= WALK_SPEED,
            Walk::Right => self.x += WALK_SPEED,
        }
        self.x = self.x.clamp(0, SCREEN_WIDTH - PLAYER_WIDTH);
    }
}

/// A message and who should receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Broadcast(ServerMessage),
    To(i32, ServerMessage),
}

pub struct GameWorld {
    fruits: BTreeMap<i32, Fruit>,
    players: BTreeMap<i32, Player>,
    next_fruit_id: i32,
    /// Zero disables game over.
    round_length: Duration,
}

impl GameWorld {
    pub fn new(round_length: Duration) -> Self {
        Self {
            fruits: BTreeMap::new(),
            players: BTreeMap::new(),
            next_fruit_id: 1,
            round_length,
        }
    }

    pub fn add_player(&mut self, id: i32) -> Vec<Outgoing> {
        self.players.insert(id, Player::new(id));
        info!("Player {} joined", id);

        let mut out = vec![Outgoing::To(id, ServerMessage::AssignId { id })];
        out.extend(
            self.fruits
                .values()
                .map(|fruit| Outgoing::To(id, fruit.spawn_message())),
        );
        out
    }

    pub fn remove_player(&mut self, id: i32) -> bool {
        let removed = self.players.remove(&id).is_some();
        if removed {
            info!("Player {} left", id);
        }
        removed
    }

    pub fn spawn_fruit(&mut self, kind: &str, x: i32, y: i32, points: i32) -> Outgoing {
        let id = self.next_fruit_id;
        self.next_fruit_id += 1;

        let fruit = Fruit {
            id,
            x,
            y,
            kind: shared::truncate_kind(kind),
            points,
        };
        debug!("Spawned {} #{} at ({}, {})", fruit.kind, id, x, y);

        let message = fruit.spawn_message();
        self.fruits.insert(id, fruit);
        Outgoing::Broadcast(message)
    }

    pub fn spawn_random_fruit<R: Rng>(&mut self, rng: &mut R) -> Outgoing {
        let (kind, points) = FRUIT_KINDS[rng.gen_range(0..FRUIT_KINDS.len())];
        let x = rng.gen_range(SPAWN_MARGIN..SCREEN_WIDTH - SPAWN_MARGIN);
        let y = rng.gen_range(SPAWN_MARGIN * 2..SCREEN_HEIGHT - SPAWN_MARGIN * 2);
        self.spawn_fruit(kind, x, y, points)
    }

    pub fn apply_command(&mut self, id: i32, command: ClientCommand) -> Vec<Outgoing> {
        let Some(player) = self.players.get_mut(&id) else {
            return Vec::new();
        };

        match command {
            ClientCommand::MoveLeft => player.walk = Walk::Left,
            ClientCommand::MoveRight => player.walk = Walk::Right,
            ClientCommand::StopMoving => player.walk = Walk::Still,
            ClientCommand::Jump => debug!("Player {} jumped", id),
            ClientCommand::EatFruit {
                player_id,
                fruit_id,
            } => {
                if player_id != id {
                    debug!("Player {} tried to eat as {}", id, player_id);
                    return Vec::new();
                }
                return self.eat_fruit(id, fruit_id);
            }
        }
        Vec::new()
    }

    fn eat_fruit(&mut self, id: i32, fruit_id: i32) -> Vec<Outgoing> {
        let Some(fruit) = self.fruits.remove(&fruit_id) else {
            debug!("Fruit {} already gone", fruit_id);
            return Vec::new();
        };
        let Some(player) = self.players.get_mut(&id) else {
            return Vec::new();
        };

        player.score += fruit.points;
        info!(
            "Player {} ate {} #{} (+{}), score {}",
            id, fruit.kind, fruit_id, fruit.points, player.score
        );

        vec![
            Outgoing::Broadcast(ServerMessage::RemoveFruit { id: fruit_id }),
            Outgoing::Broadcast(ServerMessage::PlayerScore {
                id,
                value: player.score,
            }),
        ]
    }

    /// Advances every player by one tick.
    pub fn step(&mut self, dt: Duration) -> Vec<Outgoing> {
        let mut out = Vec::with_capacity(self.players.len());
        let round_length = self.round_length;

        for player in self.players.values_mut() {
            player.walk_step();
            out.push(Outgoing::Broadcast(ServerMessage::PlayerPos {
                id: player.id,
                x: player.x,
                y: player.y,
            }));

            if round_length.is_zero() || player.game_over_sent {
                continue;
            }
            player.round_time += dt;
            if player.round_time >= round_length {
                player.game_over_sent = true;
                info!("Round over for player {}", player.id);
                out.push(Outgoing::To(player.id, ServerMessage::GameOver { id: player.id }));
            }
        }

        out
    }

    /// Ends `id`'s round on operator request, even if its timer already did.
    pub fn end_round(&mut self, id: i32) -> Option<Outgoing> {
        let player = self.players.get_mut(&id)?;
        player.game_over_sent = true;
        info!("Operator ended the round for player {}", id);
        Some(Outgoing::To(id, ServerMessage::GameOver { id }))
    }

    pub fn player(&self, id: i32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn fruit(&self, id: i32) -> Option<&Fruit> {
        self.fruits.get(&id)
    }

    pub fn fruit_count(&self) -> usize {
        self.fruits.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
