//! Text line protocol spoken between client and server.
//!
//! Every message is one ASCII line: a command name followed by space separated
//! fields. Decoding is deliberately forgiving. A line whose prefix is unknown,
//! or whose fields do not parse, decodes to `None` and is simply skipped by
//! the caller.

use crate::truncate_kind;
use std::fmt;
use std::str::SplitWhitespace;

/// Messages pushed by the server to every client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    AssignId {
        id: i32,
    },
    PlayerPos {
        id: i32,
        x: i32,
        y: i32,
    },
    SpawnFruit {
        id: i32,
        x: i32,
        y: i32,
        kind: String,
        value: i32,
    },
    RemoveFruit {
        id: i32,
    },
    PlayerScore {
        id: i32,
        value: i32,
    },
    GameOver {
        id: i32,
    },
}

/// Commands sent by a client to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    MoveLeft,
    MoveRight,
    StopMoving,
    Jump,
    EatFruit { player_id: i32, fruit_id: i32 },
}

struct Fields<'a>(SplitWhitespace<'a>);

impl<'a> Fields<'a> {
    fn new(rest: &'a str) -> Self {
        Self(rest.split_whitespace())
    }

    fn int(&mut self) -> Option<i32> {
        self.0.next()?.parse().ok()
    }

    fn word(&mut self) -> Option<&'a str> {
        self.0.next()
    }
}

impl ServerMessage {
    /// Decodes one received line.
    ///
    /// Matching is by prefix, so `ASSIGN_ID7` still yields identity 7. Trailing
    /// fields beyond the ones a command needs are ignored. `SPAWN_FRUIT` accepts
    /// a missing value field and treats it as zero.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("ASSIGN_ID") {
            let mut fields = Fields::new(rest);
            return Some(ServerMessage::AssignId { id: fields.int()? });
        }

        if let Some(rest) = line.strip_prefix("PLAYER_POS") {
            let mut fields = Fields::new(rest);
            return Some(ServerMessage::PlayerPos {
                id: fields.int()?,
                x: fields.int()?,
                y: fields.int()?,
            });
        }

        if let Some(rest) = line.strip_prefix("SPAWN_FRUIT") {
            let mut fields = Fields::new(rest);
            let id = fields.int()?;
            let x = fields.int()?;
            let y = fields.int()?;
            let kind = truncate_kind(fields.word()?);
            let value = fields.int().unwrap_or(0);
            return Some(ServerMessage::SpawnFruit {
                id,
                x,
                y,
                kind,
                value,
            });
        }

        if let Some(rest) = line.strip_prefix("REMOVE_FRUIT") {
            let mut fields = Fields::new(rest);
            return Some(ServerMessage::RemoveFruit { id: fields.int()? });
        }

        if let Some(rest) = line.strip_prefix("PLAYER_SCORE") {
            let mut fields = Fields::new(rest);
            return Some(ServerMessage::PlayerScore {
                id: fields.int()?,
                value: fields.int()?,
            });
        }

        if let Some(rest) = line.strip_prefix("GAME_OVER") {
            let mut fields = Fields::new(rest);
            return Some(ServerMessage::GameOver { id: fields.int()? });
        }

        None
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::AssignId { id } => write!(f, "ASSIGN_ID {}", id),
            ServerMessage::PlayerPos { id, x, y } => write!(f, "PLAYER_POS {} {} {}", id, x, y),
            ServerMessage::SpawnFruit {
                id,
                x,
                y,
                kind,
                value,
            } => write!(f, "SPAWN_FRUIT {} {} {} {} {}", id, x, y, kind, value),
            ServerMessage::RemoveFruit { id } => write!(f, "REMOVE_FRUIT {}", id),
            ServerMessage::PlayerScore { id, value } => write!(f, "PLAYER_SCORE {} {}", id, value),
            ServerMessage::GameOver { id } => write!(f, "GAME_OVER {}", id),
        }
    }
}

impl ClientCommand {
    /// Decodes a command line received by the server. Keywords are case-insensitive.
    pub fn decode(line: &str) -> Option<Self> {
        let mut fields = Fields::new(line);
        let keyword = fields.word()?.to_ascii_uppercase();

        match keyword.as_str() {
            "MOVE_LEFT" => Some(ClientCommand::MoveLeft),
            "MOVE_RIGHT" => Some(ClientCommand::MoveRight),
            "STOP_MOVING" => Some(ClientCommand::StopMoving),
            "JUMP" => Some(ClientCommand::Jump),
            "EAT_FRUIT" => Some(ClientCommand::EatFruit {
                player_id: fields.int()?,
                fruit_id: fields.int()?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCommand::MoveLeft => f.write_str("MOVE_LEFT"),
            ClientCommand::MoveRight => f.write_str("MOVE_RIGHT"),
            ClientCommand::StopMoving => f.write_str("STOP_MOVING"),
            ClientCommand::Jump => f.write_str("JUMP"),
            ClientCommand::EatFruit {
                player_id,
                fruit_id,
            } => write!(f, "EAT_FRUIT {} {}", player_id, fruit_id),
        }
    }
}
