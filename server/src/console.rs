//! Operator console read from the server's stdin.
//!
//! ```text
//! spawn <kind> <x> <y> <points>   place a fruit
//! gameover <player-id>            end that player's round
//! status                          log player and fruit counts
//! ```

use crate::error::ServerError;
use crate::network::GameEvent;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;

const SPAWN_USAGE: &str = "usage: spawn <kind> <x> <y> <points>";
const GAME_OVER_USAGE: &str = "usage: gameover <player-id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    SpawnFruit {
        kind: String,
        x: i32,
        y: i32,
        points: i32,
    },
    GameOver {
        player_id: i32,
    },
    Status,
}

impl ConsoleCommand {
    /// Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ServerError> {
        let invalid = |reason: &'static str| ServerError::Console {
            line: line.trim().to_string(),
            reason,
        };

        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "spawn" => {
                let kind = parts.next().ok_or_else(|| invalid(SPAWN_USAGE))?;
                let (Some(x), Some(y), Some(points)) = (
                    number(parts.next()),
                    number(parts.next()),
                    number(parts.next()),
                ) else {
                    return Err(invalid(SPAWN_USAGE));
                };
                ConsoleCommand::SpawnFruit {
                    kind: kind.to_ascii_uppercase(),
                    x,
                    y,
                    points,
                }
            }
            "gameover" => {
                let player_id = number(parts.next()).ok_or_else(|| invalid(GAME_OVER_USAGE))?;
                ConsoleCommand::GameOver { player_id }
            }
            "status" => ConsoleCommand::Status,
            _ => return Err(invalid("unknown command")),
        };
        Ok(Some(command))
    }
}

fn number(field: Option<&str>) -> Option<i32> {
    field?.parse().ok()
}

/// Forwards console commands to the game loop until the input ends.
pub async fn read_console<R>(reader: R, events: UnboundedSender<GameEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match ConsoleCommand::parse(&line) {
                Ok(Some(command)) => {
                    if events.send(GameEvent::Console(command)).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            },
            Ok(None) => {
                info!("Console input closed");
                return;
            }
            Err(e) => {
                warn!("Console read error: {}", e);
                return;
            }
        }
    }
}
