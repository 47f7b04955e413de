//! # DonCEy Kong Jr Development Server
//!
//! A small authoritative server speaking the client's text line protocol. It
//! owns the fruit and the player positions; clients only send intent
//! (`MOVE_LEFT`, `EAT_FRUIT`, ...) and mirror what comes back.
//!
//! ## Architecture Design
//!
//! ### Task Layout
//! - **Accept loop** ([`network::GameServer::run`]): registers each connection
//!   with the [`client_manager::ClientManager`] and spawns its tasks.
//! - **Reader task** per client: decodes lines into
//!   [`network::GameEvent`]s for the game loop.
//! - **Writer task** per client: drains an unbounded channel of lines onto the
//!   socket. Dropping the client's sender closes the connection.
//! - **Game loop**: the only owner of the [`game::GameWorld`]. It applies
//!   events, ticks at a fixed rate and spawns fruit on a timer.
//! - **Console** (optional): [`console::read_console`] turns operator lines
//!   from stdin into [`network::GameEvent::Console`] events.
//!
//! ### Pure World Updates
//! [`game::GameWorld`] does no I/O. Each update returns the messages it
//! produced as [`game::Outgoing`] values, which the loop routes to one client
//! or to all of them.
//!
//! ## Protocol
//!
//! On connect a client receives `ASSIGN_ID <id>` followed by `SPAWN_FRUIT` for
//! every fruit already in play. After that it sees `PLAYER_POS` every tick,
//! `SPAWN_FRUIT` / `REMOVE_FRUIT` as fruit come and go, `PLAYER_SCORE` after a
//! successful `EAT_FRUIT`, and `GAME_OVER <id>` when its round ends.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{GameServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = GameServer::bind("127.0.0.1:9999", ServerConfig::default()).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod console;
pub mod error;
pub mod game;
pub mod network;
