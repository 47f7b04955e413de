//! # DonCEy Kong Jr Client Library
//!
//! Client runtime for the arcade game: a TCP session with the authoritative
//! server, a background receiver that mirrors server state into memory, and a
//! small screen state machine driven once per frame.
//!
//! ## Architecture Overview
//!
//! Two threads share one [`session::SessionState`]:
//!
//! - The **receiver thread** ([`receiver`]) blocks on the socket, decodes each
//!   line with [`shared::ServerMessage::decode`] and applies it to the pickup
//!   registry, player mirror and session flags.
//! - The **frame thread** runs [`controller::GameController::tick`], which
//!   reads the same state, handles input, sends commands and renders.
//!
//! The server owns all positions. The only local prediction is pickup
//! consumption: a click removes the pickup and adds its value to the score
//! immediately, then `EAT_FRUIT` tells the server, which confirms with
//! `REMOVE_FRUIT`.
//!
//! ## Module Organization
//!
//! ### Transport (`connection`, `network`, `receiver`)
//! - Address resolution and connect with typed errors
//! - Newline framing with a maximum line length
//! - Receiver thread lifecycle and graceful shutdown
//!
//! ### State (`registry`, `session`)
//! - Fixed-capacity pickup table behind a single lock
//! - Player mirror and connection flags
//!
//! ### Presentation (`input`, `screen`, `rendering`, `controller`)
//! - Edge-detected input sampling
//! - Main menu, player, spectator and game over screens
//! - Drawing through the [`rendering::Canvas`] trait
//!
//! ## Failure Model
//!
//! Networking never takes the process down. A failed connect leaves the game
//! offline; a failed send is logged and the command dropped; a broken stream
//! stops the receiver for good and the game carries on locally.
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::controller::GameController;
//! use client::input::FrameInput;
//! use client::rendering::MacroquadCanvas;
//!
//! let mut controller = GameController::new();
//! if let Err(e) = controller.connect("127.0.0.1", 9999) {
//!     eprintln!("playing offline: {}", e);
//! }
//!
//! let mut canvas = MacroquadCanvas;
//! controller.tick(&FrameInput::default(), &mut canvas);
//! controller.shutdown();
//! ```

pub mod connection;
pub mod controller;
pub mod error;
pub mod input;
pub mod network;
pub mod receiver;
pub mod registry;
pub mod rendering;
pub mod screen;
pub mod session;
