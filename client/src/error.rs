//! Error types for the client's network layer.
//!
//! None of these are fatal to the process. A [`ConnectError`] drops the game
//! into offline mode and a [`NetError`] either loses one command or ends the
//! receiver loop.

use std::io;
use thiserror::Error;

/// Failure to establish the session's TCP connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid server address {address}")]
    AddressInvalid { address: String },

    #[error("could not reach {address}: {source}")]
    Unreachable {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("socket setup failed: {0}")]
    SocketInitFailed(#[source] io::Error),
}

/// Failure on an established connection.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("send failed: {0}")]
    SendFailed(#[source] io::Error),

    #[error("receive failed: {0}")]
    RecvFailed(#[source] io::Error),

    #[error("connection is closed")]
    Closed,
}
