use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read world file {}", path.display())]
    WorldRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid world file")]
    WorldFormat(#[from] serde_json::Error),

    #[error("invalid console command {line:?}: {reason}")]
    Console { line: String, reason: &'static str },
}
