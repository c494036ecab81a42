use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed action entry {0:?}")]
    MalformedAction(String),
    #[error("Unknown action kind {0:?}")]
    UnknownActionKind(String),
    #[error("Invalid cell id {0:?}")]
    InvalidCellId(String),
    #[error("Invalid elapsed time {0:?}")]
    InvalidElapsed(String),
    #[error("Invalid game data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid percent-encoding: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("Stored game can't be replayed: {0}")]
    Game(#[from] dailymines_core::GameError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage is unavailable")]
    Unavailable,
    #[error("Could not write {key}: {reason}")]
    Write { key: String, reason: String },
    #[error("Could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}
