use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell is not on the board")]
    InvalidCell,
    #[error("Invalid board configuration")]
    InvalidConfig,
    #[error("Game not started, there is no board yet")]
    NotStarted,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Can't replay without at least one revealed cell")]
    MissingInitialReveal,
    #[error("No replay is loaded")]
    NotReplaying,
}

pub type Result<T> = core::result::Result<T, GameError>;
