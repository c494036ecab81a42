//! Storage and sharing formats for finished games, plus the key-value
//! persistence used for preferences and the leaderboard.

pub use codec::*;
pub use error::*;
pub use leaderboard::*;
pub use preferences::*;
pub use share::*;
pub use store::*;
pub use stored::*;

mod codec;
mod error;
mod leaderboard;
mod preferences;
mod share;
mod store;
mod stored;
