pub mod achievement;
pub mod channel;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod invite;
pub mod io;
pub mod paths;
pub mod player;
pub mod quest;
pub mod reward;
pub mod snapshot;
pub mod types;
pub mod unlock;

pub use error::{LevelupError, Result};
