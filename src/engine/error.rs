use std::path::PathBuf;

use thiserror::Error;

use crate::grimoire::roles::Category;

#[derive(Debug, Error)]
pub enum GrimoireError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("{role} is not a {expected:?} role")]
    WrongPool { role: String, expected: Category },

    #[error("the {0:?} pool is empty")]
    EmptyPool(Category),

    #[error("ran out of roles with {0} seats left to fill")]
    PoolExhausted(usize),

    #[error("a table needs at least 5 players, got {0}")]
    TooFewPlayers(usize),

    #[error("the roster can only change during setup")]
    NotInSetup,

    #[error("no player named {0}")]
    UnknownPlayer(String),

    #[error("a player named {0} already exists")]
    DuplicatePlayer(String),
}

pub type Result<T> = std::result::Result<T, GrimoireError>;
