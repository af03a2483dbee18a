//! Table setups: roster size, seed and the enabled role pools.
//! Loaded from TOML for the CLI and the arena.

use std::path::Path;

use serde::Deserialize;

use crate::engine::error::{GrimoireError, Result};
use crate::grimoire::assignment::{RolePools, MIN_PLAYERS};
use crate::grimoire::roles::RoleTemplate;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_players")]
    pub players: usize,
    pub seed: Option<u64>,
    /// Codenames to draw from; the built-in list when empty.
    #[serde(default)]
    pub names: Vec<String>,
}

fn default_players() -> usize {
    7
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            seed: None,
            names: vec![],
        }
    }
}

/// Enabled roles per category. A missing list means the whole category.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PoolConfig {
    pub villagers: Option<Vec<String>>,
    pub outsiders: Option<Vec<String>>,
    pub werewolves: Option<Vec<String>>,
    pub minions: Option<Vec<String>>,
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SetupFile {
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub pools: PoolConfig,
}

impl SetupFile {
    /// Resolve the pool lists against the role catalog.
    pub fn to_pools(&self) -> Result<RolePools> {
        let defaults = RolePools::default();
        let names = |listed: &Option<Vec<String>>, fallback: &[&'static RoleTemplate]| {
            listed
                .clone()
                .unwrap_or_else(|| fallback.iter().map(|r| r.name.to_string()).collect())
        };
        RolePools::from_names(
            &names(&self.pools.villagers, &defaults.villagers),
            &names(&self.pools.outsiders, &defaults.outsiders),
            &names(&self.pools.werewolves, &defaults.werewolves),
            &names(&self.pools.minions, &defaults.minions),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.players < MIN_PLAYERS {
            return Err(GrimoireError::TooFewPlayers(self.table.players));
        }
        self.to_pools().map(|_| ())
    }
}

/// Load a table setup from a TOML file at the given path.
pub fn load_setup(path: &Path) -> Result<SetupFile> {
    let content = std::fs::read_to_string(path).map_err(|source| GrimoireError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let setup: SetupFile = toml::from_str(&content).map_err(|source| GrimoireError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    setup.validate()?;
    Ok(setup)
}

/// Try well-known paths, falling back to the built-in setup if none load.
pub fn load_default_setup() -> SetupFile {
    let candidates = [
        "grimoire.toml",
        "../grimoire.toml",
        "/etc/grimoire/grimoire.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_setup(p) {
                Ok(setup) => {
                    tracing::info!(path = %p.display(), players = setup.table.players, "loaded table setup");
                    return setup;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load table setup");
                }
            }
        }
    }
    tracing::info!("no grimoire.toml found, using built-in defaults");
    SetupFile::default()
}
