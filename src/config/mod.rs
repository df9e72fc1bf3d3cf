//! Configuration loading and management

mod io;
mod settings;

pub use settings::{BadgePolicy, EngineSettings, LeaderboardSettings, StoreSettings};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Progress database settings
    #[serde(default)]
    pub store: StoreSettings,

    /// Progress update engine settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Leaderboard settings
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,
}

impl Config {
    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        if self.leaderboard.default_limit == 0 {
            bail!("leaderboard.default_limit must be at least 1");
        }
        Ok(())
    }
}
