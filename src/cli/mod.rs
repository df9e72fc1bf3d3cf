//! CLI command implementations

pub mod achievement;
pub mod badge;
pub mod init;
pub mod level;
pub mod progress;

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use learnquest::config::Config;
use learnquest::progress::ProgressManager;

/// Everything a command needs: loaded config, open database, output mode
pub struct Context {
    pub config: Config,
    pub manager: ProgressManager,
    pub json: bool,
}

impl Context {
    pub fn load(config_path: Option<&Path>, db: Option<PathBuf>, json: bool) -> Result<Self> {
        let mut config = Config::load(config_path)?;
        if let Some(db) = db {
            config.store.path = Some(db);
        }
        let manager = ProgressManager::open(&config)
            .with_context(|| format!("Failed to open {}", config.db_path().display()))?;
        Ok(Self {
            config,
            manager,
            json,
        })
    }

    /// Print `value` as JSON, or run `text` for human output
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}
