//! Configuration file I/O operations

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.learnquest/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".learnquest")
    }

    /// Get the global config file path (~/.learnquest/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Database file to open: the configured path, or ~/.learnquest/progress.db
    pub fn db_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, ~/.learnquest/config.toml is
    /// used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let global_path = Self::global_config_path();
        if global_path.exists() {
            return Self::from_file(&global_path);
        }

        tracing::debug!("No config at {}, using defaults", global_path.display());
        Ok(Self::default())
    }

    /// Validate and write the configuration to `path`.
    ///
    /// The TOML goes to `<path>.tmp`, which is held under an exclusive lock
    /// while it is written and synced, then renamed over `path`. A second
    /// writer finding the temp file locked fails instead of interleaving.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }

        let temp_path = path.with_extension("toml.tmp");
        let mut temp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&temp_path)
            .with_context(|| format!("Failed to open {}", temp_path.display()))?;
        temp.try_lock_exclusive()
            .with_context(|| format!("Config {} is being written by another process", path.display()))?;

        temp.set_len(0)?;
        temp.write_all(content.as_bytes())?;
        temp.sync_all()?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace config: {}", path.display()))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }
}
