//! SQLite database connection and schema management for progress data
//!
//! Manages the progress database with automatic schema migration.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::Config;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Shared handle to the progress database
#[derive(Clone)]
pub struct ProgressDb {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressDb {
    /// Open the database configured in `config`
    pub fn open_with(config: &Config) -> Result<Self> {
        let db = Self::open(&config.db_path())?;
        db.set_busy_timeout(config.store.busy_timeout())?;
        Ok(db)
    }

    /// Open or create the progress database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create db dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;

        // WAL lets readers proceed while an update transaction holds the write lock
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory progress db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Change how long statements wait on a locked database
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn().busy_timeout(timeout)?;
        Ok(())
    }

    /// Lock the connection.
    ///
    /// A panic while the lock was held cannot leave a transaction open
    /// (rusqlite rolls back on drop), so a poisoned lock is taken over.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current schema version
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.conn();
        let version =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| {
                r.get(0)
            })?;
        Ok(version)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to create progress schema")?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let version = self.schema_version()?;
        let conn = self.conn();

        // Migration 2: index backing the XP leaderboard
        if version < 2 {
            conn.execute_batch(
                r#"
                CREATE INDEX IF NOT EXISTS idx_user_xp_rank ON user_xp(xp DESC);
                INSERT OR REPLACE INTO schema_version VALUES (2);
                "#,
            )?;
            tracing::info!("Progress db migrated to schema version 2");
        }

        Ok(())
    }
}

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);

-- ============================================
-- ACHIEVEMENT DEFINITIONS
-- ============================================

CREATE TABLE IF NOT EXISTS achievements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    deleted_at INTEGER
);
-- Names are unique among live achievements only
CREATE UNIQUE INDEX IF NOT EXISTS idx_achievement_name
    ON achievements(name) WHERE deleted_at IS NULL;

-- Levels are numbered 1..N per achievement with increasing thresholds
CREATE TABLE IF NOT EXISTS achievement_levels (
    achievement_id INTEGER NOT NULL REFERENCES achievements(id),
    level INTEGER NOT NULL,
    description TEXT NOT NULL,
    threshold INTEGER NOT NULL CHECK (threshold > 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (achievement_id, level)
);

-- ============================================
-- BADGES
-- ============================================

CREATE TABLE IF NOT EXISTS badges (
    name TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS user_badges (
    user_id TEXT NOT NULL,
    badge TEXT NOT NULL REFERENCES badges(name),
    granted_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, badge)
);

-- ============================================
-- USER PROGRESS
-- ============================================

CREATE TABLE IF NOT EXISTS user_xp (
    user_id TEXT PRIMARY KEY,
    xp INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS user_achievement_progress (
    user_id TEXT NOT NULL,
    achievement_id INTEGER NOT NULL REFERENCES achievements(id),
    level INTEGER NOT NULL DEFAULT 0,
    progress INTEGER NOT NULL DEFAULT 0 CHECK (progress >= 0),
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, achievement_id)
);
"#;
