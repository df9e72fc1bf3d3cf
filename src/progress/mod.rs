//! User progress: XP, badges and per-achievement progress
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  ProgressEngine  │────▶│  LevelSource     │  (achievement levels)
//! │ (one tx/update)  │     └──────────────────┘
//! └────────┬─────────┘
//!          │ &Transaction
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │  ledger (rows)   │     │  ProgressQuery   │  (read-only views)
//! └────────┬─────────┘     └────────┬─────────┘
//!          └───────────┬────────────┘
//!                      ▼
//!                 progress.db
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let manager = ProgressManager::open(&Config::load(None)?)?;
//!
//! let outcome = manager.engine().apply_progress(
//!     &ProgressUpdate::new("user-1").xp(50).badge("starter").achievement(3, 10),
//! )?;
//!
//! let top = manager.query().get_xp_leaderboard(10)?;
//! ```

mod badges;
mod engine;
pub mod ledger;
mod models;
mod queries;

pub use badges::BadgeCatalog;
pub use engine::ProgressEngine;
pub use models::{
    AchievementDelta, AchievementProgress, AchievementStanding, ApplyState, Badge,
    LeaderboardEntry, ProgressEvent, ProgressOutcome, ProgressUpdate, UserBadge,
};
pub use queries::ProgressQuery;

use anyhow::Result;

use crate::achievements::{AchievementCatalog, LevelLedger};
use crate::config::{BadgePolicy, Config};
use crate::store::ProgressDb;

/// Entry point tying the catalogs, the engine and the queries to one database
#[derive(Clone)]
pub struct ProgressManager {
    db: ProgressDb,
    policy: BadgePolicy,
}

impl ProgressManager {
    /// Open the database described by `config`
    pub fn open(config: &Config) -> Result<Self> {
        let db = ProgressDb::open_with(config)?;
        Ok(Self::with_db(db, config.engine.badge_policy))
    }

    pub fn with_db(db: ProgressDb, policy: BadgePolicy) -> Self {
        Self { db, policy }
    }

    pub fn catalog(&self) -> AchievementCatalog {
        AchievementCatalog::new(self.db.clone())
    }

    pub fn levels(&self) -> LevelLedger {
        LevelLedger::new(self.db.clone())
    }

    pub fn badges(&self) -> BadgeCatalog {
        BadgeCatalog::new(self.db.clone())
    }

    pub fn engine(&self) -> ProgressEngine {
        ProgressEngine::new(self.db.clone(), self.policy)
    }

    pub fn query(&self) -> ProgressQuery {
        ProgressQuery::new(self.db.clone())
    }
}
