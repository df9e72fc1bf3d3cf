//! Level ledger
//!
//! Owns the ordered level list of every achievement. Levels are always
//! numbered `1..N` with strictly increasing thresholds; [`LevelLedger::add_level`]
//! and [`LevelLedger::delete_level`] are the only operations that change the
//! structure and both keep that invariant inside one transaction.

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use super::models::{AchievementLevel, LastLevel};
use crate::error::{Constraint, ProgressError, Result, constraint_of};
use crate::store::{ProgressDb, now_ms};

/// Structural operations on achievement levels
#[derive(Clone)]
pub struct LevelLedger {
    db: ProgressDb,
}

impl LevelLedger {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    /// Append a level after the current highest one.
    ///
    /// The last-level read and the insert share one IMMEDIATE transaction,
    /// so concurrent callers cannot compute the same level number.
    pub fn add_level(
        &self,
        achievement_id: i64,
        description: &str,
        threshold: i64,
    ) -> Result<AchievementLevel> {
        if threshold <= 0 {
            return Err(ProgressError::InvalidThreshold(threshold));
        }

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let last = last_level(&tx, achievement_id)?;
        if threshold <= last.threshold {
            return Err(ProgressError::LowThreshold {
                threshold,
                current: last.threshold,
            });
        }

        let level = last.level + 1;
        let now = now_ms();
        tx.execute(
            r#"INSERT INTO achievement_levels
               (achievement_id, level, description, threshold, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?5)"#,
            params![achievement_id, level, description, threshold, now],
        )
        .map_err(|e| match constraint_of(&e) {
            Some(Constraint::Unique) => ProgressError::LevelExists {
                achievement_id,
                level,
            },
            _ => e.into(),
        })?;
        touch_achievement(&tx, achievement_id, now)?;
        tx.commit()?;

        debug!(achievement_id, level, threshold, "Added achievement level");
        Ok(AchievementLevel {
            achievement_id,
            level,
            description: description.to_string(),
            threshold,
        })
    }

    /// Delete one level and shift every higher level down by one.
    pub fn delete_level(&self, achievement_id: i64, level: i64) -> Result<()> {
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let deleted = tx.execute(
            "DELETE FROM achievement_levels WHERE achievement_id = ?1 AND level = ?2",
            params![achievement_id, level],
        )?;
        if deleted == 0 {
            return Err(ProgressError::AchievementLevelNotFound {
                achievement_id,
                level,
            });
        }

        // Ascending order: each target number has just been vacated
        let higher: Vec<i64> = {
            let mut stmt = tx.prepare(
                "SELECT level FROM achievement_levels WHERE achievement_id = ?1 AND level > ?2 ORDER BY level ASC",
            )?;
            let rows = stmt.query_map(params![achievement_id, level], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        let now = now_ms();
        {
            let mut stmt = tx.prepare(
                "UPDATE achievement_levels SET level = ?3, updated_at = ?4 WHERE achievement_id = ?1 AND level = ?2",
            )?;
            for old in &higher {
                stmt.execute(params![achievement_id, old, old - 1, now])?;
            }
        }
        touch_achievement(&tx, achievement_id, now)?;
        tx.commit()?;

        debug!(
            achievement_id,
            level,
            renumbered = higher.len(),
            "Deleted achievement level"
        );
        Ok(())
    }

    /// All levels of a live achievement, ascending by level number
    pub fn get_levels(&self, achievement_id: i64) -> Result<Vec<AchievementLevel>> {
        let conn = self.db.conn();
        load_levels(&conn, achievement_id)
    }

    /// Highest level and its threshold; `(0, 0)` when there are no levels yet
    pub fn get_last_level_and_threshold(&self, achievement_id: i64) -> Result<LastLevel> {
        let conn = self.db.conn();
        last_level(&conn, achievement_id)
    }
}

/// Read-only access to level definitions from inside an open transaction
pub trait LevelSource {
    /// Levels of a live achievement, ascending by level number
    fn levels(&self, conn: &Connection, achievement_id: i64) -> Result<Vec<AchievementLevel>>;
}

/// Reads levels from the progress database itself
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredLevels;

impl LevelSource for StoredLevels {
    fn levels(&self, conn: &Connection, achievement_id: i64) -> Result<Vec<AchievementLevel>> {
        load_levels(conn, achievement_id)
    }
}

/// Fail with `AchievementNotFound` unless the achievement exists and is not soft-deleted
pub(crate) fn ensure_live(conn: &Connection, achievement_id: i64) -> Result<()> {
    let found = conn
        .query_row(
            "SELECT 1 FROM achievements WHERE id = ?1 AND deleted_at IS NULL",
            [achievement_id],
            |_| Ok(()),
        )
        .optional()?;
    found.ok_or(ProgressError::AchievementNotFound(achievement_id))
}

pub(crate) fn load_levels(conn: &Connection, achievement_id: i64) -> Result<Vec<AchievementLevel>> {
    ensure_live(conn, achievement_id)?;
    let mut stmt = conn.prepare(
        r#"SELECT achievement_id, level, description, threshold
           FROM achievement_levels
           WHERE achievement_id = ?1
           ORDER BY level ASC"#,
    )?;
    let rows = stmt.query_map([achievement_id], |row| {
        Ok(AchievementLevel {
            achievement_id: row.get(0)?,
            level: row.get(1)?,
            description: row.get(2)?,
            threshold: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub(crate) fn last_level(conn: &Connection, achievement_id: i64) -> Result<LastLevel> {
    ensure_live(conn, achievement_id)?;
    let last = conn
        .query_row(
            r#"SELECT level, threshold FROM achievement_levels
               WHERE achievement_id = ?1
               ORDER BY level DESC LIMIT 1"#,
            [achievement_id],
            |row| {
                Ok(LastLevel {
                    level: row.get(0)?,
                    threshold: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(last.unwrap_or_default())
}

fn touch_achievement(conn: &Connection, achievement_id: i64, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE achievements SET updated_at = ?2 WHERE id = ?1",
        params![achievement_id, now],
    )?;
    Ok(())
}
