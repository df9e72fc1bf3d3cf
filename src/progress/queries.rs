//! Read-only views over user progress

use rusqlite::params;

use super::ledger::xp_of;
use super::models::{AchievementStanding, LeaderboardEntry, UserBadge};
use crate::achievements::{LevelSource, StoredLevels, threshold_of};
use crate::error::Result;
use crate::store::ProgressDb;

/// Query interface for user progress
#[derive(Clone)]
pub struct ProgressQuery {
    db: ProgressDb,
}

impl ProgressQuery {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    /// Badges granted to a user, oldest first
    pub fn get_badges(&self, user_id: &str) -> Result<Vec<UserBadge>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT b.name, b.description, ub.granted_at
               FROM user_badges ub
               JOIN badges b ON b.name = ub.badge
               WHERE ub.user_id = ?1
               ORDER BY ub.granted_at ASC, b.name ASC"#,
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(UserBadge {
                name: row.get(0)?,
                description: row.get(1)?,
                granted_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Cumulative XP; 0 for a user who never earned any
    pub fn get_xp(&self, user_id: &str) -> Result<i64> {
        let conn = self.db.conn();
        xp_of(&conn, user_id)
    }

    /// Standing on every live achievement the user has progress on
    pub fn get_achievements(&self, user_id: &str) -> Result<Vec<AchievementStanding>> {
        let conn = self.db.conn();
        let rows: Vec<(i64, String, i64, i64)> = {
            let mut stmt = conn.prepare(
                r#"SELECT p.achievement_id, a.name, p.level, p.progress
                   FROM user_achievement_progress p
                   JOIN achievements a ON a.id = p.achievement_id
                   WHERE p.user_id = ?1 AND a.deleted_at IS NULL
                   ORDER BY p.achievement_id ASC"#,
            )?;
            let rows = stmt.query_map([user_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        rows.into_iter()
            .map(|(achievement_id, name, level, progress)| -> Result<AchievementStanding> {
                let levels = StoredLevels.levels(&conn, achievement_id)?;
                Ok(AchievementStanding {
                    achievement_id,
                    name,
                    level,
                    progress,
                    level_threshold: threshold_of(&levels, level),
                    max_level: levels.last().map(|l| l.level).unwrap_or(0),
                })
            })
            .collect()
    }

    /// Top users by XP. Rank is the 1-based row position; equal XP keeps store order.
    pub fn get_xp_leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        let conn = self.db.conn();
        let mut stmt =
            conn.prepare("SELECT user_id, xp FROM user_xp ORDER BY xp DESC LIMIT ?1")?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut entries = Vec::new();
        for (position, row) in rows.enumerate() {
            let (user_id, xp) = row?;
            entries.push(LeaderboardEntry {
                rank: position as u32 + 1,
                user_id,
                xp,
            });
        }
        Ok(entries)
    }
}
