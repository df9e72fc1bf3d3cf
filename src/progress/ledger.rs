//! Progress ledger primitives
//!
//! Writers take the caller's open [`Transaction`] and never begin, commit or
//! roll back themselves; the progress engine owns that lifecycle. Every
//! increment is a single additive statement so concurrent writers cannot lose
//! an update.

use rusqlite::{Connection, OptionalExtension, Transaction, params};

use super::models::AchievementProgress;
use crate::error::{Constraint, ProgressError, Result, constraint_of};
use crate::store::now_ms;

/// Grant badges to a user, one row per badge.
///
/// A badge the user already holds fails with `UserHasBadge`, an unregistered
/// one with `BadgeNotExists`. Rows written before the failure stay inside the
/// caller's transaction and go away with its rollback.
pub fn add_badges(tx: &Transaction<'_>, user_id: &str, badges: &[String]) -> Result<()> {
    let now = now_ms();
    let mut stmt =
        tx.prepare("INSERT INTO user_badges (user_id, badge, granted_at) VALUES (?1, ?2, ?3)")?;
    for badge in badges {
        stmt.execute(params![user_id, badge, now])
            .map_err(|e| match constraint_of(&e) {
                Some(Constraint::Unique) => ProgressError::UserHasBadge {
                    user_id: user_id.to_string(),
                    badge: badge.clone(),
                },
                Some(Constraint::ForeignKey) => ProgressError::BadgeNotExists(badge.clone()),
                _ => e.into(),
            })?;
    }
    Ok(())
}

/// Add `delta` to the user's XP, creating the row on first use.
/// Returns the new total.
pub fn add_xp(tx: &Transaction<'_>, user_id: &str, delta: u32) -> Result<i64> {
    let total = tx.query_row(
        r#"INSERT INTO user_xp (user_id, xp, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(user_id) DO UPDATE SET
               xp = xp + excluded.xp, updated_at = excluded.updated_at
           RETURNING xp"#,
        params![user_id, delta, now_ms()],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Stored XP of a user, 0 when the user has none
pub fn xp_of(conn: &Connection, user_id: &str) -> Result<i64> {
    let xp = conn
        .query_row("SELECT xp FROM user_xp WHERE user_id = ?1", [user_id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(xp.unwrap_or(0))
}

/// Current progress record, or None when the user never earned progress on
/// the achievement
pub fn get_achievement_progress(
    conn: &Connection,
    user_id: &str,
    achievement_id: i64,
) -> Result<Option<AchievementProgress>> {
    let record = conn
        .query_row(
            r#"SELECT user_id, achievement_id, progress, level
               FROM user_achievement_progress
               WHERE user_id = ?1 AND achievement_id = ?2"#,
            params![user_id, achievement_id],
            |row| {
                Ok(AchievementProgress {
                    user_id: row.get(0)?,
                    achievement_id: row.get(1)?,
                    progress: row.get(2)?,
                    level: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

/// Add `earned_delta` to the stored progress and overwrite the working level.
/// Returns the new cumulative progress.
///
/// An existing row is updated in place so a negative delta is checked against
/// the stored total; the first delta for a pair inserts the row.
pub fn upsert_achievement_progress(
    tx: &Transaction<'_>,
    user_id: &str,
    achievement_id: i64,
    earned_delta: i64,
    new_level: i64,
) -> Result<i64> {
    let classify = |e: rusqlite::Error| match constraint_of(&e) {
        Some(Constraint::Check) => ProgressError::NegativeProgress { achievement_id },
        Some(Constraint::ForeignKey) => ProgressError::AchievementNotFound(achievement_id),
        _ => e.into(),
    };
    let now = now_ms();

    let updated = tx
        .query_row(
            r#"UPDATE user_achievement_progress
               SET progress = progress + ?3, level = ?4, updated_at = ?5
               WHERE user_id = ?1 AND achievement_id = ?2
               RETURNING progress"#,
            params![user_id, achievement_id, earned_delta, new_level, now],
            |row| row.get(0),
        )
        .optional()
        .map_err(classify)?;
    if let Some(progress) = updated {
        return Ok(progress);
    }

    tx.execute(
        r#"INSERT INTO user_achievement_progress (user_id, achievement_id, level, progress, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
        params![user_id, achievement_id, new_level, earned_delta, now],
    )
    .map_err(classify)?;
    Ok(earned_delta)
}
