//! Achievement catalog - identity CRUD over achievements

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::levels::{LevelLedger, load_levels};
use super::models::Achievement;
use crate::error::{Constraint, ProgressError, Result, constraint_of};
use crate::store::{ProgressDb, now_ms};

/// Create, rename, soft-delete and read achievements
#[derive(Clone)]
pub struct AchievementCatalog {
    db: ProgressDb,
}

impl AchievementCatalog {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    /// Level operations on the same database
    pub fn levels(&self) -> LevelLedger {
        LevelLedger::new(self.db.clone())
    }

    /// Create an achievement without levels
    pub fn create(&self, name: &str) -> Result<Achievement> {
        let name = normalize_name(name)?;
        let now = now_ms();

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO achievements (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )
        .map_err(|e| name_conflict(e, &name))?;
        let id = conn.last_insert_rowid();

        debug!(id, name = %name, "Created achievement");
        Ok(Achievement {
            id,
            name,
            levels: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&self, id: i64, new_name: &str) -> Result<()> {
        let name = normalize_name(new_name)?;

        let conn = self.db.conn();
        let updated = conn
            .execute(
                "UPDATE achievements SET name = ?2, updated_at = ?3 WHERE id = ?1 AND deleted_at IS NULL",
                params![id, name, now_ms()],
            )
            .map_err(|e| name_conflict(e, &name))?;
        if updated == 0 {
            return Err(ProgressError::AchievementNotFound(id));
        }

        debug!(id, name = %name, "Renamed achievement");
        Ok(())
    }

    /// Mark an achievement deleted. Its rows, levels and user progress stay.
    pub fn soft_delete(&self, id: i64) -> Result<()> {
        let now = now_ms();
        let conn = self.db.conn();
        let updated = conn.execute(
            "UPDATE achievements SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![id, now],
        )?;
        if updated == 0 {
            return Err(ProgressError::AchievementNotFound(id));
        }

        debug!(id, "Soft-deleted achievement");
        Ok(())
    }

    /// A live achievement with its ordered levels
    pub fn get(&self, id: i64) -> Result<Achievement> {
        let conn = self.db.conn();
        let achievement = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM achievements WHERE id = ?1 AND deleted_at IS NULL",
                [id],
                map_achievement,
            )
            .optional()?
            .ok_or(ProgressError::AchievementNotFound(id))?;
        with_levels(&conn, achievement)
    }

    /// Every live achievement, ordered by id
    pub fn get_all(&self) -> Result<Vec<Achievement>> {
        let conn = self.db.conn();
        let achievements: Vec<Achievement> = {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, updated_at FROM achievements WHERE deleted_at IS NULL ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], map_achievement)?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        achievements
            .into_iter()
            .map(|a| with_levels(&conn, a))
            .collect()
    }
}

fn map_achievement(row: &rusqlite::Row<'_>) -> rusqlite::Result<Achievement> {
    Ok(Achievement {
        id: row.get(0)?,
        name: row.get(1)?,
        levels: Vec::new(),
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn with_levels(conn: &Connection, mut achievement: Achievement) -> Result<Achievement> {
    achievement.levels = load_levels(conn, achievement.id)?;
    Ok(achievement)
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProgressError::InvalidName(
            "achievement name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn name_conflict(err: rusqlite::Error, name: &str) -> ProgressError {
    match constraint_of(&err) {
        Some(Constraint::Unique) => ProgressError::AchievementNameExists(name.to_string()),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AchievementCatalog {
        AchievementCatalog::new(ProgressDb::open_in_memory().unwrap())
    }

    #[test]
    fn test_create_and_get() {
        let catalog = catalog();
        let created = catalog.create("  Streak ").unwrap();
        assert_eq!(created.name, "Streak");

        catalog.levels().add_level(created.id, "d1", 5).unwrap();
        let fetched = catalog.get(created.id).unwrap();
        assert_eq!(fetched.name, "Streak");
        assert_eq!(fetched.levels.len(), 1);
    }

    #[test]
    fn test_duplicate_name() {
        let catalog = catalog();
        catalog.create("Streak").unwrap();
        assert!(matches!(
            catalog.create("Streak"),
            Err(ProgressError::AchievementNameExists(name)) if name == "Streak"
        ));
    }

    #[test]
    fn test_rename_conflict_and_missing() {
        let catalog = catalog();
        let a = catalog.create("Streak").unwrap();
        let b = catalog.create("Explorer").unwrap();

        assert!(matches!(
            catalog.rename(b.id, "Streak"),
            Err(ProgressError::AchievementNameExists(_))
        ));
        assert!(matches!(
            catalog.rename(42, "Other"),
            Err(ProgressError::AchievementNotFound(42))
        ));

        catalog.rename(a.id, "Daily Streak").unwrap();
        assert_eq!(catalog.get(a.id).unwrap().name, "Daily Streak");
    }

    #[test]
    fn test_empty_name_rejected() {
        let catalog = catalog();
        assert!(matches!(catalog.create("   "), Err(ProgressError::InvalidName(_))));
    }

    #[test]
    fn test_soft_delete_hides_and_frees_name() {
        let catalog = catalog();
        let a = catalog.create("Streak").unwrap();
        catalog.soft_delete(a.id).unwrap();

        assert!(matches!(catalog.get(a.id), Err(ProgressError::AchievementNotFound(_))));
        assert!(matches!(catalog.soft_delete(a.id), Err(ProgressError::AchievementNotFound(_))));
        assert!(matches!(catalog.rename(a.id, "X"), Err(ProgressError::AchievementNotFound(_))));
        assert!(catalog.get_all().unwrap().is_empty());

        let again = catalog.create("Streak").unwrap();
        assert_ne!(again.id, a.id);
    }
}
