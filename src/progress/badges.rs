//! Badge catalog

use rusqlite::params;
use tracing::debug;

use super::models::Badge;
use crate::error::{Constraint, ProgressError, Result, constraint_of};
use crate::store::{ProgressDb, now_ms};

/// Registers badges independently of any user
#[derive(Clone)]
pub struct BadgeCatalog {
    db: ProgressDb,
}

impl BadgeCatalog {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    pub fn insert_badge(&self, name: &str, description: &str) -> Result<Badge> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProgressError::InvalidName(
                "badge name must not be empty".to_string(),
            ));
        }

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO badges (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![name, description, now_ms()],
        )
        .map_err(|e| match constraint_of(&e) {
            Some(Constraint::Unique) => ProgressError::BadgeExists(name.to_string()),
            _ => e.into(),
        })?;

        debug!(badge = name, "Registered badge");
        Ok(Badge {
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    /// All registered badges, ordered by name
    pub fn get_all_badges(&self) -> Result<Vec<Badge>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT name, description FROM badges ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Badge {
                name: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_list() {
        let badges = BadgeCatalog::new(ProgressDb::open_in_memory().unwrap());
        badges.insert_badge("starter", "Finished the first lesson").unwrap();
        badges.insert_badge("bookworm", "Read ten articles").unwrap();

        let names: Vec<String> = badges
            .get_all_badges()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["bookworm", "starter"]);
    }

    #[test]
    fn test_duplicate_badge() {
        let badges = BadgeCatalog::new(ProgressDb::open_in_memory().unwrap());
        badges.insert_badge("starter", "first").unwrap();
        assert!(matches!(
            badges.insert_badge("starter", "second"),
            Err(ProgressError::BadgeExists(name)) if name == "starter"
        ));
        assert!(matches!(badges.insert_badge(" ", "blank"), Err(ProgressError::InvalidName(_))));
    }
}
