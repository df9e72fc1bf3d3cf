//! Shared test utilities for progress database tests

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use learnquest::config::{BadgePolicy, Config};
use learnquest::progress::ProgressManager;

/// A manager backed by a database in a fresh temp dir.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn create_test_manager(policy: BadgePolicy) -> (TempDir, ProgressManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = open_manager(&temp_dir.path().join("progress.db"), policy);
    (temp_dir, manager)
}

/// A manager with its own connection to the database at `db_path`
pub fn open_manager(db_path: &Path, policy: BadgePolicy) -> ProgressManager {
    let mut config = Config::default();
    config.store.path = Some(db_path.to_path_buf());
    config.engine.badge_policy = policy;
    ProgressManager::open(&config).expect("Failed to open progress db")
}

/// Create an achievement with one level per threshold ("d1", "d2", ...)
pub fn create_achievement(manager: &ProgressManager, name: &str, thresholds: &[i64]) -> i64 {
    let achievement = manager
        .catalog()
        .create(name)
        .expect("Failed to create achievement");
    for (i, threshold) in thresholds.iter().enumerate() {
        manager
            .levels()
            .add_level(achievement.id, &format!("d{}", i + 1), *threshold)
            .expect("Failed to add level");
    }
    achievement.id
}

pub fn register_badges(manager: &ProgressManager, names: &[&str]) {
    for name in names {
        manager
            .badges()
            .insert_badge(name, &format!("{name} badge"))
            .expect("Failed to register badge");
    }
}

/// (level, threshold) pairs in level order
pub fn level_numbering(manager: &ProgressManager, achievement_id: i64) -> Vec<(i64, i64)> {
    manager
        .levels()
        .get_levels(achievement_id)
        .expect("Failed to load levels")
        .into_iter()
        .map(|l| (l.level, l.threshold))
        .collect()
}

/// Levels are numbered 1..N and thresholds strictly increase
pub fn assert_contiguous(manager: &ProgressManager, achievement_id: i64) {
    let levels = level_numbering(manager, achievement_id);
    for (i, (level, _)) in levels.iter().enumerate() {
        assert_eq!(*level, i as i64 + 1, "gap in level numbering: {levels:?}");
    }
    for pair in levels.windows(2) {
        assert!(pair[0].1 < pair[1].1, "thresholds not increasing: {levels:?}");
    }
}
