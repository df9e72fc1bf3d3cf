//! Working level placement
//!
//! The working level is the level a user is progressing toward, not the
//! highest level already completed.

use super::models::AchievementLevel;

/// Working level for `progress` over `levels` sorted by ascending level number.
///
/// Returns the first level whose threshold is still above `progress`. Once
/// every threshold is met the highest level is returned, and an achievement
/// without levels yields 0.
pub fn working_level(levels: &[AchievementLevel], progress: i64) -> i64 {
    levels
        .iter()
        .find(|l| l.threshold > progress)
        .or_else(|| levels.last())
        .map(|l| l.level)
        .unwrap_or(0)
}

/// Threshold of `level`, if the achievement has it
pub fn threshold_of(levels: &[AchievementLevel], level: i64) -> Option<i64> {
    levels.iter().find(|l| l.level == level).map(|l| l.threshold)
}
