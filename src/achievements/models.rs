//! Achievement definition records

use serde::{Deserialize, Serialize};

/// An achievement together with its ordered levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    /// Levels ordered by level number (and therefore by threshold)
    pub levels: Vec<AchievementLevel>,
    // Timestamps (ms since epoch)
    pub created_at: i64,
    pub updated_at: i64,
}

/// One level of an achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementLevel {
    pub achievement_id: i64,
    pub level: i64,
    pub description: String,
    /// Cumulative progress required to complete this level
    pub threshold: i64,
}

/// Highest level of an achievement; `(0, 0)` when it has none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastLevel {
    pub level: i64,
    pub threshold: i64,
}

impl LastLevel {
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }
}
