//! Request, response and row records for user progress

use serde::{Deserialize, Serialize};

/// A registered badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub description: String,
}

/// A badge granted to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadge {
    pub name: String,
    pub description: String,
    pub granted_at: i64,
}

/// Stored progress of one user on one achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub user_id: String,
    pub achievement_id: i64,
    /// Cumulative earned progress
    pub progress: i64,
    /// Working level; 0 when the achievement had no levels
    pub level: i64,
}

/// A user's standing on an achievement, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStanding {
    pub achievement_id: i64,
    pub name: String,
    pub level: i64,
    pub progress: i64,
    /// Threshold of the working level (None if the level no longer exists)
    pub level_threshold: Option<i64>,
    pub max_level: i64,
}

impl AchievementStanding {
    /// Progress toward the working level's threshold (0.0 - 1.0)
    pub fn fraction_to_threshold(&self) -> f32 {
        match self.level_threshold {
            Some(threshold) if threshold > 0 => {
                (self.progress as f32 / threshold as f32).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Every level of the achievement is complete
    pub fn is_maxed(&self) -> bool {
        self.max_level > 0
            && self.level == self.max_level
            && self
                .level_threshold
                .is_some_and(|threshold| self.progress >= threshold)
    }
}

/// One row of the XP leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    pub user_id: String,
    pub xp: i64,
}

/// Progress earned toward one achievement in a single update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDelta {
    pub achievement_id: i64,
    pub earned_delta: i64,
}

/// One "apply progress" request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub user_id: String,
    #[serde(default)]
    pub xp_delta: u32,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<AchievementDelta>,
}

impl ProgressUpdate {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn xp(mut self, delta: u32) -> Self {
        self.xp_delta = delta;
        self
    }

    pub fn badge(mut self, name: impl Into<String>) -> Self {
        self.badges.push(name.into());
        self
    }

    pub fn achievement(mut self, achievement_id: i64, earned_delta: i64) -> Self {
        self.achievements.push(AchievementDelta {
            achievement_id,
            earned_delta,
        });
        self
    }

    /// Nothing would be written
    pub fn is_noop(&self) -> bool {
        self.badges.is_empty() && self.xp_delta == 0 && self.achievements.is_empty()
    }
}

/// Stage an update has reached; `RolledBack` can follow any non-terminal stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyState {
    Started,
    BadgesApplied,
    XpApplied,
    AchievementsApplied,
    Committed,
    RolledBack,
}

impl ApplyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::BadgesApplied => "badges_applied",
            Self::XpApplied => "xp_applied",
            Self::AchievementsApplied => "achievements_applied",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Something that changed during an applied update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    BadgeGranted {
        badge: String,
    },
    XpAwarded {
        amount: u32,
        total: i64,
    },
    LevelChanged {
        achievement_id: i64,
        old_level: i64,
        new_level: i64,
    },
    ProgressRecorded {
        achievement_id: i64,
        progress: i64,
        level: i64,
    },
}

/// Result of a committed update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressOutcome {
    pub user_id: String,
    pub xp_total: i64,
    pub events: Vec<ProgressEvent>,
}

impl ProgressOutcome {
    /// Level changes in the order they happened
    pub fn level_changes(&self) -> impl Iterator<Item = (i64, i64, i64)> + '_ {
        self.events.iter().filter_map(|e| match e {
            ProgressEvent::LevelChanged {
                achievement_id,
                old_level,
                new_level,
            } => Some((*achievement_id, *old_level, *new_level)),
            _ => None,
        })
    }
}
