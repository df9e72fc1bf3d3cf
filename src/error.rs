//! Error taxonomy for the achievement and progress ledgers
//!
//! Every operation in the crate returns [`ProgressError`]. Store failures that
//! are not recognised as a domain condition pass through unchanged as
//! [`ProgressError::Store`].

use rusqlite::ErrorCode;

// SQLite extended result codes for constraint failures
const SQLITE_CONSTRAINT_CHECK: i32 = 275;
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Error type for achievement, level, badge and progress operations
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Achievement {0} not found")]
    AchievementNotFound(i64),

    #[error("Level {level} of achievement {achievement_id} not found")]
    AchievementLevelNotFound { achievement_id: i64, level: i64 },

    #[error("Badge '{0}' is not registered")]
    BadgeNotExists(String),

    #[error("An achievement named '{0}' already exists")]
    AchievementNameExists(String),

    #[error("Level {level} of achievement {achievement_id} already exists")]
    LevelExists { achievement_id: i64, level: i64 },

    #[error("User '{user_id}' already has badge '{badge}'")]
    UserHasBadge { user_id: String, badge: String },

    #[error("Threshold {threshold} must exceed the current highest threshold {current}")]
    LowThreshold { threshold: i64, current: i64 },

    #[error("Badge '{0}' already exists")]
    BadgeExists(String),

    #[error("Threshold must be positive, got {0}")]
    InvalidThreshold(i64),

    #[error("At least one badge must be provided")]
    BadgeNotProvided,

    #[error("Progress update for user '{0}' changes nothing")]
    EmptyUpdate(String),

    #[error("Progress for achievement {achievement_id} would become negative")]
    NegativeProgress { achievement_id: i64 },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Coarse classification of a [`ProgressError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Store,
}

impl ProgressError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AchievementNotFound(_)
            | Self::AchievementLevelNotFound { .. }
            | Self::BadgeNotExists(_) => ErrorKind::NotFound,
            Self::AchievementNameExists(_)
            | Self::LevelExists { .. }
            | Self::UserHasBadge { .. }
            | Self::LowThreshold { .. }
            | Self::BadgeExists(_) => ErrorKind::Conflict,
            Self::InvalidThreshold(_)
            | Self::BadgeNotProvided
            | Self::EmptyUpdate(_)
            | Self::NegativeProgress { .. }
            | Self::InvalidName(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProgressError>;

/// Which constraint a failed statement tripped over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
    Unique,
    ForeignKey,
    Check,
}

/// Classify a store error as a constraint violation, if it is one
pub(crate) fn constraint_of(err: &rusqlite::Error) -> Option<Constraint> {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation {
        return None;
    }
    match failure.extended_code {
        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => Some(Constraint::Unique),
        SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
        SQLITE_CONSTRAINT_CHECK => Some(Constraint::Check),
        _ => None,
    }
}
