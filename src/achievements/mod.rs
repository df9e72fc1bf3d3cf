//! Achievement definitions: the catalog of achievements and their level ledger
//!
//! Achievements are defined by administrators as an ordered sequence of
//! levels with strictly increasing thresholds.

mod catalog;
mod levels;
mod models;
mod placement;

pub use catalog::AchievementCatalog;
pub use levels::{LevelLedger, LevelSource, StoredLevels};
pub use models::{Achievement, AchievementLevel, LastLevel};
pub use placement::{threshold_of, working_level};
