//! learnquest - achievements, badges and XP for learning platforms
//!
//! Administrators define achievements as ordered levels with strictly
//! increasing thresholds. As users complete learning activities, callers
//! submit progress updates that grant badges, add XP and advance achievement
//! progress; each update is applied as one transaction and recomputes the
//! level every touched achievement is working toward.
//!
//! ## Components
//!
//! - [`achievements`]: the achievement catalog and the level ledger that
//!   keeps levels numbered `1..N` with increasing thresholds.
//! - [`progress`]: the progress ledger, the update engine and read-only
//!   views such as the XP leaderboard.
//! - [`store`]: the SQLite database shared by both.

pub mod achievements;
pub mod config;
pub mod error;
pub mod progress;
pub mod store;

pub use error::{ErrorKind, ProgressError};
