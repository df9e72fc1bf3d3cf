//! Progress database
//!
//! All achievement, badge and progress rows live in one SQLite database.
//! [`ProgressDb`] is cheap to clone; clones share one connection behind a mutex.

mod db;

pub use db::ProgressDb;

use chrono::Utc;

/// Current timestamp in milliseconds since the epoch
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
