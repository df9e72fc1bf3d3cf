//! Progress update engine
//!
//! Applies one [`ProgressUpdate`] (badges, XP and achievement deltas) as a
//! single transaction:
//!
//! ```text
//! Started ──▶ BadgesApplied ──▶ XpApplied ──▶ AchievementsApplied ──▶ Committed
//!    │              │               │                  │
//!    └──────────────┴───────────────┴──────────────────┴──▶ RolledBack
//! ```
//!
//! The transaction begins IMMEDIATE, so the store's write lock is held before
//! any baseline is read and the working level is never computed from a stale
//! progress value.

use rusqlite::{Transaction, TransactionBehavior};
use tracing::{debug, warn};

use super::ledger::{
    add_badges, add_xp, get_achievement_progress, upsert_achievement_progress, xp_of,
};
use super::models::{ApplyState, ProgressEvent, ProgressOutcome, ProgressUpdate};
use crate::achievements::{LevelSource, StoredLevels, working_level};
use crate::config::BadgePolicy;
use crate::error::{ProgressError, Result};
use crate::store::ProgressDb;

/// Orchestrates progress updates. Holds no state beyond one in-flight transaction.
#[derive(Clone)]
pub struct ProgressEngine<S = StoredLevels> {
    db: ProgressDb,
    levels: S,
    policy: BadgePolicy,
}

impl ProgressEngine<StoredLevels> {
    pub fn new(db: ProgressDb, policy: BadgePolicy) -> Self {
        Self::with_level_source(db, StoredLevels, policy)
    }
}

impl<S: LevelSource> ProgressEngine<S> {
    /// Engine reading level definitions through `levels`
    pub fn with_level_source(db: ProgressDb, levels: S, policy: BadgePolicy) -> Self {
        Self { db, levels, policy }
    }

    /// Apply an update atomically.
    ///
    /// Any failure rolls the whole update back and is returned unchanged.
    pub fn apply_progress(&self, update: &ProgressUpdate) -> Result<ProgressOutcome> {
        let user_id = update.user_id.as_str();
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut state = ApplyState::Started;
        let outcome = match self.apply_steps(&tx, update, &mut state) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(user_id, error = %rollback_err, "Rollback of progress update failed");
                }
                debug!(
                    user_id,
                    failed_after = state.as_str(),
                    state = ApplyState::RolledBack.as_str(),
                    error = %err,
                    "Progress update rolled back"
                );
                return Err(err);
            }
        };

        if let Err(commit_err) = tx.commit() {
            // Dropping the failed transaction already attempted a rollback;
            // a connection still inside a transaction means that failed too.
            if !conn.is_autocommit() {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    warn!(user_id, error = %rollback_err, "Rollback after failed commit failed");
                }
            }
            debug!(user_id, state = ApplyState::RolledBack.as_str(), error = %commit_err, "Progress commit failed");
            return Err(commit_err.into());
        }

        debug!(
            user_id,
            state = ApplyState::Committed.as_str(),
            events = outcome.events.len(),
            "Progress update committed"
        );
        Ok(outcome)
    }

    fn apply_steps(
        &self,
        tx: &Transaction<'_>,
        update: &ProgressUpdate,
        state: &mut ApplyState,
    ) -> Result<ProgressOutcome> {
        let user_id = update.user_id.as_str();
        let mut events = Vec::new();

        match self.policy {
            BadgePolicy::Required if update.badges.is_empty() => {
                return Err(ProgressError::BadgeNotProvided);
            }
            BadgePolicy::Optional if update.is_noop() => {
                return Err(ProgressError::EmptyUpdate(update.user_id.clone()));
            }
            _ => {}
        }

        add_badges(tx, user_id, &update.badges)?;
        events.extend(update.badges.iter().map(|badge| ProgressEvent::BadgeGranted {
            badge: badge.clone(),
        }));
        *state = ApplyState::BadgesApplied;
        debug!(user_id, count = update.badges.len(), state = state.as_str(), "Badges granted");

        let xp_total = if update.xp_delta > 0 || self.policy == BadgePolicy::Required {
            add_xp(tx, user_id, update.xp_delta)?
        } else {
            xp_of(tx, user_id)?
        };
        if update.xp_delta > 0 {
            events.push(ProgressEvent::XpAwarded {
                amount: update.xp_delta,
                total: xp_total,
            });
        }
        *state = ApplyState::XpApplied;
        debug!(user_id, xp_total, state = state.as_str(), "XP applied");

        for delta in &update.achievements {
            let achievement_id = delta.achievement_id;
            let prior = get_achievement_progress(tx, user_id, achievement_id)?;
            let (prior_progress, prior_level) =
                prior.map(|p| (p.progress, p.level)).unwrap_or((0, 0));

            let levels = self.levels.levels(tx, achievement_id)?;
            let new_progress = prior_progress.saturating_add(delta.earned_delta);
            let new_level = working_level(&levels, new_progress);

            let progress = upsert_achievement_progress(
                tx,
                user_id,
                achievement_id,
                delta.earned_delta,
                new_level,
            )?;

            if new_level != prior_level {
                events.push(ProgressEvent::LevelChanged {
                    achievement_id,
                    old_level: prior_level,
                    new_level,
                });
            }
            events.push(ProgressEvent::ProgressRecorded {
                achievement_id,
                progress,
                level: new_level,
            });
        }
        *state = ApplyState::AchievementsApplied;
        debug!(
            user_id,
            count = update.achievements.len(),
            state = state.as_str(),
            "Achievement progress applied"
        );

        Ok(ProgressOutcome {
            user_id: update.user_id.clone(),
            xp_total,
            events,
        })
    }
}
