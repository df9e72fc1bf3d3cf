//! Level command implementation

use anyhow::Result;
use clap::Subcommand;

use super::Context;

#[derive(Subcommand)]
pub enum LevelAction {
    /// Append a level to an achievement
    Add {
        /// Achievement ID
        achievement: i64,
        /// Cumulative progress required to complete the level
        #[arg(short, long)]
        threshold: i64,
        /// Level description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a level; higher levels move down by one
    Delete {
        /// Achievement ID
        achievement: i64,
        /// Level number
        level: i64,
    },
}

pub async fn level_command(ctx: &Context, action: LevelAction) -> Result<()> {
    let ledger = ctx.manager.levels();

    match action {
        LevelAction::Add {
            achievement,
            threshold,
            description,
        } => {
            let level = ledger.add_level(achievement, &description, threshold)?;
            ctx.emit(&level, |l| {
                println!(
                    "Added level {} (threshold {}) to achievement #{}",
                    l.level, l.threshold, l.achievement_id
                )
            })?;
        }
        LevelAction::Delete { achievement, level } => {
            ledger.delete_level(achievement, level)?;
            let levels = ledger.get_levels(achievement)?;
            ctx.emit(&levels, |remaining| {
                println!(
                    "Deleted level {} of achievement #{} ({} remaining)",
                    level,
                    achievement,
                    remaining.len()
                )
            })?;
        }
    }

    Ok(())
}
