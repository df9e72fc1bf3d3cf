//! Achievement command implementation

use anyhow::Result;
use clap::Subcommand;

use learnquest::achievements::Achievement;

use super::Context;

#[derive(Subcommand)]
pub enum AchievementAction {
    /// Create an achievement
    Create {
        /// Unique achievement name
        name: String,
    },
    /// Rename an achievement
    Rename { id: i64, name: String },
    /// Soft-delete an achievement
    Delete { id: i64 },
    /// Show one achievement with its levels
    Show { id: i64 },
    /// List all achievements
    List,
}

pub async fn achievement_command(ctx: &Context, action: AchievementAction) -> Result<()> {
    let catalog = ctx.manager.catalog();

    match action {
        AchievementAction::Create { name } => {
            let achievement = catalog.create(&name)?;
            ctx.emit(&achievement, |a| println!("Created achievement #{} '{}'", a.id, a.name))?;
        }
        AchievementAction::Rename { id, name } => {
            catalog.rename(id, &name)?;
            let achievement = catalog.get(id)?;
            ctx.emit(&achievement, |a| println!("Renamed achievement #{} to '{}'", a.id, a.name))?;
        }
        AchievementAction::Delete { id } => {
            catalog.soft_delete(id)?;
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                println!("Deleted achievement #{}", id)
            })?;
        }
        AchievementAction::Show { id } => {
            let achievement = catalog.get(id)?;
            ctx.emit(&achievement, print_achievement)?;
        }
        AchievementAction::List => {
            let achievements = catalog.get_all()?;
            ctx.emit(&achievements, |list| {
                if list.is_empty() {
                    println!("No achievements defined.");
                }
                for achievement in list {
                    print_achievement(achievement);
                }
            })?;
        }
    }

    Ok(())
}

fn print_achievement(achievement: &Achievement) {
    println!(
        "#{} {} ({} levels)",
        achievement.id,
        achievement.name,
        achievement.levels.len()
    );
    for level in &achievement.levels {
        println!(
            "    L{:<3} {:>8}  {}",
            level.level, level.threshold, level.description
        );
    }
}
