//! Badge command implementation

use anyhow::Result;
use clap::Subcommand;

use super::Context;

#[derive(Subcommand)]
pub enum BadgeAction {
    /// Register a badge
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List registered badges
    List,
}

pub async fn badge_command(ctx: &Context, action: BadgeAction) -> Result<()> {
    let badges = ctx.manager.badges();

    match action {
        BadgeAction::Add { name, description } => {
            let badge = badges.insert_badge(&name, &description)?;
            ctx.emit(&badge, |b| println!("Registered badge '{}'", b.name))?;
        }
        BadgeAction::List => {
            let all = badges.get_all_badges()?;
            ctx.emit(&all, |list| {
                if list.is_empty() {
                    println!("No badges registered.");
                }
                for badge in list {
                    println!("  {:<24} {}", badge.name, badge.description);
                }
            })?;
        }
    }

    Ok(())
}
