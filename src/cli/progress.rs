//! Progress, user and leaderboard commands

use anyhow::Result;
use serde::Serialize;

use learnquest::progress::{
    AchievementDelta, AchievementStanding, ProgressEvent, ProgressUpdate, UserBadge,
};

use super::Context;

/// Parse `ID:DELTA` (e.g. `3:10`) into an achievement delta
pub fn parse_delta(s: &str) -> Result<AchievementDelta, String> {
    let (id, delta) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ID:DELTA, got '{}'", s))?;
    let achievement_id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid achievement id '{}': {}", id, e))?;
    let earned_delta = delta
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid delta '{}': {}", delta, e))?;
    Ok(AchievementDelta {
        achievement_id,
        earned_delta,
    })
}

pub async fn apply_command(
    ctx: &Context,
    user: String,
    xp: u32,
    badges: Vec<String>,
    achievements: Vec<AchievementDelta>,
) -> Result<()> {
    let update = ProgressUpdate {
        user_id: user,
        xp_delta: xp,
        badges,
        achievements,
    };

    let outcome = ctx.manager.engine().apply_progress(&update)?;
    ctx.emit(&outcome, |o| {
        println!("Applied progress for {} (XP total {})", o.user_id, o.xp_total);
        for event in &o.events {
            match event {
                ProgressEvent::BadgeGranted { badge } => println!("  + badge {}", badge),
                ProgressEvent::XpAwarded { amount, total } => {
                    println!("  + {} XP (now {})", amount, total)
                }
                ProgressEvent::LevelChanged {
                    achievement_id,
                    old_level,
                    new_level,
                } => println!(
                    "  achievement #{}: level {} -> {}",
                    achievement_id, old_level, new_level
                ),
                ProgressEvent::ProgressRecorded {
                    achievement_id,
                    progress,
                    level,
                } => println!(
                    "  achievement #{}: progress {} (working level {})",
                    achievement_id, progress, level
                ),
            }
        }
    })
}

#[derive(Serialize)]
struct UserReport {
    user_id: String,
    xp: i64,
    badges: Vec<UserBadge>,
    achievements: Vec<AchievementStanding>,
}

pub async fn user_command(ctx: &Context, user: &str) -> Result<()> {
    let query = ctx.manager.query();
    let report = UserReport {
        user_id: user.to_string(),
        xp: query.get_xp(user)?,
        badges: query.get_badges(user)?,
        achievements: query.get_achievements(user)?,
    };

    ctx.emit(&report, |r| {
        println!("{}: {} XP", r.user_id, r.xp);
        println!("Badges ({}):", r.badges.len());
        for badge in &r.badges {
            println!("  {:<24} {}", badge.name, badge.description);
        }
        println!("Achievements ({}):", r.achievements.len());
        for a in &r.achievements {
            let threshold = a
                .level_threshold
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  #{} {:<20} level {}/{}  {}/{} ({:.0}%){}",
                a.achievement_id,
                a.name,
                a.level,
                a.max_level,
                a.progress,
                threshold,
                a.fraction_to_threshold() * 100.0,
                if a.is_maxed() { "  maxed" } else { "" }
            );
        }
    })
}

pub async fn leaderboard_command(ctx: &Context, limit: Option<u32>) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config.leaderboard.default_limit);
    let entries = ctx.manager.query().get_xp_leaderboard(limit)?;

    ctx.emit(&entries, |list| {
        if list.is_empty() {
            println!("No XP recorded yet.");
        }
        for entry in list {
            println!("{:>4}. {:<24} {:>8} XP", entry.rank, entry.user_id, entry.xp);
        }
    })
}
