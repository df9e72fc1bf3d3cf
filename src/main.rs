use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::achievement::AchievementAction;
use cli::badge::BadgeAction;
use cli::level::LevelAction;
use learnquest::progress::AchievementDelta;

#[derive(Parser)]
#[command(name = "learnquest")]
#[command(about = "Achievement levels, badges and XP progress for learning platforms")]
#[command(version)]
struct Cli {
    /// Path to the progress database (overrides the config file)
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    /// Path to the config file (defaults to ~/.learnquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ~/.learnquest/config.toml (or the --config path)
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Manage achievements
    Achievement {
        #[command(subcommand)]
        action: AchievementAction,
    },

    /// Add or delete achievement levels
    Level {
        #[command(subcommand)]
        action: LevelAction,
    },

    /// Manage the badge catalog
    Badge {
        #[command(subcommand)]
        action: BadgeAction,
    },

    /// Apply a progress update for a user
    Apply {
        /// User receiving the progress
        #[arg(short, long)]
        user: String,

        /// XP earned
        #[arg(long, default_value_t = 0)]
        xp: u32,

        /// Badge to grant (repeatable)
        #[arg(short, long = "badge")]
        badges: Vec<String>,

        /// Achievement progress as ID:DELTA (repeatable)
        #[arg(short, long = "achievement", value_parser = cli::progress::parse_delta)]
        achievements: Vec<AchievementDelta>,
    },

    /// Show a user's XP, badges and achievements
    User {
        /// User to show
        user: String,
    },

    /// Show the XP leaderboard
    Leaderboard {
        /// Number of entries (defaults to leaderboard.default_limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let load = || cli::Context::load(cli.config.as_deref(), cli.db.clone(), cli.json);

    match cli.command {
        Commands::Init { force } => cli::init::init_command(cli.config.as_deref(), force).await?,
        Commands::Achievement { action } => {
            cli::achievement::achievement_command(&load()?, action).await?
        }
        Commands::Level { action } => cli::level::level_command(&load()?, action).await?,
        Commands::Badge { action } => cli::badge::badge_command(&load()?, action).await?,
        Commands::Apply {
            user,
            xp,
            badges,
            achievements,
        } => cli::progress::apply_command(&load()?, user, xp, badges, achievements).await?,
        Commands::User { user } => cli::progress::user_command(&load()?, &user).await?,
        Commands::Leaderboard { limit } => {
            cli::progress::leaderboard_command(&load()?, limit).await?
        }
    }

    Ok(())
}
