//! Init command implementation

use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

use learnquest::config::Config;

/// Write the default configuration
pub async fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save_to_file(&path)?;
    info!("Created {}", path.display());
    println!("Created {}", path.display());
    Ok(())
}
