//! Configuration file commands.

use anyhow::{bail, Result};
use cogmem_core::Config;
use colored::Colorize;
use std::path::Path;

use crate::cli::{ConfigAction, ConfigCommand};

pub fn execute(cmd: ConfigCommand) -> Result<()> {
    let path = Config::config_path();
    match cmd.action {
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Show => show(),
        ConfigAction::Init { force } => init(&path, force),
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&redacted(config))?);
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(path)?;
    println!("{} {}", "✓ Wrote default config to".green(), path.display());
    Ok(())
}

fn redacted(mut config: Config) -> Config {
    if config.api_token.is_some() {
        config.api_token = Some("********".to_string());
    }
    config
}
