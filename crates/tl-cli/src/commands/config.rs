//! Config command
//!
//! Manage threadline configuration.

use anyhow::{Context as _, Result};
use clap::Subcommand;
use std::path::Path;

use tl_core::config::Config;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Print the configuration file path
    Path,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(config_path, json),
        ConfigCommand::Init { force } => init_config(config_path, force),
        ConfigCommand::Validate => validate_config(config_path),
        ConfigCommand::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn show_config(config_path: &Path, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if config_path.exists() {
        println!("{}", config_path.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults, no configuration file)".dimmed());
    }
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}

fn init_config(config_path: &Path, force: bool) -> Result<()> {
    use colored::Colorize;

    if config_path.exists() && !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite with defaults?", config_path.display()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Init cancelled.");
            return Ok(());
        }
    }

    Config::default()
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Wrote default configuration to {}",
        "✓".green(),
        config_path.display()
    );

    Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
    use colored::Colorize;

    if !config_path.exists() {
        eprintln!(
            "{} Configuration not found at {}, defaults apply",
            "⚠".yellow(),
            config_path.display()
        );
        return Ok(());
    }

    Config::load(config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    println!("{} Configuration is valid.", "✓".green());

    Ok(())
}
