//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod post;
pub mod show;
pub mod watch;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tl_core::config::{Config, DEFAULT_CONFIG_PATH};
use tl_storage::FileSystemStorage;

/// threadline - threaded comment sections
#[derive(Debug, Parser)]
#[command(name = "threadline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Comment store directory
    #[arg(long, global = true, env = "THREADLINE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Post a comment or a reply
    Post(post::PostArgs),

    /// Show the comment tree of a post
    Show(show::ShowArgs),

    /// Keep a post's comment tree on screen, refreshing periodically
    Watch(watch::WatchArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Settings resolved from global flags and the configuration file
pub struct Context {
    /// Loaded configuration
    pub config: Config,
    /// Where the configuration was loaded from
    pub config_path: PathBuf,
    /// Store directory override from the command line
    pub data_dir: Option<PathBuf>,
}

impl Context {
    /// Load the configuration and keep the store override
    pub fn load(config_path: &Path, data_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            config: load_config(config_path)?,
            config_path: config_path.to_path_buf(),
            data_dir,
        })
    }

    /// Open the comment store: flag, then config, then platform default
    pub fn open_storage(&self) -> Result<FileSystemStorage> {
        let dir = self
            .data_dir
            .clone()
            .or_else(|| self.config.storage.data_dir.clone());

        let storage = match dir {
            Some(dir) => FileSystemStorage::new(&dir)
                .with_context(|| format!("Failed to open comment store at {}", dir.display()))?,
            None => FileSystemStorage::default_location()
                .context("Failed to open default comment store")?,
        };
        tracing::debug!("Using comment store at {:?}", storage.base_dir());
        Ok(storage)
    }
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    // Dispatch to command handler; config commands must work with a broken config file
    match cli.command {
        Commands::Config(cmd) => config::execute(cmd, &config_path),
        Commands::Post(args) => post::execute(args, &Context::load(&config_path, cli.data_dir)?),
        Commands::Show(args) => show::execute(args, &Context::load(&config_path, cli.data_dir)?),
        Commands::Watch(args) => watch::execute(args, &Context::load(&config_path, cli.data_dir)?),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
