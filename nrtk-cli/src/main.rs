//! nrtk-sync — publish a content feed as static files, only when it changed.
//!
//! # Usage
//!
//! ```text
//! nrtk-sync sync [--force] [--dry-run] [--every <ms>] [--json-logs]
//! nrtk-sync diff
//! nrtk-sync status [--json]
//! ```
//!
//! Settings come from `nrtk.yaml`, then `.env`, then the environment, then
//! the global flags below.

mod commands;
mod fetch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{diff::DiffArgs, status::StatusArgs, sync::SyncArgs};
use nrtk_core::{
    config::{CONFIG_FILE, ENV_FILE},
    Settings,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "nrtk-sync",
    version,
    about = "Publish a content feed as static files when it changes",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the feed and publish it if it changed.
    Sync(SyncArgs),

    /// Show unified diffs of what a publish would change on disk.
    Diff(DiffArgs),

    /// Show the current metadata record and archived snapshots.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Global settings overrides
// ---------------------------------------------------------------------------

/// Flags layered over `nrtk.yaml`, `.env` and the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Settings file.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Env file applied before the process environment.
    #[arg(long, global = true, default_value = ENV_FILE)]
    pub env_file: PathBuf,

    /// Root for metadata, snapshots and (by default) content.
    #[arg(long, global = true)]
    pub app_dir: Option<PathBuf>,

    /// Where stories, the error page and the sitemap are written.
    #[arg(long, global = true)]
    pub content_dir: Option<PathBuf>,

    /// Where superseded metadata records are archived.
    #[arg(long, global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Current metadata record location.
    #[arg(long, global = true)]
    pub meta_path: Option<PathBuf>,

    /// Suffix for story and error page files, e.g. `.html`.
    #[arg(long, global = true)]
    pub extension: Option<String>,

    /// Fetch the feed over HTTP instead of reading a local file.
    #[arg(long, global = true)]
    pub remote: bool,

    /// Feed endpoint for remote mode.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Token sent as `Authorization: Token <token>`.
    #[arg(long, global = true)]
    pub api_token: Option<String>,

    /// Local feed file.
    #[arg(long = "local", global = true)]
    pub local_path: Option<PathBuf>,
}

impl GlobalArgs {
    /// Resolve settings: file, env file, environment, then these flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load_at(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        settings
            .apply_env_file(&self.env_file)
            .with_context(|| format!("failed to apply {}", self.env_file.display()))?;
        settings
            .apply_env()
            .context("invalid environment override")?;

        if let Some(dir) = &self.app_dir {
            settings.app_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.content_dir {
            settings.content_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.snapshot_dir {
            settings.snapshot_dir = Some(dir.clone());
        }
        if let Some(path) = &self.meta_path {
            settings.meta_path = Some(path.clone());
        }
        if let Some(ext) = &self.extension {
            settings.extension = Some(ext.clone());
        }
        if self.remote {
            settings.remote = true;
        }
        if let Some(url) = &self.api_url {
            settings.api_url = Some(url.clone());
        }
        if let Some(token) = &self.api_token {
            settings.api_token = Some(token.clone());
        }
        if let Some(path) = &self.local_path {
            settings.local_path = Some(path.clone());
        }
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let json_logs = matches!(&cli.command, Commands::Sync(args) if args.json_logs);
    nrtk_daemon::init_tracing(json_logs);

    match cli.command {
        Commands::Sync(args) => args.run(&cli.global),
        Commands::Diff(args) => args.run(&cli.global),
        Commands::Status(args) => args.run(&cli.global),
    }
}
