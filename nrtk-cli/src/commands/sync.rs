//! `nrtk-sync sync` — fetch the feed and publish it if it changed.

use anyhow::{Context, Result};
use clap::Args;

use nrtk_core::{FeedSource, Layout};
use nrtk_sync::{
    pipeline::{self, SyncOptions},
    ArchiveOutcome, SyncReport, SyncStatus, WriteResult,
};

use crate::fetch::fetch;
use crate::GlobalArgs;

/// Arguments for `nrtk-sync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Republish even when the feed checksum is unchanged.
    #[arg(long)]
    pub force: bool,

    /// Report what would be written without touching the output tree.
    #[arg(long)]
    pub dry_run: bool,

    /// Repeat every N milliseconds until Ctrl-C (0 runs once).
    #[arg(long, value_name = "MS")]
    pub every: Option<u64>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let mut settings = global.settings()?;
        if self.force {
            settings.force = true;
        }
        if let Some(ms) = self.every {
            settings.interval_ms = ms;
        }

        let layout = settings.layout();
        let source = settings.source().context("invalid feed source")?;
        let options = SyncOptions {
            force: settings.force,
            dry_run: self.dry_run,
        };

        let Some(interval) = settings.interval() else {
            let report = attempt(&source, &layout, options)?;
            print_report(&report, options.dry_run);
            return Ok(());
        };

        let stats = nrtk_daemon::start_blocking(interval, move || {
            attempt(&source, &layout, options)
                .map(|report| print_report(&report, options.dry_run))
                .map_err(|err| format!("{err:#}"))
        })
        .context("repeat loop failed")?;
        println!(
            "stopped after {} attempt(s), {} failed",
            stats.attempts, stats.failures
        );
        Ok(())
    }
}

fn attempt(source: &FeedSource, layout: &Layout, options: SyncOptions) -> Result<SyncReport> {
    let raw = fetch(source)?;
    pipeline::run(layout, &raw, options).context("sync failed")
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let site = &report.site_name;

    if report.status == SyncStatus::Skipped {
        println!(
            "{prefix}· '{site}' nothing to update ({})",
            short(&report.checksum)
        );
        return;
    }

    println!(
        "{prefix}✓ '{site}' published {} artifacts, {} stories ({}, {})",
        report.writes.len(),
        report.story_count,
        report.reason,
        short(&report.checksum),
    );

    match &report.archived {
        Some(ArchiveOutcome::Archived(write)) => print_write(write),
        Some(ArchiveOutcome::AlreadyArchived { path }) => {
            println!("  ·  {} (already archived)", path.display())
        }
        None => {}
    }
    for write in &report.writes {
        print_write(write);
    }
    for failure in &report.failures {
        println!(
            "  ✗  {} {}: {}",
            failure.kind,
            failure.path.display(),
            failure.error
        );
    }
}

fn print_write(write: &WriteResult) {
    match write {
        WriteResult::Written { path } => println!("  ✎  {}", path.display()),
        WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
    }
}

fn short(checksum: &str) -> &str {
    checksum.get(..12).unwrap_or(checksum)
}
