//! `nrtk-sync status` — current metadata record and archive history.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use nrtk_core::Layout;
use nrtk_sync::{snapshot::SnapshotEntry, FsSnapshotStore, Publisher, SnapshotStore};

use crate::GlobalArgs;

/// Arguments for `nrtk-sync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let layout = global.settings()?.layout();
        let report = build_report(&layout)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(&report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    meta_path: String,
    content_dir: String,
    current: Option<CurrentJson>,
    /// Set when the current record exists but cannot be read.
    error: Option<String>,
    snapshots: Vec<SnapshotJson>,
}

#[derive(Debug, Serialize)]
struct CurrentJson {
    title: String,
    checksum: String,
    updated_at: String,
    stories: usize,
}

#[derive(Debug, Serialize)]
struct SnapshotJson {
    checksum: String,
    archived_at: Option<String>,
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "checksum")]
    checksum: String,
    #[tabled(rename = "archived at")]
    archived_at: String,
}

fn build_report(layout: &Layout) -> Result<StatusReport> {
    let store = FsSnapshotStore::new(Publisher::new(layout.clone()));

    // An unreadable record is reported, not fatal: the next sync republishes.
    let (current, error) = match store.load_current() {
        Ok(record) => (
            record.map(|r| CurrentJson {
                title: r.title,
                checksum: r.checksum,
                updated_at: r.updated_at.to_rfc3339(),
                stories: r.stories.len(),
            }),
            None,
        ),
        Err(err) => (None, Some(err.to_string())),
    };

    let snapshots = store
        .history()
        .context("failed to list archived snapshots")?
        .into_iter()
        .map(|entry: SnapshotEntry| SnapshotJson {
            checksum: entry.checksum,
            archived_at: entry.archived_at.map(|t| t.to_rfc3339()),
        })
        .collect();

    Ok(StatusReport {
        meta_path: layout.meta_path.display().to_string(),
        content_dir: layout.content_dir.display().to_string(),
        current,
        error,
        snapshots,
    })
}

fn print_table(report: &StatusReport) {
    println!(
        "nrtk-sync v{} | {} | {} archived",
        env!("CARGO_PKG_VERSION"),
        report.content_dir,
        report.snapshots.len(),
    );

    match (&report.current, &report.error) {
        (Some(current), _) => {
            println!(
                "{} '{}' {} ({} stories, updated {})",
                "■".green().bold(),
                current.title,
                current.checksum,
                current.stories,
                current.updated_at,
            );
        }
        (None, Some(error)) => {
            println!("{} {} unreadable: {error}", "■".red().bold(), report.meta_path);
            println!("Run 'nrtk-sync sync' to republish.");
        }
        (None, None) => {
            println!("{} never synced", "■".bright_black().bold());
        }
    }

    if report.snapshots.is_empty() {
        return;
    }
    let rows: Vec<SnapshotRow> = report
        .snapshots
        .iter()
        .map(|s| SnapshotRow {
            checksum: s.checksum.clone(),
            archived_at: s.archived_at.clone().unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
