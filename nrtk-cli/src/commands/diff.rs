//! `nrtk-sync diff` — show unified diffs for what a publish would write.

use anyhow::{Context, Result};
use clap::Args;

use nrtk_sync::diff::diff_payload;

use crate::fetch::fetch;
use crate::GlobalArgs;

/// Arguments for `nrtk-sync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = global.settings()?;
        let layout = settings.layout();
        let raw = fetch(&settings.source().context("invalid feed source")?)?;

        let diffs = diff_payload(&raw, &layout).context("diff failed")?;
        if diffs.is_empty() {
            println!("No differences in {}.", layout.content_dir.display());
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
