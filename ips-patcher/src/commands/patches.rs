//! Patch listing and inspection

use anyhow::Result;
use console::style;
use prettytable::row;
use std::path::Path;

use ips_patch::{PatchFile, PatchInfo};

use crate::context::PatcherContext;
use crate::utils::{create_table, format_bytes, format_offset};

pub fn execute_list(context: &PatcherContext) -> Result<()> {
    let names = context.list_patches()?;
    let selection = context.load_selection()?;

    println!(
        "Found {} patches in {}",
        style(names.len()).green(),
        style(context.patches().root().display()).cyan()
    );
    if names.is_empty() {
        return Ok(());
    }

    let mut table = create_table(vec!["#", "Use", "Patch", "Records", "Bytes", "Highest"]);
    for (position, entry) in selection.entries().iter().enumerate() {
        let marker = if entry.included { "x" } else { " " };
        match context.patches().open(&entry.name) {
            Ok(patch) => {
                let info = PatchInfo::of(&patch);
                table.add_row(row![
                    position + 1,
                    marker,
                    style(&entry.name).cyan(),
                    info.record_count,
                    format_bytes(info.total_bytes_written),
                    format_offset(info.highest_end.saturating_sub(1))
                ]);
            }
            // Unreadable patches stay listed; the error is shown inline.
            Err(e) => {
                log::warn!("{e}");
                table.add_row(row![
                    position + 1,
                    marker,
                    style(&entry.name).red(),
                    "-",
                    "-",
                    style("unreadable").red()
                ]);
            }
        }
    }
    table.printstd();

    Ok(())
}

pub fn execute_info(path: &Path) -> Result<()> {
    if !path.is_file() {
        println!("Patch file missing: {}", path.display());
        return Ok(());
    }

    // Informational: a bad patch is reported, not treated as a failure.
    let patch = match PatchFile::open(path) {
        Ok(patch) => patch,
        Err(e) => {
            println!(
                "{} Error reading patch {}: {e}",
                style("✗").red(),
                path.display()
            );
            return Ok(());
        }
    };

    let info = PatchInfo::of(&patch);
    println!("\n{}", style("IPS Patch Information").bold().underlined());
    print!("{info}");

    let runs = patch.records().iter().filter(|r| r.is_run_length()).count();
    println!(
        "Literal records: {}, RLE records: {}",
        style(info.record_count - runs).green(),
        style(runs).green()
    );
    if info.highest_end > 0 {
        println!(
            "Writes up to: {} (images shorter than {} bytes grow)",
            style(format_offset(info.highest_end - 1)).yellow(),
            info.highest_end
        );
    }

    Ok(())
}
