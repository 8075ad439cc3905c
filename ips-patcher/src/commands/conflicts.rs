//! Dry-run conflict detection

use anyhow::{Context, Result};
use console::style;

use ips_patch::{ConflictReport, PatchFootprint, SelectionState, detect_footprint_conflicts};

use crate::context::PatcherContext;

/// Check the named patches against each other
///
/// Only footprints are kept, so payloads are released as soon as each
/// patch has been decoded.
pub fn check(context: &PatcherContext, names: &[&str]) -> Result<ConflictReport> {
    let footprints = names
        .iter()
        .map(|name| {
            context
                .patches()
                .open(name)
                .map(|patch| PatchFootprint::from(&patch))
                .with_context(|| format!("Error reading patch {name}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(detect_footprint_conflicts(&footprints))
}

/// Print a report, marking involved patches in the selection list
pub fn print_report(report: &ConflictReport, selection: &SelectionState, limit: usize) {
    println!(
        "{} {} conflicting bytes found in {} ranges. Showing first {}:",
        style("✗").red(),
        style(report.conflicting_bytes()).red().bold(),
        report.len(),
        limit.min(report.len())
    );
    for entry in report.iter().take(limit) {
        println!("  {entry}");
    }
    if report.len() > limit {
        println!("  ... (+{} more ranges)", report.len() - limit);
    }

    let involved = report.involved_patches();
    println!("\n{}", style("Selected patches").bold());
    for name in selection.ordered_included() {
        if involved.contains(name) {
            println!("  {} *", style(name).yellow());
        } else {
            println!("  {name}");
        }
    }
    println!(
        "Conflicting patches are marked with an asterisk. Consider reordering or excluding them."
    );
}

pub fn execute(context: &PatcherContext, limit: usize) -> Result<()> {
    let selection = context.load_selection()?;
    let names = selection.ordered_included();
    if names.is_empty() {
        println!("No patches selected for conflict check");
        return Ok(());
    }

    println!(
        "Running dry-run conflict detection for {} patches...",
        names.len()
    );
    let report = check(context, &names)?;

    if report.is_empty() {
        println!(
            "{} No conflicts detected for selected patches",
            style("✓").green()
        );
        return Ok(());
    }

    print_report(&report, &selection, limit);
    anyhow::bail!(
        "{} patches write overlapping bytes",
        report.involved_patches().len()
    )
}
