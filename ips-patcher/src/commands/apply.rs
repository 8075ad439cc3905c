//! Apply the selected patches to a base ROM

use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

use ips_patch::apply_patches;

use crate::cli::ApplyArgs;
use crate::commands::conflicts;
use crate::commands::rom::RomIdentity;
use crate::context::PatcherContext;
use crate::utils::{create_progress_bar, format_bytes, format_coverage};

/// Extension given to outputs when neither they nor the base ROM have one
const DEFAULT_EXTENSION: &str = "gba";

/// Give `output` the base ROM's extension when it has none
fn output_path(output: &Path, rom: &Path) -> PathBuf {
    if output.extension().is_some() {
        return output.to_path_buf();
    }
    let extension = rom
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXTENSION);
    output.with_extension(extension)
}

pub fn execute(args: ApplyArgs) -> Result<()> {
    let context = PatcherContext::from(args.source);
    let output = output_path(&args.output, &args.rom);

    let selection = context.load_selection()?;
    let names = selection.ordered_included();
    if names.is_empty() {
        anyhow::bail!("No patches selected to apply");
    }

    let report = conflicts::check(&context, &names)?;
    if !report.is_empty() {
        conflicts::print_report(&report, &selection, 20);
        if !args.force {
            anyhow::bail!(
                "Conflicts detected, aborting apply. Resolve conflicts or deselect patches."
            );
        }
        log::warn!(
            "Applying despite {} conflicting bytes; later patches win",
            report.conflicting_bytes()
        );
    }

    let identity = RomIdentity::of_file(&args.rom)?;
    match identity.known_match() {
        Some(rom) => log::info!("Base ROM detected as {}", rom.name),
        None => log::warn!(
            "Unknown base ROM (CRC32 {:08X}); patches may not fit it",
            identity.crc32
        ),
    }

    println!(
        "Applying {} patches to {} -> {}",
        style(names.len()).green(),
        style(args.rom.display()).cyan(),
        style(output.display()).cyan()
    );

    let base = fs::read(&args.rom)
        .with_context(|| format!("Failed to read base ROM: {}", args.rom.display()))?;

    let pb = create_progress_bar(names.len() as u64, "Applying patches");
    let patched = apply_patches(
        &base,
        context.patches().open_all(names.iter().copied()).inspect(|patch| {
            if let Ok(patch) = patch {
                pb.set_message(patch.name().to_string());
            }
            pb.inc(1);
        }),
    );
    pb.finish_and_clear();

    // Nothing is written unless every patch applied.
    let patched = patched.context("Apply failed")?;

    fs::write(&output, &patched)
        .with_context(|| format!("Failed to write output ROM: {}", output.display()))?;

    let changed = base
        .iter()
        .zip(&patched)
        .filter(|(before, after)| before != after)
        .count()
        + patched.len().saturating_sub(base.len());

    println!(
        "{} Patched ROM written to {}",
        style("✓").green(),
        style(output.display()).cyan()
    );
    println!(
        "Size: {} -> {}, bytes changed: {} ({})",
        format_bytes(base.len() as u64),
        format_bytes(patched.len() as u64),
        changed,
        format_coverage(changed as u64, patched.len() as u64)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_extension() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("base.gba")),
            PathBuf::from("out.gba")
        );
        assert_eq!(
            output_path(Path::new("out"), Path::new("base.sfc")),
            PathBuf::from("out.sfc")
        );
        assert_eq!(
            output_path(Path::new("out"), Path::new("base")),
            PathBuf::from("out.gba")
        );
        assert_eq!(
            output_path(Path::new("out.bin"), Path::new("base.gba")),
            PathBuf::from("out.bin")
        );
    }
}
