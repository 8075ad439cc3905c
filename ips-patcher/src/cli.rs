//! Root CLI structure for ips-patcher

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ips-patcher")]
#[command(about = "Check, order and apply stacks of IPS patches", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Where patches and their selection live
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Folder containing the .ips patches
    #[arg(long, env = "IPS_PATCHES_DIR", default_value = "patches")]
    pub patches_dir: PathBuf,

    /// Selection file holding order and inclusion
    /// [default: <PATCHES_DIR>/selection.json]
    #[arg(long, env = "IPS_SELECTION", value_name = "FILE")]
    pub selection: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Base ROM image to patch
    #[arg(long, value_name = "FILE")]
    pub rom: PathBuf,

    /// Where to write the patched image
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Apply even when patches write the same bytes
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the patches found in the patches folder
    List {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show the records and write ranges of a patch
    Info {
        /// Path to the IPS patch
        patch: PathBuf,
    },

    /// Dry run: report bytes written by more than one selected patch
    Conflicts {
        #[command(flatten)]
        source: SourceArgs,

        /// Maximum number of conflict ranges to print
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// Apply the selected patches, in order, to a base ROM
    Apply(ApplyArgs),

    /// Compute ROM checksums and match them against known dumps
    Identify {
        /// Path to the ROM image
        rom: PathBuf,
    },

    /// Inspect or change patch order and inclusion
    Selection {
        #[command(flatten)]
        source: SourceArgs,

        #[command(subcommand)]
        command: crate::commands::selection::SelectionCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
