//! Patch order and inclusion commands

use anyhow::Result;
use clap::Subcommand;
use console::style;
use prettytable::row;

use ips_patch::SelectionState;

use crate::context::PatcherContext;
use crate::utils::create_table;

#[derive(Subcommand)]
pub enum SelectionCommands {
    /// Show the current order and inclusion flags
    Show,

    /// Reset to every patch included, in name order
    Init,

    /// Pick up added and removed patch files, keeping the existing order
    Refresh,

    /// Move a patch one position earlier
    Up {
        /// Patch file name
        name: String,
    },

    /// Move a patch one position later
    Down {
        /// Patch file name
        name: String,
    },

    /// Include a patch in checks and application
    Include {
        /// Patch file name
        name: String,
    },

    /// Exclude a patch from checks and application
    Exclude {
        /// Patch file name
        name: String,
    },
}

pub fn execute(context: &PatcherContext, command: SelectionCommands) -> Result<()> {
    let mut selection = match command {
        SelectionCommands::Init => {
            let mut selection = SelectionState::new();
            selection.load(context.list_patches()?);
            selection
        }
        _ => context.load_selection()?,
    };

    let name = match &command {
        SelectionCommands::Up { name }
        | SelectionCommands::Down { name }
        | SelectionCommands::Include { name }
        | SelectionCommands::Exclude { name } => Some(name.as_str()),
        _ => None,
    };
    if let Some(name) = name
        && !selection.contains(name)
    {
        log::warn!("{name} is not in the selection; nothing changed");
    }

    match &command {
        SelectionCommands::Show => {
            print_selection(&selection);
            return Ok(());
        }
        SelectionCommands::Init | SelectionCommands::Refresh => {}
        SelectionCommands::Up { name } => selection.move_up(name),
        SelectionCommands::Down { name } => selection.move_down(name),
        SelectionCommands::Include { name } => selection.set_included(name, true),
        SelectionCommands::Exclude { name } => selection.set_included(name, false),
    }

    context.save_selection(&selection)?;
    print_selection(&selection);
    Ok(())
}

fn print_selection(selection: &SelectionState) {
    if selection.is_empty() {
        println!("No patches found");
        return;
    }

    let mut table = create_table(vec!["#", "Use", "Patch"]);
    for (position, entry) in selection.entries().iter().enumerate() {
        if entry.included {
            table.add_row(row![position + 1, style("x").green(), entry.name]);
        } else {
            table.add_row(row![position + 1, " ", style(&entry.name).dim()]);
        }
    }
    table.printstd();

    println!(
        "Apply order: {}",
        style(selection.ordered_included().join(" -> ")).cyan()
    );
}
