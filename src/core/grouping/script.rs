//! Shell script that removes redundant copies.
//!
//! The library never deletes files itself. It writes a POSIX `sh` script
//! the user can review and run.

use super::{DuplicateSet, KeepPolicy};
use crate::core::catalog::Catalog;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Text that can sit in a comment or a quoted word without ending the line
fn is_script_safe(text: &str) -> bool {
    !text.chars().any(char::is_control)
}

/// Quote a path for `sh` using single quotes.
///
/// `None` for paths that aren't UTF-8 or that hold control characters: a
/// newline would end the line and run the rest of the name as a command.
fn shell_quote(path: &Path) -> Option<String> {
    let text = path.to_str().filter(|text| is_script_safe(text))?;
    Some(format!("'{}'", text.replace('\'', r"'\''")))
}

/// Write a delete script for every duplicate set.
///
/// For each set the keeper chosen by `policy` stays; every other copy gets
/// an `rm` line. When `live` is false the `rm` lines are commented out so
/// the script is a dry run until edited. A set with any path or key that
/// can't be written safely is left out with a `skipped` comment.
pub fn write_delete_script<W: Write>(
    sets: &[DuplicateSet],
    catalog: &Catalog,
    policy: KeepPolicy,
    live: bool,
    mut writer: W,
) -> std::io::Result<()> {
    let redundant_total: usize = sets.iter().map(|s| s.len().saturating_sub(1)).sum();

    writeln!(writer, "#!/bin/sh")?;
    writeln!(
        writer,
        "# {} duplicate set(s), {} redundant cop{} (keeping {})",
        sets.len(),
        redundant_total,
        if redundant_total == 1 { "y" } else { "ies" },
        policy
    )?;
    if !live {
        writeln!(writer, "# Dry run: uncomment the rm lines to delete")?;
    }

    for (index, set) in sets.iter().enumerate() {
        let Some(keeper) = set.keeper(catalog, policy).and_then(|id| catalog.get(&id)) else {
            continue;
        };

        let key = set.key.to_string();
        let keep = shell_quote(&keeper.path);
        let removals: Option<Vec<String>> = set
            .redundant(catalog, policy)
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|record| shell_quote(&record.path))
            .collect();

        writeln!(writer)?;
        let (Some(keep), Some(removals), true) = (keep, removals, is_script_safe(&key)) else {
            warn!("Leaving set {} out of the delete script: unsafe path", index + 1);
            writeln!(writer, "# set {} skipped: unsafe path", index + 1)?;
            continue;
        };

        writeln!(writer, "# set {}: {}", index + 1, key)?;
        writeln!(writer, "# keep {}", keep)?;
        let prefix = if live { "" } else { "# " };
        for removal in removals {
            writeln!(writer, "{}rm -- {}", prefix, removal)?;
        }
    }

    Ok(())
}
