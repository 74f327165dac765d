//! Delete command for removing a session.

use std::io::Write;

use anyhow::{Context, Result};
use tally_core::{EntryStore, KeyValueStore};

/// Deletes the entry with `id`. Unknown IDs are reported, not treated as errors.
pub fn run<W: Write, S: KeyValueStore>(
    writer: &mut W,
    store: &mut EntryStore<S>,
    id: &str,
) -> Result<()> {
    let removed = store
        .delete_entry(id)
        .with_context(|| format!("failed to delete entry {id}"))?;

    if removed {
        writeln!(writer, "Deleted {id}")?;
    } else {
        writeln!(writer, "No entry with ID {id}")?;
    }
    Ok(())
}
