//! Compact CLI command - Drops superseded lines from the record files

use anyhow::Result;

use super::output::Output;
use crate::storage::Workspace;

/// Run the compact command
pub fn run(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let counts = workspace.compact()?;
    tracing::debug!(?counts, "workspace compacted");

    if output.is_json() {
        output.data(&counts);
    } else {
        output.success(&format!(
            "Compacted: {} projects, {} requirements, {} tasks, {} dependencies",
            counts.projects, counts.requirements, counts.tasks, counts.dependencies
        ));
    }

    Ok(())
}
