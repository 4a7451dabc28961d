//! Abort command implementation.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::sync::Command;

/// Abandon an in-progress sync or a stuck pull.
///
/// # Errors
///
/// Returns an error if the file is not configured or nothing abortable is
/// in flight.
pub fn execute(file: &str, config: Option<&PathBuf>, json: bool) -> Result<()> {
    let sync = super::open(config, file)?;
    let outcome = sync.abort()?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "file": sync.name(),
            "aborted": outcome.command,
            "restored_local": outcome.restored_local,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if outcome.restored_local {
        println!(
            "{} Sync aborted; local file restored to its pre-sync content",
            "✓".green()
        );
    } else {
        let what = if outcome.command == Command::Pull { "Pull" } else { "Sync" };
        println!("{} {what} aborted", "✓".green());
    }
    Ok(())
}
