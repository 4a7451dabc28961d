//! Pull command implementation.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::sync::Role;

/// Execute `pull`, or finish an interrupted one with `--continue`.
///
/// # Errors
///
/// Returns an error if the file is not configured or the pull fails.
pub fn execute(
    file: &str,
    force: bool,
    resume: bool,
    config: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let sync = super::open(config, file)?;

    let outcome = if resume {
        sync.resume_pull()?
    } else {
        sync.pull(force)?
    };
    let local = sync.path_for(Role::Local);

    if json {
        let output = serde_json::json!({
            "success": true,
            "file": sync.name(),
            "local": local,
            "backup": outcome.backup,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} Pulled {} into {}", "✓".green(), sync.name(), local.display());
    if let Some(backup) = outcome.backup {
        println!("  Previous local copy saved to {}", backup.display());
    }
    Ok(())
}
