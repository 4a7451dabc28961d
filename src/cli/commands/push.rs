//! Push command implementation.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::sync::Role;

/// Execute `push`, or finish an interrupted one with `--continue`.
///
/// # Errors
///
/// Returns an error if the file is not configured or the push fails.
pub fn execute(file: &str, resume: bool, config: Option<&PathBuf>, json: bool) -> Result<()> {
    let sync = super::open(config, file)?;

    if resume {
        sync.resume_push()?;
    } else {
        sync.push()?;
    }

    let local = sync.path_for(Role::Local);
    if json {
        let output = serde_json::json!({
            "success": true,
            "file": sync.name(),
            "local": local,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} Pushed {} from {}", "✓".green(), sync.name(), local.display());
    }
    Ok(())
}
