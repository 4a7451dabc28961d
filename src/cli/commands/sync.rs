//! Sync command implementation.
//!
//! A merge that leaves conflicts is not a failure: the command exits 0,
//! reports the conflicted file, and waits for `sync --continue`.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::sync::SyncOutcome;

/// Execute `sync`, or `sync --continue`.
///
/// # Errors
///
/// Returns an error if the file is not configured or a step fails.
pub fn execute(file: &str, resume: bool, config: Option<&PathBuf>, json: bool) -> Result<()> {
    let sync = super::open(config, file)?;

    let outcome = if resume {
        sync.resume_sync()?
    } else {
        sync.sync_start()?
    };

    if json {
        let output = serde_json::json!({
            "success": true,
            "file": sync.name(),
            "conflicts": matches!(outcome, SyncOutcome::Conflicts { .. }),
            "outcome": outcome,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    match outcome {
        SyncOutcome::Completed { uploaded: true } => {
            println!("{} Synced {}", "✓".green(), sync.name());
        }
        SyncOutcome::Completed { uploaded: false } => {
            println!(
                "{} Synced {} (remote already up to date, nothing uploaded)",
                "✓".green(),
                sync.name()
            );
        }
        SyncOutcome::Conflicts { local } => {
            println!("{} Merge conflicts in {}", "!".yellow().bold(), local.display());
            println!();
            println!("  Edit the file to resolve the <<<<<<< ======= >>>>>>> markers, then run:");
            println!("    csvsync sync {file} --continue");
            println!("  Or restore your pre-sync copy with:");
            println!("    csvsync abort {file}");
        }
    }
    Ok(())
}
