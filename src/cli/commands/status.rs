//! Status command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::sync::{Command, Phase, Role, StatusReport};

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput<'a> {
    #[serde(flatten)]
    report: &'a StatusReport,
    next_step: Option<String>,
}

/// Suggested next command for a report.
fn next_step(report: &StatusReport, file: &str) -> Option<String> {
    if report.record_error.is_some() {
        return Some("Fix or delete the status record, then retry".to_string());
    }

    match (report.phase, report.resumable) {
        (Phase::Resolve, Some(Command::Sync)) => Some(format!(
            "Resolve conflicts in the local file, then `csvsync sync {file} --continue` \
             (or `csvsync abort {file}`)"
        )),
        (_, Some(Command::Sync)) => Some(format!(
            "Resume with `csvsync sync {file} --continue`{}",
            if report.abortable {
                format!(" or abandon with `csvsync abort {file}`")
            } else {
                String::new()
            }
        )),
        (_, Some(command)) => Some(format!(
            "Finish with `csvsync {command} {file} --continue`{}",
            if report.abortable {
                format!(" or abandon with `csvsync abort {file}`")
            } else {
                String::new()
            }
        )),
        (_, None) => match (report.file(Role::Ancestor), report.local_modified) {
            (Some(ancestor), _) if !ancestor.exists => {
                Some(format!("Run `csvsync pull {file}` to establish a baseline"))
            }
            (_, Some(true)) => Some(format!("Local changes pending: `csvsync sync {file}`")),
            _ => None,
        },
    }
}

fn phase_label(phase: Phase) -> colored::ColoredString {
    match phase {
        Phase::Ready => phase.as_str().green(),
        Phase::Resolve => phase.as_str().yellow().bold(),
        Phase::Pull | Phase::Merge | Phase::Push => phase.as_str().red().bold(),
    }
}

/// Execute status command. Never fails once the file is resolved.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the file is unknown.
pub fn execute(file: &str, config: Option<&PathBuf>, json: bool) -> Result<()> {
    let sync = super::open(config, file)?;
    let report = sync.status();
    let next_step = next_step(&report, file);

    if json {
        let output = StatusOutput {
            report: &report,
            next_step,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", "File:".bold(), report.name);
    println!(
        "  State:   {} (command: {})",
        phase_label(report.phase),
        report.command
    );
    if let Some(updated_at) = &report.updated_at {
        println!("  Updated: {updated_at}");
    }
    if let Some(error) = &report.record_error {
        println!("  {} {error}", "Record error:".red().bold());
    }
    match report.local_modified {
        Some(true) => println!("  Local:   {}", "modified since last sync".yellow()),
        Some(false) => println!("  Local:   unchanged since last sync"),
        None => {}
    }

    println!();
    println!("{}", "Staged files:".bold());
    for info in &report.files {
        let marker = if info.exists {
            "●".green()
        } else {
            "○".dimmed()
        };
        let size = if info.exists {
            format!("{} bytes", info.size)
        } else {
            "absent".to_string()
        };
        println!(
            "  {marker} {:<9} {}  ({size})",
            info.role.as_str(),
            info.path.display()
        );
    }

    if let Some(step) = next_step {
        println!();
        println!("{} {step}", "Next:".cyan().bold());
    }
    Ok(())
}
