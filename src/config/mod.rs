//! Configuration management.
//!
//! This module finds the config file and resolves one tracked file's
//! settings into a [`FileConfig`].
//!
//! # Discovery
//!
//! The first of these that applies wins:
//! 1. `--config <path>` (or `CSVSYNC_CONFIG`)
//! 2. `./csvsync.json`
//! 3. `~/.csvsync.json`
//!
//! Relative paths inside the file (`filename`, `syncdir`, a directory
//! remote's `path`) are resolved against the directory holding the config
//! file, and a leading `~/` expands to the home directory.

mod types;

pub use types::{
    ConfigFile, Defaults, FileConfig, FileEntry, QuoteStyle, RemoteConfig, DEFAULT_SYNC_DIR,
};

use crate::error::{Error, Result};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "csvsync.json";

/// Config file looked up in the home directory.
pub const HOME_CONFIG_FILE_NAME: &str = ".csvsync.json";

/// Home directory, if it can be determined.
fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf())
}

/// Find the config file to use.
///
/// An explicit path is returned as-is, even if it does not exist, so the
/// caller reports it instead of silently falling back.
#[must_use]
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = std::env::current_dir()
        .map(|cwd| cwd.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));
    if local.is_file() {
        return Some(local);
    }

    home_dir()
        .map(|home| home.join(HOME_CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Load and parse a config file.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

/// Discover the config and resolve the settings for `name`.
///
/// `name` may be a section name or the `filename` of an entry.
///
/// # Errors
///
/// Returns an error if no config file is found, it is invalid, or `name`
/// is not configured.
pub fn load_file_config(explicit: Option<&Path>, name: &str) -> Result<FileConfig> {
    let path = discover_config_path(explicit).ok_or_else(|| {
        Error::Config(format!(
            "No config file found (looked for ./{CONFIG_FILE_NAME} and ~/{HOME_CONFIG_FILE_NAME})"
        ))
    })?;
    debug!(path = %path.display(), "using config file");

    let config = load_config(&path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    resolve(&config, name, &base_dir)
}

/// Expand `~/` and join relative paths onto `base_dir`.
#[must_use]
pub fn expand_path(base_dir: &Path, raw: &Path) -> PathBuf {
    if let Ok(rest) = raw.strip_prefix("~") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base_dir.join(raw)
    }
}

fn required(value: Option<&String>, key: &str, section: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| Error::Config(format!("Missing required key '{key}' in files.{section}")))
}

/// Resolve one entry of `config` into a [`FileConfig`].
///
/// # Errors
///
/// Returns [`Error::FileNotConfigured`] if no entry matches `name`, or
/// [`Error::Config`] if the entry lacks a required key.
pub fn resolve(config: &ConfigFile, name: &str, base_dir: &Path) -> Result<FileConfig> {
    let (section, entry) = config
        .files
        .get_key_value(name)
        .or_else(|| {
            config
                .files
                .iter()
                .find(|(_, e)| e.filename.as_deref() == Some(name))
        })
        .ok_or_else(|| Error::FileNotConfigured {
            name: name.to_string(),
            available: config.files.keys().cloned().collect(),
        })?;

    let defaults = &config.defaults;

    let filename = required(entry.filename.as_ref(), "filename", section)?;
    let remote_resource_id = required(entry.spreadsheet_id.as_ref(), "spreadsheet_id", section)?;
    let remote_tab = required(entry.sheet.as_ref(), "sheet", section)?;

    let filename = expand_path(base_dir, Path::new(&filename));
    let syncdir = entry
        .syncdir
        .as_deref()
        .or(defaults.syncdir.as_deref())
        .unwrap_or(DEFAULT_SYNC_DIR);

    let cache_name = match &entry.cachename {
        Some(cache_name) if !cache_name.is_empty() => cache_name.clone(),
        _ => filename
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Config(format!("files.{section}: filename has no file name component"))
            })?,
    };

    let remote = match entry.remote.as_ref().or(defaults.remote.as_ref()) {
        Some(RemoteConfig::Directory { path }) => RemoteConfig::Directory {
            path: expand_path(base_dir, path),
        },
        Some(other) => other.clone(),
        None => {
            return Err(Error::Config(format!(
                "Missing required key 'remote' in files.{section} or defaults"
            )));
        }
    };

    Ok(FileConfig {
        name: section.clone(),
        filename,
        remote_resource_id,
        remote_tab,
        key_column: entry.key.clone().filter(|k| !k.is_empty()),
        quote_style: entry.quote.or(defaults.quote).unwrap_or_default(),
        stage_directory: expand_path(base_dir, Path::new(syncdir)),
        pad_lines: entry.pad_lines.or(defaults.pad_lines).unwrap_or(true),
        cache_name,
        remote,
    })
}
