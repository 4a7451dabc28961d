//! Configuration schema.
//!
//! The on-disk config is a JSON document with a `defaults` block and one
//! entry per tracked file:
//!
//! ```json
//! {
//!   "defaults": { "syncdir": "csvsync", "remote": { "type": "directory", "path": "remote" } },
//!   "files": {
//!     "contacts": { "filename": "contacts.csv", "spreadsheet_id": "abc", "sheet": "People", "key": "id" }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Default stage directory name.
pub const DEFAULT_SYNC_DIR: &str = "csvsync";

/// Quoting policy used when writing CSV output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// Quote only fields containing separators, quotes or line breaks.
    #[default]
    Minimal,
    /// Quote every field.
    All,
    /// Quote every field that does not parse as a number.
    NonNumeric,
    /// Never quote.
    None,
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimal => write!(f, "minimal"),
            Self::All => write!(f, "all"),
            Self::NonNumeric => write!(f, "nonnumeric"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Where the remote copy of a file lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteConfig {
    /// A directory tree, one `<resource_id>/<tab>.csv` file per tab.
    Directory { path: PathBuf },
    /// An HTTP endpoint serving `GET`/`PUT {url}/{resource_id}/{tab}`.
    Http {
        url: String,
        /// Name of the environment variable holding a bearer token.
        #[serde(default)]
        token_env: Option<String>,
    },
}

/// Settings shared by every file entry unless overridden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub syncdir: Option<String>,
    #[serde(default)]
    pub quote: Option<QuoteStyle>,
    #[serde(default)]
    pub pad_lines: Option<bool>,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// One `files.<name>` entry as written in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub cachename: Option<String>,
    #[serde(default)]
    pub syncdir: Option<String>,
    #[serde(default)]
    pub quote: Option<QuoteStyle>,
    #[serde(default)]
    pub pad_lines: Option<bool>,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// Whole config document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub files: BTreeMap<String, FileEntry>,
}

/// Fully resolved settings for one tracked file.
///
/// All paths are absolute or relative to the process working directory;
/// config-relative paths have already been joined onto the config location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Logical name (the config section).
    pub name: String,
    /// The user's working copy.
    pub filename: PathBuf,
    pub remote_resource_id: String,
    pub remote_tab: String,
    /// Row key for three-way merges. Only `sync` needs it.
    pub key_column: Option<String>,
    pub quote_style: QuoteStyle,
    pub stage_directory: PathBuf,
    pub pad_lines: bool,
    /// Basename used for staged artifacts.
    pub cache_name: String,
    pub remote: RemoteConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_style_parsing() {
        let style: QuoteStyle = serde_json::from_str("\"nonnumeric\"").unwrap();
        assert_eq!(style, QuoteStyle::NonNumeric);
        assert_eq!(QuoteStyle::default(), QuoteStyle::Minimal);
        assert_eq!(QuoteStyle::All.to_string(), "all");
    }

    #[test]
    fn test_remote_config_tagged() {
        let remote: RemoteConfig =
            serde_json::from_str(r#"{"type":"http","url":"https://sheets.example"}"#).unwrap();
        assert_eq!(
            remote,
            RemoteConfig::Http {
                url: "https://sheets.example".to_string(),
                token_env: None,
            }
        );

        let remote: RemoteConfig =
            serde_json::from_str(r#"{"type":"directory","path":"remote"}"#).unwrap();
        assert!(matches!(remote, RemoteConfig::Directory { .. }));
    }

    #[test]
    fn test_config_file_defaults_optional() {
        let config: ConfigFile =
            serde_json::from_str(r#"{"files":{"a":{"filename":"a.csv"}}}"#).unwrap();
        assert!(config.defaults.remote.is_none());
        assert_eq!(config.files["a"].filename.as_deref(), Some("a.csv"));
    }
}
