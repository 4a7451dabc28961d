//! Remote store backends.
//!
//! A remote store holds the shared copy of each tracked file, addressed by a
//! resource id (the spreadsheet) and a tab name. The sync core only needs to
//! read a tab into a local CSV file and to overwrite a tab from one.
//!
//! - [`DirectoryRemote`] - a directory tree, `<root>/<resource_id>/<tab>.csv`
//! - [`HttpRemote`] - CSV over HTTP `GET`/`PUT {url}/{resource_id}/{tab}`
//!
//! Errors are reported as-is; retries are left to the caller.

mod directory;
mod http;

pub use directory::DirectoryRemote;
pub use http::HttpRemote;

use std::path::Path;

use crate::config::{FileConfig, RemoteConfig};
use crate::table::TableError;

/// Errors raised by a remote store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote tab not found: {resource_id}/{tab}")]
    NotFound { resource_id: String, tab: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid remote configuration: {0}")]
    Config(String),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read/overwrite access to remote tabs.
pub trait RemoteStore {
    /// Fetch a tab into `destination`, replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read or the file written.
    fn download(&self, resource_id: &str, tab: &str, destination: &Path) -> Result<(), RemoteError>;

    /// Overwrite a tab with the content of `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the tab written.
    fn upload(&self, resource_id: &str, tab: &str, source: &Path) -> Result<(), RemoteError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn download(
        &self,
        resource_id: &str,
        tab: &str,
        destination: &Path,
    ) -> Result<(), RemoteError> {
        (**self).download(resource_id, tab, destination)
    }

    fn upload(&self, resource_id: &str, tab: &str, source: &Path) -> Result<(), RemoteError> {
        (**self).upload(resource_id, tab, source)
    }
}

/// Build the remote store configured for a file.
#[must_use]
pub fn from_config(config: &FileConfig) -> Box<dyn RemoteStore> {
    match &config.remote {
        RemoteConfig::Directory { path } => Box::new(DirectoryRemote::new(
            path,
            config.pad_lines,
            config.quote_style,
        )),
        RemoteConfig::Http { url, token_env } => Box::new(HttpRemote::new(
            url.clone(),
            token_env.as_deref(),
            config.pad_lines,
            config.quote_style,
        )),
    }
}
