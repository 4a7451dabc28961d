//! Filesystem-backed remote store.
//!
//! Useful for a shared network mount, or for exercising the sync workflow
//! without a spreadsheet service.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::QuoteStyle;
use crate::sync::atomic_copy;
use crate::table::{self, count_rows};

use super::{RemoteError, RemoteStore};

/// Remote tabs stored as `<root>/<resource_id>/<tab>.csv`.
#[derive(Debug, Clone)]
pub struct DirectoryRemote {
    root: PathBuf,
    pad_lines: bool,
    quote_style: QuoteStyle,
}

impl DirectoryRemote {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, pad_lines: bool, quote_style: QuoteStyle) -> Self {
        Self {
            root: root.into(),
            pad_lines,
            quote_style,
        }
    }

    /// Path of a tab inside the store.
    #[must_use]
    pub fn tab_path(&self, resource_id: &str, tab: &str) -> PathBuf {
        self.root.join(resource_id).join(format!("{tab}.csv"))
    }
}

impl RemoteStore for DirectoryRemote {
    fn download(
        &self,
        resource_id: &str,
        tab: &str,
        destination: &Path,
    ) -> Result<(), RemoteError> {
        let source = self.tab_path(resource_id, tab);
        if !source.is_file() {
            return Err(RemoteError::NotFound {
                resource_id: resource_id.to_string(),
                tab: tab.to_string(),
            });
        }

        atomic_copy(&source, destination)?;
        if self.pad_lines {
            table::pad_file(destination, self.quote_style)?;
        }

        info!(rows = count_rows(destination), "downloaded {resource_id}/{tab}");
        Ok(())
    }

    fn upload(&self, resource_id: &str, tab: &str, source: &Path) -> Result<(), RemoteError> {
        let target = self.tab_path(resource_id, tab);
        atomic_copy(source, &target)?;
        info!(rows = count_rows(source), "uploaded {resource_id}/{tab}");
        Ok(())
    }
}
