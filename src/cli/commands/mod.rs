//! Command implementations.

pub mod abort;
pub mod completions;
pub mod pull;
pub mod push;
pub mod status;
pub mod sync;
pub mod version;

use std::path::PathBuf;

use crate::config::load_file_config;
use crate::error::Result;
use crate::merge::KeyedMerge;
use crate::remote::{self, RemoteStore};
use crate::sync::SyncController;

/// Controller wired with the configured remote and the keyed merge.
pub type Controller = SyncController<Box<dyn RemoteStore>, KeyedMerge>;

/// Resolve `file` in the config and build its controller.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or `file` is not in it.
pub fn open(config: Option<&PathBuf>, file: &str) -> Result<Controller> {
    let file_config = load_file_config(config.map(PathBuf::as_path), file)?;
    let remote = remote::from_config(&file_config);
    Ok(SyncController::new(&file_config, remote, KeyedMerge))
}
