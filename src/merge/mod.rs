//! Three-way merge engines.
//!
//! A merge engine reconciles two branches of a table against their common
//! ancestor and writes the result to a file, reporting whether any
//! conflicts were left for the user to resolve.

mod keyed;

pub use keyed::{KeyedMerge, CONFLICT_END, CONFLICT_SEPARATOR, CONFLICT_START, DELETED_MARKER};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::QuoteStyle;
use crate::table::TableError;

/// Errors raised by a merge engine.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("Key column '{key}' not found in {}", path.display())]
    MissingKeyColumn { key: String, path: PathBuf },

    #[error("Duplicate key '{value}' in {}", path.display())]
    DuplicateKey { value: String, path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    #[error("Failed to write merge output: {0}")]
    Output(#[from] TableError),
}

/// What a merge produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// File the result was written to.
    pub output: PathBuf,
    pub has_conflicts: bool,
}

/// The three inputs of a merge.
#[derive(Debug, Clone, Copy)]
pub struct MergeInputs<'a> {
    pub ancestor: &'a Path,
    /// Local side.
    pub branch_a: &'a Path,
    /// Remote side.
    pub branch_b: &'a Path,
}

/// A three-way merge engine.
pub trait MergeEngine {
    /// Merge `inputs`, aligning rows on `key_column`, and write the result
    /// to `output` using `quote_style`.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read, rows cannot be aligned,
    /// or the output cannot be written.
    fn merge(
        &self,
        inputs: MergeInputs<'_>,
        key_column: &str,
        quote_style: QuoteStyle,
        output: &Path,
    ) -> Result<MergeOutcome, MergeError>;
}
