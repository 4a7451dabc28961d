//! csvsync - resumable three-way sync of CSV files with a remote spreadsheet
//!
//! This crate provides the core functionality for the `csvsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`sync`] - Sync state machine, status record and staged files
//! - [`merge`] - Three-way merge engines
//! - [`remote`] - Remote store backends (directory, HTTP)
//! - [`table`] - CSV reading and writing
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod remote;
pub mod sync;
pub mod table;

pub use error::{Error, Result};
