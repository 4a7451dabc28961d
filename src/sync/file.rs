//! Atomic file operations for sync.
//!
//! Every durable artifact (status record, ancestor, working copy) is
//! replaced with write-to-temp, fsync, rename, so a crash leaves either the
//! old or the new content on disk and never a torn file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Temp path used while replacing `path`: same directory, `.tmp` suffix.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("file"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file (same path with a `.tmp` suffix)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: impl AsRef<[u8]>) -> io::Result<()> {
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_ref())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)
}

/// Copy `src` over `dst` atomically.
///
/// Same guarantees as [`atomic_write`]: `dst` is either its old content or a
/// complete copy of `src`.
///
/// # Errors
///
/// Returns an error if `src` cannot be read or `dst` cannot be replaced.
pub fn atomic_copy(src: &Path, dst: &Path) -> io::Result<()> {
    let temp_path = temp_path_for(dst);

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let mut reader = File::open(src)?;
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, dst)
}

/// Compare two files byte for byte.
///
/// Files of different length are rejected without reading content.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];

    loop {
        let read = reader_a.read(&mut buf_a)?;
        if read == 0 {
            return Ok(true);
        }
        reader_b.read_exact(&mut buf_b[..read])?;
        if buf_a[..read] != buf_b[..read] {
            return Ok(false);
        }
    }
}

/// Get the size of a file in bytes.
///
/// Returns 0 if the file doesn't exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
