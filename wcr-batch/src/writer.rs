//! Atomic output writer.
//!
//! Every file lands via `<path>.wcr.tmp` + rename, so a crashed run never
//! leaves a truncated archive or document behind. The SHA-256 of what was
//! written is returned for the batch report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{io_err, BatchError};

/// One file written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    #[serde(skip)]
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub sha256: String,
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Write `bytes` to `path` atomically, creating parent directories.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<WrittenFile, BatchError> {
    let tmp = PathBuf::from(format!("{}.wcr.tmp", path.display()));
    atomic_write_with_tmp(path, bytes, &tmp)
}

fn atomic_write_with_tmp(path: &Path, bytes: &[u8], tmp: &Path) -> Result<WrittenFile, BatchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WrittenFile {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: bytes.len() as u64,
        sha256: digest(bytes),
    })
}

/// Remove `path` if it exists. Returns whether anything was removed.
pub fn remove_stale(path: &Path) -> Result<bool, BatchError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("removed stale: {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path, e)),
    }
}
