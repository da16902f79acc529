//! Artifact content hashing.
//!
//! SHA-256 over an artifact's full byte content, supporting both single
//! files and directory trees (application bundles ship as directories on
//! macOS). The hash is the manifest's integrity anchor, so it always covers
//! content, never metadata.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::error::{PublishError, Result};

/// Calculates the SHA-256 checksum of a file or directory.
///
/// Files are read in 8KB chunks. Directories are traversed recursively and
/// hashed in deterministic path order.
///
/// # Errors
///
/// [`PublishError::IntegrityComputation`] naming the unreadable path when
/// the content cannot be fully read.
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| PublishError::IntegrityComputation {
            path: path.to_path_buf(),
            source,
        })?;

    if metadata.is_file() {
        calculate_file_sha256(path).await
    } else if metadata.is_dir() {
        calculate_directory_sha256(path).await
    } else {
        Err(PublishError::configuration(format!(
            "artifact is neither file nor directory: {}",
            path.display()
        )))
    }
}

/// Calculates the SHA-256 checksum of a single file.
async fn calculate_file_sha256(file_path: &Path) -> Result<String> {
    let integrity = |source| PublishError::IntegrityComputation {
        path: file_path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(file_path).await.map_err(integrity)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await.map_err(integrity)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculates the SHA-256 checksum of a directory tree.
///
/// Every file's relative path and content feed one hasher, in sorted path
/// order so the result is deterministic across file systems.
async fn calculate_directory_sha256(dir_path: &Path) -> Result<String> {
    let mut entries: Vec<_> = walkdir::WalkDir::new(dir_path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    entries.sort_by_key(|e| e.path().to_path_buf());

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    for entry in entries {
        if let Ok(rel_path) = entry.path().strip_prefix(dir_path) {
            hasher.update(rel_path.to_string_lossy().as_bytes());
        }

        let integrity = |source| PublishError::IntegrityComputation {
            path: entry.path().to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::open(entry.path()).await.map_err(integrity)?;

        loop {
            let n = file.read(&mut buffer).await.map_err(integrity)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}
