//! Error types for publish-configuration resolution and manifest generation.
//!
//! Every failure is typed: callers can tell a malformed configuration from a
//! transient upload problem without parsing message strings.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::PublishProvider;

/// Result type alias for publish operations
pub type Result<T> = std::result::Result<T, PublishError>;

/// Main error type for all publish operations
#[derive(Error, Debug)]
pub enum PublishError {
    /// Malformed or unrecognized provider configuration shape.
    ///
    /// Reported before any network activity, naming the offending element
    /// index in the `publish` setting.
    #[error("invalid publish configuration at index {index}: {reason}")]
    Validation {
        /// Zero-based index of the offending element
        index: usize,
        /// Reason for the error
        reason: String,
    },

    /// Resolvable configuration ambiguity, such as an empty target list where
    /// one is required or a field missing for URL computation.
    #[error("publish configuration error: {reason}")]
    Configuration {
        /// Reason for the error
        reason: String,
    },

    /// Artifact could not be fully read while computing its content hash.
    ///
    /// Fatal for that artifact only; sibling artifacts are unaffected.
    #[error("failed to hash artifact {}: {source}", .path.display())]
    IntegrityComputation {
        /// Artifact that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// One or more provider uploads failed after all providers completed.
    ///
    /// Uploads that succeeded are not rolled back.
    #[error("{0}")]
    UploadsFailed(UploadFailures),

    /// Checksum mismatch on a downloaded update.
    ///
    /// Security-relevant: the downloaded file must be discarded, never
    /// installed.
    #[error(
        "integrity verification failed for {}: expected sha256 {expected}, computed {actual}",
        .path.display()
    )]
    IntegrityVerification {
        /// Downloaded file that failed verification
        path: PathBuf,
        /// Digest recorded in the manifest
        expected: String,
        /// Digest computed from the downloaded bytes
        actual: String,
    },

    /// Release asset lookup returned no match.
    #[error("no asset named {asset} in release {tag} of {owner}/{repo}")]
    AssetNotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Release tag
        tag: String,
        /// Asset name that was requested
        asset: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors from collaborators
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl PublishError {
    /// Creates a [`PublishError::Configuration`] from any message.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates a [`PublishError::Validation`] naming the offending index.
    pub fn validation(index: usize, reason: impl Into<String>) -> Self {
        Self::Validation {
            index,
            reason: reason.into(),
        }
    }
}

/// Aggregated per-provider upload failures from a single publish call.
#[derive(Debug)]
pub struct UploadFailures(pub Vec<UploadFailure>);

/// A single provider's upload failure.
#[derive(Debug)]
pub struct UploadFailure {
    /// Position of the provider in the publish target list
    pub index: usize,
    /// Provider family that failed
    pub provider: PublishProvider,
    /// Failure message from the uploader collaborator
    pub message: String,
}

impl fmt::Display for UploadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} provider upload(s) failed:", self.0.len())?;
        for failure in &self.0 {
            write!(
                f,
                " [{}] {}: {};",
                failure.index, failure.provider, failure.message
            )?;
        }
        Ok(())
    }
}
