//! Update manifests.
//!
//! A manifest is the versioned record describing one published artifact's
//! location and integrity hash. It is produced on the build machine and
//! consumed by update-checking clients, possibly months later by a different
//! binary, so the serialized form is a flat record that round-trips exactly
//! and tolerates unknown fields from newer producers.
//!
//! The `sha2` content hash is the mandatory integrity anchor: a manifest
//! without it cannot detect tampering or a partial download and must never
//! be published or trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::checksum::calculate_sha256;
use crate::error::{PublishError, Result};

/// Metadata for one finished build artifact.
///
/// Created through [`ArtifactDescriptor::describe`], which stats the file
/// and hashes its full byte content once.
#[derive(Clone, Debug)]
pub struct ArtifactDescriptor {
    /// Version being published.
    pub version: semver::Version,

    /// Local path of the artifact (file, or directory for app bundles).
    pub path: PathBuf,

    /// Total content size in bytes.
    pub size: u64,

    /// Hex-encoded SHA-256 of the full content.
    pub sha256: String,

    /// Display name distinct from the on-disk artifact name, if any.
    pub display_name: Option<String>,
}

impl ArtifactDescriptor {
    /// Describes an artifact by reading it from disk.
    ///
    /// Hashing always covers the artifact's full byte content; metadata-only
    /// hashing would defeat the integrity guarantee.
    ///
    /// # Errors
    ///
    /// [`PublishError::IntegrityComputation`] when the artifact cannot be
    /// fully read. Describing several artifacts in a loop isolates this
    /// failure to the one artifact; siblings are unaffected.
    pub async fn describe(
        version: semver::Version,
        path: impl Into<PathBuf>,
        display_name: Option<String>,
    ) -> Result<Self> {
        let path = path.into();

        let metadata = tokio::fs::metadata(&path).await.map_err(|source| {
            PublishError::IntegrityComputation {
                path: path.clone(),
                source,
            }
        })?;
        let sha256 = calculate_sha256(&path).await?;

        Ok(Self {
            version,
            size: metadata.len(),
            sha256,
            display_name,
            path,
        })
    }

    /// Returns the artifact's on-disk file name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Returns the name the artifact is published under.
    pub fn remote_name(&self) -> String {
        self.display_name.clone().unwrap_or_else(|| self.file_name())
    }
}

/// The versioned record consumed by auto-update clients.
///
/// Serialized once per channel as flat camelCase JSON. Unknown fields from
/// newer producers are tolerated on read; a missing `sha2` is a parse
/// failure by construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManifest {
    /// Published version.
    pub version: String,

    /// Artifact location relative to the provider's base endpoint.
    pub path: String,

    /// Hex-encoded SHA-256 of the artifact content. Required.
    pub sha2: String,

    /// Human-readable release name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,

    /// Release notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,

    /// Manifest-generation time, not upload time: the manifest may exist
    /// before all provider uploads complete.
    pub release_date: DateTime<Utc>,
}

/// Builds an [`UpdateManifest`] from a described artifact.
///
/// Re-invocation on byte-identical input yields a manifest equal in every
/// field except `release_date`.
pub struct ManifestBuilder<'a> {
    artifact: &'a ArtifactDescriptor,
    release_name: Option<String>,
    release_notes: Option<String>,
}

impl<'a> ManifestBuilder<'a> {
    /// Starts a builder for one artifact.
    pub fn new(artifact: &'a ArtifactDescriptor) -> Self {
        Self {
            artifact,
            release_name: None,
            release_notes: None,
        }
    }

    /// Sets the human-readable release name.
    pub fn release_name(mut self, name: impl Into<String>) -> Self {
        self.release_name = Some(name.into());
        self
    }

    /// Sets the release notes.
    pub fn release_notes(mut self, notes: impl Into<String>) -> Self {
        self.release_notes = Some(notes.into());
        self
    }

    /// Produces the manifest record.
    pub fn build(self) -> UpdateManifest {
        UpdateManifest {
            version: self.artifact.version.to_string(),
            path: self.artifact.remote_name(),
            sha2: self.artifact.sha256.clone(),
            release_name: self.release_name,
            release_notes: self.release_notes,
            release_date: Utc::now(),
        }
    }
}

/// Returns the manifest file name for a channel.
pub fn manifest_file_name(channel: &str) -> String {
    format!("{channel}.json")
}

/// Writes a channel manifest into `dir`, refusing conflicting overwrites.
///
/// A manifest for the same version with different content indicates two
/// different builds published under one version. That is a configuration
/// error, not a merge; the existing manifest is left untouched.
pub async fn write_manifest(
    dir: &Path,
    channel: &str,
    manifest: &UpdateManifest,
) -> Result<PathBuf> {
    let path = dir.join(manifest_file_name(channel));

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            if let Ok(existing) = serde_json::from_str::<UpdateManifest>(&content) {
                let same_version = existing.version == manifest.version;
                let same_content =
                    existing.sha2 == manifest.sha2 && existing.path == manifest.path;
                if same_version && !same_content {
                    return Err(PublishError::configuration(format!(
                        "manifest {} already describes version {} with different content; \
                         refusing to overwrite",
                        path.display(),
                        existing.version
                    )));
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut serialized = serde_json::to_string_pretty(manifest)?;
    serialized.push('\n');
    tokio::fs::write(&path, serialized).await?;
    log::info!("wrote {channel} manifest for {} to {}", manifest.version, path.display());

    Ok(path)
}

/// Reads and validates a channel manifest.
pub async fn read_manifest(path: &Path) -> Result<UpdateManifest> {
    let content = tokio::fs::read_to_string(path).await?;
    let manifest: UpdateManifest = serde_json::from_str(&content)?;
    Ok(manifest)
}

/// Verifies a downloaded update against its manifest.
///
/// Recomputes the SHA-256 of the downloaded content and compares it to the
/// manifest's `sha2`. Any mismatch means the download was tampered with or
/// truncated; the file must be discarded and never installed.
pub async fn verify_artifact(manifest: &UpdateManifest, downloaded: &Path) -> Result<()> {
    if manifest.sha2.len() != 64 || !manifest.sha2.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PublishError::configuration(format!(
            "manifest for version {} carries a malformed sha2 digest",
            manifest.version
        )));
    }

    let actual = calculate_sha256(downloaded).await?;
    if !actual.eq_ignore_ascii_case(&manifest.sha2) {
        return Err(PublishError::IntegrityVerification {
            path: downloaded.to_path_buf(),
            expected: manifest.sha2.clone(),
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn artifact_at(dir: &Path, name: &str, content: &[u8]) -> ArtifactDescriptor {
        let path = dir.join(name);
        tokio::fs::write(&path, content).await.unwrap();
        ArtifactDescriptor::describe("1.4.0".parse().unwrap(), path, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn describe_records_size_and_digest() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;

        assert_eq!(artifact.size, 15);
        assert_eq!(artifact.sha256.len(), 64);
        assert_eq!(artifact.file_name(), "App-Setup-1.4.0.exe");
    }

    #[tokio::test]
    async fn manifest_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;

        let manifest = ManifestBuilder::new(&artifact)
            .release_name("Rocket Sled 1.4")
            .release_notes("Faster sleds.")
            .build();

        let serialized = serde_json::to_string(&manifest).unwrap();
        let parsed: UpdateManifest = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[tokio::test]
    async fn wire_format_is_flat_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;
        let manifest = ManifestBuilder::new(&artifact).release_name("Rocket Sled").build();

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&manifest).unwrap()).unwrap();
        assert!(value.get("version").is_some());
        assert!(value.get("path").is_some());
        assert!(value.get("sha2").is_some());
        assert!(value.get("releaseName").is_some());
        assert!(value.get("releaseDate").is_some());
    }

    #[test]
    fn manifest_without_sha2_is_rejected() {
        let stripped = r#"{
            "version": "1.4.0",
            "path": "App-Setup-1.4.0.exe",
            "releaseDate": "2026-08-06T12:00:00Z"
        }"#;
        assert!(serde_json::from_str::<UpdateManifest>(stripped).is_err());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let future = r#"{
            "version": "1.4.0",
            "path": "App-Setup-1.4.0.exe",
            "sha2": "deadbeef",
            "releaseDate": "2026-08-06T12:00:00Z",
            "stagingPercentage": 25
        }"#;
        let manifest: UpdateManifest = serde_json::from_str(future).unwrap();
        assert_eq!(manifest.version, "1.4.0");
    }

    #[tokio::test]
    async fn rebuilding_from_identical_bytes_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;

        let first = ManifestBuilder::new(&artifact).build();
        let second = ManifestBuilder::new(&artifact).build();

        assert_eq!(first.version, second.version);
        assert_eq!(first.path, second.path);
        assert_eq!(first.sha2, second.sha2);
        // release_date may differ; everything else must not.
    }

    #[tokio::test]
    async fn verify_accepts_untouched_download() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;
        let manifest = ManifestBuilder::new(&artifact).build();

        verify_artifact(&manifest, &artifact.path).await.unwrap();
    }

    #[tokio::test]
    async fn verify_rejects_single_byte_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;
        let manifest = ManifestBuilder::new(&artifact).build();

        let mut corrupted = tokio::fs::read(&artifact.path).await.unwrap();
        corrupted[0] ^= 0x01;
        let tampered = dir.path().join("tampered.exe");
        tokio::fs::write(&tampered, corrupted).await.unwrap();

        let err = verify_artifact(&manifest, &tampered).await.unwrap_err();
        assert!(matches!(err, PublishError::IntegrityVerification { .. }));
    }

    #[tokio::test]
    async fn verify_rejects_malformed_digest() {
        let manifest = UpdateManifest {
            version: "1.4.0".to_string(),
            path: "App-Setup-1.4.0.exe".to_string(),
            sha2: "deadbeef".to_string(),
            release_name: None,
            release_notes: None,
            release_date: Utc::now(),
        };
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("download.exe");
        tokio::fs::write(&file, b"bytes").await.unwrap();

        assert!(verify_artifact(&manifest, &file).await.is_err());
    }

    #[tokio::test]
    async fn write_manifest_refuses_conflicting_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let first = artifact_at(dir.path(), "first.exe", b"first build").await;
        let second = artifact_at(dir.path(), "second.exe", b"second build").await;

        let manifest = ManifestBuilder::new(&first).build();
        write_manifest(dir.path(), "latest", &manifest).await.unwrap();

        let conflicting = ManifestBuilder::new(&second).build();
        let err = write_manifest(dir.path(), "latest", &conflicting)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Configuration { .. }));

        // Existing manifest is untouched.
        let kept = read_manifest(&dir.path().join("latest.json")).await.unwrap();
        assert_eq!(kept.sha2, manifest.sha2);
    }

    #[tokio::test]
    async fn write_manifest_allows_identical_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_at(dir.path(), "App-Setup-1.4.0.exe", b"installer bytes").await;

        let manifest = ManifestBuilder::new(&artifact).build();
        write_manifest(dir.path(), "beta", &manifest).await.unwrap();
        write_manifest(dir.path(), "beta", &manifest).await.unwrap();
    }
}
