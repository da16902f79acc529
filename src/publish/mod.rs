//! Artifact publication and update manifests.
//!
//! # Overview
//!
//! The publisher:
//! 1. Takes a normalized [`PublishTargets`](crate::config::PublishTargets) list
//! 2. Describes finished build artifacts (size + content hash)
//! 3. Generates the channel manifest update clients consume
//! 4. Computes provider-specific URLs
//! 5. Fans uploads out to every provider concurrently and aggregates results
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA-256 content hashing for artifacts
//! - [`collaborators`] - injected transport traits and default impls
//! - [`manifest`] - update-manifest build, persistence and verification
//! - [`orchestrator`] - the [`Publisher`] fan-out
//! - [`url`] - per-provider URL computation and macro substitution

mod checksum;
mod collaborators;
mod manifest;
mod orchestrator;
mod url;

pub use checksum::calculate_sha256;
pub use collaborators::{GithubReleaseLister, HttpUploader, ReleaseLister, Uploader};
pub use manifest::{
    ArtifactDescriptor, ManifestBuilder, UpdateManifest, manifest_file_name, read_manifest,
    verify_artifact, write_manifest,
};
pub use orchestrator::{
    FailurePolicy, ProviderOutcome, PublishOptions, PublishReport, Publisher,
};
pub use url::{UrlContext, compute_artifact_url, compute_base_url, current_os_key, expand_macros};
