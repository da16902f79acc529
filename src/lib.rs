//! Multi-provider release publishing for desktop applications
//!
//! This library turns publish configuration and ambient credential signals
//! into an ordered list of publish targets, computes provider-specific
//! artifact URLs, and generates the versioned update manifests that
//! auto-update clients consume:
//! - GitHub releases
//! - Amazon S3 buckets
//! - Bintray package repositories
//! - Any generic HTTP(S) server
//!
//! Installer construction and network transport are external collaborators;
//! transport is injected so orchestration stays deterministic under test.

pub mod config;
pub mod error;
pub mod publish;

// Re-export commonly used types
pub use config::{ProviderConfig, PublishProvider, PublishTargets, resolve_publish_targets};
pub use error::{PublishError, Result};
pub use publish::{ArtifactDescriptor, Publisher, UpdateManifest};
