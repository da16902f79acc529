//! Publish-configuration resolution.
//!
//! Turns ambient credential signals and user configuration into a
//! normalized, ordered list of publish targets. The raw setting may be a
//! bare provider name, a single object, a list, or absent entirely; the
//! output is always a [`PublishTargets`] list whose order is preserved
//! exactly as configured.

mod detect;
mod metadata;
mod normalize;
mod provider;
mod repository;
mod setting;

// Re-export all public types
pub use detect::{
    AWS_ACCESS_KEY, AWS_SECRET_KEY, BINTRAY_TOKEN, GITHUB_TOKEN, detect_default_provider,
};
pub use metadata::{PublishMetadata, load_publish_metadata};
pub use normalize::{PublishTargets, resolve_publish_targets};
pub use provider::{
    BintrayConfig, DEFAULT_BINTRAY_REPO, DEFAULT_CHANNEL, DEFAULT_GITHUB_HOST, GenericConfig,
    GithubConfig, Protocol, ProviderConfig, PublishProvider, S3Acl, S3Config, S3StorageClass,
};
pub use repository::RepoRef;
pub use setting::Setting;
