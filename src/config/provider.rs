//! Provider configuration types.
//!
//! A publish target is one of a closed set of provider families, modeled as a
//! tagged enum so every consumption site dispatches exhaustively on the
//! `provider` discriminant. Each variant carries only its own fields; defaults
//! are applied by accessors at read time, never written back into the
//! configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::setting::Setting;

/// Default update channel when none is configured.
pub const DEFAULT_CHANNEL: &str = "latest";

/// Default host for github targets.
pub const DEFAULT_GITHUB_HOST: &str = "github.com";

/// Default Bintray repository name.
pub const DEFAULT_BINTRAY_REPO: &str = "generic";

/// The provider family discriminant.
///
/// Order of declaration carries no meaning; ordering semantics live in
/// [`PublishTargets`](super::normalize::PublishTargets).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishProvider {
    /// GitHub releases.
    Github,

    /// Amazon S3 bucket.
    S3,

    /// Bintray package repository.
    Bintray,

    /// Any HTTP(S) server.
    Generic,
}

impl PublishProvider {
    /// Returns the wire name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::S3 => "s3",
            Self::Bintray => "bintray",
            Self::Generic => "generic",
        }
    }

    /// Parses a wire name into a provider family.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "github" => Some(Self::Github),
            "s3" => Some(Self::S3),
            "bintray" => Some(Self::Bintray),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for PublishProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL scheme for github read URLs.
///
/// Uploads always travel over `https` regardless of this setting; the
/// protocol only affects generated read URLs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Encrypted transport (default).
    #[default]
    Https,

    /// Plain HTTP. Read URLs only.
    Http,
}

impl Protocol {
    /// Returns the URL scheme string.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http => "http",
        }
    }
}

/// S3 object access policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum S3Acl {
    /// Objects readable by anyone (default). Update clients download
    /// anonymously.
    #[default]
    PublicRead,

    /// Objects readable by the bucket owner only.
    Private,
}

/// S3 storage class for uploaded objects.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum S3StorageClass {
    /// General-purpose storage (default).
    #[default]
    Standard,

    /// Reduced redundancy storage.
    ReducedRedundancy,

    /// Infrequent access storage.
    StandardIa,
}

/// Configuration for publishing to any HTTP(S) server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenericConfig {
    /// The base url, e.g. `https://bucket_name.s3.amazonaws.com`.
    ///
    /// May contain `${os}`, `${arch}`, `${version}` and `${channel}` macros.
    /// Required for URL computation.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub url: Setting<String>,

    /// The update channel.
    ///
    /// Default: `latest`
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub channel: Setting<String>,

    /// The owner.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub owner: Setting<String>,

    /// Access token for authenticated endpoints.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub token: Setting<String>,
}

impl GenericConfig {
    /// Returns the effective channel.
    pub fn channel(&self) -> &str {
        self.channel.value().map_or(DEFAULT_CHANNEL, String::as_str)
    }
}

/// Configuration for publishing to an Amazon S3 bucket.
///
/// S3 only serves encrypted connections reliably, so every URL this
/// configuration produces uses `https`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Config {
    /// The bucket name. Required for URL computation.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub bucket: Setting<String>,

    /// The directory path inside the bucket.
    ///
    /// Default: bucket root (nothing appended)
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub path: Setting<String>,

    /// The update channel.
    ///
    /// Default: `latest`
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub channel: Setting<String>,

    /// Object access policy.
    ///
    /// Default: [`S3Acl::PublicRead`]
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub acl: Setting<S3Acl>,

    /// Storage class for uploaded objects.
    ///
    /// Default: [`S3StorageClass::Standard`]
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub storage_class: Setting<S3StorageClass>,

    /// Secret access key override.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub secret: Setting<String>,

    /// The owner.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub owner: Setting<String>,

    /// Access token.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub token: Setting<String>,
}

impl S3Config {
    /// Returns the effective channel.
    pub fn channel(&self) -> &str {
        self.channel.value().map_or(DEFAULT_CHANNEL, String::as_str)
    }

    /// Returns the effective access policy.
    pub fn acl(&self) -> S3Acl {
        self.acl.value().copied().unwrap_or_default()
    }

    /// Returns the effective storage class.
    pub fn storage_class(&self) -> S3StorageClass {
        self.storage_class.value().copied().unwrap_or_default()
    }
}

/// Configuration for publishing to GitHub releases.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GithubConfig {
    /// The repository name.
    ///
    /// When unset, detected from the package `repository` metadata. An
    /// explicit `null` disables detection.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub repo: Setting<String>,

    /// Whether release tags are `v`-prefixed (`v1.2.3`).
    ///
    /// Default: true
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub v_prefixed_tag_name: Setting<bool>,

    /// The host, including the port if needed.
    ///
    /// Default: `github.com`
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub host: Setting<String>,

    /// The protocol for generated read URLs.
    ///
    /// Uploads only ever travel over `https`.
    ///
    /// Default: [`Protocol::Https`]
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub protocol: Setting<Protocol>,

    /// The repository owner.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub owner: Setting<String>,

    /// API token for release creation and asset upload.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub token: Setting<String>,
}

impl GithubConfig {
    /// Returns the effective host.
    pub fn host(&self) -> &str {
        self.host
            .value()
            .map_or(DEFAULT_GITHUB_HOST, String::as_str)
    }

    /// Returns the effective read-URL protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol.value().copied().unwrap_or_default()
    }

    /// Returns true when release tags carry the `v` prefix.
    pub fn v_prefixed_tag_name(&self) -> bool {
        self.v_prefixed_tag_name.value().copied().unwrap_or(true)
    }

    /// Returns the release tag for a version.
    pub fn tag_name(&self, version: &str) -> String {
        if self.v_prefixed_tag_name() {
            format!("v{version}")
        } else {
            version.to_string()
        }
    }
}

/// Configuration for publishing to a Bintray package repository.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BintrayConfig {
    /// The Bintray package name.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub package: Setting<String>,

    /// The Bintray repository name.
    ///
    /// Default: `generic`
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub repo: Setting<String>,

    /// The Bintray user account. Used when the owner is an organization.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub user: Setting<String>,

    /// The owner.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub owner: Setting<String>,

    /// API token.
    #[serde(skip_serializing_if = "Setting::is_unset")]
    pub token: Setting<String>,
}

impl BintrayConfig {
    /// Returns the effective repository name.
    pub fn repo(&self) -> &str {
        self.repo
            .value()
            .map_or(DEFAULT_BINTRAY_REPO, String::as_str)
    }
}

/// A fully-typed publish target configuration.
///
/// The `provider` discriminant is fixed at construction and selects which
/// specialized fields are meaningful. Configurations are read-only after
/// normalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// GitHub releases.
    Github(GithubConfig),

    /// Amazon S3 bucket.
    S3(S3Config),

    /// Bintray package repository.
    Bintray(BintrayConfig),

    /// Any HTTP(S) server.
    Generic(GenericConfig),
}

impl ProviderConfig {
    /// Creates a configuration with only the provider set.
    ///
    /// All other fields stay unset; per-provider defaults apply lazily
    /// through the variant accessors.
    pub fn from_provider(provider: PublishProvider) -> Self {
        match provider {
            PublishProvider::Github => Self::Github(GithubConfig::default()),
            PublishProvider::S3 => Self::S3(S3Config::default()),
            PublishProvider::Bintray => Self::Bintray(BintrayConfig::default()),
            PublishProvider::Generic => Self::Generic(GenericConfig::default()),
        }
    }

    /// Returns the provider family discriminant.
    pub fn provider(&self) -> PublishProvider {
        match self {
            Self::Github(_) => PublishProvider::Github,
            Self::S3(_) => PublishProvider::S3,
            Self::Bintray(_) => PublishProvider::Bintray,
            Self::Generic(_) => PublishProvider::Generic,
        }
    }

    /// Returns the configured owner, if any.
    pub fn owner(&self) -> Option<&str> {
        let owner = match self {
            Self::Github(c) => &c.owner,
            Self::S3(c) => &c.owner,
            Self::Bintray(c) => &c.owner,
            Self::Generic(c) => &c.owner,
        };
        owner.value().map(String::as_str)
    }

    /// Returns the configured access token, if any.
    pub fn token(&self) -> Option<&str> {
        let token = match self {
            Self::Github(c) => &c.token,
            Self::S3(c) => &c.token,
            Self::Bintray(c) => &c.token,
            Self::Generic(c) => &c.token,
        };
        token.value().map(String::as_str)
    }

    /// Returns the channel this target explicitly configures, if any.
    ///
    /// GitHub and Bintray targets are not channel-addressed and never
    /// override the build-level channel.
    pub fn channel_override(&self) -> Option<&str> {
        match self {
            Self::Generic(c) => c.channel.value().map(String::as_str),
            Self::S3(c) => c.channel.value().map(String::as_str),
            Self::Github(_) | Self::Bintray(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_github_defaults() {
        let config = GithubConfig::default();
        assert_eq!(config.host(), "github.com");
        assert_eq!(config.protocol(), Protocol::Https);
        assert!(config.v_prefixed_tag_name());
        assert_eq!(config.tag_name("1.2.3"), "v1.2.3");
    }

    #[test]
    fn v_prefix_can_be_turned_off() {
        let config = GithubConfig {
            v_prefixed_tag_name: Setting::Value(false),
            ..Default::default()
        };
        assert_eq!(config.tag_name("1.2.3"), "1.2.3");
    }

    #[test]
    fn generic_channel_defaults_to_latest() {
        let config = GenericConfig::default();
        assert_eq!(config.channel(), "latest");
        let beta = GenericConfig {
            channel: Setting::Value("beta".to_string()),
            ..Default::default()
        };
        assert_eq!(beta.channel(), "beta");
    }

    #[test]
    fn s3_defaults() {
        let config = S3Config::default();
        assert_eq!(config.channel(), "latest");
        assert_eq!(config.acl(), S3Acl::PublicRead);
        assert_eq!(config.storage_class(), S3StorageClass::Standard);
    }

    #[test]
    fn tagged_deserialization_dispatches_on_provider() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"provider": "s3", "bucket": "releases"}"#).unwrap();
        assert_eq!(config.provider(), PublishProvider::S3);
        match config {
            ProviderConfig::S3(s3) => {
                assert_eq!(s3.bucket.value().map(String::as_str), Some("releases"));
            }
            other => panic!("expected s3 config, got {other:?}"),
        }
    }

    #[test]
    fn camel_case_wire_names() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"provider": "github", "vPrefixedTagName": false, "host": "ghe.example.com"}"#,
        )
        .unwrap();
        match config {
            ProviderConfig::Github(gh) => {
                assert!(!gh.v_prefixed_tag_name());
                assert_eq!(gh.host(), "ghe.example.com");
            }
            other => panic!("expected github config, got {other:?}"),
        }
    }

    #[test]
    fn storage_class_wire_values() {
        let config: S3Config = serde_json::from_str(
            r#"{"bucket": "b", "storageClass": "REDUCED_REDUNDANCY", "acl": "private"}"#,
        )
        .unwrap();
        assert_eq!(config.storage_class(), S3StorageClass::ReducedRedundancy);
        assert_eq!(config.acl(), S3Acl::Private);
    }
}
