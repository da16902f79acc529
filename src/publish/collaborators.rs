//! Injected transport collaborators.
//!
//! The orchestrator never speaks HTTP itself. Byte transport goes through an
//! [`Uploader`], and source-hosting asset discovery through a
//! [`ReleaseLister`]; both are object-safe async traits so tests can inject
//! deterministic fakes. Default reqwest-backed implementations are provided
//! for HTTP-addressable endpoints and the GitHub release API.

use async_trait::async_trait;
use std::path::Path;

use crate::config::ProviderConfig;

/// Uploads one local artifact to one provider.
///
/// `remote_key` is the fully computed artifact URL for URL-addressable
/// providers, or the bare asset name for release-hosted providers whose
/// asset URLs are assigned by the service at upload time.
///
/// Implementations must be idempotent-safe: the orchestrator never retries,
/// but callers may re-invoke a failed publish and already-uploaded content
/// must not corrupt.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Uploads `local_path` under `remote_key` for the given provider.
    async fn upload(
        &self,
        config: &ProviderConfig,
        local_path: &Path,
        remote_key: &str,
    ) -> anyhow::Result<()>;
}

/// Resolves the download URL of an existing release asset.
#[async_trait]
pub trait ReleaseLister: Send + Sync {
    /// Returns the asset's download URL, or `None` when the release exists
    /// but carries no asset with that name (or the release is missing).
    async fn find_asset_url(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        asset_name: &str,
    ) -> anyhow::Result<Option<String>>;
}

/// PUT-based uploader for HTTP-addressable endpoints.
///
/// Sends the artifact bytes to the computed URL, with a bearer token when
/// the target configuration carries one. Retry policy, if any, belongs to
/// callers of the publish operation, not here.
#[derive(Clone, Default)]
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    /// Creates an uploader with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uploader reusing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        config: &ProviderConfig,
        local_path: &Path,
        remote_key: &str,
    ) -> anyhow::Result<()> {
        log::info!(
            "uploading {} to {} ({})",
            local_path.display(),
            remote_key,
            config.provider()
        );

        let body = bytes::Bytes::from(tokio::fs::read(local_path).await?);

        let mut request = self.client.put(remote_key).body(body);
        if let Some(token) = config.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        response.error_for_status()?;
        Ok(())
    }
}

/// Release asset returned by the GitHub API.
#[derive(Debug, serde::Deserialize)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

/// Release-by-tag response, reduced to the fields we read.
#[derive(Debug, serde::Deserialize)]
struct Release {
    assets: Vec<ReleaseAsset>,
}

/// Release lister backed by the GitHub REST API.
pub struct GithubReleaseLister {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubReleaseLister {
    /// Creates a lister against the public GitHub API.
    pub fn new(token: Option<String>) -> Self {
        Self::with_api_base("https://api.github.com", token)
    }

    /// Creates a lister against a custom API base (GitHub Enterprise, test
    /// servers).
    pub fn with_api_base(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            token,
        }
    }
}

#[async_trait]
impl ReleaseLister for GithubReleaseLister {
    async fn find_asset_url(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        asset_name: &str,
    ) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/releases/tags/{tag}",
            self.api_base
        );
        log::debug!("listing release assets from {url}");

        let mut request = self
            .client
            .get(&url)
            .header("User-Agent", "appdist")
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            log::debug!("release {tag} not found in {owner}/{repo}");
            return Ok(None);
        }

        let release: Release = response.error_for_status()?.json().await?;
        Ok(release
            .assets
            .into_iter()
            .find(|asset| asset.name == asset_name)
            .map(|asset| asset.browser_download_url))
    }
}
