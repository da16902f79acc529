//! Publish orchestration.
//!
//! Composes configuration resolution, URL computation and manifest
//! generation, then fans artifact uploads out to every configured provider
//! concurrently. Providers are independent network endpoints with no shared
//! state, so one provider's failure never cancels another's upload: results
//! are aggregated per provider and a policy decides whether any failure
//! fails the overall call. "Publish" is not transactional: succeeded
//! uploads are never rolled back.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{ProviderConfig, PublishProvider, PublishTargets, RepoRef};
use crate::error::{PublishError, Result, UploadFailure, UploadFailures};

use super::collaborators::{ReleaseLister, Uploader};
use super::manifest::{ArtifactDescriptor, ManifestBuilder, UpdateManifest, manifest_file_name, write_manifest};
use super::url::{UrlContext, compute_artifact_url, compute_base_url, current_os_key};

/// Decides how per-provider failures affect the overall publish call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Any provider failure fails the call after all providers finished
    /// (default). Succeeded uploads stay in place.
    #[default]
    FailOnError,

    /// Report per-provider failures but return success.
    ContinueOnError,
}

/// Per-publish parameters.
#[derive(Clone, Debug)]
pub struct PublishOptions {
    /// Update channel the manifest is published under.
    pub channel: String,

    /// Operating-system key for URL macros (`win`, `mac`, `linux`).
    pub os: String,

    /// Architecture string for URL macros.
    pub arch: String,

    /// Human-readable release name for the manifest.
    pub release_name: Option<String>,

    /// Release notes for the manifest.
    pub release_notes: Option<String>,
}

impl PublishOptions {
    /// Options for a channel, with os/arch taken from the build host.
    pub fn for_channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            os: current_os_key().to_string(),
            arch: std::env::consts::ARCH.to_string(),
            release_name: None,
            release_notes: None,
        }
    }
}

/// Result of one provider's upload task.
#[derive(Debug)]
pub struct ProviderOutcome {
    /// Position of the provider in the target list.
    pub index: usize,

    /// Provider family.
    pub provider: PublishProvider,

    /// Remote keys uploaded before the first failure, in order.
    pub uploaded: Vec<String>,

    /// Failure message, if the provider's task failed.
    pub error: Option<String>,
}

impl ProviderOutcome {
    /// Returns true when every upload for this provider succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated result of a publish call.
#[derive(Debug)]
pub struct PublishReport {
    /// The channel manifest generated for this publish.
    pub manifest: UpdateManifest,

    /// Local path the manifest was written to.
    pub manifest_path: PathBuf,

    /// One outcome per configured provider, in target-list order.
    pub outcomes: Vec<ProviderOutcome>,
}

/// Publishes build artifacts to every configured provider.
///
/// Transport is injected: byte-shoveling goes through the [`Uploader`] and
/// release asset discovery through the [`ReleaseLister`], so orchestration
/// logic stays deterministic under test.
pub struct Publisher {
    uploader: Arc<dyn Uploader>,
    lister: Arc<dyn ReleaseLister>,
    policy: FailurePolicy,
    detected_repo: Option<RepoRef>,
}

impl Publisher {
    /// Creates a publisher with the given collaborators.
    pub fn new(uploader: Arc<dyn Uploader>, lister: Arc<dyn ReleaseLister>) -> Self {
        Self {
            uploader,
            lister,
            policy: FailurePolicy::default(),
            detected_repo: None,
        }
    }

    /// Sets the failure policy.
    ///
    /// Default: [`FailurePolicy::FailOnError`]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the repository detected from package metadata, used by github
    /// targets that omit `repo`.
    pub fn detected_repository(mut self, repo: RepoRef) -> Self {
        self.detected_repo = Some(repo);
        self
    }

    /// Publishes `artifacts` to every target, concurrently.
    ///
    /// The first artifact is the update carrier: its bytes back the channel
    /// manifest, which is written next to it and uploaded to each provider
    /// alongside the artifacts. One task runs per provider entry; the call
    /// waits for all tasks and aggregates a result per provider. Cancelling
    /// `cancel` abandons in-flight provider work without awaiting it.
    ///
    /// # Errors
    ///
    /// [`PublishError::Configuration`] before any network activity when no
    /// target or no artifact is given; [`PublishError::UploadsFailed`] when
    /// the failure policy is [`FailurePolicy::FailOnError`] and at least one
    /// provider failed.
    pub async fn publish(
        &self,
        targets: &PublishTargets,
        artifacts: &[ArtifactDescriptor],
        options: &PublishOptions,
        cancel: &CancellationToken,
    ) -> Result<PublishReport> {
        if targets.is_empty() {
            return Err(PublishError::configuration(
                "no publish target configured for this build",
            ));
        }
        let carrier = artifacts.first().ok_or_else(|| {
            PublishError::configuration("no artifacts given to publish")
        })?;

        let mut builder = ManifestBuilder::new(carrier);
        if let Some(name) = &options.release_name {
            builder = builder.release_name(name.clone());
        }
        if let Some(notes) = &options.release_notes {
            builder = builder.release_notes(notes.clone());
        }
        let manifest = builder.build();

        let manifest_dir = carrier.path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let manifest_path = write_manifest(manifest_dir, &options.channel, &manifest).await?;

        log::info!(
            "publishing {} artifact(s) for {} to {} provider(s) on channel {}",
            artifacts.len(),
            manifest.version,
            targets.len(),
            options.channel
        );

        let shared_artifacts: Arc<Vec<ArtifactDescriptor>> = Arc::new(artifacts.to_vec());
        let mut tasks = JoinSet::new();

        for (index, config) in targets.iter().enumerate() {
            let task = ProviderTask {
                index,
                config: config.clone(),
                artifacts: Arc::clone(&shared_artifacts),
                manifest_path: manifest_path.clone(),
                options: options.clone(),
                uploader: Arc::clone(&self.uploader),
            };
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let provider = task.config.provider();
                let index = task.index;
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => ProviderOutcome {
                        index,
                        provider,
                        uploaded: Vec::new(),
                        error: Some("publish cancelled".to_string()),
                    },
                    outcome = task.run() => outcome,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    return Err(PublishError::configuration(format!(
                        "provider upload task panicked: {e}"
                    )));
                }
            }
        }
        outcomes.sort_by_key(|outcome| outcome.index);

        for outcome in &outcomes {
            match &outcome.error {
                None => log::info!(
                    "provider {} ({}): uploaded {} object(s)",
                    outcome.index,
                    outcome.provider,
                    outcome.uploaded.len()
                ),
                Some(error) => log::warn!(
                    "provider {} ({}) failed: {error}",
                    outcome.index,
                    outcome.provider
                ),
            }
        }

        let failures: Vec<UploadFailure> = outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.error.as_ref().map(|message| UploadFailure {
                    index: outcome.index,
                    provider: outcome.provider,
                    message: message.clone(),
                })
            })
            .collect();

        if !failures.is_empty() && self.policy == FailurePolicy::FailOnError {
            return Err(PublishError::UploadsFailed(UploadFailures(failures)));
        }

        Ok(PublishReport {
            manifest,
            manifest_path,
            outcomes,
        })
    }

    /// Resolves the download URL an installer embeds at build time.
    ///
    /// Exactly one URL can be embedded in a generated installer, so only the
    /// first target is consulted; list order is the tie-break. With no
    /// artifact name the provider's base endpoint is returned. Failures here
    /// must abort the calling installer build.
    pub async fn resolve_download_url(
        &self,
        targets: &PublishTargets,
        artifact_name: Option<&str>,
        ctx: &UrlContext<'_>,
    ) -> Result<String> {
        let first = targets.first().ok_or_else(|| {
            PublishError::configuration("no publish target available to compute a download URL")
        })?;

        match artifact_name {
            None => compute_base_url(first, ctx),
            Some(name) => {
                compute_artifact_url(first, name, ctx, &*self.lister, self.detected_repo.as_ref())
                    .await
            }
        }
    }
}

/// One provider's share of a publish call.
struct ProviderTask {
    index: usize,
    config: ProviderConfig,
    artifacts: Arc<Vec<ArtifactDescriptor>>,
    manifest_path: PathBuf,
    options: PublishOptions,
    uploader: Arc<dyn Uploader>,
}

impl ProviderTask {
    async fn run(self) -> ProviderOutcome {
        let provider = self.config.provider();
        let index = self.index;
        let mut uploaded = Vec::new();

        match self.upload_all(&mut uploaded).await {
            Ok(()) => ProviderOutcome {
                index,
                provider,
                uploaded,
                error: None,
            },
            Err(e) => ProviderOutcome {
                index,
                provider,
                uploaded,
                error: Some(e.to_string()),
            },
        }
    }

    async fn upload_all(&self, uploaded: &mut Vec<String>) -> Result<()> {
        for artifact in self.artifacts.iter() {
            let remote_key = self.remote_key_for(artifact)?;
            self.uploader
                .upload(&self.config, &artifact.path, &remote_key)
                .await?;
            uploaded.push(remote_key);
        }

        // The channel manifest travels with the artifacts so update clients
        // can find it at the provider's base endpoint.
        let manifest_name = manifest_file_name(self.channel());
        let manifest_key = match &self.config {
            ProviderConfig::Github(_) => manifest_name,
            _ => {
                let version = self.carrier_version();
                let ctx = self.url_context(&version);
                format!("{}/{manifest_name}", compute_base_url(&self.config, &ctx)?)
            }
        };
        self.uploader
            .upload(&self.config, &self.manifest_path, &manifest_key)
            .await?;
        uploaded.push(manifest_key);

        Ok(())
    }

    /// The key an artifact is uploaded under: the full URL for
    /// URL-addressable providers, the bare asset name for release hosting
    /// (asset URLs are assigned by the service at upload time).
    fn remote_key_for(&self, artifact: &ArtifactDescriptor) -> Result<String> {
        match &self.config {
            ProviderConfig::Github(_) => Ok(artifact.remote_name()),
            _ => {
                let version = artifact.version.to_string();
                let ctx = self.url_context(&version);
                let base = compute_base_url(&self.config, &ctx)?;
                Ok(format!("{base}/{}", artifact.remote_name()))
            }
        }
    }

    /// A target's explicitly configured channel wins over the build-level
    /// one for its own uploads.
    fn channel(&self) -> &str {
        self.config
            .channel_override()
            .unwrap_or(&self.options.channel)
    }

    fn url_context<'a>(&'a self, version: &'a str) -> UrlContext<'a> {
        UrlContext {
            os: &self.options.os,
            arch: &self.options.arch,
            version,
            channel: self.channel(),
        }
    }

    fn carrier_version(&self) -> String {
        self.artifacts
            .first()
            .map(|artifact| artifact.version.to_string())
            .unwrap_or_default()
    }
}
