//! Provider URL computation.
//!
//! Pure string assembly for every provider except github, whose artifact
//! URLs live under per-release asset identifiers assigned at upload time and
//! therefore require a release-listing lookup.

use crate::config::{ProviderConfig, RepoRef, Setting};
use crate::error::{PublishError, Result};

use super::collaborators::ReleaseLister;

/// S3 website endpoint suffix; buckets are addressed as subdomains.
const S3_HOST: &str = "s3.amazonaws.com";

/// Bintray download host.
const BINTRAY_DOWNLOAD_HOST: &str = "dl.bintray.com";

/// Substitution variables for templated URLs.
///
/// `${os}`, `${arch}`, `${version}` and `${channel}` macros in a generic
/// target's `url` expand from these values.
#[derive(Clone, Copy, Debug)]
pub struct UrlContext<'a> {
    /// Operating-system key (`win`, `mac`, `linux`).
    pub os: &'a str,

    /// Architecture string (e.g. `x86_64`).
    pub arch: &'a str,

    /// Version being published.
    pub version: &'a str,

    /// Update channel.
    pub channel: &'a str,
}

/// Returns the operating-system key for the build host.
pub fn current_os_key() -> &'static str {
    if cfg!(target_os = "windows") {
        "win"
    } else if cfg!(target_os = "macos") {
        "mac"
    } else {
        "linux"
    }
}

/// Expands `${...}` macros in a URL template.
///
/// # Errors
///
/// Unknown or unterminated macro tokens are configuration errors; they are
/// never passed through silently.
pub fn expand_macros(template: &str, ctx: &UrlContext<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            PublishError::configuration(format!("unterminated macro in url template \"{template}\""))
        })?;
        match &after[..end] {
            "os" => out.push_str(ctx.os),
            "arch" => out.push_str(ctx.arch),
            "version" => out.push_str(ctx.version),
            "channel" => out.push_str(ctx.channel),
            unknown => {
                return Err(PublishError::configuration(format!(
                    "unknown macro ${{{unknown}}} in url template \"{template}\""
                )));
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Computes the base endpoint URL for one publish target.
///
/// - generic: the configured `url` with macros expanded.
/// - s3: `https://<bucket>.s3.amazonaws.com`, plus `/<path>` when a path is
///   configured. Never any scheme but `https`.
/// - github: `<protocol>://<host>`, defaulting to `https://github.com`. The
///   protocol affects read URLs only; uploads always use `https`.
/// - bintray: `https://dl.bintray.com/<owner>/<repo>`.
///
/// # Errors
///
/// Configuration errors when a field required for URL computation is missing
/// or the assembled URL does not parse.
pub fn compute_base_url(config: &ProviderConfig, ctx: &UrlContext<'_>) -> Result<String> {
    let base = match config {
        ProviderConfig::Generic(generic) => {
            let url = generic.url.value().ok_or_else(|| {
                PublishError::configuration("generic publish target requires a \"url\" field")
            })?;
            expand_macros(url, ctx)?
        }
        ProviderConfig::S3(s3) => {
            let bucket = s3.bucket.value().ok_or_else(|| {
                PublishError::configuration("s3 publish target requires a \"bucket\" field")
            })?;
            let mut url = format!("https://{bucket}.{S3_HOST}");
            if let Some(path) = s3.path.value().filter(|p| !p.is_empty()) {
                url.push('/');
                url.push_str(path.trim_matches('/'));
            }
            url
        }
        ProviderConfig::Github(github) => {
            format!("{}://{}", github.protocol().scheme(), github.host())
        }
        ProviderConfig::Bintray(bintray) => {
            let owner = bintray.owner.value().ok_or_else(|| {
                PublishError::configuration("bintray publish target requires an \"owner\" field")
            })?;
            format!(
                "https://{BINTRAY_DOWNLOAD_HOST}/{owner}/{}",
                bintray.repo()
            )
        }
    };

    // Reject assembled garbage before anything gets embedded in an installer.
    url::Url::parse(&base)
        .map_err(|e| PublishError::configuration(format!("computed base URL \"{base}\": {e}")))?;

    Ok(base)
}

/// Resolves the github repository for a target, falling back to detected
/// package metadata when the configuration leaves `repo` unset.
pub fn resolve_github_repo(
    config: &crate::config::GithubConfig,
    detected: Option<&RepoRef>,
) -> Result<RepoRef> {
    let name = match (&config.repo, detected) {
        (Setting::Value(name), _) => name.clone(),
        (Setting::Unset, Some(found)) => found.name.clone(),
        (Setting::Disabled, _) => {
            return Err(PublishError::configuration(
                "github publish target has repository detection disabled and no \"repo\" field",
            ));
        }
        (Setting::Unset, None) => {
            return Err(PublishError::configuration(
                "github publish target requires a \"repo\" field or detectable repository metadata",
            ));
        }
    };

    let owner = config
        .owner
        .value()
        .cloned()
        .or_else(|| detected.map(|found| found.owner.clone()))
        .ok_or_else(|| {
            PublishError::configuration(
                "github publish target requires an \"owner\" field or detectable repository metadata",
            )
        })?;

    Ok(RepoRef::new(owner, name))
}

/// Computes the absolute URL of a named artifact for one publish target.
///
/// For URL-addressable providers this is the base URL with the artifact name
/// appended. For github targets the URL is resolved through the injected
/// release lister, since asset URLs are assigned by the hosting service; a
/// missing asset is a hard [`PublishError::AssetNotFound`].
pub async fn compute_artifact_url(
    config: &ProviderConfig,
    artifact_name: &str,
    ctx: &UrlContext<'_>,
    lister: &dyn ReleaseLister,
    detected_repo: Option<&RepoRef>,
) -> Result<String> {
    match config {
        ProviderConfig::Github(github) => {
            let repo = resolve_github_repo(github, detected_repo)?;
            let tag = github.tag_name(ctx.version);
            lister
                .find_asset_url(&repo.owner, &repo.name, &tag, artifact_name)
                .await?
                .ok_or_else(|| PublishError::AssetNotFound {
                    owner: repo.owner,
                    repo: repo.name,
                    tag,
                    asset: artifact_name.to_string(),
                })
        }
        _ => {
            let base = compute_base_url(config, ctx)?;
            Ok(format!("{base}/{artifact_name}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenericConfig, GithubConfig, Protocol, S3Config};
    use async_trait::async_trait;

    fn ctx() -> UrlContext<'static> {
        UrlContext {
            os: "win",
            arch: "x86_64",
            version: "1.4.0",
            channel: "latest",
        }
    }

    struct FixedLister(Option<String>);

    #[async_trait]
    impl ReleaseLister for FixedLister {
        async fn find_asset_url(
            &self,
            _owner: &str,
            _repo: &str,
            _tag: &str,
            _asset_name: &str,
        ) -> anyhow::Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn expands_known_macros() {
        let expanded = expand_macros(
            "https://dl.example.com/${os}/${arch}/${channel}/${version}",
            &ctx(),
        )
        .unwrap();
        assert_eq!(expanded, "https://dl.example.com/win/x86_64/latest/1.4.0");
    }

    #[test]
    fn unknown_macro_is_an_error() {
        let err = expand_macros("https://dl.example.com/${platform}", &ctx()).unwrap_err();
        assert!(matches!(err, PublishError::Configuration { .. }));
        assert!(err.to_string().contains("platform"));
    }

    #[test]
    fn unterminated_macro_is_an_error() {
        assert!(expand_macros("https://dl.example.com/${os", &ctx()).is_err());
    }

    #[test]
    fn s3_url_with_path() {
        let config = ProviderConfig::S3(S3Config {
            bucket: "b".to_string().into(),
            path: "p".to_string().into(),
            ..Default::default()
        });
        assert_eq!(
            compute_base_url(&config, &ctx()).unwrap(),
            "https://b.s3.amazonaws.com/p"
        );
    }

    #[test]
    fn s3_url_without_path_has_no_trailing_slash() {
        let config = ProviderConfig::S3(S3Config {
            bucket: "b".to_string().into(),
            ..Default::default()
        });
        assert_eq!(
            compute_base_url(&config, &ctx()).unwrap(),
            "https://b.s3.amazonaws.com"
        );
    }

    #[test]
    fn s3_without_bucket_is_a_configuration_error() {
        let config = ProviderConfig::S3(S3Config::default());
        assert!(matches!(
            compute_base_url(&config, &ctx()),
            Err(PublishError::Configuration { .. })
        ));
    }

    #[test]
    fn github_defaults_to_public_host_over_https() {
        let config = ProviderConfig::Github(GithubConfig::default());
        assert_eq!(
            compute_base_url(&config, &ctx()).unwrap(),
            "https://github.com"
        );
    }

    #[test]
    fn github_http_protocol_changes_read_url_only() {
        let config = ProviderConfig::Github(GithubConfig {
            protocol: Protocol::Http.into(),
            host: "ghe.example.com".to_string().into(),
            ..Default::default()
        });
        assert_eq!(
            compute_base_url(&config, &ctx()).unwrap(),
            "http://ghe.example.com"
        );
    }

    #[test]
    fn generic_requires_url() {
        let config = ProviderConfig::Generic(GenericConfig::default());
        assert!(matches!(
            compute_base_url(&config, &ctx()),
            Err(PublishError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn generic_artifact_appends_name() {
        let config = ProviderConfig::Generic(GenericConfig {
            url: "https://dl.example.com/${channel}".to_string().into(),
            ..Default::default()
        });
        let url = compute_artifact_url(&config, "App-Setup-1.4.0.exe", &ctx(), &FixedLister(None), None)
            .await
            .unwrap();
        assert_eq!(url, "https://dl.example.com/latest/App-Setup-1.4.0.exe");
    }

    #[tokio::test]
    async fn github_artifact_resolves_through_lister() {
        let config = ProviderConfig::Github(GithubConfig {
            owner: "acme".to_string().into(),
            repo: "rocket-sled".to_string().into(),
            ..Default::default()
        });
        let resolved = "https://github.com/acme/rocket-sled/releases/download/v1.4.0/App.exe";
        let url = compute_artifact_url(
            &config,
            "App.exe",
            &ctx(),
            &FixedLister(Some(resolved.to_string())),
            None,
        )
        .await
        .unwrap();
        assert_eq!(url, resolved);
    }

    #[tokio::test]
    async fn github_missing_asset_is_asset_not_found() {
        let config = ProviderConfig::Github(GithubConfig {
            owner: "acme".to_string().into(),
            repo: "rocket-sled".to_string().into(),
            ..Default::default()
        });
        let err = compute_artifact_url(&config, "App.exe", &ctx(), &FixedLister(None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::AssetNotFound { .. }));
    }

    #[test]
    fn github_repo_falls_back_to_detected_metadata() {
        let config = GithubConfig::default();
        let detected = RepoRef::new("acme", "rocket-sled");
        let repo = resolve_github_repo(&config, Some(&detected)).unwrap();
        assert_eq!(repo, detected);
    }

    #[test]
    fn disabled_repo_detection_is_an_error() {
        let config = GithubConfig {
            repo: Setting::Disabled,
            ..Default::default()
        };
        let detected = RepoRef::new("acme", "rocket-sled");
        assert!(resolve_github_repo(&config, Some(&detected)).is_err());
    }

    #[test]
    fn bintray_url_namespaces_owner_and_repo() {
        let config = ProviderConfig::Bintray(crate::config::BintrayConfig {
            owner: "acme".to_string().into(),
            ..Default::default()
        });
        assert_eq!(
            compute_base_url(&config, &ctx()).unwrap(),
            "https://dl.bintray.com/acme/generic"
        );
    }
}
