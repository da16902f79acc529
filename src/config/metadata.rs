//! Publish metadata discovery from a single Cargo.toml read.
//!
//! The raw `publish` setting lives under `[package.metadata.publish]`, next
//! to the package name, version and repository URL the publisher needs. The
//! manifest is read and parsed exactly once; everything else is extracted
//! from the parsed value.

use std::path::Path;

use super::repository::RepoRef;
use crate::error::{PublishError, Result};

/// Publish-relevant metadata extracted from Cargo.toml.
pub struct PublishMetadata {
    /// Product name from `[package]` name.
    pub product_name: String,

    /// Package version, semantic-version-shaped.
    pub version: semver::Version,

    /// Repository reference parsed from `[package]` repository, if present
    /// and well-formed.
    pub repository: Option<RepoRef>,

    /// Raw `[package.metadata.publish]` value in the normalizer's
    /// interchange form. `None` when the table is absent.
    pub raw_publish: Option<serde_json::Value>,
}

/// Loads publish metadata from a Cargo.toml manifest.
///
/// # Errors
///
/// Returns a configuration error when the manifest cannot be read, has no
/// `[package]` section, or carries a malformed version.
pub fn load_publish_metadata(cargo_toml_path: &Path) -> Result<PublishMetadata> {
    let manifest = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        PublishError::configuration(format!(
            "failed to read {}: {e}",
            cargo_toml_path.display()
        ))
    })?;

    let toml_value: toml::Value = toml::from_str(&manifest)?;

    let package = toml_value.get("package").ok_or_else(|| {
        PublishError::configuration(format!(
            "no [package] section in {}",
            cargo_toml_path.display()
        ))
    })?;

    let product_name = package
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PublishError::configuration("missing 'name' in [package]"))?
        .to_string();

    let version = package
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PublishError::configuration("missing 'version' in [package]"))?
        .parse::<semver::Version>()
        .map_err(|e| PublishError::configuration(format!("invalid package version: {e}")))?;

    // A repository key that does not parse as owner/name is ignored rather
    // than fatal; targets that need it fail later with a field-level error.
    let repository = package
        .get("repository")
        .and_then(|v| v.as_str())
        .and_then(|v| match v.parse::<RepoRef>() {
            Ok(repo) => Some(repo),
            Err(_) => {
                log::debug!("repository \"{v}\" is not owner/name shaped, ignoring");
                None
            }
        });

    let raw_publish = package
        .get("metadata")
        .and_then(|m| m.get("publish"))
        .map(serde_json::to_value)
        .transpose()?;

    Ok(PublishMetadata {
        product_name,
        version,
        repository,
        raw_publish,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp manifest");
        file.write_all(content.as_bytes()).expect("write manifest");
        file
    }

    #[test]
    fn extracts_package_and_publish_table() {
        let file = write_manifest(
            r#"
[package]
name = "rocket-sled"
version = "1.4.0"
repository = "https://github.com/acme/rocket-sled"

[package.metadata.publish]
provider = "s3"
bucket = "sled-releases"
"#,
        );

        let metadata = load_publish_metadata(file.path()).unwrap();
        assert_eq!(metadata.product_name, "rocket-sled");
        assert_eq!(metadata.version.to_string(), "1.4.0");
        assert_eq!(
            metadata.repository,
            Some(RepoRef::new("acme", "rocket-sled"))
        );
        let raw = metadata.raw_publish.expect("publish table");
        assert_eq!(raw["provider"], "s3");
        assert_eq!(raw["bucket"], "sled-releases");
    }

    #[test]
    fn missing_publish_table_is_none() {
        let file = write_manifest(
            r#"
[package]
name = "rocket-sled"
version = "1.4.0"
"#,
        );

        let metadata = load_publish_metadata(file.path()).unwrap();
        assert!(metadata.raw_publish.is_none());
        assert!(metadata.repository.is_none());
    }

    #[test]
    fn publish_list_survives_conversion() {
        let file = write_manifest(
            r#"
[package]
name = "rocket-sled"
version = "1.4.0"

[[package.metadata.publish]]
provider = "github"

[[package.metadata.publish]]
provider = "generic"
url = "https://dl.example.com"
"#,
        );

        let metadata = load_publish_metadata(file.path()).unwrap();
        let raw = metadata.raw_publish.expect("publish list");
        assert!(raw.is_array());
        assert_eq!(raw[0]["provider"], "github");
    }

    #[test]
    fn missing_package_section_is_an_error() {
        let file = write_manifest("[workspace]\nmembers = []\n");
        assert!(load_publish_metadata(file.path()).is_err());
    }

    #[test]
    fn malformed_version_is_an_error() {
        let file = write_manifest(
            r#"
[package]
name = "rocket-sled"
version = "not-a-version"
"#,
        );
        assert!(load_publish_metadata(file.path()).is_err());
    }
}
