//! Credential-environment detection.
//!
//! When no `publish` setting exists, the provider family is implied by which
//! credentials the build environment carries. The environment is injected as
//! a read-only map rather than read from ambient process state, so detection
//! stays a pure function.

use std::collections::HashMap;

use super::provider::PublishProvider;

/// GitHub API token variable.
pub const GITHUB_TOKEN: &str = "GH_TOKEN";

/// Bintray API token variable.
pub const BINTRAY_TOKEN: &str = "BT_TOKEN";

/// S3 access key variable.
pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";

/// S3 secret key variable.
pub const AWS_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Returns the provider family implied by the available credentials.
///
/// Precedence is fixed and earlier families are never overridden by later
/// ones, even when several credentials are set:
///
/// 1. `GH_TOKEN` set → github
/// 2. `BT_TOKEN` set (and `GH_TOKEN` not) → bintray
/// 3. `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` both set (and neither
///    token above) → s3
///
/// Empty-string values count as absent. Returns `None` when no rule matches.
pub fn detect_default_provider(secrets: &HashMap<String, String>) -> Option<PublishProvider> {
    let has = |name: &str| secrets.get(name).is_some_and(|value| !value.is_empty());

    if has(GITHUB_TOKEN) {
        Some(PublishProvider::Github)
    } else if has(BINTRAY_TOKEN) {
        Some(PublishProvider::Bintray)
    } else if has(AWS_ACCESS_KEY) && has(AWS_SECRET_KEY) {
        Some(PublishProvider::S3)
    } else {
        None
    }
}
