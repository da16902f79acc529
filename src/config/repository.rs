//! Repository slug handling for source-hosting targets.
//!
//! A github target may omit its `repo` field, in which case the owner and
//! name are detected from the package `repository` metadata. Both the short
//! `owner/name` slug and full repository URLs are accepted.

use std::fmt;
use std::str::FromStr;

use crate::error::{PublishError, Result};

/// An owner/name pair identifying a hosted repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Creates a reference from owner and name parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = PublishError;

    /// Parses `owner/name` or a repository URL such as
    /// `https://github.com/owner/name.git`.
    fn from_str(input: &str) -> Result<Self> {
        let path = match url::Url::parse(input) {
            Ok(parsed) => parsed.path().trim_matches('/').to_string(),
            // Not a URL; treat the whole input as a slug.
            Err(_) => input.trim_matches('/').to_string(),
        };

        let mut segments = path.split('/');
        let (owner, name) = match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                (owner, name)
            }
            _ => {
                return Err(PublishError::configuration(format!(
                    "cannot parse repository \"{input}\": expected owner/name"
                )));
            }
        };

        Ok(Self::new(owner, name.trim_end_matches(".git")))
    }
}
