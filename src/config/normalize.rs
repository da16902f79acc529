//! Publish-setting normalization.
//!
//! The raw `publish` setting accepts several shorthands: nothing at all, a
//! bare provider name, a single configuration object, or a list of either.
//! Normalization expands every shorthand into one canonical ordered list of
//! fully-typed provider configurations.
//!
//! Order is semantically significant: the first entry becomes the default
//! auto-update source embedded in Windows installers, so insertion order is
//! preserved exactly and entries are never deduplicated or reordered.

use serde_json::Value;
use std::collections::HashMap;

use super::detect::detect_default_provider;
use super::provider::{ProviderConfig, PublishProvider};
use crate::error::{PublishError, Result};

/// An ordered list of publish targets for one build.
///
/// Owns its configurations for the duration of a publish invocation; they
/// are read-only after normalization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublishTargets(Vec<ProviderConfig>);

impl PublishTargets {
    /// Wraps an already-ordered list of configurations.
    pub fn new(targets: Vec<ProviderConfig>) -> Self {
        Self(targets)
    }

    /// The tie-break target: the first configured provider.
    ///
    /// Used whenever exactly one provider must be chosen for an embedded
    /// default, such as an installer's built-in update source.
    pub fn first(&self) -> Option<&ProviderConfig> {
        self.0.first()
    }

    /// Iterates targets in configuration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProviderConfig> {
        self.0.iter()
    }

    /// Number of configured targets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no target is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a PublishTargets {
    type Item = &'a ProviderConfig;
    type IntoIter = std::slice::Iter<'a, ProviderConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolves the raw `publish` setting into an ordered target list.
///
/// - Absent (or explicit `null`) setting: the provider family is detected
///   from `secrets`; a match yields a single-element list with only the
///   provider set, no match yields an empty list.
/// - A bare string becomes `{"provider": <string>}`.
/// - A single object becomes a one-element list.
/// - A list is expanded element-wise, preserving order.
///
/// Caller-supplied values are never mutated; per-provider defaults stay lazy
/// in the configuration accessors, and an explicit `null` field survives as
/// "disabled" rather than being replaced by a default.
///
/// # Errors
///
/// [`PublishError::Validation`] for a malformed element, naming its index;
/// [`PublishError::Configuration`] when `require_targets` is set and the
/// resulting list is empty.
pub fn resolve_publish_targets(
    raw: Option<&Value>,
    secrets: &HashMap<String, String>,
    require_targets: bool,
) -> Result<PublishTargets> {
    let targets = match raw {
        None | Some(Value::Null) => match detect_default_provider(secrets) {
            Some(provider) => {
                log::info!("no publish configuration, defaulting to {provider} from environment");
                vec![ProviderConfig::from_provider(provider)]
            }
            None => Vec::new(),
        },
        Some(Value::Array(elements)) => elements
            .iter()
            .enumerate()
            .map(|(index, element)| parse_element(index, element))
            .collect::<Result<Vec<_>>>()?,
        Some(single) => vec![parse_element(0, single)?],
    };

    if require_targets && targets.is_empty() {
        return Err(PublishError::configuration(
            "publishing was requested but no publish target is configured \
             and no credentials imply one",
        ));
    }

    Ok(PublishTargets(targets))
}

/// Parses one element of the publish setting.
fn parse_element(index: usize, element: &Value) -> Result<ProviderConfig> {
    match element {
        Value::String(name) => PublishProvider::parse(name)
            .map(ProviderConfig::from_provider)
            .ok_or_else(|| {
                PublishError::validation(index, format!("unknown publish provider \"{name}\""))
            }),
        Value::Object(fields) => {
            let provider = fields.get("provider").ok_or_else(|| {
                PublishError::validation(index, "missing required \"provider\" field")
            })?;
            let name = provider.as_str().ok_or_else(|| {
                PublishError::validation(index, "\"provider\" must be a string")
            })?;
            if PublishProvider::parse(name).is_none() {
                return Err(PublishError::validation(
                    index,
                    format!("unknown publish provider \"{name}\""),
                ));
            }
            serde_json::from_value(element.clone())
                .map_err(|e| PublishError::validation(index, e.to_string()))
        }
        other => Err(PublishError::validation(
            index,
            format!("expected a provider name or configuration object, got {other}"),
        )),
    }
}
