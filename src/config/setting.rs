//! Presence-aware wrapper for optional configuration fields.
//!
//! Publish settings distinguish a field that was never written from one the
//! user explicitly set to `null`. A missing field takes the per-provider
//! default; an explicit `null` means "disabled". A bare `Option<T>` cannot
//! represent both, so optional provider fields use [`Setting<T>`] instead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An optional configuration field that remembers whether it was written.
///
/// - `Unset`: the field was absent; accessors substitute the default.
/// - `Disabled`: the field was explicitly `null`; the feature is off.
/// - `Value(T)`: the field carries a user-supplied value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Setting<T> {
    /// Field absent from the configuration.
    #[default]
    Unset,

    /// Field explicitly set to `null`.
    Disabled,

    /// Field set to a concrete value.
    Value(T),
}

impl<T> Setting<T> {
    /// Returns the user-supplied value, if any.
    ///
    /// Both `Unset` and `Disabled` yield `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Resolves the field against its default.
    ///
    /// `Unset` falls back to `default`, `Disabled` resolves to `None`, and a
    /// concrete value is returned as-is. Normalization never materializes
    /// defaults into the configuration; they are applied here, at read time.
    pub fn resolve<'a>(&'a self, default: &'a T) -> Option<&'a T> {
        match self {
            Self::Unset => Some(default),
            Self::Disabled => None,
            Self::Value(v) => Some(v),
        }
    }

    /// Returns true if the field was absent from the configuration.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns true if the field was explicitly set to `null`.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

// Serde round-trip: a missing field deserializes through `Default` (Unset),
// `null` through the Option impl below (Disabled). Unset fields must be
// skipped on the wire via `skip_serializing_if = "Setting::is_unset"`.

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Value(value),
            None => Self::Disabled,
        })
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default)]
        channel: Setting<String>,
    }

    #[test]
    fn missing_field_is_unset() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.channel, Setting::Unset);
    }

    #[test]
    fn null_field_is_disabled() {
        let probe: Probe = serde_json::from_str(r#"{"channel": null}"#).unwrap();
        assert_eq!(probe.channel, Setting::Disabled);
    }

    #[test]
    fn concrete_value_round_trips() {
        let probe: Probe = serde_json::from_str(r#"{"channel": "beta"}"#).unwrap();
        assert_eq!(probe.channel, Setting::Value("beta".to_string()));
    }

    #[test]
    fn unset_resolves_to_default() {
        let latest = "latest".to_string();
        assert_eq!(Setting::Unset.resolve(&latest), Some(&latest));
    }

    #[test]
    fn disabled_resolves_to_none() {
        let latest = "latest".to_string();
        assert_eq!(Setting::<String>::Disabled.resolve(&latest), None);
    }

    #[test]
    fn value_overrides_default() {
        let latest = "latest".to_string();
        let beta = Setting::Value("beta".to_string());
        assert_eq!(beta.resolve(&latest).map(String::as_str), Some("beta"));
    }
}
