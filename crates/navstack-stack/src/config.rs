#![forbid(unsafe_code)]

//! Synchronizer policy.
//!
//! [`StackConfig`] collects the knobs of the stack synchronizer. The defaults
//! match the behavior most hosts expect; policies can also be loaded from
//! JSON, or from TOML with the `policy-config` feature.
//!
//! ```
//! use navstack_stack::StackConfig;
//!
//! let config = StackConfig::from_json(r#"{ "reconcile_external_pops": false }"#).unwrap();
//! assert!(!config.reconcile_external_pops);
//! assert!(config.animate_root_recovery);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Policy knobs for a [`NavigationStackController`](crate::NavigationStackController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Animate restoring `[root]` when the host stack is found empty.
    ///
    /// Default: true
    pub animate_root_recovery: bool,

    /// After the host shows a screen, write pops the host performed on its
    /// own (back gestures, back buttons) into the path.
    ///
    /// Default: true
    pub reconcile_external_pops: bool,

    /// During a rebuild, drop encoded elements whose type has no registered
    /// destination instead of leaving them for display-time reconciliation.
    ///
    /// Default: false
    pub prune_encoded_without_destination: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            animate_root_recovery: true,
            reconcile_external_pops: true,
            prune_encoded_without_destination: false,
        }
    }
}

impl StackConfig {
    /// Parse a policy from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    /// Parse a policy from TOML. Missing fields keep their defaults.
    #[cfg(feature = "policy-config")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Toml)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }
}

/// Errors from loading a [`StackConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON stack policy: {err}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(err) => write!(f, "invalid TOML stack policy: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            #[cfg(feature = "policy-config")]
            Self::Toml(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(StackConfig::from_json("{}").unwrap(), StackConfig::default());
    }

    #[test]
    fn json_round_trip() {
        let config = StackConfig {
            prune_encoded_without_destination: true,
            ..StackConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(StackConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn bad_json_is_reported() {
        let err = StackConfig::from_json("{ \"animate_root_recovery\": 3 }").unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON stack policy"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn toml_overrides() {
        let config = StackConfig::from_toml("animate_root_recovery = false\n").unwrap();
        assert!(!config.animate_root_recovery);
        assert!(config.reconcile_external_pops);
    }
}
