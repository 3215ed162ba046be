//! Contains the definition of [`Config`].

use std::num::NonZeroUsize;

use getset::CopyGetters;
use serde::{Deserialize, Serialize};

/// The nesting depth of resolver calls allowed by default.
pub const DEFAULT_RESOLUTION_DEPTH_LIMIT: NonZeroUsize =
    match NonZeroUsize::new(64) {
        Some(limit) => limit,
        None => unreachable!(),
    };

/// What to do with a requirement bucket whose subject is rooted in a
/// parameter the signature doesn't declare.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ForeignParameterPolicy {
    /// The bucket is skipped and a warning is logged.
    #[default]
    Skip,

    /// The bucket aborts the construction with
    /// [`Error::ForeignParameter`](crate::Error::ForeignParameter).
    Reject,
}

/// Tunes how a [`GenericEnvironment`](crate::GenericEnvironment) reacts to
/// unusual input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    CopyGetters,
    typed_builder::TypedBuilder,
)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// See [`ForeignParameterPolicy`].
    #[get_copy = "pub"]
    #[builder(default)]
    foreign_parameters: ForeignParameterPolicy,

    /// How deep resolver calls may nest on one thread before the resolution
    /// is reported as [`Error::ResolutionOverflow`]. Always at least one, so
    /// a resolver can run at all.
    ///
    /// [`Error::ResolutionOverflow`]: crate::Error::ResolutionOverflow
    #[get_copy = "pub"]
    #[builder(default = DEFAULT_RESOLUTION_DEPTH_LIMIT)]
    resolution_depth_limit: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            foreign_parameters: ForeignParameterPolicy::default(),
            resolution_depth_limit: DEFAULT_RESOLUTION_DEPTH_LIMIT,
        }
    }
}

/// An error that occurs when loading or storing a [`Config`].
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to parse the configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Parses a configuration from TOML. Missing keys take their default
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys and a
    /// zero depth limit.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Serializes the configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
