// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Annotation key configuration.
//!
//! Five keys drive decoding: the outer annotation key and the four role
//! keywords. Empty keys fall back to their defaults; the resolved keys must
//! be pairwise distinct.
//!
//! Keys can also be loaded from YAML, every entry optional:
//!
//! ```yaml
//! key: metrics
//! measurement: series
//! ```

use crate::error::Error;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error as ThisError;

/// Default outer annotation key.
pub const DEFAULT_KEY: &str = "influxqu";
/// Default measurement role keyword.
pub const DEFAULT_MEASUREMENT_KEY: &str = "measurement";
/// Default tag role keyword.
pub const DEFAULT_TAG_KEY: &str = "tag";
/// Default field role keyword.
pub const DEFAULT_FIELD_KEY: &str = "field";
/// Default timestamp role keyword.
pub const DEFAULT_TIMESTAMP_KEY: &str = "timestamp";

/// Modifier suppressing empty tags and fields.
pub const OMITEMPTY: &str = "omitempty";

/// Resolved, validated annotation keys. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "KeysConfig")]
pub struct AnnotationKeys {
    key: String,
    measurement: String,
    tag: String,
    field: String,
    timestamp: String,
}

impl AnnotationKeys {
    /// Build a key set. Empty strings select the default for that slot.
    ///
    /// Fails with [`Error::DuplicatedKey`] when two resolved keys are equal.
    pub fn new(
        key: &str,
        measurement: &str,
        tag: &str,
        field: &str,
        timestamp: &str,
    ) -> Result<Self, Error> {
        let keys = Self {
            key: or_default(key, DEFAULT_KEY),
            measurement: or_default(measurement, DEFAULT_MEASUREMENT_KEY),
            tag: or_default(tag, DEFAULT_TAG_KEY),
            field: or_default(field, DEFAULT_FIELD_KEY),
            timestamp: or_default(timestamp, DEFAULT_TIMESTAMP_KEY),
        };

        let all = keys.as_array();
        for (i, k) in all.iter().enumerate() {
            if all[i + 1..].contains(k) {
                return Err(Error::DuplicatedKey((*k).to_string()));
            }
        }

        Ok(keys)
    }

    /// Outer annotation key (`influxqu` by default).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Parse keys from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: KeysConfig = serde_yaml::from_str(yaml)?;
        Ok(Self::try_from(raw)?)
    }

    /// Parse keys from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn as_array(&self) -> [&str; 5] {
        [
            &self.key,
            &self.measurement,
            &self.tag,
            &self.field,
            &self.timestamp,
        ]
    }
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            measurement: DEFAULT_MEASUREMENT_KEY.to_string(),
            tag: DEFAULT_TAG_KEY.to_string(),
            field: DEFAULT_FIELD_KEY.to_string(),
            timestamp: DEFAULT_TIMESTAMP_KEY.to_string(),
        }
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Raw, unvalidated key configuration as read from YAML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    pub key: String,
    pub measurement: String,
    pub tag: String,
    pub field: String,
    pub timestamp: String,
}

impl TryFrom<KeysConfig> for AnnotationKeys {
    type Error = Error;

    fn try_from(raw: KeysConfig) -> Result<Self, Self::Error> {
        AnnotationKeys::new(
            &raw.key,
            &raw.measurement,
            &raw.tag,
            &raw.field,
            &raw.timestamp,
        )
    }
}

/// Configuration loading errors.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid annotation keys: {0}")]
    Keys(#[from] Error),
}
