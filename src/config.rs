//! Codec configuration.
//!
//! Every knob has a default, so an empty TOML document (or
//! `CodecConfig::default()`) gives the strict, zero-filling behaviour:
//!
//! ```toml
//! max_depth = 256
//! missing_fields = "zero_fill"   # or "reject"
//! unknown_keys = "ignore"        # or "reject"
//! record_key_order = "declaration" # or "sorted"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default nesting limit for lists and dictionaries.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What `decode_into` does with a record field that has no key in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Leave the field at its `Default` value.
    #[default]
    ZeroFill,
    /// Fail with `MissingField`, unless the field is `omitempty`.
    Reject,
}

/// What `decode_into` does with a dictionary key no record field claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    #[default]
    Ignore,
    Reject,
}

/// Order in which record fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKeyOrder {
    /// Field declaration order. Records declared out of byte order then produce
    /// dictionaries the strict decoder rejects.
    #[default]
    Declaration,
    /// Ascending wire-name order, always canonical.
    Sorted,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    pub max_depth: usize,
    pub missing_fields: MissingFieldPolicy,
    pub unknown_keys: UnknownKeyPolicy,
    pub record_key_order: RecordKeyOrder,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            missing_fields: MissingFieldPolicy::default(),
            unknown_keys: UnknownKeyPolicy::default(),
            record_key_order: RecordKeyOrder::default(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate_strict()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// List every problem with this configuration.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_depth == 0 {
            errors.push("max_depth must be at least 1".to_string());
        }
        errors
    }

    pub fn validate_strict(&self) -> Result<(), ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn with_record_key_order(mut self, order: RecordKeyOrder) -> Self {
        self.record_key_order = order;
        self
    }
}
