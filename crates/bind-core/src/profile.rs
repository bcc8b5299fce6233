//! File-based mapping profiles.
//!
//! A profile carries everything a [`MappingConfig`] holds except manual
//! transforms, which only exist in code.

use std::path::Path;

use bind_types::ValueType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MappingConfig;
use crate::error::MapperError;
use crate::names::NameTransformation;

/// Errors raised while loading or applying a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read mapping profile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mapping profile: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid rule in mapping profile: {0}")]
    Rule(#[from] MapperError),

    #[error("Rule for '{column}' is marked typed but names no type")]
    MissingType { column: String },
}

/// One override rule as written in a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRule {
    /// Source column name
    pub source: String,

    /// Target field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Coercion destination
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<ValueType>,

    /// Register through the primitive-only typed path
    #[serde(default)]
    pub typed: bool,

    #[serde(default)]
    pub trim: bool,
}

/// A mapping configuration in serializable form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_transformation: Option<NameTransformation>,

    #[serde(default)]
    pub ignore_unmapped: bool,

    #[serde(default)]
    pub rules: Vec<ProfileRule>,
}

impl MappingProfile {
    /// Parse a profile from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ProfileError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a profile from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Append this profile's rules to `config`, in file order, and set its
    /// global switches.
    ///
    /// A name transformation in the profile replaces the configuration's;
    /// `ignore_unmapped: true` switches it on but never off. On error
    /// `config` is left untouched.
    pub fn apply(&self, config: &mut MappingConfig) -> Result<(), ProfileError> {
        let mut staged = config.clone();
        self.apply_to(&mut staged)?;
        *config = staged;
        Ok(())
    }

    fn apply_to(&self, config: &mut MappingConfig) -> Result<(), ProfileError> {
        if let Some(transformation) = &self.name_transformation {
            config.set_name_transformation(
                transformation.pattern.clone(),
                transformation.replacement.clone(),
            );
        }
        if self.ignore_unmapped {
            config.set_ignore_unmapped(true);
        }

        for rule in &self.rules {
            let target = rule.target.as_deref();
            let handle = match (&rule.target_type, rule.typed) {
                (Some(ty), true) => config.add_typed_rule_as(&rule.source, ty.clone(), target)?,
                (None, true) => {
                    return Err(ProfileError::MissingType {
                        column: rule.source.clone(),
                    })
                }
                (ty, false) => config.add_rule(&rule.source, target, ty.clone()),
            };
            if rule.trim {
                handle.trim();
            }
        }
        Ok(())
    }

    /// Build a fresh configuration from this profile.
    pub fn into_config(self) -> Result<MappingConfig, ProfileError> {
        let mut config = MappingConfig::new();
        self.apply(&mut config)?;
        Ok(config)
    }
}
