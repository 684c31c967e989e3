//! Harness Configuration (tfmodtest.toml)
//!
//! Handles the optional `tfmodtest.toml` stored next to (or above) the test root.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// Harness configuration from tfmodtest.toml
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Test discovery settings
    pub harness: Option<HarnessConfig>,

    /// Terraform invocation settings
    pub terraform: Option<TerraformConfig>,
}

/// Test discovery configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Reserved dependency-storage directory (default: "vendor")
    pub vendor_dir: Option<String>,

    /// Prerequisite sub-directory name (default: "prereq")
    pub prereq_dir: Option<String>,

    /// Additional directory names that are never test cases
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Terraform invocation configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TerraformConfig {
    /// Terraform executable (default: "terraform")
    pub binary: Option<String>,

    /// Input variables passed as `-var name=value`
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Extra environment variables for every terraform process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Load harness configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the harness configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(harness) = &self.harness {
            if let Some(vendor) = &harness.vendor_dir {
                validate_dir_name("harness.vendor_dir", vendor)?;
            }
            if let Some(prereq) = &harness.prereq_dir {
                validate_dir_name("harness.prereq_dir", prereq)?;
            }
            for name in &harness.exclude {
                validate_dir_name("harness.exclude", name)?;
            }
        }

        if let Some(terraform) = &self.terraform {
            if let Some(binary) = &terraform.binary {
                if binary.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "terraform.binary".to_string(),
                        reason: "binary cannot be empty".to_string(),
                    });
                }
            }
            for name in terraform.vars.keys() {
                if name.is_empty() || name.contains('=') {
                    return Err(ConfigError::InvalidValue {
                        field: "terraform.vars".to_string(),
                        reason: format!("invalid variable name '{}'", name),
                    });
                }
            }
            for name in terraform.env.keys() {
                if name.is_empty() || name.contains('=') {
                    return Err(ConfigError::InvalidValue {
                        field: "terraform.env".to_string(),
                        reason: format!("invalid environment variable name '{}'", name),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the vendor directory name, if configured
    pub fn vendor_dir(&self) -> Option<&str> {
        self.harness.as_ref().and_then(|h| h.vendor_dir.as_deref())
    }

    /// Get the prerequisite directory name, if configured
    pub fn prereq_dir(&self) -> Option<&str> {
        self.harness.as_ref().and_then(|h| h.prereq_dir.as_deref())
    }

    /// Get the terraform binary, if configured
    pub fn terraform_binary(&self) -> Option<&str> {
        self.terraform.as_ref().and_then(|t| t.binary.as_deref())
    }

    /// Merge another harness config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if let Some(other_harness) = &other.harness {
            let harness = self.harness.get_or_insert_with(Default::default);
            if other_harness.vendor_dir.is_some() {
                harness.vendor_dir = other_harness.vendor_dir.clone();
            }
            if other_harness.prereq_dir.is_some() {
                harness.prereq_dir = other_harness.prereq_dir.clone();
            }
            for name in &other_harness.exclude {
                if !harness.exclude.contains(name) {
                    harness.exclude.push(name.clone());
                }
            }
        }

        if let Some(other_tf) = &other.terraform {
            let terraform = self.terraform.get_or_insert_with(Default::default);
            if other_tf.binary.is_some() {
                terraform.binary = other_tf.binary.clone();
            }
            terraform.vars.extend(other_tf.vars.clone());
            terraform.env.extend(other_tf.env.clone());
        }
    }
}

/// A directory name must be exactly one normal path component
fn validate_dir_name(field: &str, name: &str) -> ConfigResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not a plain directory name", name),
        }),
    }
}
