//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::project::{HarnessConfig, ProjectConfig, TerraformConfig};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Default reserved dependency-storage directory
pub const DEFAULT_VENDOR_DIR: &str = "vendor";
/// Default prerequisite sub-directory
pub const DEFAULT_PREREQ_DIR: &str = "prereq";
/// Default terraform executable
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Harness config (tfmodtest.toml) - overrides defaults
/// 3. Environment variables (TFMODTEST_*) - overrides the file
/// 4. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Harness configuration
    pub project: ProjectConfig,

    /// Directory where tfmodtest.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find tfmodtest.toml, then applies
    /// environment overrides.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, mut project_config) = self.find_project_config(start_dir)?;
        if let Some(root) = &project_root {
            resolve_file_paths(&mut project_config, root);
        }
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            project_root,
        })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let mut project_config = ProjectConfig::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        if let Some(root) = &project_root {
            resolve_file_paths(&mut project_config, root);
        }
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            project_root,
        })
    }

    /// Find harness configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); defaults when nothing is found
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to the harness config
    ///
    /// - TFMODTEST_TERRAFORM: terraform executable
    /// - TFMODTEST_VENDOR_DIR: reserved dependency-storage directory
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        let mut overlay = ProjectConfig::default();

        if let Ok(binary) = env::var("TFMODTEST_TERRAFORM") {
            if !binary.trim().is_empty() {
                overlay.terraform = Some(TerraformConfig {
                    binary: Some(binary),
                    ..Default::default()
                });
            }
        }

        if let Ok(vendor) = env::var("TFMODTEST_VENDOR_DIR") {
            overlay.harness = Some(HarnessConfig {
                vendor_dir: Some(vendor),
                ..Default::default()
            });
        }

        // Overrides go through the same checks as the file
        overlay.validate()?;
        config.merge(&overlay);
        Ok(config)
    }
}

/// Anchor a path-like binary from the config file at the file's directory
fn resolve_file_paths(config: &mut ProjectConfig, root: &Path) {
    if let Some(terraform) = config.terraform.as_mut() {
        if let Some(binary) = terraform.binary.as_mut() {
            *binary = resolve_binary(binary, root);
        }
    }
}

/// Make a relative, path-like executable absolute against `base`
///
/// Bare names such as `terraform` are left alone for `PATH` lookup.
pub fn resolve_binary(binary: &str, base: &Path) -> String {
    let path = Path::new(binary);
    if path.is_relative() && path.components().count() > 1 {
        base.join(path).display().to_string()
    } else {
        binary.to_string()
    }
}

impl Config {
    /// Reserved dependency-storage directory name
    pub fn vendor_dir(&self) -> &str {
        self.project.vendor_dir().unwrap_or(DEFAULT_VENDOR_DIR)
    }

    /// Prerequisite sub-directory name
    pub fn prereq_dir(&self) -> &str {
        self.project.prereq_dir().unwrap_or(DEFAULT_PREREQ_DIR)
    }

    /// All directory names that are never test cases (vendor dir first)
    pub fn excluded_dirs(&self) -> Vec<String> {
        let mut excluded = vec![self.vendor_dir().to_string()];
        if let Some(harness) = &self.project.harness {
            for name in &harness.exclude {
                if !excluded.contains(name) {
                    excluded.push(name.clone());
                }
            }
        }
        excluded
    }

    /// Terraform executable
    pub fn terraform_binary(&self) -> &str {
        self.project
            .terraform_binary()
            .unwrap_or(DEFAULT_TERRAFORM_BINARY)
    }

    /// Input variables for terraform
    pub fn vars(&self) -> BTreeMap<String, String> {
        self.terraform_section().vars
    }

    /// Extra environment variables for terraform
    pub fn env(&self) -> BTreeMap<String, String> {
        self.terraform_section().env
    }

    /// Get the directory holding tfmodtest.toml
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Override the terraform executable (CLI flag)
    pub fn set_terraform_binary(&mut self, binary: impl Into<String>) -> ConfigResult<()> {
        let binary = binary.into();
        if binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "terraform".to_string(),
                reason: "binary cannot be empty".to_string(),
            });
        }
        self.project
            .terraform
            .get_or_insert_with(Default::default)
            .binary = Some(binary);
        Ok(())
    }

    fn terraform_section(&self) -> TerraformConfig {
        self.project.terraform.clone().unwrap_or_default()
    }
}
