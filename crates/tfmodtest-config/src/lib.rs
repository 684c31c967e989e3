//! tfmodtest Configuration System
//!
//! Provides configuration for the module test harness:
//! - Harness configuration (`tfmodtest.toml`)
//! - Environment variable overrides (`TFMODTEST_*`)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults (`vendor`, `prereq`, `terraform`)
//! 2. Harness config (`tfmodtest.toml`, searched upwards from the test root)
//! 3. Environment variables (`TFMODTEST_*`)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use tfmodtest_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("skipping {}", config.vendor_dir());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the harness configuration file
pub const CONFIG_FILE_NAME: &str = "tfmodtest.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{resolve_binary, Config, ConfigLoader};
pub use project::{HarnessConfig, ProjectConfig, TerraformConfig};
