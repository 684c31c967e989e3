//! CLI configuration via environment variables
//!
//! Settings that shape the CLI itself rather than the harness run. Harness
//! settings live in `tfmodtest.toml` (see the `tfmodtest-config` crate).

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Disable colored output (TFMODTEST_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
    /// Log filter directives (TFMODTEST_LOG=debug)
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            no_color: env::var("TFMODTEST_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
            log_filter: env::var("TFMODTEST_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_config_defaults() {
        env::remove_var("TFMODTEST_NO_COLOR");
        env::remove_var("NO_COLOR");
        env::remove_var("TFMODTEST_LOG");

        let config = Config::from_env();
        assert!(!config.no_color);
        assert!(config.log_filter.is_none());
    }

    #[test]
    #[serial]
    fn test_config_no_color() {
        env::set_var("TFMODTEST_NO_COLOR", "1");
        let config = Config::from_env();
        assert!(config.no_color);
        env::remove_var("TFMODTEST_NO_COLOR");

        // Also test NO_COLOR (standard)
        env::set_var("NO_COLOR", "1");
        let config = Config::from_env();
        assert!(config.no_color);
        env::remove_var("NO_COLOR");
    }

    #[test]
    #[serial]
    fn test_config_log_filter() {
        env::set_var("TFMODTEST_LOG", "tfmodtest=debug,terraform=trace");
        let config = Config::from_env();
        assert_eq!(
            config.log_filter.as_deref(),
            Some("tfmodtest=debug,terraform=trace")
        );

        env::set_var("TFMODTEST_LOG", "  ");
        let config = Config::from_env();
        assert!(config.log_filter.is_none());
        env::remove_var("TFMODTEST_LOG");
    }
}
