//! Test discovery - find test case directories under the test root

use std::path::{Path, PathBuf};
use tfmodtest_config::Config;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// A discovered test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Directory name (e.g., "basic")
    pub name: String,
    /// Path of the case directory under the test root
    pub dir: PathBuf,
    /// Path of the prerequisite stack, when `<dir>/prereq/` exists
    pub prereq: Option<PathBuf>,
}

impl TestCase {
    /// Whether the case carries a prerequisite stack
    pub fn has_prereq(&self) -> bool {
        self.prereq.is_some()
    }
}

/// What discovery skips and where it looks for prerequisites
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Directory names that are never test cases (the vendor dir among them)
    pub excluded: Vec<String>,
    /// Name of the prerequisite sub-directory
    pub prereq_dir: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            excluded: vec!["vendor".to_string()],
            prereq_dir: "prereq".to_string(),
        }
    }
}

impl DiscoveryOptions {
    /// Options from the loaded harness configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            excluded: config.excluded_dirs(),
            prereq_dir: config.prereq_dir().to_string(),
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|e| e == name)
    }
}

/// The test root could not be enumerated
#[derive(Debug, Error)]
#[error("failed to read test root {}: {error}", .root.display())]
pub struct DiscoveryError {
    pub root: PathBuf,
    pub error: walkdir::Error,
}

/// A suite of discovered test cases
#[derive(Debug, Default)]
pub struct TestSuite {
    /// Cases in filesystem listing order
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Discover test cases among the immediate children of `root`
    ///
    /// Every child directory is a case unless its name is excluded. Files and
    /// symlinks are ignored. Cases keep the order the filesystem lists them in.
    pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Self, DiscoveryError> {
        let mut suite = TestSuite::default();

        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| DiscoveryError {
                root: root.to_path_buf(),
                error: e,
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if options.is_excluded(&name) {
                debug!("skipping excluded directory {}", name);
                continue;
            }

            let dir = entry.into_path();
            let prereq = dir.join(&options.prereq_dir);
            let prereq = prereq.is_dir().then_some(prereq);

            suite.cases.push(TestCase { name, dir, prereq });
        }

        Ok(suite)
    }

    /// Filter cases by name pattern
    pub fn filter(&self, pattern: &str) -> Self {
        let cases = self
            .cases
            .iter()
            .filter(|c| c.name.contains(pattern))
            .cloned()
            .collect();

        TestSuite { cases }
    }

    /// Check if suite has any cases
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Get count of cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }
}
