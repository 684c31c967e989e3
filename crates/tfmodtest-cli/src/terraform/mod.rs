//! Provisioning layer - drive the Terraform CLI for one stack at a time
//!
//! Every operation takes the per-case [`TestContext`] plus a
//! [`TerraformOptions`] value and either succeeds or returns a
//! [`ProvisionError`]. Output of the tool is logged, never parsed.

mod cli;
mod options;
mod teardown;

pub use cli::TerraformCli;
pub use options::{build_options, TerraformOptions};
pub use teardown::Teardown;

use crate::testing::TestContext;
use std::path::PathBuf;
use thiserror::Error;

/// Lines of tool output kept in a failure message
const ERROR_TAIL_LINES: usize = 20;

/// Something that can bring a stack up and tear it down again
pub trait Provisioner {
    /// Run `init` followed by `apply` in the options' directory
    fn init_and_apply(
        &self,
        t: &TestContext,
        options: &TerraformOptions,
    ) -> Result<(), ProvisionError>;

    /// Run `destroy` in the options' directory
    fn destroy(&self, t: &TestContext, options: &TerraformOptions) -> Result<(), ProvisionError>;
}

impl<P: Provisioner + ?Sized> Provisioner for &P {
    fn init_and_apply(
        &self,
        t: &TestContext,
        options: &TerraformOptions,
    ) -> Result<(), ProvisionError> {
        (**self).init_and_apply(t, options)
    }

    fn destroy(&self, t: &TestContext, options: &TerraformOptions) -> Result<(), ProvisionError> {
        (**self).destroy(t, options)
    }
}

/// Provisioning failures
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to start `{binary} {command}` in {}: {error}", .dir.display())]
    Spawn {
        binary: String,
        command: &'static str,
        dir: PathBuf,
        error: std::io::Error,
    },

    #[error("terraform {command} failed in {} ({status}){}", .dir.display(), tail(.output))]
    Failed {
        command: &'static str,
        dir: PathBuf,
        status: String,
        output: String,
    },
}

impl ProvisionError {
    /// The terraform sub-command that failed
    pub fn command(&self) -> &'static str {
        match self {
            ProvisionError::Spawn { command, .. } | ProvisionError::Failed { command, .. } => {
                command
            }
        }
    }
}

/// Last lines of captured output, prefixed with a newline
fn tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    format!("\n{}", lines[start..].join("\n"))
}
