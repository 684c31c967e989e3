//! Terraform provisioner backed by the `terraform` executable

use super::{ProvisionError, Provisioner, TerraformOptions};
use crate::testing::TestContext;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

/// Runs terraform as a subprocess in the stack's directory
#[derive(Debug, Clone)]
pub struct TerraformCli {
    binary: String,
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new("terraform")
    }
}

impl TerraformCli {
    /// Create a provisioner that invokes `binary`
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Executable being invoked
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Run one terraform command and wait for it
    fn run(
        &self,
        t: &TestContext,
        options: &TerraformOptions,
        command: &'static str,
        args: Vec<String>,
    ) -> Result<(), ProvisionError> {
        let dir = options.dir();
        info!(case = t.name(), dir = %dir.display(), "terraform {}", command);
        t.log(format!(
            "Running command {} with args {:?} in {}",
            self.binary,
            args,
            dir.display()
        ));

        let start = Instant::now();
        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(dir)
            .envs(&options.env_vars)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ProvisionError::Spawn {
                binary: self.binary.clone(),
                command,
                dir: dir.to_path_buf(),
                error: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        for line in stdout.lines().chain(stderr.lines()) {
            debug!(target: "terraform", "{}", line);
            t.log(line);
        }

        debug!(
            case = t.name(),
            "terraform {} finished in {:.2?}",
            command,
            start.elapsed()
        );

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            let mut combined = stdout;
            combined.push_str(&stderr);
            return Err(ProvisionError::Failed {
                command,
                dir: dir.to_path_buf(),
                status,
                output: combined,
            });
        }

        Ok(())
    }
}

impl Provisioner for TerraformCli {
    fn init_and_apply(
        &self,
        t: &TestContext,
        options: &TerraformOptions,
    ) -> Result<(), ProvisionError> {
        self.run(t, options, "init", options.init_args())?;
        self.run(t, options, "apply", options.apply_args())
    }

    fn destroy(&self, t: &TestContext, options: &TerraformOptions) -> Result<(), ProvisionError> {
        self.run(t, options, "destroy", options.destroy_args())
    }
}
