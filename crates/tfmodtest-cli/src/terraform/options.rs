//! Per-invocation terraform options

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options for one terraform stack
///
/// Built fresh for every stack (prerequisite or test case) and owned by the
/// call that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformOptions {
    /// Directory holding the stack's `.tf` files; terraform runs from here
    pub terraform_dir: PathBuf,
    /// Pass `-no-color` to every command
    pub no_color: bool,
    /// Input variables, passed as `-var name=value`
    pub vars: BTreeMap<String, String>,
    /// Extra environment for the terraform process
    pub env_vars: BTreeMap<String, String>,
}

/// Build options targeting `dir` with colored output disabled
pub fn build_options(dir: impl Into<PathBuf>) -> TerraformOptions {
    TerraformOptions::for_dir(dir)
}

impl TerraformOptions {
    /// Options targeting `dir` with colored output disabled
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            terraform_dir: dir.into(),
            no_color: true,
            vars: BTreeMap::new(),
            env_vars: BTreeMap::new(),
        }
    }

    /// Set input variables
    pub fn with_vars(mut self, vars: BTreeMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Set extra environment variables
    pub fn with_env(mut self, env_vars: BTreeMap<String, String>) -> Self {
        self.env_vars = env_vars;
        self
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.terraform_dir
    }

    /// Arguments for `terraform init`
    pub fn init_args(&self) -> Vec<String> {
        self.format_args("init", &["-upgrade=false", "-input=false"], false)
    }

    /// Arguments for `terraform apply`
    pub fn apply_args(&self) -> Vec<String> {
        self.format_args(
            "apply",
            &["-input=false", "-auto-approve", "-lock=false"],
            true,
        )
    }

    /// Arguments for `terraform destroy`
    pub fn destroy_args(&self) -> Vec<String> {
        self.format_args(
            "destroy",
            &["-auto-approve", "-input=false", "-lock=false"],
            true,
        )
    }

    fn format_args(&self, command: &str, flags: &[&str], with_vars: bool) -> Vec<String> {
        let mut args = vec![command.to_string()];
        args.extend(flags.iter().map(|f| f.to_string()));

        if with_vars {
            for (name, value) in &self.vars {
                args.push("-var".to_string());
                args.push(format!("{}={}", name, value));
            }
        }

        if self.no_color {
            args.push("-no-color".to_string());
        }

        args
    }
}
