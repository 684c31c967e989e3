//! Test runner - provision and tear down discovered test cases

use crate::terraform::{build_options, ProvisionError, Provisioner, Teardown, TerraformOptions};
use crate::testing::context::TestContext;
use crate::testing::discovery::{TestCase, TestSuite};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of running a single test case
#[derive(Debug, Clone)]
pub enum TestResult {
    /// Every stack applied and was destroyed cleanly
    Pass { duration: Duration },
    /// Provisioning or teardown failed
    Fail {
        errors: Vec<String>,
        duration: Duration,
    },
}

impl TestResult {
    /// Check if this result is a pass
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }

    /// Check if this result is a failure
    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }

    /// Get the duration of this case
    pub fn duration(&self) -> Duration {
        match self {
            TestResult::Pass { duration } => *duration,
            TestResult::Fail { duration, .. } => *duration,
        }
    }

    /// Recorded failures (empty for a pass)
    pub fn errors(&self) -> &[String] {
        match self {
            TestResult::Pass { .. } => &[],
            TestResult::Fail { errors, .. } => errors,
        }
    }
}

/// A completed test case
#[derive(Debug, Clone)]
pub struct TestRun {
    /// The case that was run
    pub case: TestCase,
    /// Result of running it
    pub result: TestResult,
    /// Provisioning log collected while running
    pub log: Vec<String>,
}

/// Sequential test runner over a [`Provisioner`]
pub struct TestRunner<P> {
    provisioner: P,
    /// Input variables for every stack
    vars: BTreeMap<String, String>,
    /// Extra environment for every stack
    env_vars: BTreeMap<String, String>,
}

impl<P: Provisioner> TestRunner<P> {
    /// Create a new runner provisioning through `provisioner`
    pub fn new(provisioner: P) -> Self {
        Self {
            provisioner,
            vars: BTreeMap::new(),
            env_vars: BTreeMap::new(),
        }
    }

    /// Set input variables passed to every stack
    pub fn with_vars(mut self, vars: BTreeMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Set environment variables passed to every stack
    pub fn with_env(mut self, env_vars: BTreeMap<String, String>) -> Self {
        self.env_vars = env_vars;
        self
    }

    /// Run every case in the suite, one after another
    ///
    /// A failing case never stops the cases after it.
    pub fn run(&self, suite: &TestSuite) -> Vec<TestRun> {
        suite.cases.iter().map(|case| self.run_case(case)).collect()
    }

    /// Run a single case and collect its result
    pub fn run_case(&self, case: &TestCase) -> TestRun {
        info!(case = %case.name, prereq = case.has_prereq(), "running test case");
        let start = Instant::now();
        let t = TestContext::new(&case.name);

        if let Err(e) = self.process_case(&t, case) {
            // Already recorded on the context; only the remaining steps are skipped
            debug!(case = %case.name, "aborted after terraform {}", e.command());
        }

        let duration = start.elapsed();
        let result = if t.failed() {
            warn!(case = %case.name, "test case failed");
            TestResult::Fail {
                errors: t.errors(),
                duration,
            }
        } else {
            TestResult::Pass { duration }
        };

        TestRun {
            case: case.clone(),
            result,
            log: t.log_lines(),
        }
    }

    /// Provision the prerequisite (if any) and the case, tearing both down
    ///
    /// Each teardown is scheduled before its stack is applied, so a partial
    /// apply is still destroyed. The case is destroyed before its prerequisite.
    pub fn process_case(&self, t: &TestContext, case: &TestCase) -> Result<(), ProvisionError> {
        let _prereq = match &case.prereq {
            Some(prereq_dir) => {
                let guard = Teardown::schedule(t, &self.provisioner, self.options_for(prereq_dir));
                self.provisioner
                    .init_and_apply(t, guard.options())
                    .map_err(|e| t.fatal(e))?;
                Some(guard)
            }
            None => None,
        };

        let stack = Teardown::schedule(t, &self.provisioner, self.options_for(&case.dir));
        self.provisioner
            .init_and_apply(t, stack.options())
            .map_err(|e| t.fatal(e))?;

        Ok(())
    }

    fn options_for(&self, dir: &Path) -> TerraformOptions {
        build_options(dir)
            .with_vars(self.vars.clone())
            .with_env(self.env_vars.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// A provisioning call seen by [`RecordingProvisioner`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Apply(PathBuf),
        Destroy(PathBuf),
    }

    /// Records calls instead of running terraform; can be told to fail
    #[derive(Default)]
    pub(crate) struct RecordingProvisioner {
        pub calls: RefCell<Vec<Call>>,
        pub fail_apply: Vec<PathBuf>,
        pub fail_destroy: Vec<PathBuf>,
        pub seen_options: RefCell<Vec<TerraformOptions>>,
    }

    impl RecordingProvisioner {
        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    fn failure(command: &'static str, options: &TerraformOptions) -> ProvisionError {
        ProvisionError::Failed {
            command,
            dir: options.terraform_dir.clone(),
            status: "exit code 1".to_string(),
            output: format!("Error: {} rejected", command),
        }
    }

    impl Provisioner for RecordingProvisioner {
        fn init_and_apply(
            &self,
            _t: &TestContext,
            options: &TerraformOptions,
        ) -> Result<(), ProvisionError> {
            self.seen_options.borrow_mut().push(options.clone());
            self.calls
                .borrow_mut()
                .push(Call::Apply(options.terraform_dir.clone()));
            if self.fail_apply.contains(&options.terraform_dir) {
                return Err(failure("apply", options));
            }
            Ok(())
        }

        fn destroy(&self, _t: &TestContext, options: &TerraformOptions) -> Result<(), ProvisionError> {
            self.calls
                .borrow_mut()
                .push(Call::Destroy(options.terraform_dir.clone()));
            if self.fail_destroy.contains(&options.terraform_dir) {
                return Err(failure("destroy", options));
            }
            Ok(())
        }
    }

    fn case(name: &str, prereq: bool) -> TestCase {
        TestCase {
            name: name.to_string(),
            dir: PathBuf::from(name),
            prereq: prereq.then(|| PathBuf::from(name).join("prereq")),
        }
    }

    fn apply(dir: &str) -> Call {
        Call::Apply(PathBuf::from(dir))
    }

    fn destroy(dir: &str) -> Call {
        Call::Destroy(PathBuf::from(dir))
    }

    #[test]
    fn test_case_without_prereq() {
        let provisioner = RecordingProvisioner::default();
        let run = TestRunner::new(&provisioner).run_case(&case("a", false));

        assert!(run.result.is_pass());
        assert_eq!(provisioner.calls(), vec![apply("a"), destroy("a")]);
    }

    #[test]
    fn test_prereq_wraps_case() {
        let provisioner = RecordingProvisioner::default();
        let run = TestRunner::new(&provisioner).run_case(&case("c", true));

        assert!(run.result.is_pass());
        assert_eq!(
            provisioner.calls(),
            vec![
                apply("c/prereq"),
                apply("c"),
                destroy("c"),
                destroy("c/prereq"),
            ]
        );
    }

    #[test]
    fn test_destroy_follows_failed_apply() {
        let provisioner = RecordingProvisioner {
            fail_apply: vec![PathBuf::from("a")],
            ..Default::default()
        };
        let run = TestRunner::new(&provisioner).run_case(&case("a", false));

        assert!(run.result.is_fail());
        assert_eq!(provisioner.calls(), vec![apply("a"), destroy("a")]);
        assert_eq!(run.result.errors().len(), 1);
        assert!(run.result.errors()[0].contains("terraform apply failed in a"));
    }

    #[test]
    fn test_failed_prereq_skips_case_but_tears_down_prereq() {
        let provisioner = RecordingProvisioner {
            fail_apply: vec![PathBuf::from("c/prereq")],
            ..Default::default()
        };
        let run = TestRunner::new(&provisioner).run_case(&case("c", true));

        assert!(run.result.is_fail());
        assert_eq!(
            provisioner.calls(),
            vec![apply("c/prereq"), destroy("c/prereq")]
        );
    }

    #[test]
    fn test_failed_case_apply_tears_down_both() {
        let provisioner = RecordingProvisioner {
            fail_apply: vec![PathBuf::from("c")],
            ..Default::default()
        };
        let run = TestRunner::new(&provisioner).run_case(&case("c", true));

        assert!(run.result.is_fail());
        assert_eq!(
            provisioner.calls(),
            vec![
                apply("c/prereq"),
                apply("c"),
                destroy("c"),
                destroy("c/prereq"),
            ]
        );
    }

    #[test]
    fn test_failed_destroy_still_destroys_prereq() {
        let provisioner = RecordingProvisioner {
            fail_destroy: vec![PathBuf::from("c")],
            ..Default::default()
        };
        let run = TestRunner::new(&provisioner).run_case(&case("c", true));

        assert!(run.result.is_fail());
        assert_eq!(provisioner.calls().last(), Some(&destroy("c/prereq")));
        assert!(run.result.errors()[0].contains("terraform destroy failed in c"));
    }

    #[test]
    fn test_apply_error_recorded_before_teardown_error() {
        let provisioner = RecordingProvisioner {
            fail_apply: vec![PathBuf::from("a")],
            fail_destroy: vec![PathBuf::from("a")],
            ..Default::default()
        };
        let run = TestRunner::new(&provisioner).run_case(&case("a", false));

        let errors = run.result.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("terraform apply failed"));
        assert!(errors[1].contains("terraform destroy failed"));
    }

    #[test]
    fn test_failure_is_isolated_to_its_case() {
        let provisioner = RecordingProvisioner {
            fail_apply: vec![PathBuf::from("a")],
            ..Default::default()
        };
        let suite = TestSuite {
            cases: vec![case("a", false), case("b", false)],
        };
        let runs = TestRunner::new(&provisioner).run(&suite);

        assert_eq!(runs.len(), 2);
        assert!(runs[0].result.is_fail());
        assert!(runs[1].result.is_pass());
        assert_eq!(
            provisioner.calls(),
            vec![apply("a"), destroy("a"), apply("b"), destroy("b")]
        );
    }

    #[test]
    fn test_stacks_get_uncolored_options_with_vars() {
        let provisioner = RecordingProvisioner::default();
        let vars = BTreeMap::from([("region".to_string(), "eu-west-1".to_string())]);
        TestRunner::new(&provisioner)
            .with_vars(vars.clone())
            .run_case(&case("c", true));

        let seen = provisioner.seen_options.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].terraform_dir, PathBuf::from("c/prereq"));
        assert_eq!(seen[1].terraform_dir, PathBuf::from("c"));
        assert!(seen.iter().all(|o| o.no_color && o.vars == vars));
    }

    #[test]
    fn test_result_duration() {
        let pass = TestResult::Pass {
            duration: Duration::from_millis(100),
        };
        assert_eq!(pass.duration(), Duration::from_millis(100));
        assert!(pass.errors().is_empty());

        let fail = TestResult::Fail {
            errors: vec!["error".to_string()],
            duration: Duration::from_millis(50),
        };
        assert_eq!(fail.duration(), Duration::from_millis(50));
    }
}
