//! Test reporter - display test results

use crate::testing::runner::{TestResult, TestRun};
use colored::*;
use std::io::{self, Write};
use std::time::Duration;

/// Log lines shown under a failed case
const LOG_TAIL_LINES: usize = 15;

/// Test reporter with output configuration
pub struct TestReporter {
    /// Show one line per case instead of dots
    verbose: bool,
    /// Disable colored output
    no_color: bool,
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TestReporter {
    /// Create a new test reporter
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            no_color: false,
        }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Report test results
    pub fn report(&self, runs: &[TestRun]) {
        if self.no_color {
            colored::control::set_override(false);
        }

        for run in runs {
            self.print_test_result(run);
        }

        // Dots need a newline before the summary
        if !self.verbose && !runs.is_empty() {
            println!();
        }

        println!();
        self.print_summary(runs);
        self.print_failures(runs);

        if self.no_color {
            colored::control::unset_override();
        }
    }

    /// Print a single case result
    fn print_test_result(&self, run: &TestRun) {
        let prereq = if run.case.has_prereq() {
            " [prereq]".dimmed().to_string()
        } else {
            String::new()
        };

        match &run.result {
            TestResult::Pass { duration } => {
                if self.verbose {
                    println!(
                        "{} {}{} ({:.2?})",
                        "PASS".green().bold(),
                        run.case.name,
                        prereq,
                        duration
                    );
                } else {
                    print!("{}", ".".green());
                    let _ = io::stdout().flush();
                }
            }
            TestResult::Fail { duration, .. } => {
                if self.verbose {
                    println!(
                        "{} {}{} ({:.2?})",
                        "FAIL".red().bold(),
                        run.case.name,
                        prereq,
                        duration
                    );
                } else {
                    print!("{}", "F".red().bold());
                    let _ = io::stdout().flush();
                }
            }
        }
    }

    /// Print summary statistics
    fn print_summary(&self, runs: &[TestRun]) {
        let summary = Summary::of(runs);

        println!("{}", "─".repeat(50));

        let status = if summary.failed > 0 {
            "FAILED".red().bold()
        } else {
            "PASSED".green().bold()
        };

        println!(
            "Test result: {} | {} total, {} passed, {} failed",
            status,
            summary.total.to_string().bold(),
            summary.passed.to_string().green().bold(),
            if summary.failed > 0 {
                summary.failed.to_string().red().bold()
            } else {
                summary.failed.to_string().normal()
            }
        );
        println!("Time: {:.2?}", summary.duration);
    }

    /// Print details of failed cases
    fn print_failures(&self, runs: &[TestRun]) {
        let failures: Vec<_> = runs.iter().filter(|r| r.result.is_fail()).collect();

        if failures.is_empty() {
            return;
        }

        println!();
        println!("{}", "Failures:".red().bold());
        println!();

        for run in failures {
            println!("  {} {}", "●".red(), run.case.dir.display());
            println!("    {}", run.case.name.bold());

            for error in run.result.errors() {
                for line in error.lines() {
                    println!("      {}", line.dimmed());
                }
            }

            if !run.log.is_empty() {
                let start = run.log.len().saturating_sub(LOG_TAIL_LINES);
                println!("    {}", "Log:".yellow());
                for line in &run.log[start..] {
                    println!("      {}", line.dimmed());
                }
            }
            println!();
        }
    }
}

/// Totals over a set of runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl Summary {
    /// Count passes and failures
    pub fn of(runs: &[TestRun]) -> Self {
        Self {
            total: runs.len(),
            passed: runs.iter().filter(|r| r.result.is_pass()).count(),
            failed: runs.iter().filter(|r| r.result.is_fail()).count(),
            duration: runs.iter().map(|r| r.result.duration()).sum(),
        }
    }
}

/// JSON document describing a run
pub fn to_json(runs: &[TestRun]) -> serde_json::Value {
    let summary = Summary::of(runs);

    let results: Vec<_> = runs
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.case.name,
                "dir": r.case.dir.display().to_string(),
                "prereq": r.case.has_prereq(),
                "passed": r.result.is_pass(),
                "duration_ms": r.result.duration().as_millis() as u64,
                "errors": r.result.errors(),
            })
        })
        .collect();

    serde_json::json!({
        "tests": summary.total,
        "passed": summary.passed,
        "failed": summary.failed,
        "results": results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::discovery::TestCase;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn make_case(name: &str, prereq: bool) -> TestCase {
        TestCase {
            name: name.to_string(),
            dir: PathBuf::from(name),
            prereq: prereq.then(|| PathBuf::from(name).join("prereq")),
        }
    }

    fn make_pass(name: &str) -> TestRun {
        TestRun {
            case: make_case(name, false),
            result: TestResult::Pass {
                duration: Duration::from_millis(10),
            },
            log: Vec::new(),
        }
    }

    fn make_fail(name: &str, error: &str) -> TestRun {
        TestRun {
            case: make_case(name, true),
            result: TestResult::Fail {
                errors: vec![error.to_string()],
                duration: Duration::from_millis(5),
            },
            log: vec!["Running command terraform".to_string()],
        }
    }

    #[test]
    fn test_reporter_all_pass() {
        let runs = vec![make_pass("a"), make_pass("b")];

        let reporter = TestReporter::new(true).with_no_color(true);
        // Just verify it doesn't panic
        reporter.report(&runs);
    }

    #[test]
    fn test_reporter_with_failures() {
        let runs = vec![
            make_pass("a"),
            make_fail("c", "terraform apply failed in c (exit code 1)\nError: denied"),
        ];

        let reporter = TestReporter::new(true).with_no_color(true);
        reporter.report(&runs);
    }

    #[test]
    fn test_reporter_quiet_mode() {
        let runs = vec![make_pass("a"), make_fail("c", "boom")];

        let reporter = TestReporter::new(false).with_no_color(true);
        reporter.report(&runs);
    }

    #[test]
    fn test_reporter_empty() {
        let runs: Vec<TestRun> = vec![];

        let reporter = TestReporter::new(true).with_no_color(true);
        reporter.report(&runs);
    }

    #[test]
    fn test_summary_counts() {
        let runs = vec![make_pass("a"), make_pass("b"), make_fail("c", "boom")];
        let summary = Summary::of(&runs);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.duration, Duration::from_millis(25));
    }

    #[test]
    fn test_json_report() {
        let runs = vec![make_pass("a"), make_fail("c", "boom")];
        let json = to_json(&runs);

        assert_eq!(json["tests"], 2);
        assert_eq!(json["passed"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["results"][0]["name"], "a");
        assert_eq!(json["results"][0]["prereq"], false);
        assert_eq!(json["results"][0]["errors"], serde_json::json!([]));
        assert_eq!(json["results"][1]["prereq"], true);
        assert_eq!(json["results"][1]["passed"], false);
        assert_eq!(json["results"][1]["errors"][0], "boom");
        assert_eq!(json["results"][1]["duration_ms"], 5);
    }
}
