//! Per-case test-reporting handle

use std::cell::RefCell;
use std::fmt::Display;

/// Reporting handle for one test case
///
/// Passed explicitly to every provisioning operation. Collects failures and
/// a log of what was run; the runner turns it into a [`TestResult`] once the
/// case is done.
///
/// [`TestResult`]: crate::testing::runner::TestResult
#[derive(Debug)]
pub struct TestContext {
    name: String,
    errors: RefCell<Vec<String>>,
    log: RefCell<Vec<String>>,
}

impl TestContext {
    /// Create a handle for the named case
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            errors: RefCell::new(Vec::new()),
            log: RefCell::new(Vec::new()),
        }
    }

    /// Name of the case
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a line to the case log
    pub fn log(&self, line: impl Into<String>) {
        self.log.borrow_mut().push(line.into());
    }

    /// Mark the case failed and keep going
    pub fn error(&self, message: impl Into<String>) {
        self.errors.borrow_mut().push(message.into());
    }

    /// Mark the case failed and hand the error back so the caller can stop
    pub fn fatal<E: Display>(&self, err: E) -> E {
        self.error(err.to_string());
        err
    }

    /// Whether any failure was recorded
    pub fn failed(&self) -> bool {
        !self.errors.borrow().is_empty()
    }

    /// Recorded failures, oldest first
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Log lines, oldest first
    pub fn log_lines(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}
