//! Test harness infrastructure for Terraform modules
//!
//! Discovers test case directories, provisions and tears them down through
//! the [`crate::terraform`] layer, and reports the outcome.

pub mod context;
pub mod discovery;
pub mod reporter;
pub mod runner;

pub use context::TestContext;
pub use discovery::{DiscoveryOptions, TestSuite};
pub use reporter::TestReporter;
pub use runner::TestRunner;
