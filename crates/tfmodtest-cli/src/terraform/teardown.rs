//! Scoped teardown of a provisioned stack

use super::{Provisioner, TerraformOptions};
use crate::testing::TestContext;
use tracing::warn;

/// A scheduled `destroy` for one stack
///
/// Acquire it *before* `init_and_apply`; the stack is destroyed when the
/// guard goes out of scope, whether provisioning succeeded, returned early
/// with an error, or panicked. Guards drop in reverse order, so a test case
/// is torn down before its prerequisite.
pub struct Teardown<'a> {
    t: &'a TestContext,
    provisioner: &'a dyn Provisioner,
    options: TerraformOptions,
}

impl<'a> Teardown<'a> {
    /// Schedule destruction of the stack described by `options`
    pub fn schedule(
        t: &'a TestContext,
        provisioner: &'a dyn Provisioner,
        options: TerraformOptions,
    ) -> Self {
        Self {
            t,
            provisioner,
            options,
        }
    }

    /// Options of the guarded stack
    pub fn options(&self) -> &TerraformOptions {
        &self.options
    }
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.provisioner.destroy(self.t, &self.options) {
            warn!(
                case = self.t.name(),
                dir = %self.options.dir().display(),
                "teardown failed: {}",
                e
            );
            self.t.error(e.to_string());
        }
    }
}
