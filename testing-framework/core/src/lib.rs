pub mod constants;
pub mod nodes;
pub mod provision;
pub mod scenario;
pub mod topology;

use std::{ops::Mul as _, sync::LazyLock, time::Duration};

use ln_testing_framework_env as tf_env;

/// Boxed error returned by node capabilities.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

static IS_SLOW_TEST_ENV: LazyLock<bool> = LazyLock::new(tf_env::slow_test_env);

/// In slow test environments like Codecov, use 2x timeout.
#[must_use]
pub fn adjust_timeout(d: Duration) -> Duration {
    if *IS_SLOW_TEST_ENV { d.mul(2) } else { d }
}
