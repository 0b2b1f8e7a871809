pub mod fake_executor;
pub mod fixtures;

pub use fake_executor::{FakeExecutor, FakeExecutorStats, FakeOutcome, HoldGate};

/// Initializes env_logger once for tests that want visible log output.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
