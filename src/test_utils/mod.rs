//! Shared test utilities.
//!
//! Available to unit tests and, behind the `test-utils` feature, to the
//! integration suite. Provides descriptor fixtures, a temporary project
//! directory builder and a fake Maven repository.

pub mod fixtures;
pub mod repository;

pub use fixtures::{DescriptorFixture, ProjectFixture};
pub use repository::FakeRepository;

use std::sync::Once;

use tracing::Level;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// With an explicit level, enables that level for the crate; otherwise
/// honors `RUST_LOG` when set and stays silent when not. Safe to call from
/// every test, only the first call takes effect.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            tracing_subscriber::EnvFilter::new(format!("flowpack_cli={level}"))
        } else if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
            env_filter
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
