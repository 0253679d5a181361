//! Test logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "activation_tables=debug,activation_harness=debug";

/// Installs a global `fmt` subscriber that writes through the test writer.
///
/// Filtering follows `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Safe to
/// call from every test: only the first call in a process installs anything.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("logging initialized twice");
    }
}
