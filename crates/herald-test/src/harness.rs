//! Test logging setup.

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber with `filter`.
///
/// Safe to call from every test; only the first call installs anything.
///
/// ```rust,ignore
/// use herald_test::setup_test_logging;
///
/// #[test]
/// fn my_test() {
///     setup_test_logging("herald_events=debug");
///     // ... test code
/// }
/// ```
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// Set up test logging with the default filter (warn level).
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}
