//! Tracing setup for tests
//!
//! Every test gets its own dispatcher writing to stdout (when enabled) and to
//! `<target-dir>/test-logs/<test_name>.log`. The log file is deleted when the
//! test passes.

mod config;
mod panic;
mod path;
mod test_tracing;
mod timer;

pub use config::{
    ConfigError,
    FileConfig,
    PanicConfig,
    TracingConfig,
};
pub use test_tracing::TestTracing;

/// Initializes tracing for the calling test, named after the test function.
///
/// ```no_run
/// use steep::init_test_tracing;
///
/// #[test]
/// fn my_test() {
///     let _tracing = init_test_tracing!();
/// }
/// ```
///
/// Passing a [`TestGraph`](crate::TestGraph) also logs its execution forest
/// in DOT format:
///
/// ```no_run
/// use steep::{init_test_tracing, Selection, PASS};
///
/// #[test]
/// fn my_test() {
///     let root = Selection::new(PASS).unwrap();
///     let _tracing = init_test_tracing!(root.graph());
/// }
/// ```
#[macro_export]
macro_rules! init_test_tracing {
    () => {{
        let test_name = {
            fn f() {}
            fn type_name_of<T>(_: T) -> &'static str {
                std::any::type_name::<T>()
            }
            let name = type_name_of(f);
            name.strip_suffix("::f")
                .and_then(|s| s.split("::").last())
                .unwrap_or("unknown")
        };
        $crate::logging::TestTracing::init(test_name)
    }};
    ($graph:expr) => {{
        let tracing = $crate::init_test_tracing!();
        tracing.log_graph(&$graph);
        tracing
    }};
}
