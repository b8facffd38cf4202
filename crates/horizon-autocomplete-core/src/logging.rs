//! Logging facilities.
//!
//! Horizon Autocomplete uses the `tracing` crate for instrumentation. To see
//! logs, install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_autocomplete=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core foundations target.
    pub const CORE: &str = "horizon_autocomplete_core";
    /// Timer system target.
    pub const TIMER: &str = "horizon_autocomplete_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_autocomplete_core::signal";
    /// Async runtime target.
    pub const RUNTIME: &str = "horizon_autocomplete_core::runtime";
    /// Widget state machine target.
    pub const WIDGET: &str = "horizon_autocomplete::widget";
    /// Query trigger (debounce) target.
    pub const TRIGGER: &str = "horizon_autocomplete::trigger";
    /// Suggestion resolver target.
    pub const RESOLVER: &str = "horizon_autocomplete::resolver";
    /// Item text resolution target.
    pub const ITEM_TEXT: &str = "horizon_autocomplete::item_text";
    /// Configuration loading target.
    pub const CONFIG: &str = "horizon_autocomplete::config";
}

/// A guard for timing an operation.
///
/// Opens an `info` span on the `horizon_autocomplete::perf` target that is
/// closed when the guard is dropped.
///
/// ```ignore
/// {
///     let _span = PerfSpan::new("filter_items");
///     // ... timed work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_autocomplete::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_without_subscriber() {
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_targets_are_namespaced() {
        assert!(targets::TIMER.starts_with(targets::CORE));
        assert!(targets::RESOLVER.starts_with("horizon_autocomplete::"));
    }
}
