use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber with the `RUST_LOG` filter, or [`DEFAULT_FILTER`].
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Installs the global subscriber, falling back to `default_filter` when `RUST_LOG` is unset.
///
/// Span close events (with their timings) are only printed when debug output is enabled.
pub fn init_with_default(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let is_debug = is_debug_filter(&env_filter.to_string());

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn is_debug_filter(filter: &str) -> bool {
    filter.contains("debug") || filter.contains("trace")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_detection() {
        assert!(is_debug_filter("debug"));
        assert!(is_debug_filter("pdftiff_rs=trace,info"));
        assert!(!is_debug_filter("info"));
    }
}
