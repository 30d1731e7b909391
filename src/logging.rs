use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Normalize a configured log level, `info` for anything unknown.
pub fn effective_level(level: &str) -> &'static str {
    let wanted = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .find(|l| **l == wanted)
        .copied()
        .unwrap_or("info")
}

/// Install the global subscriber: stderr output filtered at `level`, overridable with
/// `RUST_LOG`.
///
/// Calling it twice is harmless, the second subscriber is discarded.
pub fn init_logging(level: &str) {
    let effective = effective_level(level);
    let filter = EnvFilter::builder()
        .with_default_directive(effective.parse().unwrap_or_else(|_| LevelFilter::INFO.into()))
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init()
        .is_ok();

    if installed && effective != level.trim().to_ascii_lowercase() {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", level);
    }
}

#[cfg(test)]
mod logging_test {
    use super::*;

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level("debug"), "debug");
        assert_eq!(effective_level(" WARN "), "warn");
        assert_eq!(effective_level("verbose"), "info");
        assert_eq!(effective_level(""), "info");
    }

    #[test]
    fn test_init_twice() {
        init_logging("debug");
        init_logging("nonsense");
    }
}
