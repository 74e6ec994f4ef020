//! Logging setup for the blockpack CLI.
//!
//! The resolution engine only emits `tracing` events; this module installs the
//! subscriber that renders them.
//!
//! # Example
//!
//! ```rust,no_run
//! use blockpack_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Resolving build plan");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "blockpack=debug,blockpack_config=debug,blockpack_cli=debug";
const QUIET_FILTER: &str = "blockpack=error,blockpack_config=error,blockpack_cli=error";
const DEFAULT_FILTER: &str = "blockpack=info,blockpack_config=info,blockpack_cli=info";

/// Pick the filter directives for the given flags.
///
/// Order: `--verbose`, then `--quiet`, then `RUST_LOG`, then the info default.
pub fn filter_directives(verbose: bool, quiet: bool, rust_log: Option<&str>) -> String {
    if verbose {
        VERBOSE_FILTER.to_string()
    } else if quiet {
        QUIET_FILTER.to_string()
    } else {
        rust_log
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_FILTER)
            .to_string()
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at the start of the program, before any logging occurs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(filter_directives(verbose, quiet, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_target(false) // Don't show the module path (keeps output clean)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    // try_init: integration tests may call commands more than once per process
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Check if colored output should be enabled.
///
/// - `NO_COLOR`: If set, disables colors
/// - `FORCE_COLOR`: If set, forces colors even in non-TTY
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_quiet_and_env() {
        assert_eq!(filter_directives(true, true, Some("warn")), VERBOSE_FILTER);
    }

    #[test]
    fn test_quiet_is_errors_only() {
        assert_eq!(filter_directives(false, true, Some("debug")), QUIET_FILTER);
    }

    #[test]
    fn test_rust_log_used_when_no_flags() {
        assert_eq!(filter_directives(false, false, Some("trace")), "trace");
        assert_eq!(filter_directives(false, false, Some("  ")), DEFAULT_FILTER);
        assert_eq!(filter_directives(false, false, None), DEFAULT_FILTER);
    }

    #[test]
    fn test_filters_parse() {
        for directives in [VERBOSE_FILTER, QUIET_FILTER, DEFAULT_FILTER] {
            assert!(EnvFilter::try_new(directives).is_ok());
        }
    }
}
