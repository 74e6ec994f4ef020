//! Terminal output: status lines and summaries.
//!
//! ```no_run
//! use blockpack_cli::ui;
//!
//! ui::init_colors();
//! ui::success("Build plan resolved");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_artifact_summary, print_plan_summary};
pub use messages::{error, info, success, warning};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr() && !is_ci()
}

static COLORS: AtomicBool = AtomicBool::new(false);

/// Decide once whether status lines are colored.
pub fn init_colors() {
    COLORS.store(should_use_color(), Ordering::Relaxed);
}

/// Disable colors regardless of the environment (`--no-color`).
pub fn disable_colors() {
    COLORS.store(false, Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_wins() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_color());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
