//! Status lines written to stderr.

use owo_colors::OwoColorize;

use super::colors_enabled;

pub fn success(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {message}");
    }
}

pub fn info(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {message}");
    }
}

pub fn warning(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {message}");
    }
}

pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    } else {
        eprintln!("✗ {message}");
    }
}
