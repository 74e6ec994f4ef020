//! Formatting utilities for sizes, durations, and summaries.

use std::time::Duration;

use blockpack_config::BuildPlan;
use console::Term;
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Format file size in human-readable format.
///
/// ```
/// use blockpack_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format (ms, s, m:s).
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn rule() -> String {
    let width = Term::stderr().size().1 as usize;
    "─".repeat(width.clamp(20, 80))
}

fn heading(title: &str) {
    if colors_enabled() {
        eprintln!("\n{}", title.bold().underline());
    } else {
        eprintln!("\n{title}");
    }
    eprintln!("{}", rule());
}

fn row(label: &str, value: &str) {
    if colors_enabled() {
        eprintln!("  {} {:<12} {}", "▸".blue(), label.bold(), value);
    } else {
        eprintln!("  ▸ {label:<12} {value}");
    }
}

/// Print the essentials of a resolved plan to stderr.
pub fn print_plan_summary(plan: &BuildPlan) {
    heading(&format!("Build plan ({})", plan.mode()));

    if let Some(entry) = plan.entry_path() {
        row("entry", &entry.display().to_string());
    }
    row("output", &plan.output_dir().display().to_string());

    let externals: Vec<&str> = plan.externals().iter().map(|(name, _)| name).collect();
    row(
        "externals",
        &if externals.is_empty() {
            "none".to_string()
        } else {
            externals.join(", ")
        },
    );
    row("plugins", &plan.plugin_names().join(" → "));

    if let Some(server) = plan.dev_server() {
        row("port", &server.port.to_string());
        for route in &server.proxy_routes {
            row("proxy", &format!("{} → {}", route.path_pattern, route.target_origin));
        }
    }
    eprintln!("{}", rule());
}

/// Print emitted files with their sizes, plus a total.
pub fn print_artifact_summary(entries: &[(String, u64)], elapsed: Duration) {
    heading("Emitted files");

    for (name, size) in entries {
        row(name, &format_size(*size));
    }

    eprintln!("{}", rule());
    let total: u64 = entries.iter().map(|(_, size)| size).sum();
    let line = format!(
        "{} files, {} in {}",
        entries.len(),
        format_size(total),
        format_duration(elapsed)
    );
    if colors_enabled() {
        eprintln!("  {} {}", "Total:".bold(), line.green());
    } else {
        eprintln!("  Total: {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_larger_units() {
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }
}
