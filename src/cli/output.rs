use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print an indented detail line.
pub fn detail(msg: &str) {
    println!("    {}", msg.dimmed());
}

/// Start a spinner on stderr. Hidden automatically when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Stop a spinner without printing anything.
pub fn abandon_spinner(sp: ProgressBar) {
    sp.finish_and_clear();
}

/// Horizontal bar of `width` cells scaled against `max`.
pub fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = (value * width).div_ceil(max).min(width);
    "█".repeat(cells)
}

/// Print a labelled bar chart row: `label │████ 12`.
pub fn chart_row(label: &str, label_width: usize, value: usize, max: usize) {
    println!(
        "  {:<label_width$} │{} {}",
        label,
        bar(value, max, 40).cyan(),
        value
    );
}

/// Signed byte change, green when positive and red when negative.
pub fn signed_bytes(diff: i64) -> String {
    let text = format!("{diff:+}");
    match diff.signum() {
        1 => text.green().to_string(),
        -1 => text.red().to_string(),
        _ => text.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(10, 10, 40).chars().count(), 40);
        assert_eq!(bar(5, 10, 40).chars().count(), 20);
        assert_eq!(bar(0, 10, 40), "");
        assert_eq!(bar(3, 0, 40), "");
    }

    #[test]
    fn small_values_still_show_one_cell() {
        assert_eq!(bar(1, 1000, 40).chars().count(), 1);
    }
}
