//! Spinner and table reporting for the CLI.

use std::time::Duration;

use chrono::{DateTime, Local};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::display::DisplayRow;

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates the countdown spinner.
pub fn make_countdown_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar.set_message("Fetching prayer times...");
    bar
}

/// Message shown next to the spinner.
pub fn spinner_message(city: &str, next_prayer: &str, timer: &str) -> String {
    if city.is_empty() {
        format!("{next_prayer} {}", style(timer).green().bold())
    } else {
        format!(
            "{next_prayer} {} ({city})",
            style(timer).green().bold()
        )
    }
}

/// Prints today's table, highlighting the next event.
pub fn print_day_table(
    city: &str,
    at: DateTime<Local>,
    rows: &[DisplayRow],
    highlight: Option<usize>,
) {
    println!("\n{SEPARATOR}");
    println!("{} {}", style(city).cyan().bold(), at.format("%d-%m-%Y"));
    println!("{SEPARATOR}");

    for (i, row) in rows.iter().enumerate() {
        let line = format!("  {:<10} {}", row.time, row.name);
        if highlight == Some(i) {
            println!("{}", style(line).yellow().bold());
        } else {
            println!("{line}");
        }
    }

    println!("{SEPARATOR}");
}

/// Prints the next event and the time left until it.
pub fn print_next(label: &str, timer: &str) {
    println!("  {label} {}", style(timer).green().bold());
    println!("{SEPARATOR}\n");
}
