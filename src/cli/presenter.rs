//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    absence_shown: bool,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            absence_shown: false,
        }
    }

    /// Start a spinner with message, replacing any running one
    pub fn start_spinner(&mut self, message: &str) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.finish_with_message(format!("{} {}", "✓".green(), message)),
            None => self.success(message),
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.finish_with_message(format!("{} {}", "✗".red(), message)),
            None => self.error(message),
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.println(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.println(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.println(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.println(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout (redirect URL, config values)
    pub fn output(&self, text: &str) {
        println!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Print above the spinner when one is running
    fn println(&self, line: String) {
        match self.spinner {
            Some(ref spinner) => spinner.println(line),
            None => eprintln!("{}", line),
        }
    }

    /// Format the remaining recording time as a draining bar
    pub fn format_countdown(&self, remaining_secs: u64, total_secs: u64) -> String {
        let fraction = if total_secs > 0 {
            (remaining_secs as f64 / total_secs as f64).min(1.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = (fraction * bar_width as f64).ceil() as usize;
        let empty = bar_width - filled.min(bar_width);

        format!(
            "[{}{}] {:>3}s left",
            "█".repeat(filled.min(bar_width)).red(),
            "░".repeat(empty),
            remaining_secs
        )
    }

    /// Show the recording spinner
    pub fn show_recording(&mut self, total_secs: u64) {
        let countdown = self.format_countdown(total_secs, total_secs);
        self.start_spinner(&format!("Recording... {} (Enter to stop)", countdown));
    }

    /// Update the recording countdown once per tick
    pub fn update_countdown(&self, remaining_secs: u64, total_secs: u64) {
        let countdown = self.format_countdown(remaining_secs, total_secs);
        self.update_spinner(&format!("Recording... {} (Enter to stop)", countdown));
    }

    /// Leave the last countdown frame on screen
    pub fn finish_countdown(&mut self, remaining_secs: u64, total_secs: u64) {
        let message = format!(
            "Recording... {}",
            self.format_countdown(remaining_secs, total_secs)
        );
        match self.spinner.take() {
            Some(spinner) => spinner.finish_with_message(message),
            None => self.println(message),
        }
    }

    /// Show the current question and the button label
    pub fn show_control(&self, label: &str, text: &str, enabled: bool) {
        if !text.is_empty() {
            self.println(format!("\n{} {}", "Q:".bold().cyan(), text.bold()));
        }
        let button = format!("[ {} ]", label);
        if enabled {
            self.println(format!(
                "{}  {}",
                button.reversed(),
                "Enter: press · p: replay · d: dismiss · q: quit".dimmed()
            ));
        } else {
            self.println(button.dimmed().to_string());
        }
    }

    /// Show the absence overlay
    pub fn show_absence(&mut self, message: &str) {
        self.absence_shown = true;
        let bar = "!".repeat(message.chars().count() + 4);
        self.println(format!(
            "{}\n{} {} {}\n{}\n{}",
            bar.on_red().white(),
            "!".on_red().white(),
            message.bold(),
            "!".on_red().white(),
            bar.on_red().white(),
            "Press d to dismiss".dimmed()
        ));
    }

    /// Hide the absence overlay; returns whether it was shown
    pub fn hide_absence(&mut self) -> bool {
        std::mem::replace(&mut self.absence_shown, false)
    }

    pub fn is_absence_shown(&self) -> bool {
        self.absence_shown
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
