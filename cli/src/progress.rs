use crate::ui;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner plus elapsed-time reporting around one long operation
pub struct ProgressTracker {
    operation_name: String,
    start_time: Instant,
    spinner: ProgressBar,
}

impl ProgressTracker {
    /// Start a spinner labelled with `operation_name`
    pub fn start(operation_name: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(operation_name.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));

        Self {
            operation_name: operation_name.to_string(),
            start_time: Instant::now(),
            spinner,
        }
    }

    /// Stop the spinner and report success
    pub fn complete(self) {
        self.spinner.finish_and_clear();
        ui::success_message(&format!(
            "{} completed in {}",
            self.operation_name,
            format_duration(self.start_time.elapsed())
        ));
    }

    /// Stop the spinner and report failure
    pub fn fail(self, reason: &str) {
        self.spinner.finish_and_clear();
        ui::warning_message(&format!(
            "{} failed after {}: {}",
            self.operation_name,
            format_duration(self.start_time.elapsed()),
            reason
        ));
    }
}

/// Format a duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    if seconds < 60 {
        format!("{seconds} seconds")
    } else if seconds < 3600 {
        format!(
            "{} minutes {seconds_remainder} seconds",
            seconds / 60,
            seconds_remainder = seconds % 60
        )
    } else {
        format!(
            "{hours} hours {minutes} minutes",
            hours = seconds / 3600,
            minutes = (seconds % 3600) / 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42 seconds");
        assert_eq!(format_duration(Duration::from_secs(125)), "2 minutes 5 seconds");
        assert_eq!(format_duration(Duration::from_secs(7260)), "2 hours 1 minutes");
    }
}
