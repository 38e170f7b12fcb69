use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::Mutex;

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// Keeps stdout free for the formatted graph. Page loading is shown with an
/// indicatif bar; warnings and errors are colored when stderr is a terminal.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
    color: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
            quiet: false,
            color: std::io::stderr().is_terminal(),
        }
    }

    /// Suppresses informational messages; warnings and errors still print
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::new()
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        let mut slot = self.progress_bar.lock().ok()?;
        if let Some(pb) = slot.as_ref() {
            return Some(pb.clone());
        }

        let style = ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages - {msg}")
            .ok()?
            .progress_chars("=>-");
        let pb = ProgressBar::new(total as u64);
        pb.set_style(style);
        *slot = Some(pb.clone());
        Some(pb)
    }

    fn paint(&self, text: &str, paint: fn(&str) -> String) -> String {
        if self.color {
            paint(text)
        } else {
            text.to_string()
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut slot) = self.progress_bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.progress_bar(total) {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
            if let Some(msg) = message {
                pb.set_message(msg.to_string());
            }
        }
    }

    fn report_warning(&self, message: &str) {
        let prefix = self.paint("⚠️  Warning:", |t| t.yellow().to_string());
        eprintln!("{} {}", prefix, message);
    }

    fn report_error(&self, message: &str) {
        self.finish_progress();
        eprintln!("{}", self.paint(message, |t| t.red().to_string()));
    }

    fn report_completion(&self, message: &str) {
        self.finish_progress();
        if !self.quiet {
            eprintln!("{}", self.paint(message, |t| t.green().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = StderrProgressReporter::new();
        // Can't easily test stderr output, but verify it doesn't panic
        reporter.report("Test message");
        reporter.report_progress(1, 3, Some("25 more available"));
        reporter.report_warning("Skipped result row");
        reporter.report_error("Test error");
        reporter.report_completion("Test completion");
    }

    #[test]
    fn test_progress_bar_is_reused_until_finished() {
        let reporter = StderrProgressReporter::default();
        reporter.report_progress(1, 4, None);
        reporter.report_progress(2, 4, None);
        assert!(reporter.progress_bar.lock().unwrap().is_some());

        reporter.report_completion("done");
        assert!(reporter.progress_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        let reporter = StderrProgressReporter {
            color: false,
            ..StderrProgressReporter::new()
        };
        assert_eq!(reporter.paint("plain", |t| t.red().to_string()), "plain");

        let colored = StderrProgressReporter {
            color: true,
            ..StderrProgressReporter::new()
        };
        assert_ne!(colored.paint("red", |t| t.red().to_string()), "red");
    }

    #[test]
    fn test_quiet_reporter_skips_progress() {
        let reporter = StderrProgressReporter::quiet();
        reporter.report_progress(1, 2, Some("ignored"));
        assert!(reporter.progress_bar.lock().unwrap().is_none());
    }
}
