/// Console adapters writing user feedback to stderr
mod progress_reporter;

pub use progress_reporter::StderrProgressReporter;
