/// ProgressReporter port for user feedback during fetch cycles
///
/// Implementations write to stderr (or capture messages in tests) so the
/// formatted graph on stdout stays clean.
pub trait ProgressReporter: Send + Sync {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress of a multi-step operation (e.g. page `current` of `total`)
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a non-fatal problem such as a skipped row
    fn report_warning(&self, message: &str);

    /// Reports an error message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
