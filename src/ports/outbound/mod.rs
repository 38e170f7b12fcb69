/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (graph store, file system, console).
pub mod criteria_reader;
pub mod formatter;
pub mod output_presenter;
pub mod progress_reporter;
pub mod query_executor;

pub use criteria_reader::CriteriaReader;
pub use formatter::GraphFormatter;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use query_executor::QueryExecutor;
