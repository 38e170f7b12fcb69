/// Mock implementations for testing
mod mock_progress_reporter;
mod mock_query_executor;

pub use mock_progress_reporter::MockProgressReporter;
pub use mock_query_executor::MockQueryExecutor;
