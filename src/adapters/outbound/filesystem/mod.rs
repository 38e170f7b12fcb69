/// Filesystem adapters for file I/O operations
mod criteria_reader;
mod file_writer;

pub use criteria_reader::FileSystemCriteriaReader;
pub use file_writer::{FileSystemWriter, StdoutPresenter};
