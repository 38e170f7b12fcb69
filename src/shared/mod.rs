pub mod error;
pub mod result;
pub mod security;

pub use error::{ExitCode, GraphError};
pub use result::Result;
