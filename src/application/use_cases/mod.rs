/// Use cases module containing application business logic orchestration
mod incremental_loader;

pub use incremental_loader::{IncrementalLoader, PAGE_SIZE};
