use crate::graph_query::domain::RawRecord;
use crate::shared::Result;
use async_trait::async_trait;

/// QueryExecutor port for running compiled programs against the graph store
///
/// Implementations must be `Send + Sync` so the data and count programs of
/// one fetch cycle can run concurrently.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a data program and returns its `(n, r, m)` rows
    ///
    /// # Errors
    /// Returns `GraphError::QueryExecution` when the store is unreachable,
    /// answers with a non-success status or sends a malformed body
    async fn execute(&self, program: &str) -> Result<Vec<RawRecord>>;

    /// Runs a count program; one row per unioned branch, summed
    async fn count(&self, program: &str) -> Result<u64>;
}
