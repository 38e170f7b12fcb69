use crate::application::dto::{GraphRequest, GraphSnapshot};
use crate::shared::Result;
use async_trait::async_trait;

/// GraphExplorationPort - Inbound port for paged graph exploration
///
/// Drivers (the CLI) apply a set of filter criteria, then grow the result
/// page by page. Every call re-runs the bounded query from scratch.
#[async_trait]
pub trait GraphExplorationPort: Send + Sync {
    /// Resets the limit to one page and fetches the graph for `request`
    ///
    /// # Errors
    /// Returns the query execution error after publishing an empty graph
    async fn apply_filters(&self, request: GraphRequest) -> Result<GraphSnapshot>;

    /// Grows the limit by one page and re-fetches with the current criteria
    async fn load_more(&self) -> Result<GraphSnapshot>;

    /// Latest published snapshot
    fn snapshot(&self) -> Result<GraphSnapshot>;
}
