use crate::application::dto::GraphSnapshot;
use crate::graph_query::domain::PositionedGraph;
use crate::graph_query::services::LayoutEngine;

/// What the formatters render: the latest snapshot, optionally laid out
#[derive(Debug, Clone, PartialEq)]
pub struct GraphResponse {
    pub snapshot: GraphSnapshot,
    pub layout: Option<PositionedGraph>,
}

impl GraphResponse {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self {
            snapshot,
            layout: None,
        }
    }

    /// Positions every node for a viewport of `viewport_width` pixels
    pub fn with_layout(mut self, engine: &LayoutEngine, viewport_width: f64) -> Self {
        self.layout = Some(engine.position(self.snapshot.graph.clone(), viewport_width));
        self
    }
}
