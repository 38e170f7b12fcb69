use crate::application::dto::GraphResponse;
use crate::graph_query::domain::{CanonicalEdge, CanonicalNode, PositionedNode};
use crate::ports::outbound::GraphFormatter;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphDocument<'a> {
    nodes: NodeList<'a>,
    edges: &'a [CanonicalEdge],
    pagination: Pagination,
    fetched_at: DateTime<Utc>,
    generation: u64,
    query: Programs<'a>,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [String],
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

/// Positioned nodes when a layout was computed, plain nodes otherwise
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum NodeList<'a> {
    Plain(&'a [CanonicalNode]),
    Positioned(&'a [PositionedNode]),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    total_count: u64,
    limit: usize,
    has_more: bool,
    more_available: u64,
}

#[derive(Debug, Serialize)]
struct Programs<'a> {
    data: &'a str,
    count: &'a str,
}

/// JsonGraphFormatter adapter emitting the canonical graph model
///
/// This is the contract an external renderer consumes: `nodes`
/// (`id`, `label`, `type`, `rawLabel`, `properties`, plus `x`/`y`/`level`
/// when laid out) and `edges` (`id`, `source`, `target`, `type`, `label`,
/// `properties`).
pub struct JsonGraphFormatter;

impl JsonGraphFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonGraphFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphFormatter for JsonGraphFormatter {
    fn format(&self, response: &GraphResponse) -> Result<String> {
        let snapshot = &response.snapshot;
        let (nodes, edges) = match &response.layout {
            Some(layout) => (NodeList::Positioned(&layout.nodes), layout.edges.as_slice()),
            None => (
                NodeList::Plain(&snapshot.graph.nodes),
                snapshot.graph.edges.as_slice(),
            ),
        };

        let document = GraphDocument {
            nodes,
            edges,
            pagination: Pagination {
                total_count: snapshot.total_count,
                limit: snapshot.limit,
                has_more: snapshot.has_more,
                more_available: snapshot.more_available,
            },
            fetched_at: snapshot.fetched_at,
            generation: snapshot.generation,
            query: Programs {
                data: &snapshot.data_query,
                count: &snapshot.count_query,
            },
            warnings: &snapshot.warnings,
        };

        Ok(serde_json::to_string_pretty(&document)?)
    }
}
