use crate::graph_query::domain::GraphModel;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// State published after every completed fetch cycle.
///
/// A snapshot is replaced wholesale; `generation` identifies the
/// `apply_filters`/`load_more` call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub graph: GraphModel,
    pub total_count: u64,
    pub limit: usize,
    pub has_more: bool,
    /// `min(page size, total_count - limit)`
    pub more_available: u64,
    pub fetched_at: DateTime<Utc>,
    pub generation: u64,
    pub data_query: String,
    pub count_query: String,
    /// Rows and properties skipped while normalizing
    pub warnings: Vec<String>,
}

impl GraphSnapshot {
    /// Snapshot before the first fetch, or after a failed one
    pub fn empty(limit: usize, generation: u64) -> Self {
        Self {
            graph: GraphModel::empty(),
            total_count: 0,
            limit,
            has_more: false,
            more_available: 0,
            fetched_at: Utc::now(),
            generation,
            data_query: String::new(),
            count_query: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Computes the pagination fields from the store's total count
    pub fn paginate(total_count: u64, limit: usize, page_size: usize) -> (bool, u64) {
        let limit = limit as u64;
        let has_more = total_count > limit;
        let more_available = if has_more {
            (total_count - limit).min(page_size as u64)
        } else {
            0
        };
        (has_more, more_available)
    }
}
