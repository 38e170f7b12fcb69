use crate::graph_query::domain::{
    CanonicalEdge, CanonicalNode, GraphModel, RawNode, RawRecord, RawRelationship,
};
use crate::graph_query::services::node_classifier::NodeClassifier;
use crate::shared::error::GraphError;
use std::collections::{HashMap, HashSet};

/// Normalized model plus the rows and properties that could not be used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub model: GraphModel,
    /// `GraphError::Normalization` for skipped rows and
    /// `GraphError::Classification` for undecodable node properties
    pub issues: Vec<GraphError>,
}

/// Folds query rows into a deduplicated [`GraphModel`]
pub struct GraphNormalizer;

impl GraphNormalizer {
    pub fn normalize(records: &[RawRecord]) -> GraphModel {
        Self::normalize_with_issues(records).model
    }

    /// Single pass over `records`.
    ///
    /// Nodes are keyed by store id and keep insertion order. An edge is only
    /// kept when both endpoints are already known, so the resulting model
    /// never contains a dangling edge.
    pub fn normalize_with_issues(records: &[RawRecord]) -> Normalized {
        let mut builder = ModelBuilder::default();

        for (row, record) in records.iter().enumerate() {
            if record.n.is_none() && record.m.is_none() {
                builder.skip(format!("row {} has neither an n nor an m column", row));
                continue;
            }
            for node in [&record.n, &record.m].into_iter().flatten() {
                builder.upsert(row, node);
            }
            if let Some(rel) = &record.r {
                builder.link(row, rel);
            }
        }

        builder.finish()
    }
}

#[derive(Default)]
struct ModelBuilder {
    nodes: Vec<CanonicalNode>,
    /// Per node, the property keys still holding classifier fallbacks
    placeholders: Vec<HashSet<String>>,
    index: HashMap<String, usize>,
    edges: Vec<CanonicalEdge>,
    edge_ids: HashSet<String>,
    generated: usize,
    issues: Vec<GraphError>,
}

impl ModelBuilder {
    fn upsert(&mut self, row: usize, raw: &RawNode) {
        let Some(id) = raw.id_string() else {
            self.skip(format!("row {} contains a node without an id", row));
            return;
        };

        let classified = NodeClassifier::classify(raw);
        self.issues.extend(classified.issues);

        match self.index.get(&id).copied() {
            Some(position) => {
                // Observed values refresh, fallbacks only fill gaps; identity stays
                let existing = &mut self.nodes[position].properties;
                let filled = &mut self.placeholders[position];
                for (key, value) in classified.properties {
                    if classified.placeholders.contains(&key) {
                        if !existing.contains_key(&key) {
                            filled.insert(key.clone());
                            existing.insert(key, value);
                        }
                    } else {
                        filled.remove(&key);
                        existing.insert(key, value);
                    }
                }
            }
            None => {
                self.index.insert(id.clone(), self.nodes.len());
                self.placeholders
                    .push(classified.placeholders.into_iter().collect());
                self.nodes.push(CanonicalNode {
                    id,
                    label: classified.label,
                    semantic_type: classified.semantic_type,
                    raw_label: classified.raw_label,
                    labels: raw.labels.clone(),
                    properties: classified.properties,
                });
            }
        }
    }

    fn link(&mut self, row: usize, rel: &RawRelationship) {
        let Some((source, target)) = rel.endpoints() else {
            self.skip(format!(
                "row {}: relationship '{}' has no start_node/end_node or startNode/endNode",
                row, rel.rel_type
            ));
            return;
        };

        if !self.index.contains_key(&source) || !self.index.contains_key(&target) {
            self.skip(format!(
                "row {}: relationship '{}' references a node outside the result ({} -> {})",
                row, rel.rel_type, source, target
            ));
            return;
        }

        let id = match rel.id_string() {
            Some(id) => id,
            None => {
                self.generated += 1;
                format!("edge-{}", self.generated)
            }
        };
        if !self.edge_ids.insert(id.clone()) {
            return;
        }

        let mut edge = CanonicalEdge::new(id, source, target, rel.rel_type.clone());
        edge.properties = rel.properties.clone();
        self.edges.push(edge);
    }

    fn skip(&mut self, reason: String) {
        self.issues.push(GraphError::Normalization { reason });
    }

    fn finish(self) -> Normalized {
        Normalized {
            model: GraphModel {
                nodes: self.nodes,
                edges: self.edges,
            },
            issues: self.issues,
        }
    }
}
