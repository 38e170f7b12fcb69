use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Classified, deduplicated node of the rendered graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalNode {
    pub id: String,
    /// Display label
    pub label: String,
    /// Semantic type tag (`vulnerability`, `dockerimage`, `internet`, or a raw store type)
    #[serde(rename = "type")]
    pub semantic_type: String,
    /// First label reported by the store
    #[serde(rename = "rawLabel")]
    pub raw_label: String,
    /// Every label reported by the store
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
}

impl CanonicalNode {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Case-insensitive; falls back to `raw_label` when no labels were kept
    pub fn has_label(&self, label: &str) -> bool {
        if self.labels.is_empty() {
            return self.raw_label.eq_ignore_ascii_case(label);
        }
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relation_type: String,
    pub label: String,
    pub properties: Map<String, Value>,
}

impl CanonicalEdge {
    pub fn new(id: String, source: String, target: String, relation_type: String) -> Self {
        Self {
            id,
            source,
            target,
            label: relation_type.clone(),
            relation_type,
            properties: Map::new(),
        }
    }
}

/// The single contract consumed by renderers.
///
/// A fresh model is produced on every fetch cycle; it is never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<CanonicalNode>,
    pub edges: Vec<CanonicalEdge>,
}

impl GraphModel {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&CanonicalNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose source or target is not in `nodes`
    pub fn dangling_edges(&self) -> Vec<&CanonicalEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }
}

/// Node with a presentation position assigned by the layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: CanonicalNode,
    pub x: f64,
    pub y: f64,
    /// BFS depth from the nearest root
    pub level: usize,
}

/// Graph model with every node positioned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionedGraph {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<CanonicalEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> CanonicalNode {
        CanonicalNode {
            id: id.to_string(),
            label: id.to_string(),
            semantic_type: "aws_s3_bucket".to_string(),
            raw_label: "aws_s3_bucket".to_string(),
            labels: vec!["aws_s3_bucket".to_string()],
            properties: Map::new(),
        }
    }

    #[test]
    fn test_serialized_shape_matches_renderer_contract() {
        let model = GraphModel {
            nodes: vec![node("a"), node("b")],
            edges: vec![CanonicalEdge::new(
                "e1".to_string(),
                "a".to_string(),
                "b".to_string(),
                "connects_to".to_string(),
            )],
        };

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["nodes"][0]["id"], "a");
        assert_eq!(json["nodes"][0]["type"], "aws_s3_bucket");
        assert!(json["nodes"][0]["properties"].is_object());
        assert_eq!(json["edges"][0]["source"], "a");
        assert_eq!(json["edges"][0]["type"], "connects_to");
        assert_eq!(json["edges"][0]["label"], "connects_to");
    }

    #[test]
    fn test_dangling_edges_detected() {
        let model = GraphModel {
            nodes: vec![node("a")],
            edges: vec![CanonicalEdge::new(
                "e1".to_string(),
                "a".to_string(),
                "missing".to_string(),
                "x".to_string(),
            )],
        };
        assert_eq!(model.dangling_edges().len(), 1);
    }

    #[test]
    fn test_positioned_node_flattens_fields() {
        let positioned = PositionedNode {
            node: node("a"),
            x: 1.5,
            y: -2.0,
            level: 0,
        };
        let json = serde_json::to_value(&positioned).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["x"], 1.5);
        assert_eq!(json["y"], -2.0);
    }
}
