use crate::graph_query::domain::{CanonicalEdge, CanonicalNode, GraphModel};
use crate::graph_query::policies::PublicExposure;
use serde_json::{Map, Value};

pub const INTERNET_NODE_ID: &str = "internet";
pub const INTERNET_EDGE_TYPE: &str = "internet_access";

/// Adds a synthetic `internet` node connected to every publicly reachable node
pub struct InternetExposure;

impl InternetExposure {
    /// Returns the model unchanged when nothing is publicly reachable.
    /// Re-applying to an already synthesized model is a no-op.
    pub fn synthesize(mut model: GraphModel) -> GraphModel {
        let exposed: Vec<String> = model
            .nodes
            .iter()
            .filter(|node| node.id != INTERNET_NODE_ID)
            .filter(|node| PublicExposure::is_publicly_reachable(node))
            .map(|node| node.id.clone())
            .collect();

        if exposed.is_empty() {
            return model;
        }

        for target in &exposed {
            let id = format!("{}->{}", INTERNET_NODE_ID, target);
            if model.edges.iter().any(|edge| edge.id == id) {
                continue;
            }
            model.edges.push(CanonicalEdge::new(
                id,
                INTERNET_NODE_ID.to_string(),
                target.clone(),
                INTERNET_EDGE_TYPE.to_string(),
            ));
        }

        let connections = Value::from(exposed.len());
        match model.nodes.iter_mut().find(|n| n.id == INTERNET_NODE_ID) {
            Some(node) => {
                node.properties
                    .insert("publicConnections".to_string(), connections);
            }
            None => {
                let mut properties = Map::new();
                properties.insert("publicConnections".to_string(), connections);
                model.nodes.push(CanonicalNode {
                    id: INTERNET_NODE_ID.to_string(),
                    label: "Internet".to_string(),
                    semantic_type: INTERNET_NODE_ID.to_string(),
                    raw_label: INTERNET_NODE_ID.to_string(),
                    labels: Vec::new(),
                    properties,
                });
            }
        }

        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, label: &str, props: Value) -> CanonicalNode {
        CanonicalNode {
            id: id.to_string(),
            label: id.to_string(),
            semantic_type: label.to_string(),
            raw_label: label.to_string(),
            labels: vec![label.to_string()],
            properties: props.as_object().cloned().unwrap(),
        }
    }

    fn sample() -> GraphModel {
        GraphModel {
            nodes: vec![
                node("1", "aws_ec2_instance", json!({"public_ip_address": "3.3.3.3"})),
                node("2", "aws_ec2_instance", json!({})),
                node("3", "aws_s3_bucket", json!({"bucket_policy_is_public": true})),
                node(
                    "4",
                    "aws_vpc_security_group_rule",
                    json!({"cidr_ipv4": "0.0.0.0/0", "type": "ingress"}),
                ),
            ],
            edges: vec![],
        }
    }

    #[test]
    fn test_synthesize_connects_public_nodes() {
        let model = InternetExposure::synthesize(sample());

        let internet = model.node(INTERNET_NODE_ID).unwrap();
        assert_eq!(internet.label, "Internet");
        assert_eq!(internet.semantic_type, "internet");
        assert_eq!(internet.properties["publicConnections"], 3);

        let targets: Vec<&str> = model.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["1", "3", "4"]);
        assert_eq!(model.edges[0].id, "internet->1");
        assert_eq!(model.edges[0].relation_type, INTERNET_EDGE_TYPE);
        assert!(model.dangling_edges().is_empty());
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let once = InternetExposure::synthesize(sample());
        let twice = InternetExposure::synthesize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nothing_public_leaves_model_untouched() {
        let model = GraphModel {
            nodes: vec![node("2", "aws_ec2_instance", json!({}))],
            edges: vec![],
        };
        assert_eq!(InternetExposure::synthesize(model.clone()), model);
    }
}
