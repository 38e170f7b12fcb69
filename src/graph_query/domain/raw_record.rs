use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node payload as returned by the query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, labels: &[&str], properties: Map<String, Value>) -> Self {
        Self {
            id: Value::String(id.into()),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties,
        }
    }

    /// Store id as a string; integer ids are stringified, missing or
    /// structured ids yield `None`
    pub fn id_string(&self) -> Option<String> {
        id_to_string(&self.id)
    }

    /// First label reported by the store
    pub fn first_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|v| !v.is_null())
    }

    /// Non-empty string property (numbers are rendered as text)
    pub fn str_property(&self, key: &str) -> Option<String> {
        match self.property(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Relationship payload as returned by the query endpoint.
///
/// Endpoints arrive as `start_node`/`end_node` from forward matches and as
/// `startNode`/`endNode` from the reverse bidirectional branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRelationship {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "type", default)]
    pub rel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node: Option<Value>,
    #[serde(rename = "startNode", default, skip_serializing_if = "Option::is_none")]
    pub start_node_camel: Option<Value>,
    #[serde(rename = "endNode", default, skip_serializing_if = "Option::is_none")]
    pub end_node_camel: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl RawRelationship {
    /// Forward-style relationship using `start_node`/`end_node`
    pub fn new(
        id: impl Into<String>,
        rel_type: &str,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            id: Value::String(id.into()),
            rel_type: rel_type.to_string(),
            start_node: Some(Value::String(start.into())),
            end_node: Some(Value::String(end.into())),
            start_node_camel: None,
            end_node_camel: None,
            properties: Map::new(),
        }
    }

    /// Resolves `(source, target)` from whichever naming convention is present
    pub fn endpoints(&self) -> Option<(String, String)> {
        let snake = self
            .start_node
            .as_ref()
            .and_then(id_to_string)
            .zip(self.end_node.as_ref().and_then(id_to_string));
        snake.or_else(|| {
            self.start_node_camel
                .as_ref()
                .and_then(id_to_string)
                .zip(self.end_node_camel.as_ref().and_then(id_to_string))
        })
    }

    pub fn id_string(&self) -> Option<String> {
        id_to_string(&self.id)
    }
}

/// One row of a three-column `(n, r, m)` result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub n: Option<RawNode>,
    pub r: Option<RawRelationship>,
    pub m: Option<RawNode>,
}

impl RawRecord {
    pub fn node(n: RawNode) -> Self {
        Self {
            n: Some(n),
            r: None,
            m: None,
        }
    }

    pub fn triple(n: RawNode, r: RawRelationship, m: RawNode) -> Self {
        Self {
            n: Some(n),
            r: Some(r),
            m: Some(m),
        }
    }

    /// Decodes one result row column by column.
    ///
    /// A column that is null or does not have the expected payload shape is
    /// left empty instead of failing the whole response.
    pub fn from_row(row: &Map<String, Value>) -> Self {
        Self {
            n: row.get("n").and_then(decode_node),
            r: row.get("r").and_then(decode_relationship),
            m: row.get("m").and_then(decode_node),
        }
    }
}

fn decode_node(value: &Value) -> Option<RawNode> {
    if !value.get("labels").is_some_and(Value::is_array) {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn decode_relationship(value: &Value) -> Option<RawRelationship> {
    if !value.get("type").is_some_and(Value::is_string) {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
