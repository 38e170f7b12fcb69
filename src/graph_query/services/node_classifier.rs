use crate::graph_query::domain::filter_criteria::VULNERABILITY_LABEL;
use crate::graph_query::domain::RawNode;
use crate::graph_query::policies::classification_rules::{
    ClassificationRule, DISPLAY_NAME_FIELDS, DOCKER_IMAGE_LABEL,
};
use crate::shared::error::GraphError;
use serde_json::{Map, Value};

const SEVERITIES: [&str; 4] = ["critical", "high", "medium", "low"];

/// Result of classifying one raw node
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub semantic_type: String,
    pub label: String,
    pub raw_label: String,
    pub properties: Map<String, Value>,
    /// Keys holding a fallback value rather than anything the store returned
    pub placeholders: Vec<String>,
    /// Properties that could not be decoded and were replaced by `[]`
    pub issues: Vec<GraphError>,
}

/// Classifies raw nodes and derives their display properties
pub struct NodeClassifier;

impl NodeClassifier {
    pub fn classify(node: &RawNode) -> Classification {
        let mut context = Enrichment::new(node);
        match ClassificationRule::select(node) {
            ClassificationRule::KnownExploitedVulnerability => context.known_exploited(),
            ClassificationRule::ComplianceSummary => context.compliance_summary(),
            ClassificationRule::ContainerImage => context.container_image(),
            ClassificationRule::Vulnerability => context.vulnerability(),
            ClassificationRule::AwsResource | ClassificationRule::Generic => context.resource(),
        }
    }
}

/// Working state shared by the per-rule transforms
struct Enrichment<'a> {
    node: &'a RawNode,
    raw_label: String,
    properties: Map<String, Value>,
    placeholders: Vec<String>,
    issues: Vec<GraphError>,
}

impl<'a> Enrichment<'a> {
    fn new(node: &'a RawNode) -> Self {
        Self {
            node,
            raw_label: node.first_label().unwrap_or("unknown").to_string(),
            properties: node.properties.clone(),
            placeholders: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn finish(self, semantic_type: String, label: String) -> Classification {
        Classification {
            semantic_type,
            label,
            raw_label: self.raw_label,
            properties: self.properties,
            placeholders: self.placeholders,
            issues: self.issues,
        }
    }

    fn known_exploited(mut self) -> Classification {
        self.properties.insert("kev".to_string(), Value::Bool(true));
        if self.text(&["severity"]).is_none() {
            self.fill("severity", Value::from("critical"));
        }
        self.list_property("cwes");

        let label = self
            .text(&["cve_id", "cveID"])
            .map(|cve| cve.to_uppercase())
            .or_else(|| self.text(&["vulnerability_name", "name"]))
            .unwrap_or_else(|| self.fallback_id());
        self.finish(VULNERABILITY_LABEL.to_string(), label)
    }

    fn compliance_summary(mut self) -> Classification {
        self.properties
            .insert("compliance_summary".to_string(), Value::Bool(true));

        let sum = self.severity_counts("findings", None);
        if self.properties.get("total_findings").and_then(as_count).is_none() {
            self.derive_total("total_findings", "findings", sum);
        }

        self.list_property("compliance_standards");
        for key in ["bucket_names", "credential_names", "findings"] {
            if self.properties.contains_key(key) {
                self.list_property(key);
            }
        }

        let lowered = self.raw_label.to_ascii_lowercase();
        let label = self.text(&["name"]).unwrap_or_else(|| {
            if lowered.starts_with("s3") {
                "S3 Compliance Summary".to_string()
            } else if lowered.starts_with("database") {
                "Database Compliance Summary".to_string()
            } else {
                "Compliance Summary".to_string()
            }
        });
        let semantic_type = self.raw_label.clone();
        self.finish(semantic_type, label)
    }

    fn container_image(mut self) -> Classification {
        let by_severity = self.severity_count_map();
        let sum = self.severity_counts("vulnerabilities", by_severity.as_ref());

        let precomputed = self
            .properties
            .get("total_vulnerabilities")
            .and_then(as_count);
        match (&by_severity, precomputed) {
            (Some(map), _) => {
                let total = map
                    .values()
                    .filter_map(as_count)
                    .fold(0, u64::saturating_add);
                self.properties
                    .insert("total_vulnerabilities".to_string(), Value::from(total));
            }
            (None, Some(total)) => {
                self.properties
                    .insert("total_vulnerabilities".to_string(), Value::from(total));
            }
            (None, None) => self.derive_total("total_vulnerabilities", "vulnerabilities", sum),
        }

        let label = self
            .text(&["name", "image_uri", "repository"])
            .unwrap_or_else(|| self.fallback_id());
        self.finish(DOCKER_IMAGE_LABEL.to_string(), label)
    }

    /// Unifies the `vulnerabilityId/pkgname/installedversion` and
    /// `vulnerability_id/package_name/package_version` naming schemes
    fn vulnerability(mut self) -> Classification {
        let id = self.text(&[
            "vulnerability_id",
            "vulnerabilityid",
            "vulnerabilityId",
            "VulnerabilityID",
        ]);
        let package = self.text(&["package_name", "pkgname", "pkgName", "PkgName"]);
        let version = self.text(&[
            "package_version",
            "installedversion",
            "installedVersion",
            "InstalledVersion",
        ]);
        let fixed = self.text(&["fixed_version", "fixedversion", "fixedVersion", "FixedVersion"]);
        let severity = self.text(&["severity", "Severity"]);
        let title = self.text(&["title", "Title"]);

        // Rolled-up summary nodes carry no single CVE or version
        let id_value = id.clone().unwrap_or_else(|| "Multiple CVEs".to_string());
        match &id {
            Some(id) => {
                self.properties
                    .insert("vulnerability_id".to_string(), Value::from(id.clone()));
            }
            None => self.fill("vulnerability_id", Value::from(id_value.clone())),
        }
        match version {
            Some(version) => {
                self.properties
                    .insert("package_version".to_string(), Value::from(version));
            }
            None => self.fill("package_version", Value::from("Various versions")),
        }
        if let Some(package) = package {
            self.properties
                .insert("package_name".to_string(), Value::from(package));
        }
        if let Some(fixed) = fixed {
            self.properties
                .insert("fixed_version".to_string(), Value::from(fixed));
        }
        if let Some(severity) = severity {
            self.properties
                .insert("severity".to_string(), Value::from(severity.to_lowercase()));
        }
        if !self.properties.get("kev").is_some_and(Value::is_boolean) {
            self.fill("kev", Value::Bool(false));
        }

        let label = match (id, title) {
            (Some(id), _) => id,
            (None, Some(title)) => title,
            (None, None) => id_value,
        };
        self.finish(VULNERABILITY_LABEL.to_string(), label)
    }

    /// AWS resources and everything else keep their raw type
    fn resource(self) -> Classification {
        let label = display_name(self.node).unwrap_or_else(|| self.fallback_id());
        let semantic_type = self.raw_label.clone();
        self.finish(semantic_type, label)
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.node.str_property(key))
    }

    /// Inserts a fallback value and remembers that it was not observed
    fn fill(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
        self.placeholders.push(key.to_string());
    }

    /// Writes `<severity>_<suffix>` for every severity and returns their sum.
    /// Counts missing from both `map` and the node are zero placeholders.
    fn severity_counts(&mut self, suffix: &str, map: Option<&Map<String, Value>>) -> u64 {
        let mut sum: u64 = 0;
        for severity in SEVERITIES {
            let key = format!("{}_{}", severity, suffix);
            let observed = match map {
                Some(map) => Some(map_count(map, severity)),
                None => self.properties.get(&key).and_then(as_count),
            };
            match observed {
                Some(count) => {
                    sum = sum.saturating_add(count);
                    self.properties.insert(key, Value::from(count));
                }
                None => self.fill(&key, Value::from(0)),
            }
        }
        sum
    }

    /// A computed total is only as real as the counts behind it
    fn derive_total(&mut self, key: &str, suffix: &str, sum: u64) {
        let all_filled = SEVERITIES.iter().all(|severity| {
            let part = format!("{}_{}", severity, suffix);
            self.placeholders.contains(&part)
        });
        if all_filled {
            self.fill(key, Value::from(sum));
        } else {
            self.properties.insert(key.to_string(), Value::from(sum));
        }
    }

    /// Decodes a list property in place; an absent or undecodable list is a placeholder `[]`
    fn list_property(&mut self, key: &str) {
        let issues_before = self.issues.len();
        let decoded = self.decode_list(key);
        let observed = self.node.properties.get(key).is_some_and(|v| !v.is_null());
        if observed && self.issues.len() == issues_before {
            self.properties.insert(key.to_string(), decoded);
        } else {
            self.fill(key, decoded);
        }
    }

    fn fallback_id(&self) -> String {
        self.node
            .id_string()
            .unwrap_or_else(|| self.raw_label.clone())
    }

    /// `vulnerabilities` as a severity → count map, possibly JSON-encoded
    fn severity_count_map(&mut self) -> Option<Map<String, Value>> {
        let value = self.properties.get("vulnerabilities")?.clone();
        match value {
            Value::Object(map) => Some(lowercase_keys(map)),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Some(lowercase_keys(map)),
                _ => {
                    self.issue("vulnerabilities", "expected a severity count map");
                    None
                }
            },
            _ => None,
        }
    }

    /// Decodes a list property that may arrive as an array, a JSON-encoded
    /// array, or a bare scalar. Undecodable values become `[]`.
    fn decode_list(&mut self, key: &str) -> Value {
        let decoded = match self.properties.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(Value::String(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Ok(Vec::new())
                } else if trimmed.starts_with('[') {
                    serde_json::from_str::<Vec<Value>>(trimmed)
                        .map_err(|e| format!("invalid JSON list: {}", e))
                } else {
                    Ok(vec![Value::from(trimmed)])
                }
            }
            Some(other) => Err(format!("expected a list, found {}", type_name(other))),
        };

        match decoded {
            Ok(items) => Value::Array(items),
            Err(reason) => {
                self.issue(key, &reason);
                Value::Array(Vec::new())
            }
        }
    }

    fn issue(&mut self, property: &str, reason: &str) {
        self.issues.push(GraphError::Classification {
            node_id: self.fallback_id(),
            property: property.to_string(),
            reason: reason.to_string(),
        });
    }
}

/// Best available identifying field; ARNs are shortened to their last segment
pub fn display_name(node: &RawNode) -> Option<String> {
    DISPLAY_NAME_FIELDS.iter().find_map(|field| {
        let value = node.str_property(field)?;
        if *field == "arn" {
            let tail = value.rsplit(['/', ':']).next().unwrap_or(value.as_str());
            if tail.is_empty() {
                return None;
            }
            return Some(tail.to_string());
        }
        Some(value)
    })
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn map_count(map: &Map<String, Value>, severity: &str) -> u64 {
    map.get(severity).and_then(as_count).unwrap_or(0)
}

fn lowercase_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
