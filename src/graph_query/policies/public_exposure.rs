use crate::graph_query::domain::query_ast::{Literal, Predicate};
use crate::graph_query::domain::CanonicalNode;
use serde_json::{Map, Value};

const OPEN_CIDR: &str = "0.0.0.0/0";

/// Heuristics for nodes reachable from the public internet.
///
/// The same rules drive the extra query branch and the synthetic
/// `internet` edges added after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicExposure {
    /// Security group ingress rule open to `0.0.0.0/0`
    OpenIngressRule,
    /// S3 bucket whose policy is public
    PublicBucket,
    /// EC2 instance with a public IP address or DNS name
    PublicInstance,
}

impl PublicExposure {
    pub const ALL: [PublicExposure; 3] = [
        PublicExposure::OpenIngressRule,
        PublicExposure::PublicBucket,
        PublicExposure::PublicInstance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PublicExposure::OpenIngressRule => "aws_vpc_security_group_rule",
            PublicExposure::PublicBucket => "aws_s3_bucket",
            PublicExposure::PublicInstance => "aws_ec2_instance",
        }
    }

    /// WHERE-clause form of the rule for node variable `var`
    pub fn predicate(self, var: &'static str) -> Predicate {
        let label = Predicate::has_label(var, self.label());
        let condition = match self {
            PublicExposure::OpenIngressRule => Predicate::And(vec![
                Predicate::equals(var, "cidr_ipv4", OPEN_CIDR),
                Predicate::NotEquals {
                    var,
                    prop: "type".to_string(),
                    value: Literal::Str("egress".to_string()),
                },
            ]),
            PublicExposure::PublicBucket => Predicate::Equals {
                var,
                prop: "bucket_policy_is_public".to_string(),
                value: Literal::Bool(true),
            },
            PublicExposure::PublicInstance => Predicate::Or(vec![
                Predicate::IsNotNull {
                    var,
                    prop: "public_ip_address".to_string(),
                },
                Predicate::IsNotNull {
                    var,
                    prop: "public_dns_name".to_string(),
                },
            ]),
        };
        Predicate::And(vec![label, condition])
    }

    /// In-memory form of the rule for an already classified node
    pub fn matches(self, node: &CanonicalNode) -> bool {
        if !node.has_label(self.label()) {
            return false;
        }
        let props = &node.properties;
        match self {
            PublicExposure::OpenIngressRule => {
                text(props, "cidr_ipv4") == Some(OPEN_CIDR)
                    && text(props, "type") != Some("egress")
            }
            PublicExposure::PublicBucket => truthy(props.get("bucket_policy_is_public")),
            PublicExposure::PublicInstance => {
                text(props, "public_ip_address").is_some()
                    || text(props, "public_dns_name").is_some()
            }
        }
    }

    /// Disjunction of every rule
    pub fn any_predicate(var: &'static str) -> Predicate {
        Predicate::Or(Self::ALL.iter().map(|rule| rule.predicate(var)).collect())
    }

    /// True if any rule matches the node
    pub fn is_publicly_reachable(node: &CanonicalNode) -> bool {
        Self::ALL.iter().any(|rule| rule.matches(node))
    }
}

fn text<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(label: &str, props: Value) -> CanonicalNode {
        CanonicalNode {
            id: "1".to_string(),
            label: "x".to_string(),
            semantic_type: label.to_string(),
            raw_label: label.to_string(),
            labels: vec![label.to_string()],
            properties: props.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_rule_label_need_not_come_first() {
        let bucket = CanonicalNode {
            raw_label: "resource".to_string(),
            labels: vec!["resource".to_string(), "aws_s3_bucket".to_string()],
            ..node("resource", json!({"bucket_policy_is_public": true}))
        };
        assert!(PublicExposure::PublicBucket.matches(&bucket));
        assert!(!PublicExposure::PublicInstance.matches(&bucket));
    }

    #[test]
    fn test_open_ingress_rule() {
        let rule = node(
            "aws_vpc_security_group_rule",
            json!({"cidr_ipv4": "0.0.0.0/0", "type": "ingress"}),
        );
        assert!(PublicExposure::is_publicly_reachable(&rule));

        let egress = node(
            "aws_vpc_security_group_rule",
            json!({"cidr_ipv4": "0.0.0.0/0", "type": "egress"}),
        );
        assert!(!PublicExposure::is_publicly_reachable(&egress));
    }

    #[test]
    fn test_public_bucket_accepts_string_flag() {
        let bucket = node("aws_s3_bucket", json!({"bucket_policy_is_public": "true"}));
        assert!(PublicExposure::PublicBucket.matches(&bucket));

        let private = node("aws_s3_bucket", json!({"bucket_policy_is_public": false}));
        assert!(!PublicExposure::PublicBucket.matches(&private));
    }

    #[test]
    fn test_public_instance_ignores_empty_dns() {
        let instance = node("aws_ec2_instance", json!({"public_dns_name": ""}));
        assert!(!PublicExposure::PublicInstance.matches(&instance));

        let public = node("aws_ec2_instance", json!({"public_ip_address": "54.1.2.3"}));
        assert!(PublicExposure::PublicInstance.matches(&public));
    }

    #[test]
    fn test_rule_requires_matching_label() {
        let other = node("aws_rds_db_instance", json!({"public_ip_address": "1.2.3.4"}));
        assert!(!PublicExposure::is_publicly_reachable(&other));
    }

    #[test]
    fn test_predicate_rendering() {
        assert_eq!(
            PublicExposure::PublicBucket.predicate("n").to_string(),
            "n:aws_s3_bucket AND n.bucket_policy_is_public = true"
        );
        let any = PublicExposure::any_predicate("n").to_string();
        assert!(any.contains("n.cidr_ipv4 = '0.0.0.0/0'"));
        assert!(any.contains("n.public_ip_address IS NOT NULL"));
    }
}
