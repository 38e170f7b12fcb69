use crate::graph_query::domain::filter_criteria::{KEV_LABEL, VULNERABILITY_LABEL};
use crate::graph_query::domain::RawNode;

/// Label prefix of cloud resources synced from AWS
pub const AWS_PREFIX: &str = "aws_";

/// Container image label
pub const DOCKER_IMAGE_LABEL: &str = "dockerimage";

/// Identifying fields tried, in order, when deriving a display name
pub const DISPLAY_NAME_FIELDS: [&str; 5] = ["name", "bucket_name", "instance_id", "arn", "vpc_id"];

const STORAGE_TOKENS: [&str; 2] = ["database", "s3"];
const COMPLIANCE_TOKENS: [&str; 3] = ["compliance", "pii", "sensitive"];

/// Semantic buckets a raw node can fall into, highest priority first.
///
/// Several heuristics overlap (a compliance summary may carry
/// vulnerability-shaped fields), so exactly one rule is selected by walking
/// `PRIORITY` top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    KnownExploitedVulnerability,
    ComplianceSummary,
    ContainerImage,
    Vulnerability,
    AwsResource,
    Generic,
}

impl ClassificationRule {
    pub const PRIORITY: [ClassificationRule; 6] = [
        ClassificationRule::KnownExploitedVulnerability,
        ClassificationRule::ComplianceSummary,
        ClassificationRule::ContainerImage,
        ClassificationRule::Vulnerability,
        ClassificationRule::AwsResource,
        ClassificationRule::Generic,
    ];

    /// First rule in priority order that applies to the node
    pub fn select(node: &RawNode) -> ClassificationRule {
        Self::PRIORITY
            .into_iter()
            .find(|rule| rule.applies(node))
            .unwrap_or(ClassificationRule::Generic)
    }

    pub fn applies(self, node: &RawNode) -> bool {
        match self {
            ClassificationRule::KnownExploitedVulnerability => node.has_label(KEV_LABEL),
            ClassificationRule::ComplianceSummary => is_compliance_summary(node),
            ClassificationRule::ContainerImage => node.has_label(DOCKER_IMAGE_LABEL),
            ClassificationRule::Vulnerability => node.has_label(VULNERABILITY_LABEL),
            ClassificationRule::AwsResource => node
                .first_label()
                .is_some_and(|label| label.to_ascii_lowercase().starts_with(AWS_PREFIX)),
            ClassificationRule::Generic => true,
        }
    }
}

fn is_compliance_summary(node: &RawNode) -> bool {
    if node
        .labels
        .iter()
        .any(|label| label.to_ascii_lowercase().ends_with("compliancesummary"))
    {
        return true;
    }

    let mentions = |text: &str| {
        let text = text.to_ascii_lowercase();
        STORAGE_TOKENS.iter().any(|t| text.contains(t))
            && COMPLIANCE_TOKENS.iter().any(|t| text.contains(t))
    };

    node.labels.iter().any(|label| mentions(label))
        || node.str_property("name").is_some_and(|name| mentions(&name))
}
