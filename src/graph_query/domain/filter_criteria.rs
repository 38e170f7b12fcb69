use crate::shared::error::GraphError;
use crate::shared::Result;
use serde::{Deserialize, Serialize};

/// Wildcard node type matching any label
pub const ANY_RESOURCE: &str = "any_resource";

/// Wildcard relationship matching any relationship type
pub const ANY_RELATIONSHIP: &str = "any_relationship";

/// Node label of a scanner-reported vulnerability
pub const VULNERABILITY_LABEL: &str = "vulnerability";

/// Node label of a CISA known-exploited vulnerability
pub const KEV_LABEL: &str = "knownexploitedvulnerability";

/// Node type selector used on either side of a criterion.
///
/// Tags are open strings: unknown labels are passed through to the store,
/// which simply returns no rows for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeSelector {
    /// `any_resource`
    Any,
    /// A concrete node label such as `aws_ec2_instance`
    Label(String),
}

impl TypeSelector {
    pub fn label(&self) -> Option<&str> {
        match self {
            TypeSelector::Any => None,
            TypeSelector::Label(label) => Some(label),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeSelector::Any)
    }
}

impl From<String> for TypeSelector {
    fn from(value: String) -> Self {
        if value == ANY_RESOURCE {
            TypeSelector::Any
        } else {
            TypeSelector::Label(value)
        }
    }
}

impl From<&str> for TypeSelector {
    fn from(value: &str) -> Self {
        TypeSelector::from(value.to_string())
    }
}

impl From<TypeSelector> for String {
    fn from(value: TypeSelector) -> Self {
        match value {
            TypeSelector::Any => ANY_RESOURCE.to_string(),
            TypeSelector::Label(label) => label,
        }
    }
}

/// Relationship selector of a criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationSelector {
    /// `any_relationship`
    Any,
    /// A concrete relationship type such as `has_vulnerability`
    Type(String),
}

impl RelationSelector {
    pub fn rel_type(&self) -> Option<&str> {
        match self {
            RelationSelector::Any => None,
            RelationSelector::Type(rel_type) => Some(rel_type),
        }
    }
}

impl From<String> for RelationSelector {
    fn from(value: String) -> Self {
        if value == ANY_RELATIONSHIP {
            RelationSelector::Any
        } else {
            RelationSelector::Type(value)
        }
    }
}

impl From<&str> for RelationSelector {
    fn from(value: &str) -> Self {
        RelationSelector::from(value.to_string())
    }
}

impl From<RelationSelector> for String {
    fn from(value: RelationSelector) -> Self {
        match value {
            RelationSelector::Any => ANY_RELATIONSHIP.to_string(),
            RelationSelector::Type(rel_type) => rel_type,
        }
    }
}

/// How a single criterion is compiled.
///
/// Bidirectional and full-graph matching cannot be combined, so they are
/// variants of one enum rather than independent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Single hop `(n)-[r]->(m)`
    #[default]
    Relationship,
    /// Nodes of the source type only
    SingleNodeType,
    /// Single hop plus the reverse direction
    Bidirectional,
    /// Bounded variable-length path between source and target type
    FullGraph,
}

/// Scalar attribute filters, applied only to vulnerability-bearing nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeFilters {
    pub severity: Option<String>,
    pub package_name: Option<String>,
    pub cve_id: Option<String>,
}

impl AttributeFilters {
    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.package_name.is_none() && self.cve_id.is_none()
    }
}

/// One entry of the ordered filter list. Each entry compiles to an
/// independent query branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCriterion", into = "RawCriterion")]
pub struct FilterCriterion {
    /// `None` means "no filter set"
    pub source_type: Option<TypeSelector>,
    pub relationship: Option<RelationSelector>,
    pub target_type: Option<TypeSelector>,
    pub filters: AttributeFilters,
    pub mode: QueryMode,
}

impl FilterCriterion {
    /// A blank criterion with nothing selected
    pub fn blank() -> Self {
        Self::default()
    }

    /// Relationship-path criterion `source -[relationship]-> target`
    pub fn relationship(
        source: impl Into<TypeSelector>,
        relationship: impl Into<RelationSelector>,
        target: impl Into<TypeSelector>,
    ) -> Self {
        Self {
            source_type: Some(source.into()),
            relationship: Some(relationship.into()),
            target_type: Some(target.into()),
            ..Self::default()
        }
    }

    /// Node-only criterion
    pub fn single_node(source: impl Into<TypeSelector>) -> Self {
        Self {
            source_type: Some(source.into()),
            mode: QueryMode::SingleNodeType,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.filters.severity = non_blank(severity.into());
        self
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.filters.package_name = non_blank(package_name.into());
        self
    }

    pub fn with_cve_id(mut self, cve_id: impl Into<String>) -> Self {
        self.filters.cve_id = non_blank(cve_id.into());
        self
    }

    pub fn is_blank(&self) -> bool {
        self.source_type.is_none()
    }

    /// Relationship selector, defaulting to `any_relationship` when unset
    pub fn relationship_or_any(&self) -> RelationSelector {
        self.relationship.clone().unwrap_or(RelationSelector::Any)
    }

    /// Target selector, defaulting to `any_resource` when unset
    pub fn target_or_any(&self) -> TypeSelector {
        self.target_type.clone().unwrap_or(TypeSelector::Any)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Wire shape of a criterion (camelCase, independent mode flags)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawCriterion {
    source_type: Option<String>,
    relationship: Option<String>,
    target_type: Option<String>,
    severity: Option<String>,
    package_name: Option<String>,
    cve_id: Option<String>,
    show_single_node_type: bool,
    bidirectional: bool,
    full_graph: bool,
}

impl TryFrom<RawCriterion> for FilterCriterion {
    type Error = GraphError;

    fn try_from(raw: RawCriterion) -> std::result::Result<Self, Self::Error> {
        if raw.bidirectional && raw.full_graph {
            return Err(GraphError::InvalidCriteria {
                reason: "'bidirectional' and 'fullGraph' cannot both be enabled".to_string(),
            });
        }

        let mode = if raw.show_single_node_type {
            QueryMode::SingleNodeType
        } else if raw.full_graph {
            QueryMode::FullGraph
        } else if raw.bidirectional {
            QueryMode::Bidirectional
        } else {
            QueryMode::Relationship
        };

        Ok(Self {
            source_type: raw.source_type.and_then(non_blank).map(TypeSelector::from),
            relationship: raw.relationship.and_then(non_blank).map(RelationSelector::from),
            target_type: raw.target_type.and_then(non_blank).map(TypeSelector::from),
            filters: AttributeFilters {
                severity: raw.severity.and_then(non_blank),
                package_name: raw.package_name.and_then(non_blank),
                cve_id: raw.cve_id.and_then(non_blank),
            },
            mode,
        })
    }
}

impl From<FilterCriterion> for RawCriterion {
    fn from(criterion: FilterCriterion) -> Self {
        Self {
            source_type: criterion.source_type.map(String::from),
            relationship: criterion.relationship.map(String::from),
            target_type: criterion.target_type.map(String::from),
            severity: criterion.filters.severity,
            package_name: criterion.filters.package_name,
            cve_id: criterion.filters.cve_id,
            show_single_node_type: criterion.mode == QueryMode::SingleNodeType,
            bidirectional: criterion.mode == QueryMode::Bidirectional,
            full_graph: criterion.mode == QueryMode::FullGraph,
        }
    }
}

/// Ordered, never-empty list of criteria.
///
/// All edits are pure reducers returning a new list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FilterCriterion>", into = "Vec<FilterCriterion>")]
pub struct FilterCriteria(Vec<FilterCriterion>);

impl FilterCriteria {
    pub fn new(criteria: Vec<FilterCriterion>) -> Self {
        Self::from(criteria)
    }

    pub fn single(criterion: FilterCriterion) -> Self {
        Self(vec![criterion])
    }

    pub fn as_slice(&self) -> &[FilterCriterion] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FilterCriterion> {
        self.0.get(index)
    }

    /// Appends a criterion
    pub fn add(&self, criterion: FilterCriterion) -> Self {
        let mut next = self.0.clone();
        next.push(criterion);
        Self(next)
    }

    /// Removes the criterion at `index`; removing the last one leaves a
    /// single blank criterion behind
    pub fn remove(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let mut next = self.0.clone();
        next.remove(index);
        Ok(Self::from(next))
    }

    /// Replaces the criterion at `index`
    pub fn update(&self, index: usize, criterion: FilterCriterion) -> Result<Self> {
        self.check_index(index)?;
        let mut next = self.0.clone();
        next[index] = criterion;
        Ok(Self(next))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.0.len() {
            return Err(GraphError::Validation {
                message: format!(
                    "Criterion index {} is out of range (list has {} entries)",
                    index,
                    self.0.len()
                ),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self(vec![FilterCriterion::blank()])
    }
}

impl From<Vec<FilterCriterion>> for FilterCriteria {
    fn from(criteria: Vec<FilterCriterion>) -> Self {
        if criteria.is_empty() {
            Self::default()
        } else {
            Self(criteria)
        }
    }
}

impl From<FilterCriteria> for Vec<FilterCriterion> {
    fn from(criteria: FilterCriteria) -> Self {
        criteria.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_selector_wildcard() {
        assert_eq!(TypeSelector::from("any_resource"), TypeSelector::Any);
        assert_eq!(
            TypeSelector::from("aws_s3_bucket").label(),
            Some("aws_s3_bucket")
        );
        assert_eq!(String::from(TypeSelector::Any), "any_resource");
    }

    #[test]
    fn test_relation_selector_wildcard() {
        assert_eq!(
            RelationSelector::from("any_relationship"),
            RelationSelector::Any
        );
        assert_eq!(
            RelationSelector::from("has_vulnerability").rel_type(),
            Some("has_vulnerability")
        );
    }

    #[test]
    fn test_default_list_has_one_blank_criterion() {
        let criteria = FilterCriteria::default();
        assert_eq!(criteria.len(), 1);
        assert!(criteria.get(0).unwrap().is_blank());
    }

    #[test]
    fn test_empty_vec_becomes_blank_list() {
        let criteria = FilterCriteria::new(vec![]);
        assert_eq!(criteria.len(), 1);
        assert!(criteria.get(0).unwrap().is_blank());
    }

    #[test]
    fn test_add_does_not_mutate_original() {
        let original = FilterCriteria::default();
        let next = original.add(FilterCriterion::single_node("aws_s3_bucket"));
        assert_eq!(original.len(), 1);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_remove_last_reinserts_blank() {
        let criteria = FilterCriteria::single(FilterCriterion::single_node("aws_s3_bucket"));
        let next = criteria.remove(0).unwrap();
        assert_eq!(next.len(), 1);
        assert!(next.get(0).unwrap().is_blank());
    }

    #[test]
    fn test_remove_keeps_order() {
        let criteria = FilterCriteria::new(vec![
            FilterCriterion::single_node("a"),
            FilterCriterion::single_node("b"),
            FilterCriterion::single_node("c"),
        ]);
        let next = criteria.remove(1).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(
            next.get(1).unwrap().source_type,
            Some(TypeSelector::from("c"))
        );
    }

    #[test]
    fn test_remove_out_of_range() {
        let criteria = FilterCriteria::default();
        let result = criteria.remove(3);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn test_update_replaces_entry() {
        let criteria = FilterCriteria::default();
        let next = criteria
            .update(0, FilterCriterion::single_node("dockerimage"))
            .unwrap();
        assert_eq!(
            next.get(0).unwrap().source_type,
            Some(TypeSelector::from("dockerimage"))
        );
        assert!(criteria.get(0).unwrap().is_blank());
    }

    #[test]
    fn test_deserialize_camel_case_criterion() {
        let json = r#"{
            "sourceType": "aws_ec2_instance",
            "relationship": "has_vulnerability",
            "targetType": "vulnerability",
            "severity": "critical",
            "bidirectional": true
        }"#;
        let criterion: FilterCriterion = serde_json::from_str(json).unwrap();
        assert_eq!(
            criterion.source_type,
            Some(TypeSelector::from("aws_ec2_instance"))
        );
        assert_eq!(criterion.mode, QueryMode::Bidirectional);
        assert_eq!(criterion.filters.severity.as_deref(), Some("critical"));
        assert!(criterion.filters.cve_id.is_none());
    }

    #[test]
    fn test_deserialize_rejects_bidirectional_full_graph() {
        let json = r#"{"sourceType": "a", "bidirectional": true, "fullGraph": true}"#;
        let result: std::result::Result<FilterCriterion, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_strings_are_unset() {
        let json = r#"{"sourceType": "", "severity": "  "}"#;
        let criterion: FilterCriterion = serde_json::from_str(json).unwrap();
        assert!(criterion.is_blank());
        assert!(criterion.filters.is_empty());
    }

    #[test]
    fn test_serialize_round_trips_mode_flags() {
        let criterion = FilterCriterion::relationship("a", "b", "c").with_mode(QueryMode::FullGraph);
        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["fullGraph"], true);
        assert_eq!(json["bidirectional"], false);
    }

    #[test]
    fn test_deserialize_empty_list_is_blank() {
        let criteria: FilterCriteria = serde_json::from_str("[]").unwrap();
        assert_eq!(criteria.len(), 1);
    }
}
