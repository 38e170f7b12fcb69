pub mod filter_criteria;
pub mod graph_model;
pub mod query_ast;
pub mod raw_record;

pub use filter_criteria::{
    AttributeFilters, FilterCriteria, FilterCriterion, QueryMode, RelationSelector, TypeSelector,
};
pub use graph_model::{CanonicalEdge, CanonicalNode, GraphModel, PositionedGraph, PositionedNode};
pub use query_ast::QueryProgram;
pub use raw_record::{RawNode, RawRecord, RawRelationship};
