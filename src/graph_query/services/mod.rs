pub mod graph_normalizer;
pub mod internet_exposure;
pub mod layout_engine;
pub mod node_classifier;
pub mod query_compiler;

pub use graph_normalizer::{GraphNormalizer, Normalized};
pub use internet_exposure::InternetExposure;
pub use layout_engine::LayoutEngine;
pub use node_classifier::{Classification, NodeClassifier};
pub use query_compiler::{CompileOptions, QueryCompiler};
