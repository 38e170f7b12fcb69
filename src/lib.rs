//! asset-graph - explore a cloud-asset graph store from the command line
//!
//! Compiles filter criteria into Cypher programs, runs them against a graph
//! store's HTTP query endpoint, and normalizes the rows into a canonical,
//! classified and optionally laid-out graph model.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`graph_query`): criteria, query compiler, normalizer,
//!   classifier, internet synthesis and layout; no I/O
//! - **Application Layer** (`application`): the incremental loader, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): HTTP client, console, filesystem and formatters
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use asset_graph::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let client = GraphQueryClient::new("http://localhost:5000/neo4j/query")?;
//! let loader = IncrementalLoader::new(client, StderrProgressReporter::new());
//!
//! let criteria = FilterCriteria::single(
//!     FilterCriterion::relationship("aws_ec2_instance", "has_vulnerability", "vulnerability")
//!         .with_severity("critical"),
//! );
//! let snapshot = loader.apply_filters(GraphRequest::new(criteria)).await?;
//! let snapshot = if snapshot.has_more { loader.load_more().await? } else { snapshot };
//!
//! let response = GraphResponse::new(snapshot).with_layout(&LayoutEngine::default(), 1280.0);
//! println!("{}", JsonGraphFormatter::new().format(&response)?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod graph_query;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemCriteriaReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonGraphFormatter, MarkdownSummaryFormatter};
    pub use crate::adapters::outbound::network::GraphQueryClient;
    pub use crate::application::dto::{GraphRequest, GraphResponse, GraphSnapshot, OutputFormat};
    pub use crate::application::use_cases::{IncrementalLoader, PAGE_SIZE};
    pub use crate::graph_query::domain::{
        CanonicalEdge, CanonicalNode, FilterCriteria, FilterCriterion, GraphModel, QueryMode,
        RawNode, RawRecord, RawRelationship,
    };
    pub use crate::graph_query::services::{
        GraphNormalizer, InternetExposure, LayoutEngine, NodeClassifier, QueryCompiler,
    };
    pub use crate::ports::inbound::GraphExplorationPort;
    pub use crate::ports::outbound::{
        CriteriaReader, GraphFormatter, OutputPresenter, ProgressReporter, QueryExecutor,
    };
    pub use crate::shared::Result;
}
