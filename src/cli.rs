use clap::Parser;
use std::path::PathBuf;

use crate::application::dto::OutputFormat;
use crate::graph_query::domain::{
    AttributeFilters, FilterCriterion, QueryMode, RelationSelector, TypeSelector,
};

/// Query a cloud-asset graph store and render the matching subgraph
#[derive(Parser, Debug)]
#[command(name = "asset-graph")]
#[command(version)]
#[command(
    about = "Compile asset-graph filter criteria to Cypher, fetch the subgraph and emit a canonical graph model",
    long_about = None
)]
pub struct Args {
    /// Graph store query endpoint (http:// or https://)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Bearer token sent with every query
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Path to a config file (defaults to ./asset-graph.config.yml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// YAML or JSON file holding a list of filter criteria
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["source", "relationship", "target", "severity", "package", "cve", "single", "bidirectional", "full_graph"]
    )]
    pub criteria: Option<PathBuf>,

    /// Source node type, or any_resource
    #[arg(long, value_name = "TYPE")]
    pub source: Option<String>,

    /// Relationship type, or any_relationship
    #[arg(long, value_name = "TYPE")]
    pub relationship: Option<String>,

    /// Target node type, or any_resource
    #[arg(long, value_name = "TYPE")]
    pub target: Option<String>,

    /// Only vulnerabilities of this severity (e.g. critical)
    #[arg(long)]
    pub severity: Option<String>,

    /// Only vulnerabilities affecting this package
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Only this CVE identifier
    #[arg(long, value_name = "CVE_ID")]
    pub cve: Option<String>,

    /// Fetch nodes of the source type only, without relationships
    #[arg(long, conflicts_with_all = ["bidirectional", "full_graph"])]
    pub single: bool,

    /// Follow the relationship in both directions
    #[arg(long, conflicts_with = "full_graph")]
    pub bidirectional: bool,

    /// Follow paths of up to 10 hops between source and target
    #[arg(long)]
    pub full_graph: bool,

    /// Add the synthetic Internet node for publicly exposed assets
    #[arg(long)]
    pub internet: bool,

    /// Number of "load more" cycles after the first page
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub pages: usize,

    /// Include x/y grid positions and BFS levels in the JSON output
    #[arg(long)]
    pub layout: bool,

    /// Viewport width in pixels used by --layout
    #[arg(long, value_name = "PIXELS")]
    pub viewport_width: Option<f64>,

    /// Output format: json or markdown
    #[arg(short, long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the compiled data and count programs without contacting the store
    #[arg(long)]
    pub print_query: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// True when any of the single-criterion flags was given
    pub fn has_quick_criterion(&self) -> bool {
        self.source.is_some()
            || self.relationship.is_some()
            || self.target.is_some()
            || self.severity.is_some()
            || self.package.is_some()
            || self.cve.is_some()
            || self.single
            || self.bidirectional
            || self.full_graph
    }

    /// Builds the criterion described by the single-criterion flags
    pub fn quick_criterion(&self) -> FilterCriterion {
        let mode = if self.single {
            QueryMode::SingleNodeType
        } else if self.full_graph {
            QueryMode::FullGraph
        } else if self.bidirectional {
            QueryMode::Bidirectional
        } else {
            QueryMode::Relationship
        };

        FilterCriterion {
            source_type: given(&self.source).map(TypeSelector::from),
            relationship: given(&self.relationship).map(RelationSelector::from),
            target_type: given(&self.target).map(TypeSelector::from),
            filters: AttributeFilters {
                severity: given(&self.severity),
                package_name: given(&self.package),
                cve_id: given(&self.cve),
            },
            mode,
        }
    }
}

fn given(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
