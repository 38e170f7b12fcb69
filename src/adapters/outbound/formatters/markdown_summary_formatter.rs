use crate::application::dto::GraphResponse;
use crate::graph_query::domain::{CanonicalNode, GraphModel};
use crate::graph_query::services::internet_exposure::{INTERNET_EDGE_TYPE, INTERNET_NODE_ID};
use crate::ports::outbound::GraphFormatter;
use crate::shared::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

const VULN_TABLE_HEADER: &str = "| CVE | Severity | Package | Version | Fixed Version | KEV |\n";
const VULN_TABLE_SEPARATOR: &str = "|-----|----------|---------|---------|---------------|-----|\n";

const SEVERITY_ORDER: [&str; 4] = ["critical", "high", "medium", "low"];

/// MarkdownSummaryFormatter adapter producing a human-readable report
///
/// Sections: overview, node types, relationships, vulnerabilities (sorted by
/// severity), publicly exposed assets and skipped rows.
pub struct MarkdownSummaryFormatter;

impl MarkdownSummaryFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn text_property<'a>(node: &'a CanonicalNode, key: &str) -> &'a str {
        node.property(key).and_then(Value::as_str).unwrap_or("-")
    }

    fn severity_rank(severity: &str) -> usize {
        SEVERITY_ORDER
            .iter()
            .position(|s| *s == severity)
            .unwrap_or(SEVERITY_ORDER.len())
    }

    fn render_overview(output: &mut String, response: &GraphResponse) -> std::fmt::Result {
        let snapshot = &response.snapshot;
        writeln!(output, "# Asset Graph Summary\n")?;
        writeln!(
            output,
            "Fetched at {} (request #{})\n",
            snapshot.fetched_at.to_rfc3339(),
            snapshot.generation
        )?;
        writeln!(output, "| Metric | Value |")?;
        writeln!(output, "|--------|-------|")?;
        writeln!(output, "| Nodes | {} |", snapshot.graph.nodes.len())?;
        writeln!(output, "| Edges | {} |", snapshot.graph.edges.len())?;
        writeln!(output, "| Total matches | {} |", snapshot.total_count)?;
        writeln!(output, "| Limit | {} |", snapshot.limit)?;
        if snapshot.has_more {
            writeln!(
                output,
                "\n{} more result(s) available; rerun with a higher --pages to load them.",
                snapshot.more_available
            )?;
        }
        writeln!(output)
    }

    fn render_counts(
        output: &mut String,
        title: &str,
        column: &str,
        counts: &BTreeMap<&str, usize>,
    ) -> std::fmt::Result {
        if counts.is_empty() {
            return Ok(());
        }
        writeln!(output, "## {}\n", title)?;
        writeln!(output, "| {} | Count |", column)?;
        writeln!(output, "|------|-------|")?;
        for (name, count) in counts {
            writeln!(output, "| {} | {} |", Self::escape_cell(name), count)?;
        }
        writeln!(output)
    }

    fn render_vulnerabilities(output: &mut String, graph: &GraphModel) -> std::fmt::Result {
        let mut vulnerabilities: Vec<&CanonicalNode> = graph
            .nodes
            .iter()
            .filter(|n| n.semantic_type == "vulnerability")
            .collect();
        if vulnerabilities.is_empty() {
            return Ok(());
        }
        vulnerabilities.sort_by_key(|n| Self::severity_rank(Self::text_property(n, "severity")));

        writeln!(output, "## Vulnerabilities\n")?;
        output.push_str(VULN_TABLE_HEADER);
        output.push_str(VULN_TABLE_SEPARATOR);
        for node in vulnerabilities {
            let kev = node.property("kev").and_then(Value::as_bool).unwrap_or(false);
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} |",
                Self::escape_cell(&node.label),
                Self::escape_cell(Self::text_property(node, "severity")),
                Self::escape_cell(Self::text_property(node, "package_name")),
                Self::escape_cell(Self::text_property(node, "package_version")),
                Self::escape_cell(Self::text_property(node, "fixed_version")),
                if kev { "⚠️ yes" } else { "no" }
            )?;
        }
        writeln!(output)
    }

    fn render_exposure(output: &mut String, graph: &GraphModel) -> std::fmt::Result {
        let exposed: Vec<&CanonicalNode> = graph
            .edges
            .iter()
            .filter(|e| e.source == INTERNET_NODE_ID && e.relation_type == INTERNET_EDGE_TYPE)
            .filter_map(|e| graph.node(&e.target))
            .collect();
        if exposed.is_empty() {
            return Ok(());
        }

        writeln!(output, "## Internet Exposure\n")?;
        for node in exposed {
            writeln!(
                output,
                "- **{}** (`{}`)",
                Self::escape_cell(&node.label),
                node.semantic_type
            )?;
        }
        writeln!(output)
    }

    fn render_warnings(output: &mut String, warnings: &[String]) -> std::fmt::Result {
        if warnings.is_empty() {
            return Ok(());
        }
        writeln!(output, "## Skipped Data\n")?;
        for warning in warnings {
            writeln!(output, "- {}", warning.replace('\n', " "))?;
        }
        writeln!(output)
    }

    fn render(response: &GraphResponse) -> std::result::Result<String, std::fmt::Error> {
        let graph = &response.snapshot.graph;
        let mut output = String::new();

        Self::render_overview(&mut output, response)?;

        let mut node_types: BTreeMap<&str, usize> = BTreeMap::new();
        for node in &graph.nodes {
            *node_types.entry(node.semantic_type.as_str()).or_default() += 1;
        }
        Self::render_counts(&mut output, "Node Types", "Type", &node_types)?;

        let mut relationships: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in &graph.edges {
            *relationships.entry(edge.relation_type.as_str()).or_default() += 1;
        }
        Self::render_counts(&mut output, "Relationships", "Relationship", &relationships)?;

        Self::render_vulnerabilities(&mut output, graph)?;
        Self::render_exposure(&mut output, graph)?;
        Self::render_warnings(&mut output, &response.snapshot.warnings)?;

        Ok(output)
    }
}

impl Default for MarkdownSummaryFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphFormatter for MarkdownSummaryFormatter {
    fn format(&self, response: &GraphResponse) -> Result<String> {
        Ok(Self::render(response)?)
    }
}
