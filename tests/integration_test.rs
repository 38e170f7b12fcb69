/// Integration tests for the application layer
mod test_utilities;

use asset_graph::prelude::*;
use asset_graph::shared::error::GraphError;
use serde_json::{json, Value};
use test_utilities::mocks::*;

fn store_rows() -> Value {
    json!([
        {
            "n": {"id": 1, "labels": ["aws_ec2_instance"], "properties": {
                "instance_id": "i-0abc", "name": "web-1", "public_ip_address": "54.1.2.3"
            }},
            "r": {"id": 100, "type": "has_vulnerability", "start_node": 1, "end_node": 2, "properties": {}},
            "m": {"id": 2, "labels": ["vulnerability"], "properties": {
                "vulnerabilityid": "CVE-2023-0001", "pkgname": "openssl",
                "installedversion": "1.1.1", "severity": "CRITICAL"
            }}
        },
        {
            "n": {"id": 1, "labels": ["aws_ec2_instance"], "properties": {"state": "running"}},
            "r": {"id": 101, "type": "has_vulnerability", "startNode": 1, "endNode": 3, "properties": {}},
            "m": {"id": 3, "labels": ["knownexploitedvulnerability"], "properties": {
                "cve_id": "cve-2021-44228", "cwes": "[\"CWE-502\"]"
            }}
        },
        {
            "n": {"id": 4, "labels": ["aws_s3_bucket"], "properties": {"bucket_name": "logs"}},
            "r": null,
            "m": null
        }
    ])
}

fn ec2_criteria() -> FilterCriteria {
    FilterCriteria::single(FilterCriterion::relationship(
        "aws_ec2_instance",
        "has_vulnerability",
        "any_resource",
    ))
}

#[tokio::test]
async fn test_fetch_normalizes_and_classifies() {
    let executor = MockQueryExecutor::new()
        .with_json_rows(store_rows())
        .with_total(3);
    let loader = IncrementalLoader::new(executor.clone(), MockProgressReporter::new());

    let snapshot = loader
        .apply_filters(GraphRequest::new(ec2_criteria()))
        .await
        .unwrap();

    let graph = &snapshot.graph;
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 2);
    assert!(graph.dangling_edges().is_empty());

    let instance = graph.node("1").unwrap();
    assert_eq!(instance.label, "web-1");
    assert_eq!(instance.semantic_type, "aws_ec2_instance");
    // later rows merge their properties into the first occurrence
    assert_eq!(instance.properties["state"], "running");
    assert_eq!(instance.properties["instance_id"], "i-0abc");

    let vulnerability = graph.node("2").unwrap();
    assert_eq!(vulnerability.semantic_type, "vulnerability");
    assert_eq!(vulnerability.properties["severity"], "critical");
    assert_eq!(vulnerability.properties["kev"], false);

    let kev = graph.node("3").unwrap();
    assert_eq!(kev.semantic_type, "vulnerability");
    assert_eq!(kev.raw_label, "knownexploitedvulnerability");
    assert_eq!(kev.label, "CVE-2021-44228");
    assert_eq!(kev.properties["kev"], true);
    assert_eq!(kev.properties["cwes"], json!(["CWE-502"]));

    assert_eq!(graph.node("4").unwrap().label, "logs");
    assert!(!snapshot.has_more);
    assert_eq!(executor.programs().len(), 2);
}

#[tokio::test]
async fn test_load_more_expands_limit() {
    let executor = MockQueryExecutor::new()
        .with_json_rows(store_rows())
        .with_total(70);
    let loader = IncrementalLoader::new(executor.clone(), MockProgressReporter::new());

    let first = loader
        .apply_filters(GraphRequest::new(ec2_criteria()))
        .await
        .unwrap();
    assert_eq!(first.limit, PAGE_SIZE);
    assert_eq!(first.more_available, 25);

    let second = loader.load_more().await.unwrap();
    assert_eq!(second.limit, 50);
    assert_eq!(second.more_available, 20);
    assert!(second.has_more);

    let programs = executor.programs();
    assert_eq!(programs.len(), 4);
    assert!(programs.iter().any(|p| p.ends_with("LIMIT 50")));
}

#[tokio::test]
async fn test_internet_node_for_public_assets() {
    let executor = MockQueryExecutor::new()
        .with_json_rows(store_rows())
        .with_total(3);
    let loader = IncrementalLoader::new(executor, MockProgressReporter::new());

    let snapshot = loader
        .apply_filters(GraphRequest::new(ec2_criteria()).with_internet(true))
        .await
        .unwrap();

    let internet = snapshot.graph.node("internet").unwrap();
    assert_eq!(internet.semantic_type, "internet");
    assert_eq!(internet.properties["publicConnections"], 1);
    assert!(snapshot
        .graph
        .edges
        .iter()
        .any(|e| e.id == "internet->1" && e.relation_type == "internet_access"));
}

#[tokio::test]
async fn test_no_internet_node_without_public_assets() {
    let executor = MockQueryExecutor::new()
        .with_rows(vec![RawRecord::node(RawNode::new(
            "9",
            &["aws_vpc"],
            Default::default(),
        ))])
        .with_total(1);
    let loader = IncrementalLoader::new(executor, MockProgressReporter::new());

    let snapshot = loader
        .apply_filters(GraphRequest::default().with_internet(true))
        .await
        .unwrap();

    assert!(snapshot.graph.node("internet").is_none());
    assert_eq!(snapshot.graph.nodes.len(), 1);
}

#[tokio::test]
async fn test_failed_fetch_reports_and_clears_graph() {
    let reporter = MockProgressReporter::new();
    let loader = IncrementalLoader::new(
        MockQueryExecutor::new().failing("Neo4j connection refused"),
        reporter.clone(),
    );

    let error = loader
        .apply_filters(GraphRequest::new(ec2_criteria()))
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<GraphError>(),
        Some(GraphError::QueryExecution {
            status: Some(503),
            ..
        })
    ));
    assert!(loader.snapshot().unwrap().graph.is_empty());
    assert!(reporter
        .get_messages()
        .iter()
        .any(|m| m.starts_with("Error:") && m.contains("Neo4j connection refused")));
}

#[tokio::test]
async fn test_malformed_rows_become_warnings() {
    let rows = json!([
        {"n": {"id": 1, "labels": ["aws_ec2_instance"], "properties": {}},
         "r": {"id": 5, "type": "uses", "start_node": 1, "end_node": 77, "properties": {}},
         "m": null},
        {"n": {"id": 2, "labels": ["s3compliancesummary"], "properties": {"bucket_names": "[broken"}},
         "r": null, "m": null}
    ]);
    let reporter = MockProgressReporter::new();
    let loader = IncrementalLoader::new(
        MockQueryExecutor::new().with_json_rows(rows).with_total(2),
        reporter.clone(),
    );

    let snapshot = loader.apply_filters(GraphRequest::default()).await.unwrap();

    assert_eq!(snapshot.graph.nodes.len(), 2);
    assert!(snapshot.graph.edges.is_empty());
    assert_eq!(snapshot.warnings.len(), 2);
    assert_eq!(reporter.warnings().len(), 2);
    assert_eq!(
        snapshot.graph.node("2").unwrap().properties["bucket_names"],
        json!([])
    );
}

#[tokio::test]
async fn test_json_output_with_layout() {
    let loader = IncrementalLoader::new(
        MockQueryExecutor::new()
            .with_json_rows(store_rows())
            .with_total(3),
        MockProgressReporter::new(),
    );
    let snapshot = loader
        .apply_filters(GraphRequest::new(ec2_criteria()))
        .await
        .unwrap();

    let response = GraphResponse::new(snapshot).with_layout(&LayoutEngine::default(), 1280.0);
    let output = JsonGraphFormatter::new().format(&response).unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();

    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 4);
    assert!(nodes.iter().all(|n| n["x"].is_number() && n["y"].is_number()));
    let level_of = |id: &str| {
        nodes
            .iter()
            .find(|n| n["id"] == id)
            .map(|n| n["level"].as_u64().unwrap())
            .unwrap()
    };
    assert_eq!(level_of("1"), 0);
    assert_eq!(level_of("2"), 1);
    assert_eq!(level_of("4"), 0);
}

#[tokio::test]
async fn test_markdown_summary_of_fetched_graph() {
    let loader = IncrementalLoader::new(
        MockQueryExecutor::new()
            .with_json_rows(store_rows())
            .with_total(3),
        MockProgressReporter::new(),
    );
    let snapshot = loader
        .apply_filters(GraphRequest::new(ec2_criteria()))
        .await
        .unwrap();

    let output = MarkdownSummaryFormatter::new()
        .format(&GraphResponse::new(snapshot))
        .unwrap();

    assert!(output.contains("| vulnerability | 2 |"));
    assert!(output.contains("| has_vulnerability | 2 |"));
    assert!(output.contains("CVE-2021-44228"));
}
