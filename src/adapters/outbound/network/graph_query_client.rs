use crate::graph_query::domain::RawRecord;
use crate::ports::outbound::QueryExecutor;
use crate::shared::error::GraphError;
use crate::shared::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    params: Map<String, Value>,
}

/// Body of a query endpoint response.
///
/// Success: `{success: true, records: [...], count}`. Failure:
/// `{success: false, error}` or a bare `{message}`.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    records: Vec<Value>,
    #[serde(default)]
    count: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl QueryResponse {
    fn upstream_message(&self) -> Option<String> {
        self.error.clone().or_else(|| self.message.clone())
    }
}

/// GraphQueryClient adapter executing programs over HTTP
///
/// POSTs `{query, params}` to the configured endpoint. An optional bearer
/// token is passed through unchanged.
///
/// # Security
/// - Only `http://` and `https://` endpoints are accepted
/// - Implements timeout (30 seconds by default)
/// - Does not retry failed requests; the caller decides
pub struct GraphQueryClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphQueryClient {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
    const MAX_ERROR_BODY: usize = 500;

    /// Creates a client with the default timeout and no token
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_options(
            endpoint,
            None,
            Duration::from_secs(Self::DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            anyhow::bail!(
                "Invalid query endpoint '{}': expected an http:// or https:// URL",
                endpoint
            );
        }

        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("asset-graph/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, program: &str) -> Result<QueryResponse> {
        if program.trim().is_empty() {
            return Err(GraphError::CompileError {
                reason: "refusing to send an empty program".to_string(),
            }
            .into());
        }

        let body = QueryRequest {
            query: program,
            params: Map::new(),
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| GraphError::QueryExecution {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| GraphError::QueryExecution {
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {}", e),
        })?;

        Ok(Self::parse_response(status.as_u16(), &text)?)
    }

    /// Maps a raw HTTP status and body to a response or a typed error
    fn parse_response(status: u16, body: &str) -> std::result::Result<QueryResponse, GraphError> {
        let parsed = serde_json::from_str::<QueryResponse>(body);

        if !(200..300).contains(&status) {
            let message = parsed
                .ok()
                .and_then(|r| r.upstream_message())
                .unwrap_or_else(|| Self::truncate(body));
            return Err(GraphError::QueryExecution {
                status: Some(status),
                message,
            });
        }

        let response = parsed.map_err(|e| GraphError::QueryExecution {
            status: Some(status),
            message: format!("malformed response body: {}", e),
        })?;

        if response.success == Some(false) {
            return Err(GraphError::QueryExecution {
                status: Some(status),
                message: response
                    .upstream_message()
                    .unwrap_or_else(|| "query reported failure without a message".to_string()),
            });
        }

        Ok(response)
    }

    fn truncate(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return "empty response body".to_string();
        }
        trimmed.chars().take(Self::MAX_ERROR_BODY).collect()
    }

    /// Object rows become records; anything else is ignored
    fn decode_records(rows: &[Value]) -> Vec<RawRecord> {
        rows.iter()
            .filter_map(Value::as_object)
            .map(RawRecord::from_row)
            .collect()
    }

    /// Sums the `count` column (or first numeric column) of every row.
    ///
    /// Falls back to the response-level `count` when there are no rows.
    fn sum_counts(response: &QueryResponse) -> u64 {
        if response.records.is_empty() {
            return response.count.as_ref().and_then(numeric).unwrap_or(0);
        }

        response
            .records
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|row| {
                row.get("count")
                    .and_then(numeric)
                    .or_else(|| row.values().find_map(numeric))
            })
            .fold(0, u64::saturating_add)
    }
}

fn numeric(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl QueryExecutor for GraphQueryClient {
    async fn execute(&self, program: &str) -> Result<Vec<RawRecord>> {
        let response = self.post(program).await?;
        Ok(Self::decode_records(&response.records))
    }

    async fn count(&self, program: &str) -> Result<u64> {
        let response = self.post(program).await?;
        Ok(Self::sum_counts(&response))
    }
}
