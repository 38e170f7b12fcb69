use asset_graph::prelude::*;
use asset_graph::shared::error::GraphError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Mock QueryExecutor serving canned rows and recording every program
#[derive(Default, Clone)]
pub struct MockQueryExecutor {
    rows: Vec<RawRecord>,
    total: u64,
    failure: Option<String>,
    programs: Arc<Mutex<Vec<String>>>,
}

impl MockQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows decoded from JSON objects shaped like the store's `records`
    pub fn with_json_rows(mut self, rows: Value) -> Self {
        self.rows = rows
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(RawRecord::from_row)
            .collect();
        self
    }

    pub fn with_rows(mut self, rows: Vec<RawRecord>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn programs(&self) -> Vec<String> {
        self.programs.lock().unwrap().clone()
    }

    fn record(&self, program: &str) -> Result<()> {
        self.programs.lock().unwrap().push(program.to_string());
        match &self.failure {
            Some(message) => Err(GraphError::QueryExecution {
                status: Some(503),
                message: message.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, program: &str) -> Result<Vec<RawRecord>> {
        self.record(program)?;
        Ok(self.rows.clone())
    }

    async fn count(&self, program: &str) -> Result<u64> {
        self.record(program)?;
        Ok(self.total)
    }
}

