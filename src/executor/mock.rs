//! Mock query runner for testing.
//!
//! Returns canned results without spawning processes and records every
//! query it receives.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ExecutionResult, QueryRunner};

/// A runner that answers from a lookup table.
pub struct MockQueryRunner {
    responses: HashMap<String, ExecutionResult>,
    fallback: ExecutionResult,
    calls: Mutex<Vec<String>>,
}

impl MockQueryRunner {
    /// Creates a runner that answers every query with an empty success.
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fallback: ExecutionResult::success(""),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Registers the result for an exact (trimmed) query.
    pub fn with_response(mut self, query: &str, result: ExecutionResult) -> Self {
        self.responses.insert(query.trim().to_string(), result);
        self
    }

    /// Sets the result for queries without a registered response.
    pub fn with_fallback(mut self, result: ExecutionResult) -> Self {
        self.fallback = result;
        self
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockQueryRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryRunner for MockQueryRunner {
    async fn run(&self, query: &str) -> ExecutionResult {
        let query = query.trim();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.to_string());
        }
        self.responses
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
