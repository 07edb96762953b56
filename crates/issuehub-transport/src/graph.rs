//! GraphQL client over reqwest.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use issuehub_kernel::{GraphClient, IssueHubError, Result};

use crate::config::TransportConfig;
use crate::rest::http_client;

#[derive(Clone)]
pub struct GithubGraphClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GithubGraphClient {
    pub fn new(config: &TransportConfig, token: &str) -> Result<Self> {
        Ok(Self {
            http: http_client(config, token)?,
            endpoint: config.graphql_url.clone(),
        })
    }
}

/// Split a graph response envelope into its `data` member or a failure.
pub fn unwrap_envelope(operation: &str, envelope: Value) -> Result<Value> {
    if let Some(errors) = envelope["errors"].as_array().filter(|e| !e.is_empty()) {
        let messages = errors
            .iter()
            .map(|e| {
                e["message"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect();
        return Err(IssueHubError::Graph {
            operation: operation.to_string(),
            messages,
        });
    }
    match envelope.get("data") {
        Some(data) if !data.is_null() => Ok(data.clone()),
        _ => Err(IssueHubError::decode(operation, "response has no data")),
    }
}

#[async_trait]
impl GraphClient for GithubGraphClient {
    async fn execute(&self, operation: &str, document: &str, variables: Value) -> Result<Value> {
        debug!(operation, "graph request");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await
            .map_err(|e| IssueHubError::transport(operation, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IssueHubError::transport(operation, e))?;
        if !(200..300).contains(&status) {
            warn!(operation, status, "graph request rejected");
            return Err(IssueHubError::status(operation, status, body));
        }
        let envelope: Value = serde_json::from_str(&body).map_err(|e| {
            IssueHubError::decode(operation, format!("failed to unmarshal response: {e}"))
        })?;
        unwrap_envelope(operation, envelope)
    }
}
