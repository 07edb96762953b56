use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use issuehub_kernel::{ClientSource, GraphClient, Result, RestClient};

use crate::config::TransportConfig;
use crate::graph::GithubGraphClient;
use crate::rest::GithubRestClient;
use crate::token::TokenSource;

/// Builds fresh clients per operation, resolving the token each time.
#[derive(Debug, Clone, Default)]
pub struct GithubClientSource {
    config: TransportConfig,
    token: TokenSource,
}

impl GithubClientSource {
    pub fn new(config: TransportConfig, token: TokenSource) -> Self {
        Self { config, token }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl ClientSource for GithubClientSource {
    async fn rest(&self) -> Result<Arc<dyn RestClient>> {
        let token = self.token.resolve()?;
        debug!(api_base = %self.config.api_base, "building REST client");
        Ok(Arc::new(GithubRestClient::new(&self.config, &token)?))
    }

    async fn graph(&self) -> Result<Arc<dyn GraphClient>> {
        let token = self.token.resolve()?;
        debug!(endpoint = %self.config.graphql_url, "building graph client");
        Ok(Arc::new(GithubGraphClient::new(&self.config, &token)?))
    }
}
