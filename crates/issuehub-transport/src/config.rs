use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_USER_AGENT: &str = "issuehub";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Pinned REST API version sent on every request.
pub const API_VERSION: &str = "2022-11-28";
pub const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

/// Endpoints and client settings. Deserializes from the `[upstream]` table
/// of the config file; absent keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    pub api_base: String,
    pub graphql_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl TransportConfig {
    /// Point both endpoints at one host, GitHub Enterprise style:
    /// `https://ghe.example/api/v3` for REST and `.../api/graphql` for graph.
    pub fn for_host(api_base: &str) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        let graphql_url = match api_base.strip_suffix("/v3") {
            Some(root) => format!("{root}/graphql"),
            None => format!("{api_base}/graphql"),
        };
        Self {
            api_base,
            graphql_url,
            ..Self::default()
        }
    }

    pub(crate) fn rest_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_github() {
        let config = TransportConfig::default();
        assert_eq!(config.api_base, "https://api.github.com");
        assert_eq!(config.graphql_url, "https://api.github.com/graphql");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn enterprise_hosts_derive_graphql_endpoint() {
        let config = TransportConfig::for_host("https://ghe.example/api/v3/");
        assert_eq!(config.api_base, "https://ghe.example/api/v3");
        assert_eq!(config.graphql_url, "https://ghe.example/api/graphql");
        assert_eq!(
            config.rest_url("/repos/o/r/issues/1"),
            "https://ghe.example/api/v3/repos/o/r/issues/1"
        );
    }
}
