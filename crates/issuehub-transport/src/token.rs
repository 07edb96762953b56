use issuehub_kernel::{IssueHubError, Result};

pub const TOKEN_ENV_VAR: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

/// Where the bearer token comes from. `Env` is read on every resolve, so a
/// rotated token is picked up by the next operation.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    Static(String),
    Env(String),
}

impl Default for TokenSource {
    fn default() -> Self {
        Self::Env(TOKEN_ENV_VAR.to_string())
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
        }
    }
}

impl TokenSource {
    pub fn resolve(&self) -> Result<String> {
        let token = match self {
            Self::Static(token) => token.clone(),
            Self::Env(var) => std::env::var(var).map_err(|_| IssueHubError::Client {
                message: format!("{var} is not set"),
            })?,
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(IssueHubError::Client {
                message: "GitHub token is empty".to_string(),
            });
        }
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_is_trimmed() {
        let source = TokenSource::Static("  ghp_abc \n".into());
        assert_eq!(source.resolve().expect("token"), "ghp_abc");
    }

    #[test]
    fn blank_or_missing_tokens_are_client_errors() {
        let blank = TokenSource::Static("   ".into()).resolve().expect_err("blank");
        assert_eq!(blank.to_string(), "failed to get GitHub client: GitHub token is empty");

        let missing = TokenSource::Env("ISSUEHUB_TEST_TOKEN_NEVER_SET".into())
            .resolve()
            .expect_err("unset var");
        assert!(matches!(missing, IssueHubError::Client { .. }));
        assert!(missing.to_string().contains("ISSUEHUB_TEST_TOKEN_NEVER_SET"));
    }

    #[test]
    fn debug_output_redacts_static_tokens() {
        let rendered = format!("{:?}", TokenSource::Static("ghp_secret".into()));
        assert!(!rendered.contains("ghp_secret"));
    }
}
