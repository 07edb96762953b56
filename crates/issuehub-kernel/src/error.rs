//! Error types for issuehub operations.
//!
//! Four outcomes are distinguished by callers: a request that was never sent
//! (validation), a request that never got a response (transport), a response
//! with a non-success status, and a response that could not be understood.
//! "Agent not offered in this repository" is not an error at all; see
//! [`crate::assignment::AssignmentOutcome`].

use std::error::Error as StdError;

/// Parameter contract violations. Always detected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required parameter was absent or blank.
    #[error("missing required parameter: {0}")]
    Missing(&'static str),

    /// A parameter was present but outside its domain.
    #[error("invalid {field}: {detail}")]
    Invalid { field: &'static str, detail: String },

    /// Mutually exclusive or co-required parameters were combined wrongly.
    #[error("{0}")]
    Conflict(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            detail: detail.into(),
        }
    }
}

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by kernel operations.
#[derive(Debug, thiserror::Error)]
pub enum IssueHubError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The client accessor could not produce a client for this call.
    #[error("failed to get GitHub client: {message}")]
    Client { message: String },

    /// The upstream call did not complete.
    #[error("failed to {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// The upstream call completed with a non-success status. `body` is the
    /// raw response text, kept verbatim.
    #[error("failed to {operation}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// A graph response carried an `errors` array.
    #[error("failed to {operation}: {}", messages.join("; "))]
    Graph {
        operation: String,
        messages: Vec<String>,
    },

    /// A success response whose body could not be parsed.
    #[error("failed to {operation}: {message}")]
    Decode { operation: String, message: String },
}

impl IssueHubError {
    pub fn transport(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    pub fn decode(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status of a status failure, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IssueHubError>;
