//! Upstream client facade.
//!
//! The kernel never speaks HTTP. Protocols are written against these traits;
//! `issuehub-transport` supplies the network implementation and tests supply
//! recording fakes.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::anchor::Anchor;
use crate::error::{IssueHubError, Result};
use crate::ids::{IssueNumber, RepoRef};

/// Operation names carried as error context. The transport uses the same
/// names when a call never completes.
pub mod op {
    pub const GET_ISSUE: &str = "get issue";
    pub const CREATE_ISSUE: &str = "create issue";
    pub const UPDATE_ISSUE: &str = "update issue";
    pub const LIST_ISSUES: &str = "list issues";
    pub const SEARCH_ISSUES: &str = "search issues";
    pub const CREATE_COMMENT: &str = "create comment";
    pub const GET_COMMENTS: &str = "get issue comments";
    pub const ADD_SUB_ISSUE: &str = "add sub-issue";
    pub const LIST_SUB_ISSUES: &str = "list sub-issues";
    pub const REMOVE_SUB_ISSUE: &str = "remove sub-issue";
    pub const REPRIORITIZE_SUB_ISSUE: &str = "reprioritize sub-issue";
    pub const LIST_SUGGESTED_ACTORS: &str = "list suggested actors";
    pub const GET_ISSUE_ID: &str = "get issue ID";
    pub const REPLACE_ASSIGNEES: &str = "replace actors for assignable";
}

/// Status plus raw body of a completed upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check for the exact status an operation expects, then parse the body
    /// as JSON. Anything else becomes a status failure carrying the raw body.
    pub fn expect_json(self, operation: &str, expected: u16) -> Result<Value> {
        if self.status != expected {
            return Err(IssueHubError::status(operation, self.status, self.body));
        }
        serde_json::from_str(&self.body).map_err(|e| {
            IssueHubError::decode(operation, format!("failed to unmarshal response: {e}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A hand-built request, bypassing the structured methods. `path` is
/// relative to the REST base (`repos/o/r/...`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Wire shape of every sub-issue mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubIssueRequest {
    pub sub_issue_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_parent: Option<bool>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
}

/// Body of issue create/edit calls. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<i64>,
}

/// Query-string pairs for list/search endpoints, in insertion order.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Structured REST access. Every method returns the status envelope of a
/// completed call, or `IssueHubError::Transport` when no response arrived.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn get_issue(&self, repo: &RepoRef, number: IssueNumber) -> Result<RestResponse>;

    async fn create_issue(&self, repo: &RepoRef, request: &IssueRequest) -> Result<RestResponse>;

    async fn update_issue(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        request: &IssueRequest,
    ) -> Result<RestResponse>;

    async fn list_issues(&self, repo: &RepoRef, query: &QueryPairs) -> Result<RestResponse>;

    async fn search_issues(&self, query: &QueryPairs) -> Result<RestResponse>;

    async fn create_comment(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        body: &str,
    ) -> Result<RestResponse>;

    async fn list_comments(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        query: &QueryPairs,
    ) -> Result<RestResponse>;

    async fn add_sub_issue(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        request: &SubIssueRequest,
    ) -> Result<RestResponse>;

    async fn list_sub_issues(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        query: &QueryPairs,
    ) -> Result<RestResponse>;

    async fn reprioritize_sub_issue(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        request: &SubIssueRequest,
    ) -> Result<RestResponse>;

    /// Low-level path. Implementations apply the same default headers as the
    /// structured methods (accept, api version, auth, JSON content type).
    async fn send_raw(&self, operation: &str, request: RawRequest) -> Result<RestResponse>;
}

/// Graph query/mutation execution. Returns the `data` member on success.
#[async_trait]
pub trait GraphClient: Send + Sync {
    async fn execute(&self, operation: &str, document: &str, variables: Value) -> Result<Value>;
}

/// Late-bound accessor, consulted once per operation so each call can carry
/// its own identity.
#[async_trait]
pub trait ClientSource: Send + Sync {
    async fn rest(&self) -> Result<Arc<dyn RestClient>>;

    async fn graph(&self) -> Result<Arc<dyn GraphClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expect_json_reparses_success_bodies() {
        let value = RestResponse::new(200, r#"{ "id" : 1 }"#)
            .expect_json("remove sub-issue", 200)
            .expect("200 should parse");
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn expect_json_surfaces_raw_body_on_unexpected_status() {
        let err = RestResponse::new(200, "{}")
            .expect_json("add sub-issue", 201)
            .expect_err("200 is not 201");
        assert_eq!(err.status_code(), Some(200));

        let err = RestResponse::new(500, r#"{"message":"boom"}"#)
            .expect_json("get issue", 200)
            .expect_err("500 should fail");
        assert!(err.to_string().contains(r#"{"message":"boom"}"#));
    }

    #[test]
    fn expect_json_reports_unparseable_success() {
        let err = RestResponse::new(200, "not json")
            .expect_json("list sub-issues", 200)
            .expect_err("garbage should fail");
        assert!(matches!(err, IssueHubError::Decode { .. }));
    }

    #[test]
    fn issue_request_omits_absent_fields() {
        let request = IssueRequest {
            title: Some("New".into()),
            labels: Some(vec!["bug".into()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({"title": "New", "labels": ["bug"]})
        );
    }
}
