//! Plain issue operations: read, create, edit, list, search, comment.
//!
//! Each one validates its parameters, forwards one structured call, checks
//! the status the endpoint returns on success, and hands back the upstream
//! resource as JSON.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::facade::{IssueRequest, QueryPairs, RestClient, op};
use crate::ids::{IssueNumber, RepoRef};
use crate::params::{
    IssueSort, IssueState, IssueStateFilter, Pagination, SearchSort, SortDirection, non_empty,
    parse_iso_timestamp, required_str,
};

fn non_empty_list(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values
        .map(|v| {
            v.into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
}

fn milestone(raw: Option<i64>) -> std::result::Result<Option<i64>, ValidationError> {
    match raw {
        None | Some(0) => Ok(None),
        Some(n) if n < 0 => Err(ValidationError::invalid(
            "milestone",
            format!("{n} (must be positive)"),
        )),
        Some(n) => Ok(Some(n)),
    }
}

pub async fn get_issue(client: &dyn RestClient, repo: &RepoRef, number: IssueNumber) -> Result<Value> {
    debug!(repo = %repo, issue = %number, "getting issue");
    client
        .get_issue(repo, number)
        .await?
        .expect_json(op::GET_ISSUE, 200)
}

/// Fields for a new issue. `title` is required.
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub title: String,
    pub body: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    pub milestone: Option<i64>,
}

impl NewIssue {
    pub fn into_request(self) -> std::result::Result<IssueRequest, ValidationError> {
        Ok(IssueRequest {
            title: Some(required_str("title", &self.title)?),
            body: non_empty(self.body),
            state: None,
            labels: non_empty_list(self.labels),
            assignees: non_empty_list(self.assignees),
            milestone: milestone(self.milestone)?,
        })
    }
}

pub async fn create_issue(client: &dyn RestClient, repo: &RepoRef, issue: NewIssue) -> Result<Value> {
    let request = issue.into_request()?;
    debug!(repo = %repo, "creating issue");
    client
        .create_issue(repo, &request)
        .await?
        .expect_json(op::CREATE_ISSUE, 201)
}

/// Edits to an existing issue. Only supplied, non-empty fields are sent.
#[derive(Debug, Clone, Default)]
pub struct IssueEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub milestone: Option<i64>,
}

impl IssueEdit {
    pub fn into_request(self) -> std::result::Result<IssueRequest, ValidationError> {
        let state = IssueState::parse_opt(self.state.as_deref())?;
        Ok(IssueRequest {
            title: non_empty(self.title),
            body: non_empty(self.body),
            state: state.map(|s| s.as_str().to_string()),
            labels: non_empty_list(self.labels),
            assignees: non_empty_list(self.assignees),
            milestone: milestone(self.milestone)?,
        })
    }
}

pub async fn update_issue(
    client: &dyn RestClient,
    repo: &RepoRef,
    number: IssueNumber,
    edit: IssueEdit,
) -> Result<Value> {
    let request = edit.into_request()?;
    debug!(repo = %repo, issue = %number, "updating issue");
    client
        .update_issue(repo, number, &request)
        .await?
        .expect_json(op::UPDATE_ISSUE, 200)
}

#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub state: Option<String>,
    pub labels: Option<Vec<String>>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub since: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl IssueFilter {
    pub fn query_pairs(&self) -> std::result::Result<QueryPairs, ValidationError> {
        let mut pairs = QueryPairs::new();
        if let Some(state) = IssueStateFilter::parse_opt(self.state.as_deref())? {
            pairs.push(("state", state.as_str().to_string()));
        }
        if let Some(labels) = non_empty_list(self.labels.clone()) {
            pairs.push(("labels", labels.join(",")));
        }
        if let Some(sort) = IssueSort::parse_opt(self.sort.as_deref())? {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(direction) = SortDirection::parse_opt(self.direction.as_deref())? {
            pairs.push(("direction", direction.as_str().to_string()));
        }
        if let Some(since) = self.since.as_deref().filter(|s| !s.trim().is_empty()) {
            let since = parse_iso_timestamp(since)?;
            pairs.push(("since", since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)));
        }
        pairs.extend(Pagination::from_fields(self.page, self.per_page)?.query_pairs());
        Ok(pairs)
    }
}

pub async fn list_issues(client: &dyn RestClient, repo: &RepoRef, filter: &IssueFilter) -> Result<Value> {
    let query = filter.query_pairs()?;
    debug!(repo = %repo, "listing issues");
    client
        .list_issues(repo, &query)
        .await?
        .expect_json(op::LIST_ISSUES, 200)
}

#[derive(Debug, Clone, Default)]
pub struct IssueSearch {
    pub query: String,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl IssueSearch {
    /// The query text scoped to issues, and to one repository when both
    /// owner and repo are given.
    pub fn scoped_query(&self) -> std::result::Result<String, ValidationError> {
        let mut query = required_str("query", &self.query)?;
        if !query.split_whitespace().any(|term| term == "is:issue") {
            query = format!("is:issue {query}");
        }
        let owner = non_empty(self.owner.clone());
        let repo = non_empty(self.repo.clone());
        if let (Some(owner), Some(repo)) = (owner, repo) {
            let scope = format!("repo:{}/{}", owner.trim(), repo.trim());
            if !query.split_whitespace().any(|term| term == scope) {
                query = format!("{scope} {query}");
            }
        }
        Ok(query)
    }

    pub fn query_pairs(&self) -> std::result::Result<QueryPairs, ValidationError> {
        let mut pairs = vec![("q", self.scoped_query()?)];
        if let Some(sort) = SearchSort::parse_opt(self.sort.as_deref())? {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(order) = SortDirection::parse_opt(self.order.as_deref())
            .map_err(|_| ValidationError::invalid("order", "expected one of: asc, desc"))?
        {
            pairs.push(("order", order.as_str().to_string()));
        }
        pairs.extend(Pagination::from_fields(self.page, self.per_page)?.query_pairs());
        Ok(pairs)
    }
}

pub async fn search_issues(client: &dyn RestClient, search: &IssueSearch) -> Result<Value> {
    let query = search.query_pairs()?;
    debug!(query = %query[0].1, "searching issues");
    client
        .search_issues(&query)
        .await?
        .expect_json(op::SEARCH_ISSUES, 200)
}

pub async fn add_issue_comment(
    client: &dyn RestClient,
    repo: &RepoRef,
    number: IssueNumber,
    body: &str,
) -> Result<Value> {
    required_str("body", body)?;
    debug!(repo = %repo, issue = %number, "adding comment");
    client
        .create_comment(repo, number, body)
        .await?
        .expect_json(op::CREATE_COMMENT, 201)
}

pub async fn get_issue_comments(
    client: &dyn RestClient,
    repo: &RepoRef,
    number: IssueNumber,
    pagination: Pagination,
) -> Result<Value> {
    debug!(repo = %repo, issue = %number, "listing comments");
    client
        .list_comments(repo, number, &pagination.query_pairs())
        .await?
        .expect_json(op::GET_COMMENTS, 200)
}

/// The `{"body": ...}` payload a comment call carries.
pub fn comment_payload(body: &str) -> Value {
    json!({ "body": body })
}
