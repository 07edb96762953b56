//! Sub-issue ordering protocol.
//!
//! A parent issue owns an ordered list of children. Edits are expressed
//! upstream as anchors relative to siblings, never as absolute indices, and
//! the list order itself is whatever the upstream service reports.
//!
//! Every operation validates first and makes no call on a validation
//! failure. Success bodies are reparsed and handed back as opaque JSON.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::anchor::Anchor;
use crate::error::{Result, ValidationError};
use crate::facade::{Method, RawRequest, RestClient, RestResponse, SubIssueRequest, op};
use crate::ids::{IssueId, IssueNumber, RepoRef};
use crate::params::Pagination;

/// Attach `sub_issue` under `parent`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddSubIssue {
    pub repo: RepoRef,
    pub parent: IssueNumber,
    pub sub_issue: IssueId,
    /// Sever any existing parent edge of `sub_issue` first. When false, a
    /// conflicting parent is left to the upstream service's own rule.
    pub replace_parent: bool,
}

impl AddSubIssue {
    pub fn new(
        owner: &str,
        repo: &str,
        issue_number: i64,
        sub_issue_id: i64,
        replace_parent: Option<bool>,
    ) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            repo: RepoRef::new(owner, repo)?,
            parent: IssueNumber::new("issueNumber", issue_number)?,
            sub_issue: IssueId::new("subIssueId", sub_issue_id)?,
            replace_parent: replace_parent.unwrap_or(false),
        })
    }

    pub fn wire(&self) -> SubIssueRequest {
        SubIssueRequest {
            sub_issue_id: self.sub_issue.get(),
            replace_parent: Some(self.replace_parent),
            anchor: None,
        }
    }
}

/// One page of a parent's children.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSubIssues {
    pub repo: RepoRef,
    pub parent: IssueNumber,
    pub pagination: Pagination,
}

impl ListSubIssues {
    pub fn new(
        owner: &str,
        repo: &str,
        issue_number: i64,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            repo: RepoRef::new(owner, repo)?,
            parent: IssueNumber::new("issueNumber", issue_number)?,
            pagination: Pagination::from_fields(page, per_page)?,
        })
    }
}

/// Sever the edge between `parent` and `sub_issue`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveSubIssue {
    pub repo: RepoRef,
    pub parent: IssueNumber,
    pub sub_issue: IssueId,
}

impl RemoveSubIssue {
    pub fn new(
        owner: &str,
        repo: &str,
        issue_number: i64,
        sub_issue_id: i64,
    ) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            repo: RepoRef::new(owner, repo)?,
            parent: IssueNumber::new("issueNumber", issue_number)?,
            sub_issue: IssueId::new("subIssueId", sub_issue_id)?,
        })
    }

    /// The hand-built DELETE: same payload shape the structured call would
    /// send, with the id as a JSON integer.
    pub fn raw_request(&self) -> RawRequest {
        RawRequest {
            method: Method::Delete,
            path: format!(
                "repos/{}/{}/issues/{}/sub_issue",
                self.repo.owner,
                self.repo.name,
                self.parent.get()
            ),
            body: Some(json!({ "sub_issue_id": self.sub_issue.get() })),
        }
    }
}

/// Move `sub_issue` next to a sibling.
#[derive(Debug, Clone, PartialEq)]
pub struct ReprioritizeSubIssue {
    pub repo: RepoRef,
    pub parent: IssueNumber,
    pub sub_issue: IssueId,
    pub anchor: Anchor,
}

impl ReprioritizeSubIssue {
    pub fn new(
        owner: &str,
        repo: &str,
        issue_number: i64,
        sub_issue_id: i64,
        after_id: Option<i64>,
        before_id: Option<i64>,
    ) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            repo: RepoRef::new(owner, repo)?,
            parent: IssueNumber::new("issueNumber", issue_number)?,
            sub_issue: IssueId::new("subIssueId", sub_issue_id)?,
            anchor: Anchor::from_fields(after_id, before_id)?,
        })
    }

    pub fn wire(&self) -> SubIssueRequest {
        SubIssueRequest {
            sub_issue_id: self.sub_issue.get(),
            replace_parent: None,
            anchor: Some(self.anchor),
        }
    }
}

pub async fn add_sub_issue(client: &dyn RestClient, request: &AddSubIssue) -> Result<Value> {
    debug!(
        repo = %request.repo,
        parent = request.parent.get(),
        sub_issue = request.sub_issue.get(),
        replace_parent = request.replace_parent,
        "adding sub-issue"
    );
    let response = client
        .add_sub_issue(&request.repo, request.parent, &request.wire())
        .await?;
    let created = finish(op::ADD_SUB_ISSUE, response, 201)?;
    info!(repo = %request.repo, parent = request.parent.get(), "sub-issue added");
    Ok(created)
}

pub async fn list_sub_issues(client: &dyn RestClient, request: &ListSubIssues) -> Result<Value> {
    debug!(
        repo = %request.repo,
        parent = request.parent.get(),
        page = request.pagination.page,
        per_page = request.pagination.per_page,
        "listing sub-issues"
    );
    let response = client
        .list_sub_issues(
            &request.repo,
            request.parent,
            &request.pagination.query_pairs(),
        )
        .await?;
    finish(op::LIST_SUB_ISSUES, response, 200)
}

/// Goes through [`RestClient::send_raw`] rather than a structured method.
/// Any status other than 200 is a failure carrying the raw body; a 200 is
/// success whatever the body's shape, as long as it is JSON.
pub async fn remove_sub_issue(client: &dyn RestClient, request: &RemoveSubIssue) -> Result<Value> {
    debug!(
        repo = %request.repo,
        parent = request.parent.get(),
        sub_issue = request.sub_issue.get(),
        "removing sub-issue"
    );
    let response = client
        .send_raw(op::REMOVE_SUB_ISSUE, request.raw_request())
        .await?;
    let removed = finish(op::REMOVE_SUB_ISSUE, response, 200)?;
    info!(repo = %request.repo, parent = request.parent.get(), "sub-issue removed");
    Ok(removed)
}

pub async fn reprioritize_sub_issue(
    client: &dyn RestClient,
    request: &ReprioritizeSubIssue,
) -> Result<Value> {
    debug!(
        repo = %request.repo,
        parent = request.parent.get(),
        sub_issue = request.sub_issue.get(),
        anchor = ?request.anchor,
        "reprioritizing sub-issue"
    );
    let response = client
        .reprioritize_sub_issue(&request.repo, request.parent, &request.wire())
        .await?;
    let moved = finish(op::REPRIORITIZE_SUB_ISSUE, response, 200)?;
    info!(repo = %request.repo, parent = request.parent.get(), "sub-issue reprioritized");
    Ok(moved)
}

fn finish(operation: &str, response: RestResponse, expected: u16) -> Result<Value> {
    response.expect_json(operation, expected).inspect_err(|err| {
        warn!(operation, error = %err, "upstream call failed");
    })
}
