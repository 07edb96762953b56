//! Recording fakes of the upstream facade for protocol tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{IssueHubError, Result};
use crate::facade::{
    GraphClient, IssueRequest, Method, QueryPairs, RawRequest, RestClient, RestResponse,
    SubIssueRequest,
};
use crate::ids::{IssueNumber, RepoRef};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RestCall {
    pub name: &'static str,
    pub path: String,
    pub query: QueryPairs,
    pub body: Option<Value>,
}

#[derive(Default)]
pub(crate) struct FakeRest {
    calls: Mutex<Vec<RestCall>>,
    responses: Mutex<VecDeque<Result<RestResponse>>>,
}

impl FakeRest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(RestResponse::new(status, body)));
        self
    }

    pub fn fail(self, err: IssueHubError) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<RestCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(
        &self,
        name: &'static str,
        path: String,
        query: QueryPairs,
        body: Option<Value>,
    ) -> Result<RestResponse> {
        self.calls.lock().expect("calls lock").push(RestCall {
            name,
            path,
            query,
            body,
        });
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected upstream call: {name}"))
    }
}

fn issue_path(repo: &RepoRef, number: IssueNumber) -> String {
    format!("repos/{}/{}/issues/{}", repo.owner, repo.name, number.get())
}

fn to_json<T: serde::Serialize>(value: &T) -> Option<Value> {
    Some(serde_json::to_value(value).expect("fake payload should serialize"))
}

#[async_trait]
impl RestClient for FakeRest {
    async fn get_issue(&self, repo: &RepoRef, number: IssueNumber) -> Result<RestResponse> {
        self.record("get_issue", issue_path(repo, number), vec![], None)
    }

    async fn create_issue(&self, repo: &RepoRef, request: &IssueRequest) -> Result<RestResponse> {
        let path = format!("repos/{}/{}/issues", repo.owner, repo.name);
        self.record("create_issue", path, vec![], to_json(request))
    }

    async fn update_issue(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        request: &IssueRequest,
    ) -> Result<RestResponse> {
        self.record("update_issue", issue_path(repo, number), vec![], to_json(request))
    }

    async fn list_issues(&self, repo: &RepoRef, query: &QueryPairs) -> Result<RestResponse> {
        let path = format!("repos/{}/{}/issues", repo.owner, repo.name);
        self.record("list_issues", path, query.clone(), None)
    }

    async fn search_issues(&self, query: &QueryPairs) -> Result<RestResponse> {
        self.record("search_issues", "search/issues".into(), query.clone(), None)
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        body: &str,
    ) -> Result<RestResponse> {
        let path = format!("{}/comments", issue_path(repo, number));
        self.record("create_comment", path, vec![], Some(json!({ "body": body })))
    }

    async fn list_comments(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        query: &QueryPairs,
    ) -> Result<RestResponse> {
        let path = format!("{}/comments", issue_path(repo, number));
        self.record("list_comments", path, query.clone(), None)
    }

    async fn add_sub_issue(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        request: &SubIssueRequest,
    ) -> Result<RestResponse> {
        let path = format!("{}/sub_issues", issue_path(repo, parent));
        self.record("add_sub_issue", path, vec![], to_json(request))
    }

    async fn list_sub_issues(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        query: &QueryPairs,
    ) -> Result<RestResponse> {
        let path = format!("{}/sub_issues", issue_path(repo, parent));
        self.record("list_sub_issues", path, query.clone(), None)
    }

    async fn reprioritize_sub_issue(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        request: &SubIssueRequest,
    ) -> Result<RestResponse> {
        let path = format!("{}/sub_issues/priority", issue_path(repo, parent));
        self.record("reprioritize_sub_issue", path, vec![], to_json(request))
    }

    async fn send_raw(&self, _operation: &str, request: RawRequest) -> Result<RestResponse> {
        let name = match request.method {
            Method::Get => "raw_get",
            Method::Post => "raw_post",
            Method::Patch => "raw_patch",
            Method::Delete => "raw_delete",
        };
        self.record(name, request.path, vec![], request.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GraphCall {
    pub operation: String,
    pub document: String,
    pub variables: Value,
}

#[derive(Default)]
pub(crate) struct FakeGraph {
    calls: Mutex<Vec<GraphCall>>,
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, data: Value) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(data));
        self
    }

    pub fn fail(self, err: IssueHubError) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<GraphCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl GraphClient for FakeGraph {
    async fn execute(&self, operation: &str, document: &str, variables: Value) -> Result<Value> {
        self.calls.lock().expect("calls lock").push(GraphCall {
            operation: operation.to_string(),
            document: document.to_string(),
            variables,
        });
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected graph call: {operation}"))
    }
}
