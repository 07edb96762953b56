//! REST client over reqwest.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

use issuehub_kernel::facade::op;
use issuehub_kernel::issues::comment_payload;
use issuehub_kernel::{
    IssueHubError, IssueNumber, IssueRequest, Method, QueryPairs, RawRequest, RepoRef, Result,
    RestClient, RestResponse, SubIssueRequest,
};

use crate::config::{ACCEPT_GITHUB_JSON, API_VERSION, TransportConfig};

const API_VERSION_HEADER: &str = "x-github-api-version";

/// Headers every request carries, raw ones included.
pub(crate) fn default_headers(config: &TransportConfig, token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|_| IssueHubError::Client {
            message: "invalid user agent".to_string(),
        })?,
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        IssueHubError::Client {
            message: "invalid github authorization header".to_string(),
        }
    })?;
    auth.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth);
    Ok(headers)
}

pub(crate) fn http_client(config: &TransportConfig, token: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(default_headers(config, token)?)
        .timeout(Duration::from_millis(config.timeout_ms.max(1)))
        .build()
        .map_err(|e| IssueHubError::Client {
            message: format!("failed to create github api client: {e}"),
        })
}

#[derive(Clone)]
pub struct GithubRestClient {
    http: reqwest::Client,
    config: TransportConfig,
}

impl GithubRestClient {
    pub fn new(config: &TransportConfig, token: &str) -> Result<Self> {
        Ok(Self {
            http: http_client(config, token)?,
            config: config.clone(),
        })
    }

    fn issue_url(&self, repo: &RepoRef, number: IssueNumber, suffix: &str) -> String {
        self.config.rest_url(&format!(
            "repos/{}/{}/issues/{}{suffix}",
            repo.owner,
            repo.name,
            number.get()
        ))
    }

    fn issues_url(&self, repo: &RepoRef) -> String {
        self.config
            .rest_url(&format!("repos/{}/{}/issues", repo.owner, repo.name))
    }

    async fn send(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<RestResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| IssueHubError::transport(operation, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IssueHubError::transport(operation, e))?;
        debug!(operation, status, "upstream call completed");
        Ok(RestResponse::new(status, body))
    }
}

#[async_trait]
impl RestClient for GithubRestClient {
    async fn get_issue(&self, repo: &RepoRef, number: IssueNumber) -> Result<RestResponse> {
        let url = self.issue_url(repo, number, "");
        self.send(op::GET_ISSUE, self.http.get(url)).await
    }

    async fn create_issue(&self, repo: &RepoRef, request: &IssueRequest) -> Result<RestResponse> {
        let url = self.issues_url(repo);
        self.send(op::CREATE_ISSUE, self.http.post(url).json(request))
            .await
    }

    async fn update_issue(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        request: &IssueRequest,
    ) -> Result<RestResponse> {
        let url = self.issue_url(repo, number, "");
        self.send(op::UPDATE_ISSUE, self.http.patch(url).json(request))
            .await
    }

    async fn list_issues(&self, repo: &RepoRef, query: &QueryPairs) -> Result<RestResponse> {
        let url = self.issues_url(repo);
        self.send(op::LIST_ISSUES, self.http.get(url).query(query))
            .await
    }

    async fn search_issues(&self, query: &QueryPairs) -> Result<RestResponse> {
        let url = self.config.rest_url("search/issues");
        self.send(op::SEARCH_ISSUES, self.http.get(url).query(query))
            .await
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        body: &str,
    ) -> Result<RestResponse> {
        let url = self.issue_url(repo, number, "/comments");
        let payload = comment_payload(body);
        self.send(op::CREATE_COMMENT, self.http.post(url).json(&payload))
            .await
    }

    async fn list_comments(
        &self,
        repo: &RepoRef,
        number: IssueNumber,
        query: &QueryPairs,
    ) -> Result<RestResponse> {
        let url = self.issue_url(repo, number, "/comments");
        self.send(op::GET_COMMENTS, self.http.get(url).query(query))
            .await
    }

    async fn add_sub_issue(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        request: &SubIssueRequest,
    ) -> Result<RestResponse> {
        let url = self.issue_url(repo, parent, "/sub_issues");
        self.send(op::ADD_SUB_ISSUE, self.http.post(url).json(request))
            .await
    }

    async fn list_sub_issues(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        query: &QueryPairs,
    ) -> Result<RestResponse> {
        let url = self.issue_url(repo, parent, "/sub_issues");
        self.send(op::LIST_SUB_ISSUES, self.http.get(url).query(query))
            .await
    }

    async fn reprioritize_sub_issue(
        &self,
        repo: &RepoRef,
        parent: IssueNumber,
        request: &SubIssueRequest,
    ) -> Result<RestResponse> {
        let url = self.issue_url(repo, parent, "/sub_issues/priority");
        self.send(op::REPRIORITIZE_SUB_ISSUE, self.http.patch(url).json(request))
            .await
    }

    async fn send_raw(&self, operation: &str, request: RawRequest) -> Result<RestResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .http
            .request(method, self.config.rest_url(&request.path))
            .header(header::ACCEPT, ACCEPT_GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(body) = request.body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|e| IssueHubError::decode(operation, format!("failed to encode request: {e}")))?;
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }
        debug!(operation, method = request.method.as_str(), path = %request.path, "sending raw request");
        self.send(operation, builder).await
    }
}
