use async_trait::async_trait;
use issuehub_kernel::issues::{
    self, IssueEdit, IssueFilter, IssueSearch, NewIssue, add_issue_comment, get_issue_comments,
};
use issuehub_kernel::params::required_str;
use issuehub_kernel::sub_issue::{
    add_sub_issue, list_sub_issues, remove_sub_issue, reprioritize_sub_issue,
};
use issuehub_kernel::{
    ASSIGN_AGENT_PROMPT_DESCRIPTION, ASSIGN_AGENT_PROMPT_NAME, ASSIGN_AGENT_PROMPT_REPO_ARG,
    AddSubIssue, AssignCodingAgent, ClientSource, GraphClient, IssueHubError, IssueNumber,
    ListSubIssues, Pagination, PromptRole, RemoveSubIssue, RepoRef, ReprioritizeSubIssue,
    RestClient, assign_agent_prompt, assign_coding_agent,
};
use rust_mcp_sdk::{
    McpServer, StdioTransport, ToMcpServerHandler, TransportOptions,
    macros::{JsonSchema, mcp_tool},
    mcp_server::{McpServerOptions, ServerHandler, ServerRuntime, server_runtime},
    schema::{
        CallToolRequestParams, CallToolResult, ContentBlock, GetPromptRequestParams,
        GetPromptResult, Implementation, InitializeResult, ListPromptsResult, ListToolsResult,
        PaginatedRequestParams, Prompt, PromptArgument, PromptMessage, ProtocolVersion, Role,
        RpcError, ServerCapabilities, ServerCapabilitiesPrompts, ServerCapabilitiesTools,
        TextContent, schema_utils::CallToolError,
    },
    tool_box,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::GlobalArgs;
use crate::support::{runtime_or_exit, settings_or_exit};

pub struct Args {
    pub read_only: bool,
    pub server_name: String,
    pub server_version: String,
}

/// Tools that never change GitHub state. The only ones served with
/// `--read-only`.
const READ_ONLY_TOOLS: &[&str] = &[
    "get_issue",
    "search_issues",
    "list_issues",
    "get_issue_comments",
    "list_sub_issues",
];

#[derive(Clone)]
struct IssueHubMcpHandler {
    source: Arc<dyn ClientSource>,
    read_only: bool,
}

pub fn run(global: &GlobalArgs, args: Args) {
    let settings = settings_or_exit(global);

    eprintln!("issuehub mcp-serve");
    eprintln!("  transport: stdio");
    eprintln!("  server: {} {}", args.server_name, args.server_version);
    eprintln!("  rest api: {}", settings.transport.api_base);
    eprintln!("  graphql: {}", settings.transport.graphql_url);
    eprintln!("  read-only: {}", args.read_only);

    let source = issuehub_transport::GithubClientSource::new(settings.transport, settings.token);
    runtime_or_exit().block_on(async move {
        if let Err(e) = run_async(Arc::new(source), args).await {
            eprintln!("error: mcp server failed: {e}");
            process::exit(1);
        }
    });
}

async fn run_async(source: Arc<dyn ClientSource>, args: Args) -> Result<(), String> {
    let server_details = InitializeResult {
        server_info: Implementation {
            name: args.server_name,
            version: args.server_version,
            title: Some("Issuehub MCP Server".into()),
            description: Some(
                "GitHub issues, ordered sub-issues and coding-agent assignment".into(),
            ),
            icons: vec![],
            website_url: Some("https://github.com/issuehub/issuehub".into()),
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            prompts: Some(ServerCapabilitiesPrompts { list_changed: None }),
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2025_11_25.into(),
        instructions: Some(
            "Issue numbers (issueNumber) and issue IDs (subIssueId, afterId, beforeId) are different keys: sub-issue tools take the parent's number and the child's ID. reprioritize_sub_issue needs exactly one of afterId or beforeId. assign_copilot_to_issue keeps existing assignees; when the agent is not offered in the repository it answers with a fixed message instead of an error."
                .into(),
        ),
        meta: None,
    };

    let transport = StdioTransport::new(TransportOptions::default()).map_err(|e| e.to_string())?;
    let handler = IssueHubMcpHandler {
        source,
        read_only: args.read_only,
    };
    info!(read_only = handler.read_only, "serving MCP tools over stdio");

    let server: Arc<ServerRuntime> = server_runtime::create_server(McpServerOptions {
        server_details,
        transport,
        handler: handler.to_mcp_server_handler(),
        task_store: None,
        client_task_store: None,
    });

    server.start().await.map_err(|e| {
        e.rpc_error_message()
            .cloned()
            .unwrap_or_else(|| e.to_string())
    })
}

fn is_read_only_tool(name: &str) -> bool {
    READ_ONLY_TOOLS.contains(&name)
}

fn visible_tools(read_only: bool) -> Vec<rust_mcp_sdk::schema::Tool> {
    IssueHubTools::tools()
        .into_iter()
        .filter(|tool| !read_only || is_read_only_tool(&tool.name))
        .collect()
}

fn prompts() -> Vec<Prompt> {
    vec![Prompt {
        arguments: vec![PromptArgument {
            description: Some("The repository to assign tasks in (owner/repo).".into()),
            name: ASSIGN_AGENT_PROMPT_REPO_ARG.into(),
            required: Some(true),
            title: None,
        }],
        description: Some(ASSIGN_AGENT_PROMPT_DESCRIPTION.into()),
        icons: vec![],
        meta: None,
        name: ASSIGN_AGENT_PROMPT_NAME.into(),
        title: Some("Assign Coding Agent".into()),
    }]
}

/// MCP messages carry only user and assistant roles; the system turn is
/// sent as the opening user message.
fn render_prompt(name: &str, repo: Option<&str>) -> Result<GetPromptResult, String> {
    if name != ASSIGN_AGENT_PROMPT_NAME {
        return Err(format!("unknown prompt: {name}"));
    }
    let repo = repo
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| format!("missing required argument: {ASSIGN_AGENT_PROMPT_REPO_ARG}"))?;

    let messages = assign_agent_prompt(repo)
        .into_iter()
        .map(|turn| PromptMessage {
            content: ContentBlock::from(TextContent::from(turn.text)),
            role: match turn.role {
                PromptRole::System | PromptRole::User => Role::User,
                PromptRole::Assistant => Role::Assistant,
            },
        })
        .collect();

    Ok(GetPromptResult {
        description: Some(ASSIGN_AGENT_PROMPT_DESCRIPTION.into()),
        messages,
        meta: None,
    })
}

#[async_trait]
impl ServerHandler for IssueHubMcpHandler {
    async fn handle_list_prompts_request(
        &self,
        _params: Option<PaginatedRequestParams>,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<ListPromptsResult, RpcError> {
        Ok(ListPromptsResult {
            meta: None,
            next_cursor: None,
            prompts: prompts(),
        })
    }

    async fn handle_get_prompt_request(
        &self,
        params: GetPromptRequestParams,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<GetPromptResult, RpcError> {
        let repo = params
            .arguments
            .as_ref()
            .and_then(|args| args.get(ASSIGN_AGENT_PROMPT_REPO_ARG))
            .map(String::as_str);
        render_prompt(&params.name, repo)
            .map_err(|message| RpcError::invalid_params().with_message(message))
    }

    async fn handle_list_tools_request(
        &self,
        _params: Option<PaginatedRequestParams>,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: visible_tools(self.read_only),
        })
    }

    async fn handle_call_tool_request(
        &self,
        params: CallToolRequestParams,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        if self.read_only && !is_read_only_tool(&params.name) {
            return Err(call_tool_error(format!(
                "tool `{}` is not available in read-only mode",
                params.name
            )));
        }
        let tool_params: IssueHubTools =
            IssueHubTools::try_from(params).map_err(CallToolError::new)?;
        let source = self.source.as_ref();

        match tool_params {
            IssueHubTools::GetIssueTool(tool) => call_get_issue(source, tool).await,
            IssueHubTools::AddIssueCommentTool(tool) => call_add_issue_comment(source, tool).await,
            IssueHubTools::SearchIssuesTool(tool) => call_search_issues(source, tool).await,
            IssueHubTools::CreateIssueTool(tool) => call_create_issue(source, tool).await,
            IssueHubTools::ListIssuesTool(tool) => call_list_issues(source, tool).await,
            IssueHubTools::UpdateIssueTool(tool) => call_update_issue(source, tool).await,
            IssueHubTools::GetIssueCommentsTool(tool) => {
                call_get_issue_comments(source, tool).await
            }
            IssueHubTools::AddSubIssueTool(tool) => call_add_sub_issue(source, tool).await,
            IssueHubTools::ListSubIssuesTool(tool) => call_list_sub_issues(source, tool).await,
            IssueHubTools::RemoveSubIssueTool(tool) => call_remove_sub_issue(source, tool).await,
            IssueHubTools::ReprioritizeSubIssueTool(tool) => {
                call_reprioritize_sub_issue(source, tool).await
            }
            IssueHubTools::AssignCopilotToIssueTool(tool) => {
                call_assign_copilot_to_issue(source, tool).await
            }
        }
    }
}

#[mcp_tool(
    name = "get_issue",
    description = "Get details of a specific issue in a GitHub repository.",
    read_only_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct GetIssueTool {
    /// The owner of the repository
    owner: String,
    /// The name of the repository
    repo: String,
    /// The number of the issue
    issue_number: i64,
}

#[mcp_tool(
    name = "add_issue_comment",
    description = "Add a comment to a specific issue in a GitHub repository.",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct AddIssueCommentTool {
    owner: String,
    repo: String,
    /// Issue number to comment on
    issue_number: i64,
    /// Comment content
    body: String,
}

#[mcp_tool(
    name = "search_issues",
    description = "Search for issues in GitHub repositories using issues search syntax already scoped to is:issue",
    read_only_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SearchIssuesTool {
    /// Search query using GitHub issues search syntax
    query: String,
    /// Optional repository owner; with repo, limits the search to that repository
    #[serde(default)]
    owner: Option<String>,
    /// Optional repository name; with owner, limits the search to that repository
    #[serde(default)]
    repo: Option<String>,
    /// comments, reactions, reactions-+1, reactions--1, reactions-smile, reactions-thinking_face, reactions-heart, reactions-tada, interactions, created or updated; defaults to best match
    #[serde(default)]
    sort: Option<String>,
    /// asc or desc
    #[serde(default)]
    order: Option<String>,
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    per_page: Option<i64>,
}

#[mcp_tool(
    name = "create_issue",
    description = "Create a new issue in a GitHub repository.",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CreateIssueTool {
    owner: String,
    repo: String,
    /// Issue title
    title: String,
    #[serde(default)]
    body: Option<String>,
    /// Usernames to assign to this issue
    #[serde(default)]
    assignees: Option<Vec<String>>,
    /// Labels to apply to this issue
    #[serde(default)]
    labels: Option<Vec<String>>,
    /// Milestone number
    #[serde(default)]
    milestone: Option<i64>,
}

#[mcp_tool(
    name = "list_issues",
    description = "List issues in a GitHub repository.",
    read_only_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ListIssuesTool {
    owner: String,
    repo: String,
    /// open, closed or all
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    /// created, updated or comments
    #[serde(default)]
    sort: Option<String>,
    /// asc or desc
    #[serde(default)]
    direction: Option<String>,
    /// Only issues updated at or after this time (YYYY-MM-DDThh:mm:ssZ or YYYY-MM-DD)
    #[serde(default)]
    since: Option<String>,
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    per_page: Option<i64>,
}

#[mcp_tool(
    name = "update_issue",
    description = "Update an existing issue in a GitHub repository.",
    read_only_hint = false,
    idempotent_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueTool {
    owner: String,
    repo: String,
    /// Issue number to update
    issue_number: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    /// open or closed
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    assignees: Option<Vec<String>>,
    #[serde(default)]
    milestone: Option<i64>,
}

#[mcp_tool(
    name = "get_issue_comments",
    description = "Get comments for a specific issue in a GitHub repository.",
    read_only_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct GetIssueCommentsTool {
    owner: String,
    repo: String,
    issue_number: i64,
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    per_page: Option<i64>,
}

#[mcp_tool(
    name = "add_sub_issue",
    description = "Add a sub-issue to a parent issue in a GitHub repository.",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct AddSubIssueTool {
    owner: String,
    repo: String,
    /// The number of the parent issue
    issue_number: i64,
    /// The ID of the sub-issue to add. ID is not the same as issue number
    sub_issue_id: i64,
    /// When true, replaces the sub-issue's current parent issue
    #[serde(default)]
    replace_parent: Option<bool>,
}

#[mcp_tool(
    name = "list_sub_issues",
    description = "List sub-issues for a specific issue in a GitHub repository.",
    read_only_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ListSubIssuesTool {
    owner: String,
    repo: String,
    issue_number: i64,
    /// Page number for pagination (default: 1)
    #[serde(default)]
    page: Option<i64>,
    /// Number of results per page (max 100, default: 30)
    #[serde(default)]
    per_page: Option<i64>,
}

#[mcp_tool(
    name = "remove_sub_issue",
    description = "Remove a sub-issue from a parent issue in a GitHub repository.",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct RemoveSubIssueTool {
    owner: String,
    repo: String,
    /// The number of the parent issue
    issue_number: i64,
    /// The ID of the sub-issue to remove. ID is not the same as issue number
    sub_issue_id: i64,
}

#[mcp_tool(
    name = "reprioritize_sub_issue",
    description = "Reprioritize a sub-issue to a different position in the parent issue's sub-issue list.",
    read_only_hint = false,
    idempotent_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ReprioritizeSubIssueTool {
    owner: String,
    repo: String,
    /// The number of the parent issue
    issue_number: i64,
    /// The ID of the sub-issue to reprioritize. ID is not the same as issue number
    sub_issue_id: i64,
    /// The ID of the sub-issue to be prioritized after (either afterId OR beforeId)
    #[serde(default)]
    after_id: Option<i64>,
    /// The ID of the sub-issue to be prioritized before (either afterId OR beforeId)
    #[serde(default)]
    before_id: Option<i64>,
}

#[mcp_tool(
    name = "assign_copilot_to_issue",
    description = "Assign the Copilot coding agent to a GitHub issue. Existing assignees are kept.",
    read_only_hint = false,
    idempotent_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct AssignCopilotToIssueTool {
    owner: String,
    repo: String,
    issue_number: i64,
}

tool_box!(
    IssueHubTools,
    [
        GetIssueTool,
        AddIssueCommentTool,
        SearchIssuesTool,
        CreateIssueTool,
        ListIssuesTool,
        UpdateIssueTool,
        GetIssueCommentsTool,
        AddSubIssueTool,
        ListSubIssuesTool,
        RemoveSubIssueTool,
        ReprioritizeSubIssueTool,
        AssignCopilotToIssueTool
    ]
);

type ToolResult = std::result::Result<CallToolResult, CallToolError>;

async fn rest(source: &dyn ClientSource) -> Result<Arc<dyn RestClient>, CallToolError> {
    source.rest().await.map_err(tool_error)
}

async fn graph(source: &dyn ClientSource) -> Result<Arc<dyn GraphClient>, CallToolError> {
    source.graph().await.map_err(tool_error)
}

fn target(owner: &str, repo: &str, issue_number: i64) -> Result<(RepoRef, IssueNumber), CallToolError> {
    let repo = RepoRef::new(owner, repo).map_err(|e| tool_error(e.into()))?;
    let number = IssueNumber::new("issueNumber", issue_number).map_err(|e| tool_error(e.into()))?;
    Ok((repo, number))
}

async fn call_get_issue(source: &dyn ClientSource, tool: GetIssueTool) -> ToolResult {
    let (repo, number) = target(&tool.owner, &tool.repo, tool.issue_number)?;
    let client = rest(source).await?;
    let issue = issues::get_issue(client.as_ref(), &repo, number)
        .await
        .map_err(tool_error)?;
    json_result(issue)
}

async fn call_add_issue_comment(source: &dyn ClientSource, tool: AddIssueCommentTool) -> ToolResult {
    let (repo, number) = target(&tool.owner, &tool.repo, tool.issue_number)?;
    required_str("body", &tool.body).map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let comment = add_issue_comment(client.as_ref(), &repo, number, &tool.body)
        .await
        .map_err(tool_error)?;
    json_result(comment)
}

async fn call_search_issues(source: &dyn ClientSource, tool: SearchIssuesTool) -> ToolResult {
    let search = IssueSearch {
        query: tool.query,
        owner: tool.owner,
        repo: tool.repo,
        sort: tool.sort,
        order: tool.order,
        page: tool.page,
        per_page: tool.per_page,
    };
    search
        .query_pairs()
        .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let found = issues::search_issues(client.as_ref(), &search)
        .await
        .map_err(tool_error)?;
    json_result(found)
}

async fn call_create_issue(source: &dyn ClientSource, tool: CreateIssueTool) -> ToolResult {
    let repo = RepoRef::new(&tool.owner, &tool.repo).map_err(|e| tool_error(e.into()))?;
    let issue = NewIssue {
        title: tool.title,
        body: tool.body,
        assignees: tool.assignees,
        labels: tool.labels,
        milestone: tool.milestone,
    };
    issue
        .clone()
        .into_request()
        .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let created = issues::create_issue(client.as_ref(), &repo, issue)
        .await
        .map_err(tool_error)?;
    json_result(created)
}

async fn call_list_issues(source: &dyn ClientSource, tool: ListIssuesTool) -> ToolResult {
    let repo = RepoRef::new(&tool.owner, &tool.repo).map_err(|e| tool_error(e.into()))?;
    let filter = IssueFilter {
        state: tool.state,
        labels: tool.labels,
        sort: tool.sort,
        direction: tool.direction,
        since: tool.since,
        page: tool.page,
        per_page: tool.per_page,
    };
    filter.query_pairs().map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let listed = issues::list_issues(client.as_ref(), &repo, &filter)
        .await
        .map_err(tool_error)?;
    json_result(listed)
}

async fn call_update_issue(source: &dyn ClientSource, tool: UpdateIssueTool) -> ToolResult {
    let (repo, number) = target(&tool.owner, &tool.repo, tool.issue_number)?;
    let edit = IssueEdit {
        title: tool.title,
        body: tool.body,
        state: tool.state,
        labels: tool.labels,
        assignees: tool.assignees,
        milestone: tool.milestone,
    };
    edit.clone()
        .into_request()
        .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let updated = issues::update_issue(client.as_ref(), &repo, number, edit)
        .await
        .map_err(tool_error)?;
    json_result(updated)
}

async fn call_get_issue_comments(source: &dyn ClientSource, tool: GetIssueCommentsTool) -> ToolResult {
    let (repo, number) = target(&tool.owner, &tool.repo, tool.issue_number)?;
    let pagination =
        Pagination::from_fields(tool.page, tool.per_page).map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let comments = get_issue_comments(client.as_ref(), &repo, number, pagination)
        .await
        .map_err(tool_error)?;
    json_result(comments)
}

async fn call_add_sub_issue(source: &dyn ClientSource, tool: AddSubIssueTool) -> ToolResult {
    let request = AddSubIssue::new(
        &tool.owner,
        &tool.repo,
        tool.issue_number,
        tool.sub_issue_id,
        tool.replace_parent,
    )
    .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let created = add_sub_issue(client.as_ref(), &request)
        .await
        .map_err(tool_error)?;
    json_result(created)
}

async fn call_list_sub_issues(source: &dyn ClientSource, tool: ListSubIssuesTool) -> ToolResult {
    let request = ListSubIssues::new(
        &tool.owner,
        &tool.repo,
        tool.issue_number,
        tool.page,
        tool.per_page,
    )
    .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let listed = list_sub_issues(client.as_ref(), &request)
        .await
        .map_err(tool_error)?;
    json_result(listed)
}

async fn call_remove_sub_issue(source: &dyn ClientSource, tool: RemoveSubIssueTool) -> ToolResult {
    let request = RemoveSubIssue::new(&tool.owner, &tool.repo, tool.issue_number, tool.sub_issue_id)
        .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let removed = remove_sub_issue(client.as_ref(), &request)
        .await
        .map_err(tool_error)?;
    json_result(removed)
}

async fn call_reprioritize_sub_issue(
    source: &dyn ClientSource,
    tool: ReprioritizeSubIssueTool,
) -> ToolResult {
    let request = ReprioritizeSubIssue::new(
        &tool.owner,
        &tool.repo,
        tool.issue_number,
        tool.sub_issue_id,
        tool.after_id,
        tool.before_id,
    )
    .map_err(|e| tool_error(e.into()))?;
    let client = rest(source).await?;
    let moved = reprioritize_sub_issue(client.as_ref(), &request)
        .await
        .map_err(tool_error)?;
    json_result(moved)
}

/// Both outcomes are plain text results; callers match on the message.
async fn call_assign_copilot_to_issue(
    source: &dyn ClientSource,
    tool: AssignCopilotToIssueTool,
) -> ToolResult {
    let request = AssignCodingAgent::new(&tool.owner, &tool.repo, tool.issue_number)
        .map_err(|e| tool_error(e.into()))?;
    let client = graph(source).await?;
    let outcome = assign_coding_agent(client.as_ref(), &request)
        .await
        .map_err(tool_error)?;
    Ok(text_result(outcome.message()))
}

fn json_result(value: Value) -> ToolResult {
    let text = serde_json::to_string_pretty(&value).map_err(CallToolError::new)?;
    Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
}

fn text_result(text: &str) -> CallToolResult {
    CallToolResult::text_content(vec![TextContent::from(text.to_string())])
}

fn tool_error(err: IssueHubError) -> CallToolError {
    if !err.is_validation() {
        warn!(error = %err, "tool call failed");
    }
    call_tool_error(err.to_string())
}

fn call_tool_error(message: impl Into<String>) -> CallToolError {
    CallToolError::from_message(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use issuehub_kernel::AGENT_UNAVAILABLE_MESSAGE;
    use issuehub_transport::{GithubClientSource, TokenSource, TransportConfig};
    use serde_json::json;

    fn source(server: &MockServer) -> GithubClientSource {
        let config = TransportConfig {
            api_base: server.base_url(),
            graphql_url: server.url("/graphql"),
            ..TransportConfig::default()
        };
        GithubClientSource::new(config, TokenSource::Static("ghp_test".into()))
    }

    fn unreachable_source() -> GithubClientSource {
        let config = TransportConfig {
            api_base: "http://127.0.0.1:1".into(),
            graphql_url: "http://127.0.0.1:1/graphql".into(),
            timeout_ms: 1_000,
            ..TransportConfig::default()
        };
        GithubClientSource::new(config, TokenSource::Static("ghp_test".into()))
    }

    fn tool_text(result: CallToolResult) -> String {
        result
            .content
            .first()
            .expect("result should contain content")
            .as_text_content()
            .expect("content should be text")
            .text
            .clone()
    }

    fn parse_tool_json(result: CallToolResult) -> Value {
        serde_json::from_str(&tool_text(result)).expect("tool response should be valid json")
    }

    fn error_text(err: CallToolError) -> String {
        err.to_string()
    }

    #[test]
    fn read_only_mode_lists_only_read_tools() {
        let all = visible_tools(false);
        assert_eq!(all.len(), 12);

        let read_only: Vec<String> = visible_tools(true).into_iter().map(|t| t.name).collect();
        assert_eq!(read_only.len(), READ_ONLY_TOOLS.len());
        assert!(read_only.iter().all(|name| is_read_only_tool(name)));
        assert!(!read_only.iter().any(|name| name == "remove_sub_issue"));
    }

    fn message_text(message: &PromptMessage) -> String {
        match &message.content {
            ContentBlock::TextContent(text) => text.text.clone(),
            other => panic!("expected text content, got {other:?}"),
        }
    }

    #[test]
    fn assign_agent_prompt_is_listed_with_required_repo() {
        let listed = prompts();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "AssignCodingAgent");
        assert_eq!(listed[0].arguments[0].name, "repo");
        assert_eq!(listed[0].arguments[0].required, Some(true));
    }

    #[test]
    fn assign_agent_prompt_renders_the_conversation() {
        let rendered = render_prompt("AssignCodingAgent", Some("octo/hello")).expect("render");
        assert_eq!(rendered.messages.len(), 6);
        assert_eq!(rendered.messages[0].role, Role::User);
        assert!(message_text(&rendered.messages[0]).contains("`assign_copilot_to_issue`"));
        assert!(message_text(&rendered.messages[1]).contains("from the octo/hello GitHub repository"));
        assert_eq!(rendered.messages[2].role, Role::Assistant);

        let missing = render_prompt("AssignCodingAgent", None).expect_err("no repo");
        assert_eq!(missing, "missing required argument: repo");
        assert!(render_prompt("Other", Some("octo/hello")).is_err());
    }

    #[tokio::test]
    async fn list_sub_issues_returns_upstream_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/hello/issues/1/sub_issues")
                .query_param("page", "1")
                .query_param("per_page", "30");
            then.status(200)
                .body(r#"[{"id":11,"number":2,"title":"first"},{"id":12,"number":3,"title":"second"}]"#);
        });

        let result = call_list_sub_issues(
            &source(&server),
            ListSubIssuesTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 1,
                page: None,
                per_page: None,
            },
        )
        .await
        .expect("list");
        let listed = parse_tool_json(result);
        assert_eq!(listed[1]["title"], "second");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn remove_sub_issue_surfaces_upstream_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/repos/octo/hello/issues/1/sub_issue")
                .json_body(json!({"sub_issue_id": 77}));
            then.status(422).body(r#"{"message":"boom"}"#);
        });

        let err = call_remove_sub_issue(
            &source(&server),
            RemoveSubIssueTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 1,
                sub_issue_id: 77,
            },
        )
        .await
        .expect_err("422");
        assert!(error_text(err).contains(r#"{"message":"boom"}"#));
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn reprioritize_with_both_anchors_is_rejected_before_connecting() {
        let err = call_reprioritize_sub_issue(
            &unreachable_source(),
            ReprioritizeSubIssueTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 1,
                sub_issue_id: 5,
                after_id: Some(3),
                before_id: Some(4),
            },
        )
        .await
        .expect_err("both anchors");
        assert!(
            error_text(err).contains("only one of after_id or before_id should be specified, not both")
        );
    }

    #[tokio::test]
    async fn add_sub_issue_posts_and_returns_created_issue() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/octo/hello/issues/4/sub_issues")
                .json_body(json!({"sub_issue_id": 99, "replace_parent": true}));
            then.status(201).body(r#"{"id":99,"number":12,"title":"child"}"#);
        });

        let result = call_add_sub_issue(
            &source(&server),
            AddSubIssueTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 4,
                sub_issue_id: 99,
                replace_parent: Some(true),
            },
        )
        .await
        .expect("add");
        assert_eq!(parse_tool_json(result)["number"], 12);
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn assign_reports_unavailable_agent_as_text() {
        let server = MockServer::start();
        let actors = server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("suggestedActors");
            then.status(200).json_body(json!({"data": {"repository": {"suggestedActors": {
                "nodes": [{"id": "BOT_1", "login": "dependabot", "__typename": "Bot"}],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}}));
        });

        let result = call_assign_copilot_to_issue(
            &source(&server),
            AssignCopilotToIssueTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 9,
            },
        )
        .await
        .expect("not an error");
        assert_eq!(tool_text(result), AGENT_UNAVAILABLE_MESSAGE);
        actors.assert_calls(1);
    }

    #[tokio::test]
    async fn assign_replaces_assignees_with_the_union() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("suggestedActors");
            then.status(200).json_body(json!({"data": {"repository": {"suggestedActors": {
                "nodes": [{"id": "BOT_agent", "login": "copilot-swe-agent", "__typename": "Bot"}],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("IssueAssignees");
            then.status(200).json_body(json!({"data": {"repository": {"issue": {
                "id": "I_9",
                "assignees": {"nodes": [{"id": "U_a"}]}
            }}}}));
        });
        let mutation = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes("replaceActorsForAssignable")
                .body_includes(r#""actorIds":["U_a","BOT_agent"]"#);
            then.status(200).json_body(json!({"data": {"replaceActorsForAssignable": {
                "__typename": "ReplaceActorsForAssignablePayload"
            }}}));
        });

        let result = call_assign_copilot_to_issue(
            &source(&server),
            AssignCopilotToIssueTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 9,
            },
        )
        .await
        .expect("assign");
        assert_eq!(tool_text(result), "successfully assigned copilot to issue");
        mutation.assert_calls(1);
    }

    #[tokio::test]
    async fn search_scopes_query_to_repository() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search/issues")
                .query_param("q", "repo:octo/hello is:issue crash");
            then.status(200).body(r#"{"total_count":0,"items":[]}"#);
        });

        let result = call_search_issues(
            &source(&server),
            SearchIssuesTool {
                query: "crash".into(),
                owner: Some("octo".into()),
                repo: Some("hello".into()),
                sort: None,
                order: None,
                page: None,
                per_page: None,
            },
        )
        .await
        .expect("search");
        assert_eq!(parse_tool_json(result)["total_count"], 0);
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn missing_token_is_a_client_error() {
        let server = MockServer::start();
        let config = TransportConfig {
            api_base: server.base_url(),
            ..TransportConfig::default()
        };
        let source = GithubClientSource::new(
            config,
            TokenSource::Env("ISSUEHUB_TEST_MCP_TOKEN_NEVER_SET".into()),
        );
        let err = call_get_issue(
            &source,
            GetIssueTool {
                owner: "octo".into(),
                repo: "hello".into(),
                issue_number: 1,
            },
        )
        .await
        .expect_err("no token");
        assert!(error_text(err).starts_with("failed to get GitHub client"));
    }
}
