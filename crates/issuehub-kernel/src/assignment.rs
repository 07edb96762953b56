//! Coding-agent assignment.
//!
//! ```text
//! discover actor ──► read issue id + assignees ──► replace-all(current ∪ {agent})
//!       │
//!       └─ not offered ──► AgentUnavailable (a result, not an error)
//! ```
//!
//! The upstream service only offers a replace-all mutation, so adding one
//! assignee is a read-modify-write. It is not transactional: an assignee
//! change landing between the read and the mutation is overwritten. The
//! read is issued immediately before the write and nothing runs between
//! them. Re-running the operation is safe; the second pass computes the
//! same target set.

use serde_json::{Value, json};
use tracing::{debug, info};

use crate::actors::{CODING_AGENT_LOGIN, SuggestedActorPages, find_actor};
use crate::error::{IssueHubError, Result, ValidationError};
use crate::facade::{GraphClient, op};
use crate::ids::{IssueNumber, NodeId, RepoRef};

pub const AGENT_UNAVAILABLE_MESSAGE: &str = "copilot isn't available as an assignee for this issue. Please inform the user to visit https://docs.github.com/en/copilot/using-github-copilot/using-copilot-coding-agent-to-work-on-tasks/about-assigning-tasks-to-copilot for more information.";

pub const ASSIGNED_MESSAGE: &str = "successfully assigned copilot to issue";

/// Name of the prompt that walks a client through triaging a repository's
/// issues and assigning the suitable ones to the coding agent.
pub const ASSIGN_AGENT_PROMPT_NAME: &str = "AssignCodingAgent";

pub const ASSIGN_AGENT_PROMPT_DESCRIPTION: &str =
    "Assign GitHub Coding Agent to multiple tasks in a GitHub repository.";

pub const ASSIGN_AGENT_PROMPT_REPO_ARG: &str = "repo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTurn {
    pub role: PromptRole,
    pub text: String,
}

/// The scripted conversation for [`ASSIGN_AGENT_PROMPT_NAME`]. `repo` is
/// interpolated as given (`owner/repo`).
pub fn assign_agent_prompt(repo: &str) -> Vec<PromptTurn> {
    let turn = |role, text: String| PromptTurn { role, text };
    vec![
        turn(
            PromptRole::System,
            "You are a personal assistant for GitHub the Copilot GitHub Coding Agent. Your task is to help the user assign tasks to the Coding Agent based on their open GitHub issues. You can use `assign_copilot_to_issue` tool to assign the Coding Agent to issues that are suitable for autonomous work, and `search_issues` tool to find issues that match the user's criteria. You can also use `list_issues` to get a list of issues in the repository.".to_string(),
        ),
        turn(
            PromptRole::User,
            format!("Please go and get a list of the most recent 10 issues from the {repo} GitHub repository"),
        ),
        turn(
            PromptRole::Assistant,
            format!("Sure! I will get a list of the 10 most recent issues for the repo {repo}."),
        ),
        turn(
            PromptRole::User,
            "For each issue, please check if it is a clearly defined coding task with acceptance criteria and a low to medium complexity to identify issues that are suitable for an AI Coding Agent to work on. Then assign each of the identified issues to Copilot.".to_string(),
        ),
        turn(
            PromptRole::Assistant,
            "Certainly! Let me carefully check which ones are clearly scoped issues that are good to assign to the coding agent, and I will summarize and assign them now.".to_string(),
        ),
        turn(
            PromptRole::User,
            "Great, if you are unsure if an issue is good to assign, ask me first, rather than assigning copilot. If you are certain the issue is clear and suitable you can assign it to Copilot without asking.".to_string(),
        ),
    ]
}

pub const ISSUE_ASSIGNEES_QUERY: &str = r#"query IssueAssignees($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      id
      assignees(first: 100) {
        nodes {
          id
        }
      }
    }
  }
}"#;

pub const REPLACE_ACTORS_MUTATION: &str = r#"mutation ReplaceActorsForAssignable($input: ReplaceActorsForAssignableInput!) {
  replaceActorsForAssignable(input: $input) {
    __typename
  }
}"#;

#[derive(Debug, Clone, PartialEq)]
pub struct AssignCodingAgent {
    pub repo: RepoRef,
    pub issue: IssueNumber,
}

impl AssignCodingAgent {
    pub fn new(owner: &str, repo: &str, issue_number: i64) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            repo: RepoRef::new(owner, repo)?,
            issue: IssueNumber::new("issueNumber", issue_number)?,
        })
    }
}

/// Ordered assignee ids with set semantics on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeSet(Vec<NodeId>);

impl AssigneeSet {
    /// Keeps the snapshot order; repeated ids collapse to their first slot.
    pub fn from_snapshot(ids: impl IntoIterator<Item = NodeId>) -> Self {
        let mut set = Self::default();
        for id in ids {
            set.insert(id);
        }
        set
    }

    /// Appends `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: NodeId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<NodeId> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Assigned { issue: NodeId, assignees: Vec<NodeId> },
    /// The agent is not in the repository's assignable pool.
    AgentUnavailable,
}

impl AssignmentOutcome {
    /// Fixed text for callers that can only match on strings.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Assigned { .. } => ASSIGNED_MESSAGE,
            Self::AgentUnavailable => AGENT_UNAVAILABLE_MESSAGE,
        }
    }
}

/// Snapshot read right before the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSnapshot {
    pub id: NodeId,
    pub assignees: Vec<NodeId>,
}

impl IssueSnapshot {
    fn from_data(data: &Value, request: &AssignCodingAgent) -> Result<Self> {
        let issue = data
            .pointer("/repository/issue")
            .filter(|v| !v.is_null())
            .ok_or_else(|| IssueHubError::Graph {
                operation: op::GET_ISSUE_ID.to_string(),
                messages: vec![format!(
                    "issue {} not found in {}",
                    request.issue, request.repo
                )],
            })?;

        let id = issue["id"]
            .as_str()
            .and_then(|raw| NodeId::new(raw).ok())
            .ok_or_else(|| IssueHubError::decode(op::GET_ISSUE_ID, "issue has no node id"))?;

        let assignees = issue
            .pointer("/assignees/nodes")
            .and_then(Value::as_array)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(|n| n["id"].as_str())
                    .filter_map(|raw| NodeId::new(raw).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { id, assignees })
    }
}

pub async fn assign_coding_agent(
    graph: &dyn GraphClient,
    request: &AssignCodingAgent,
) -> Result<AssignmentOutcome> {
    let mut pages = SuggestedActorPages::new(graph, request.repo.clone());
    let Some(agent) = find_actor(&mut pages, CODING_AGENT_LOGIN).await? else {
        info!(
            repo = %request.repo,
            pages = pages.pages_fetched(),
            "coding agent not offered as an assignee"
        );
        return Ok(AssignmentOutcome::AgentUnavailable);
    };
    debug!(repo = %request.repo, agent = %agent.id, pages = pages.pages_fetched(), "found coding agent");

    let variables = json!({
        "owner": request.repo.owner,
        "name": request.repo.name,
        "number": request.issue.get(),
    });
    let data = graph
        .execute(op::GET_ISSUE_ID, ISSUE_ASSIGNEES_QUERY, variables)
        .await?;
    let snapshot = IssueSnapshot::from_data(&data, request)?;

    let mut assignees = AssigneeSet::from_snapshot(snapshot.assignees);
    if !assignees.insert(agent.id.clone()) {
        debug!(issue = %request.issue, "coding agent already assigned");
    }

    let input = json!({
        "input": {
            "assignableId": snapshot.id,
            "actorIds": assignees.ids(),
        }
    });
    graph
        .execute(op::REPLACE_ASSIGNEES, REPLACE_ACTORS_MUTATION, input)
        .await?;

    info!(
        repo = %request.repo,
        issue = %request.issue,
        assignees = assignees.len(),
        "assigned coding agent"
    );
    Ok(AssignmentOutcome::Assigned {
        issue: snapshot.id,
        assignees: assignees.into_vec(),
    })
}
