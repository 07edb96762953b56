//! # Issuehub Kernel
//!
//! Issue operations against a GitHub-shaped upstream, with two protocols
//! that need more than a single call: keeping a parent's ordered sub-issue
//! list consistent, and adding the coding agent to an issue's assignees
//! through a replace-all mutation.
//!
//! The kernel does no I/O of its own. Everything goes through the
//! [`facade`] traits, which `issuehub-transport` implements over HTTPS.
//!
//! ## Architecture
//!
//! ```text
//! params / ids / anchor   ← Validated inputs; checked before any call
//!     │
//! facade                  ← RestClient, GraphClient, ClientSource
//!     │
//! issues                  ← Single-call pass-through operations
//! sub_issue               ← Add / list / remove / reprioritize children
//! actors → assignment     ← Discover agent, read assignees, replace-all
//! ```

pub mod actors;
pub mod anchor;
pub mod assignment;
pub mod error;
pub mod facade;
pub mod ids;
pub mod issues;
pub mod params;
pub mod sub_issue;

#[cfg(test)]
mod fake;

pub use actors::{
    ActorPage, CODING_AGENT_LOGIN, SuggestedActor, SuggestedActorPages, find_actor,
};
pub use anchor::Anchor;
pub use assignment::{
    AGENT_UNAVAILABLE_MESSAGE, ASSIGN_AGENT_PROMPT_DESCRIPTION, ASSIGN_AGENT_PROMPT_NAME,
    ASSIGN_AGENT_PROMPT_REPO_ARG, ASSIGNED_MESSAGE, AssignCodingAgent, AssigneeSet,
    AssignmentOutcome, PromptRole, PromptTurn, assign_agent_prompt, assign_coding_agent,
};
pub use error::{IssueHubError, Result, ValidationError};
pub use facade::{
    ClientSource, GraphClient, IssueRequest, Method, QueryPairs, RawRequest, RestClient,
    RestResponse, SubIssueRequest,
};
pub use ids::{IssueId, IssueNumber, NodeId, RepoRef};
pub use params::Pagination;
pub use sub_issue::{AddSubIssue, ListSubIssues, RemoveSubIssue, ReprioritizeSubIssue};
