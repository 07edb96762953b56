//! Suggested-actor discovery.
//!
//! The repository's pool of assignable actors is walked one cursor page at
//! a time. [`SuggestedActorPages`] owns the cursor; [`find_actor`] decides
//! when to stop.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{IssueHubError, Result};
use crate::facade::{GraphClient, op};
use crate::ids::{NodeId, RepoRef};

/// Login of the coding agent bot.
pub const CODING_AGENT_LOGIN: &str = "copilot-swe-agent";

/// Upstream page-size cap for the actor pool.
pub const ACTOR_PAGE_SIZE: u32 = 100;

pub const SUGGESTED_ACTORS_QUERY: &str = r#"query SuggestedActors($owner: String!, $name: String!, $endCursor: String) {
  repository(owner: $owner, name: $name) {
    suggestedActors(first: 100, after: $endCursor, capabilities: [CAN_BE_ASSIGNED]) {
      nodes {
        ... on Bot {
          id
          login
          __typename
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedActor {
    pub id: NodeId,
    pub login: String,
    pub typename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorPage {
    pub actors: Vec<SuggestedActor>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl ActorPage {
    /// Decode the `data` member of one query response. Nodes that are not
    /// bots come back as empty objects and are skipped.
    pub fn from_data(data: &Value) -> Result<Self> {
        let pool = data
            .pointer("/repository/suggestedActors")
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                IssueHubError::decode(
                    op::LIST_SUGGESTED_ACTORS,
                    "response has no repository.suggestedActors",
                )
            })?;

        let actors = pool["nodes"]
            .as_array()
            .map(|nodes| nodes.iter().filter_map(decode_actor).collect())
            .unwrap_or_default();

        let info = &pool["pageInfo"];
        Ok(Self {
            actors,
            has_next_page: info["hasNextPage"].as_bool().unwrap_or(false),
            end_cursor: info["endCursor"].as_str().map(str::to_string),
        })
    }
}

fn decode_actor(node: &Value) -> Option<SuggestedActor> {
    let login = node["login"].as_str()?;
    let id = NodeId::new(node["id"].as_str()?).ok()?;
    Some(SuggestedActor {
        id,
        login: login.to_string(),
        typename: node["__typename"].as_str().unwrap_or_default().to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Ready,
    Exhausted,
    Failed,
}

/// Lazy page sequence over a repository's assignable actors.
///
/// Ends after the page reporting no next page. Fused after an error: a
/// failed fetch yields `Some(Err(_))` once, then `None`. [`restart`] goes
/// back to the first page.
///
/// [`restart`]: SuggestedActorPages::restart
pub struct SuggestedActorPages<'a> {
    graph: &'a dyn GraphClient,
    repo: RepoRef,
    end_cursor: Option<String>,
    state: Cursor,
    pages_fetched: usize,
}

impl<'a> SuggestedActorPages<'a> {
    pub fn new(graph: &'a dyn GraphClient, repo: RepoRef) -> Self {
        Self {
            graph,
            repo,
            end_cursor: None,
            state: Cursor::Ready,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn restart(&mut self) {
        self.end_cursor = None;
        self.state = Cursor::Ready;
        self.pages_fetched = 0;
    }

    pub async fn next_page(&mut self) -> Option<Result<ActorPage>> {
        if self.state != Cursor::Ready {
            return None;
        }
        let variables = json!({
            "owner": self.repo.owner,
            "name": self.repo.name,
            "endCursor": self.end_cursor,
        });
        let fetched = self
            .graph
            .execute(op::LIST_SUGGESTED_ACTORS, SUGGESTED_ACTORS_QUERY, variables)
            .await
            .and_then(|data| ActorPage::from_data(&data));
        self.pages_fetched += 1;

        let page = match fetched {
            Ok(page) => page,
            Err(err) => {
                self.state = Cursor::Failed;
                return Some(Err(err));
            }
        };
        debug!(
            repo = %self.repo,
            page = self.pages_fetched,
            actors = page.actors.len(),
            has_next_page = page.has_next_page,
            "fetched suggested actors"
        );

        match (page.has_next_page, page.end_cursor.clone()) {
            (true, Some(cursor)) => self.end_cursor = Some(cursor),
            (true, None) => {
                warn!(repo = %self.repo, "next page advertised without a cursor");
                self.state = Cursor::Exhausted;
            }
            (false, _) => self.state = Cursor::Exhausted,
        }
        Some(Ok(page))
    }
}

/// First actor whose login equals `login` exactly. Stops fetching at the
/// page holding the match; `None` only once the sequence is exhausted.
pub async fn find_actor(
    pages: &mut SuggestedActorPages<'_>,
    login: &str,
) -> Result<Option<SuggestedActor>> {
    while let Some(page) = pages.next_page().await {
        if let Some(actor) = page?.actors.into_iter().find(|a| a.login == login) {
            return Ok(Some(actor));
        }
    }
    Ok(None)
}
