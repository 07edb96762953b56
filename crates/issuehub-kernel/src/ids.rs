//! Identifier types.
//!
//! An issue has three keys upstream and they are never interchangeable:
//!
//! ```text
//! IssueNumber  #17                repo-scoped, human-visible (REST paths)
//! IssueId      2_310_455_101      database id (sub-issue payloads, anchors)
//! NodeId       "I_kwDOAbc123"     opaque graph id (graph mutations)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// `owner/name` of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Result<Self, ValidationError> {
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() {
            return Err(ValidationError::Missing("owner"));
        }
        if name.is_empty() {
            return Err(ValidationError::Missing("repo"));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse `owner/name`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let (owner, name) = raw.trim().split_once('/').ok_or_else(|| {
            ValidationError::invalid("repo", format!("`{raw}` (expected owner/repo)"))
        })?;
        if name.contains('/') {
            return Err(ValidationError::invalid(
                "repo",
                format!("`{raw}` (expected owner/repo)"),
            ));
        }
        Self::new(owner, name)
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository-scoped sequential issue number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    pub fn new(field: &'static str, raw: i64) -> Result<Self, ValidationError> {
        if raw < 1 {
            return Err(ValidationError::invalid(
                field,
                format!("{raw} (issue numbers start at 1)"),
            ));
        }
        Ok(Self(raw as u64))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Database id of an issue. Not the issue number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(i64);

impl IssueId {
    pub fn new(field: &'static str, raw: i64) -> Result<Self, ValidationError> {
        if raw < 1 {
            return Err(ValidationError::invalid(
                field,
                format!("{raw} (issue ids are positive)"),
            ));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque graph node id, for issues and actors alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::Missing("node id"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_ref_rejects_blank_parts() {
        assert_eq!(
            RepoRef::new("  ", "repo"),
            Err(ValidationError::Missing("owner"))
        );
        assert_eq!(RepoRef::new("octo", ""), Err(ValidationError::Missing("repo")));
    }

    #[test]
    fn repo_ref_parses_slug() {
        let repo = RepoRef::parse(" octo/hello ").expect("slug should parse");
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.name, "hello");
        assert_eq!(repo.slug(), "octo/hello");
        assert!(RepoRef::parse("octo").is_err());
        assert!(RepoRef::parse("octo/hello/extra").is_err());
    }

    #[test]
    fn issue_number_must_be_positive() {
        assert!(IssueNumber::new("issueNumber", 0).is_err());
        assert!(IssueNumber::new("issueNumber", -3).is_err());
        assert_eq!(IssueNumber::new("issueNumber", 9).map(IssueNumber::get), Ok(9));
    }

    #[test]
    fn ids_serialize_as_bare_values() {
        let id = IssueId::new("subIssueId", 42).expect("valid id");
        assert_eq!(serde_json::to_value(id).expect("serialize"), serde_json::json!(42));
        let node = NodeId::new("I_abc").expect("valid node id");
        assert_eq!(
            serde_json::to_value(&node).expect("serialize"),
            serde_json::json!("I_abc")
        );
    }
}
