//! Anchor-relative position for sub-issue reordering.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use crate::error::ValidationError;
use crate::ids::IssueId;

/// Where a sub-issue lands relative to a sibling. Exactly one anchor per edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    After(IssueId),
    Before(IssueId),
}

impl Anchor {
    /// Build from the two optional wire fields. Zero counts as absent.
    pub fn from_fields(after: Option<i64>, before: Option<i64>) -> Result<Self, ValidationError> {
        let after = after.filter(|id| *id != 0);
        let before = before.filter(|id| *id != 0);
        match (after, before) {
            (None, None) => Err(ValidationError::Conflict(
                "either after_id or before_id must be specified".to_string(),
            )),
            (Some(_), Some(_)) => Err(ValidationError::Conflict(
                "only one of after_id or before_id should be specified, not both".to_string(),
            )),
            (Some(id), None) => Ok(Self::After(IssueId::new("afterId", id)?)),
            (None, Some(id)) => Ok(Self::Before(IssueId::new("beforeId", id)?)),
        }
    }

    pub fn id(self) -> IssueId {
        match self {
            Self::After(id) | Self::Before(id) => id,
        }
    }

    fn field(self) -> &'static str {
        match self {
            Self::After(_) => "after_id",
            Self::Before(_) => "before_id",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::After(id) => write!(f, "after {id}"),
            Self::Before(id) => write!(f, "before {id}"),
        }
    }
}

/// Serializes as a one-entry map: `{"after_id": n}` or `{"before_id": n}`.
/// Use with `#[serde(flatten)]`.
impl Serialize for Anchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field(), &self.id())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requires_one_anchor() {
        let err = Anchor::from_fields(None, None).expect_err("no anchor should fail");
        assert_eq!(err.to_string(), "either after_id or before_id must be specified");

        let err = Anchor::from_fields(Some(0), Some(0)).expect_err("zero anchors should fail");
        assert_eq!(err.to_string(), "either after_id or before_id must be specified");
    }

    #[test]
    fn rejects_both_anchors() {
        let err = Anchor::from_fields(Some(5), Some(6)).expect_err("both anchors should fail");
        assert_eq!(
            err.to_string(),
            "only one of after_id or before_id should be specified, not both"
        );
    }

    #[test]
    fn zero_is_treated_as_absent() {
        let anchor = Anchor::from_fields(Some(0), Some(8)).expect("before anchor");
        assert!(matches!(anchor, Anchor::Before(id) if id.get() == 8));
        assert_eq!(anchor.to_string(), "before 8");
    }

    #[test]
    fn negative_anchor_is_invalid() {
        let err = Anchor::from_fields(Some(-4), None).expect_err("negative id should fail");
        assert!(err.to_string().contains("afterId"), "got: {err}");
    }

    #[test]
    fn serializes_only_the_supplied_side() {
        let after = Anchor::from_fields(Some(11), None).expect("after anchor");
        assert_eq!(serde_json::to_value(after).expect("serialize"), json!({"after_id": 11}));
        let before = Anchor::from_fields(None, Some(12)).expect("before anchor");
        assert_eq!(serde_json::to_value(before).expect("serialize"), json!({"before_id": 12}));
    }
}
