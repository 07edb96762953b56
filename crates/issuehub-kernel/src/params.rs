//! Parameter contracts: pagination bounds, value domains, timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::ValidationError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 30;
pub const MAX_PER_PAGE: u32 = 100;

/// Page-bounded listing window. `page >= 1`, `per_page` in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn from_fields(page: Option<i64>, per_page: Option<i64>) -> Result<Self, ValidationError> {
        let page = page.unwrap_or(i64::from(DEFAULT_PAGE));
        let per_page = per_page.unwrap_or(i64::from(DEFAULT_PER_PAGE));
        if page < 1 || page > i64::from(u32::MAX) {
            return Err(ValidationError::invalid(
                "page",
                format!("{page} (must be at least 1)"),
            ));
        }
        if !(1..=i64::from(MAX_PER_PAGE)).contains(&per_page) {
            return Err(ValidationError::invalid(
                "perPage",
                format!("{per_page} (must be between 1 and {MAX_PER_PAGE})"),
            ));
        }
        Ok(Self {
            page: page as u32,
            per_page: per_page as u32,
        })
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Trimmed, non-empty required string.
pub fn required_str(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(trimmed.to_string())
}

/// Collapse blank optional strings to `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

macro_rules! string_domain {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                match value.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ValidationError::invalid(
                        $field,
                        format!(
                            "`{other}` (expected one of: {})",
                            Self::ALL
                                .iter()
                                .map(|v| v.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    )),
                }
            }

            /// Parse an optional value; blank means absent.
            pub fn parse_opt(value: Option<&str>) -> Result<Option<Self>, ValidationError> {
                match value.map(str::trim).filter(|v| !v.is_empty()) {
                    Some(v) => Self::parse(v).map(Some),
                    None => Ok(None),
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }
    };
}

string_domain!(
    /// State filter for issue listing.
    IssueStateFilter, "state", {
        Open => "open",
        Closed => "closed",
        All => "all",
    }
);

string_domain!(
    /// Target state for issue updates.
    IssueState, "state", {
        Open => "open",
        Closed => "closed",
    }
);

string_domain!(
    IssueSort, "sort", {
        Created => "created",
        Updated => "updated",
        Comments => "comments",
    }
);

string_domain!(
    SortDirection, "direction", {
        Asc => "asc",
        Desc => "desc",
    }
);

string_domain!(
    /// Sort keys accepted by issue search. Absent means best match.
    SearchSort, "sort", {
        Comments => "comments",
        Reactions => "reactions",
        ReactionsPlusOne => "reactions-+1",
        ReactionsMinusOne => "reactions--1",
        ReactionsSmile => "reactions-smile",
        ReactionsThinkingFace => "reactions-thinking_face",
        ReactionsHeart => "reactions-heart",
        ReactionsTada => "reactions-tada",
        Interactions => "interactions",
        Created => "created",
        Updated => "updated",
    }
);

/// Parse `YYYY-MM-DDThh:mm:ssZ` (RFC 3339) or `YYYY-MM-DD` (midnight UTC).
pub fn parse_iso_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::invalid("since", "empty timestamp"));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Some(ts) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(ts.and_utc());
    }
    Err(ValidationError::invalid(
        "since",
        format!(
            "invalid ISO 8601 timestamp: {value} (supported formats: YYYY-MM-DDThh:mm:ssZ or YYYY-MM-DD)"
        ),
    ))
}
