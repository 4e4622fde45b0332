use crate::types::ContentRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Code of a configured vote type (`"like"`, `"useful"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteKind(pub String);

impl VoteKind {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored anonymous vote on a content entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub content_ref: ContentRef,
    pub score: f64,
    pub vote_kind: VoteKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
}

/// Request to record a vote.
///
/// `(content_ref, vote_kind)` is the uniqueness key; `score` is only used when
/// the vote does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVote {
    pub content_ref: ContentRef,
    pub vote_kind: VoteKind,
    pub score: f64,
}

/// Mutable fields of a vote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VotePatch {
    pub score: Option<f64>,
}

/// A vote type offered to clients, with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteKindChoice {
    pub code: VoteKind,
    pub name: String,
}
