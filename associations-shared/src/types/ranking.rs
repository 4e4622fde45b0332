use crate::types::{ContentKind, ContentRef, LinkLevel, ProfileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parameters of a best-linked-profiles query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub content_kind: ContentKind,
    pub levels: BTreeSet<LinkLevel>,
    pub limit: Option<usize>,
    /// Profiles never ranked, such as the anonymous profile.
    #[serde(default)]
    pub excluded_profiles: BTreeSet<ProfileId>,
}

/// One row of a best-linked-profiles ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedProfile {
    pub profile_id: ProfileId,
    /// Number of matching links held by the profile. Always positive.
    pub score: i64,
}

/// Aggregated votes for a single content entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub content_ref: ContentRef,
    pub score: f64,
    pub votes: i64,
}
