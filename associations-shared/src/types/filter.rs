use crate::types::{ContentId, ContentKind, LinkLevel, ProfileId, VoteKind};
use serde::{Deserialize, Serialize};

/// Optional window over a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// Filter for listing profile links. Unset fields match everything.
///
/// Results are ordered by creation time, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLinkFilter {
    pub content_kind: Option<ContentKind>,
    pub content_id: Option<ContentId>,
    pub level: Option<LinkLevel>,
    pub profile_id: Option<ProfileId>,
    pub is_validated: Option<bool>,
    #[serde(default)]
    pub page: Page,
}

/// Filter for listing votes. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteFilter {
    pub content_kind: Option<ContentKind>,
    pub content_id: Option<ContentId>,
    pub vote_kind: Option<VoteKind>,
    #[serde(default)]
    pub page: Page,
}
