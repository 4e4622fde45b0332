use crate::types::ContentRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Opaque identifier of a profile owned by the accounts subsystem.
pub type ProfileId = i64;

/// Role of a profile with respect to a content entity.
///
/// Levels are plain integers so that subsystems can define their own roles;
/// the constants below are the ones shared by every subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkLevel(pub i32);

impl LinkLevel {
    /// Author or owner of the entity.
    pub const OWNER: LinkLevel = LinkLevel(30);
    /// Contributor to the entity.
    pub const CONTRIBUTOR: LinkLevel = LinkLevel(31);

    /// Highest level accepted by the store.
    pub const MAX: LinkLevel = LinkLevel(999);

    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for LinkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored link between a profile and a content entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLink {
    pub id: i64,
    pub profile_id: ProfileId,
    pub content_ref: ContentRef,
    pub level: LinkLevel,
    pub detail: String,
    pub is_validated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
}

/// Request to link a profile to a content entity.
///
/// Every field takes part in the uniqueness key of the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfileLink {
    pub profile_id: ProfileId,
    pub content_ref: ContentRef,
    pub level: LinkLevel,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub is_validated: bool,
}

/// Mutable fields of a profile link. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLinkPatch {
    pub detail: Option<String>,
    pub is_validated: Option<bool>,
}

impl ProfileLinkPatch {
    pub fn is_empty(&self) -> bool {
        self.detail.is_none() && self.is_validated.is_none()
    }
}
