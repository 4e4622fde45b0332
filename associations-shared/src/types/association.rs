use crate::types::{ContentRef, ProfileLink, Vote};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row identifier of an association, unique within its `AssociationKind`.
pub type AssociationId = i64;

/// The concrete variants of association records, one table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    ProfileLink,
    Vote,
}

impl AssociationKind {
    pub const ALL: [AssociationKind; 2] = [AssociationKind::ProfileLink, AssociationKind::Vote];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationKind::ProfileLink => "profile_link",
            AssociationKind::Vote => "vote",
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any auxiliary record attached to a content entity through a `ContentRef`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssociationRecord {
    ProfileLink(ProfileLink),
    Vote(Vote),
}

impl AssociationRecord {
    pub fn kind(&self) -> AssociationKind {
        match self {
            AssociationRecord::ProfileLink(_) => AssociationKind::ProfileLink,
            AssociationRecord::Vote(_) => AssociationKind::Vote,
        }
    }

    pub fn id(&self) -> AssociationId {
        match self {
            AssociationRecord::ProfileLink(link) => link.id,
            AssociationRecord::Vote(vote) => vote.id,
        }
    }

    pub fn content_ref(&self) -> &ContentRef {
        match self {
            AssociationRecord::ProfileLink(link) => &link.content_ref,
            AssociationRecord::Vote(vote) => &vote.content_ref,
        }
    }
}

impl From<ProfileLink> for AssociationRecord {
    fn from(link: ProfileLink) -> Self {
        AssociationRecord::ProfileLink(link)
    }
}

impl From<Vote> for AssociationRecord {
    fn from(vote: Vote) -> Self {
        AssociationRecord::Vote(vote)
    }
}
