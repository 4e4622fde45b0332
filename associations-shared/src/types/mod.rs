mod association;
mod content_ref;
mod filter;
mod profile_link;
mod ranking;
mod sweep;
mod vote;

pub use association::{AssociationId, AssociationKind, AssociationRecord};
pub use content_ref::{ContentEntity, ContentId, ContentKind, ContentRef, ContentRefError};
pub use filter::{Page, ProfileLinkFilter, VoteFilter};
pub use profile_link::{LinkLevel, NewProfileLink, ProfileId, ProfileLink, ProfileLinkPatch};
pub use ranking::{RankedProfile, RankingRequest, VoteTally};
pub use sweep::SweepSummary;
pub use vote::{NewVote, Vote, VoteKind, VoteKindChoice, VotePatch};
