//! This module defines the `AssociationsRepository` trait, which provides an interface
//! for interacting with the underlying data store for profile links and votes.
//! It abstracts the database operations for persistence, aggregation and maintenance scans.
use crate::errors::AssociationsRepositoryError;
use associations_shared::types::{
    AssociationId, AssociationKind, AssociationRecord, ContentKind, ContentRef, NewProfileLink,
    NewVote, ProfileLink, ProfileLinkFilter, ProfileLinkPatch, RankedProfile, RankingRequest, Vote,
    VoteFilter, VotePatch, VoteTally,
};

/// Result of an atomic create-or-get.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome<T> {
    pub record: T,
    /// `true` when this call inserted the record, `false` when it already existed.
    pub created: bool,
}

impl<T> CreateOutcome<T> {
    pub fn created(record: T) -> Self {
        Self {
            record,
            created: true,
        }
    }

    pub fn existing(record: T) -> Self {
        Self {
            record,
            created: false,
        }
    }
}

/// A trait that defines the interface for interacting with the associations data store.
///
/// Implementors must make `get_or_create_*` atomic with respect to the uniqueness
/// key: two concurrent calls with the same key never both insert.
#[async_trait::async_trait]
pub trait AssociationsRepository: Send + Sync {
    /// Inserts a profile link unless one with the same key exists, in which case
    /// the stored link is returned untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(CreateOutcome)` - The inserted or existing link
    /// * `Err(AssociationsRepositoryError::Conflict)` - The existing row vanished
    ///   between the conflicting insert and the lookup; callers may retry
    async fn get_or_create_profile_link(
        &self,
        link: &NewProfileLink,
    ) -> Result<CreateOutcome<ProfileLink>, AssociationsRepositoryError>;

    async fn get_profile_link(
        &self,
        id: AssociationId,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError>;

    /// Applies a patch to a profile link. Returns `None` if the link does not exist.
    async fn update_profile_link(
        &self,
        id: AssociationId,
        patch: &ProfileLinkPatch,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError>;

    /// Lists profile links matching the filter, newest first.
    async fn list_profile_links(
        &self,
        filter: &ProfileLinkFilter,
    ) -> Result<Vec<ProfileLink>, AssociationsRepositoryError>;

    /// Ranks profiles by their number of links matching the request.
    ///
    /// Ordering is score descending then profile id ascending; `limit` is applied
    /// after aggregation.
    async fn rank_linked_profiles(
        &self,
        request: &RankingRequest,
    ) -> Result<Vec<RankedProfile>, AssociationsRepositoryError>;

    /// Inserts a vote unless one with the same key exists.
    async fn get_or_create_vote(
        &self,
        vote: &NewVote,
    ) -> Result<CreateOutcome<Vote>, AssociationsRepositoryError>;

    async fn get_vote(&self, id: AssociationId) -> Result<Option<Vote>, AssociationsRepositoryError>;

    async fn update_vote(
        &self,
        id: AssociationId,
        patch: &VotePatch,
    ) -> Result<Option<Vote>, AssociationsRepositoryError>;

    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, AssociationsRepositoryError>;

    /// Sums the scores of every vote on a content entity.
    async fn vote_tally(
        &self,
        content_ref: &ContentRef,
    ) -> Result<VoteTally, AssociationsRepositoryError>;

    /// Deletes one record. Returns `false` if it was already gone.
    async fn delete_association(
        &self,
        kind: AssociationKind,
        id: AssociationId,
    ) -> Result<bool, AssociationsRepositoryError>;

    /// Distinct content kinds referenced by records of the given kind.
    async fn content_kinds_in_use(
        &self,
        kind: AssociationKind,
    ) -> Result<Vec<ContentKind>, AssociationsRepositoryError>;

    /// Returns up to `limit` records with an id strictly greater than `after`,
    /// ordered by id ascending.
    async fn scan_associations(
        &self,
        kind: AssociationKind,
        after: AssociationId,
        limit: u32,
    ) -> Result<Vec<AssociationRecord>, AssociationsRepositoryError>;
}
