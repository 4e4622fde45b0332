//! In-memory implementation of the associations repository.
//!
//! Backed by a single mutex-guarded state, so every operation is atomic.
//! Ids are assigned in creation order, which doubles as the listing order.
use crate::{AssociationsRepository, AssociationsRepositoryError, CreateOutcome};
use associations_shared::rank_profile_links;
use associations_shared::types::{
    AssociationId, AssociationKind, AssociationRecord, ContentKind, ContentRef, NewProfileLink,
    NewVote, Page, ProfileLink, ProfileLinkFilter, ProfileLinkPatch, RankedProfile,
    RankingRequest, Vote, VoteFilter, VotePatch, VoteTally,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;

#[derive(Default)]
struct State {
    next_link_id: AssociationId,
    next_vote_id: AssociationId,
    links: BTreeMap<AssociationId, ProfileLink>,
    votes: BTreeMap<AssociationId, Vote>,
}

fn link_key_matches(link: &ProfileLink, new: &NewProfileLink) -> bool {
    link.profile_id == new.profile_id
        && link.content_ref == new.content_ref
        && link.level == new.level
        && link.detail == new.detail
        && link.is_validated == new.is_validated
}

fn paginate<T>(mut items: Vec<T>, page: &Page) -> Vec<T> {
    let offset = (page.offset as usize).min(items.len());
    items.drain(..offset);
    if let Some(limit) = page.limit {
        items.truncate(limit as usize);
    }
    items
}

/// Association storage held entirely in process memory.
#[derive(Default)]
pub struct InMemoryAssociationsRepository {
    state: Mutex<State>,
}

impl InMemoryAssociationsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Every mutation is a single map insert or remove, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Total number of stored records of both kinds.
    pub fn len(&self) -> usize {
        let state = self.state();
        state.links.len() + state.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AssociationsRepository for InMemoryAssociationsRepository {
    async fn get_or_create_profile_link(
        &self,
        link: &NewProfileLink,
    ) -> Result<CreateOutcome<ProfileLink>, AssociationsRepositoryError> {
        let mut state = self.state();
        if let Some(existing) = state.links.values().find(|l| link_key_matches(l, link)) {
            return Ok(CreateOutcome::existing(existing.clone()));
        }

        state.next_link_id += 1;
        let record = ProfileLink {
            id: state.next_link_id,
            profile_id: link.profile_id,
            content_ref: link.content_ref.clone(),
            level: link.level,
            detail: link.detail.clone(),
            is_validated: link.is_validated,
            created_on: OffsetDateTime::now_utc(),
        };
        state.links.insert(record.id, record.clone());
        Ok(CreateOutcome::created(record))
    }

    async fn get_profile_link(
        &self,
        id: AssociationId,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError> {
        Ok(self.state().links.get(&id).cloned())
    }

    async fn update_profile_link(
        &self,
        id: AssociationId,
        patch: &ProfileLinkPatch,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError> {
        let mut state = self.state();
        let Some(current) = state.links.get(&id).cloned() else {
            return Ok(None);
        };

        let mut updated = current;
        if let Some(detail) = &patch.detail {
            updated.detail = detail.clone();
        }
        if let Some(is_validated) = patch.is_validated {
            updated.is_validated = is_validated;
        }

        let key = NewProfileLink {
            profile_id: updated.profile_id,
            content_ref: updated.content_ref.clone(),
            level: updated.level,
            detail: updated.detail.clone(),
            is_validated: updated.is_validated,
        };
        if state
            .links
            .values()
            .any(|l| l.id != id && link_key_matches(l, &key))
        {
            return Err(AssociationsRepositoryError::conflict(
                "profile link update collides with an existing record",
            ));
        }

        state.links.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn list_profile_links(
        &self,
        filter: &ProfileLinkFilter,
    ) -> Result<Vec<ProfileLink>, AssociationsRepositoryError> {
        let state = self.state();
        let mut links: Vec<ProfileLink> = state
            .links
            .values()
            .filter(|l| {
                filter
                    .content_kind
                    .as_ref()
                    .is_none_or(|k| &l.content_ref.content_kind == k)
                    && filter.content_id.is_none_or(|id| l.content_ref.content_id == id)
                    && filter.level.is_none_or(|level| l.level == level)
                    && filter.profile_id.is_none_or(|p| l.profile_id == p)
                    && filter.is_validated.is_none_or(|v| l.is_validated == v)
            })
            .cloned()
            .collect();
        links.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(links, &filter.page))
    }

    async fn rank_linked_profiles(
        &self,
        request: &RankingRequest,
    ) -> Result<Vec<RankedProfile>, AssociationsRepositoryError> {
        let state = self.state();
        Ok(rank_profile_links(state.links.values(), request))
    }

    async fn get_or_create_vote(
        &self,
        vote: &NewVote,
    ) -> Result<CreateOutcome<Vote>, AssociationsRepositoryError> {
        let mut state = self.state();
        if let Some(existing) = state
            .votes
            .values()
            .find(|v| v.content_ref == vote.content_ref && v.vote_kind == vote.vote_kind)
        {
            return Ok(CreateOutcome::existing(existing.clone()));
        }

        state.next_vote_id += 1;
        let record = Vote {
            id: state.next_vote_id,
            content_ref: vote.content_ref.clone(),
            score: vote.score,
            vote_kind: vote.vote_kind.clone(),
            created_on: OffsetDateTime::now_utc(),
        };
        state.votes.insert(record.id, record.clone());
        Ok(CreateOutcome::created(record))
    }

    async fn get_vote(&self, id: AssociationId) -> Result<Option<Vote>, AssociationsRepositoryError> {
        Ok(self.state().votes.get(&id).cloned())
    }

    async fn update_vote(
        &self,
        id: AssociationId,
        patch: &VotePatch,
    ) -> Result<Option<Vote>, AssociationsRepositoryError> {
        let mut state = self.state();
        let Some(vote) = state.votes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(score) = patch.score {
            vote.score = score;
        }
        Ok(Some(vote.clone()))
    }

    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, AssociationsRepositoryError> {
        let state = self.state();
        let mut votes: Vec<Vote> = state
            .votes
            .values()
            .filter(|v| {
                filter
                    .content_kind
                    .as_ref()
                    .is_none_or(|k| &v.content_ref.content_kind == k)
                    && filter.content_id.is_none_or(|id| v.content_ref.content_id == id)
                    && filter.vote_kind.as_ref().is_none_or(|k| &v.vote_kind == k)
            })
            .cloned()
            .collect();
        votes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(votes, &filter.page))
    }

    async fn vote_tally(
        &self,
        content_ref: &ContentRef,
    ) -> Result<VoteTally, AssociationsRepositoryError> {
        let state = self.state();
        let (score, votes) = state
            .votes
            .values()
            .filter(|v| &v.content_ref == content_ref)
            .fold((0.0, 0), |(score, count), v| (score + v.score, count + 1));

        Ok(VoteTally {
            content_ref: content_ref.clone(),
            score,
            votes,
        })
    }

    async fn delete_association(
        &self,
        kind: AssociationKind,
        id: AssociationId,
    ) -> Result<bool, AssociationsRepositoryError> {
        let mut state = self.state();
        let removed = match kind {
            AssociationKind::ProfileLink => state.links.remove(&id).is_some(),
            AssociationKind::Vote => state.votes.remove(&id).is_some(),
        };
        Ok(removed)
    }

    async fn content_kinds_in_use(
        &self,
        kind: AssociationKind,
    ) -> Result<Vec<ContentKind>, AssociationsRepositoryError> {
        let state = self.state();
        let kinds: BTreeSet<ContentKind> = match kind {
            AssociationKind::ProfileLink => state
                .links
                .values()
                .map(|l| l.content_ref.content_kind.clone())
                .collect(),
            AssociationKind::Vote => state
                .votes
                .values()
                .map(|v| v.content_ref.content_kind.clone())
                .collect(),
        };
        Ok(kinds.into_iter().collect())
    }

    async fn scan_associations(
        &self,
        kind: AssociationKind,
        after: AssociationId,
        limit: u32,
    ) -> Result<Vec<AssociationRecord>, AssociationsRepositoryError> {
        let state = self.state();
        let take = limit as usize;
        let records = match kind {
            AssociationKind::ProfileLink => state
                .links
                .range(after + 1..)
                .take(take)
                .map(|(_, l)| AssociationRecord::from(l.clone()))
                .collect(),
            AssociationKind::Vote => state
                .votes
                .range(after + 1..)
                .take(take)
                .map(|(_, v)| AssociationRecord::from(v.clone()))
                .collect(),
        };
        Ok(records)
    }
}
