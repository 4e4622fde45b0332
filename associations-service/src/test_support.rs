use crate::errors::LookupError;
use crate::registry::{ContentLookup, ContentRegistry};
use associations_repository::{
    AssociationsRepository, AssociationsRepositoryError, CreateOutcome,
    InMemoryAssociationsRepository,
};
use associations_shared::types::{
    AssociationId, AssociationKind, AssociationRecord, ContentEntity, ContentId, ContentKind,
    ContentRef, NewProfileLink, NewVote, ProfileLink, ProfileLinkFilter, ProfileLinkPatch,
    RankedProfile, RankingRequest, Vote, VoteFilter, VotePatch, VoteTally,
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub(crate) fn kind(name: &str) -> ContentKind {
    ContentKind::new(name).unwrap()
}

/// Lookup over a mutable set of live ids.
pub(crate) struct MockLookup {
    live: Mutex<BTreeSet<ContentId>>,
    failure: Mutex<Option<String>>,
}

impl MockLookup {
    pub(crate) fn with_ids(ids: impl IntoIterator<Item = ContentId>) -> Arc<Self> {
        Arc::new(Self {
            live: Mutex::new(ids.into_iter().collect()),
            failure: Mutex::new(None),
        })
    }

    pub(crate) fn remove(&self, id: ContentId) {
        self.live.lock().unwrap().remove(&id);
    }

    pub(crate) fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl ContentLookup for MockLookup {
    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<ContentEntity>, LookupError> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(LookupError(reason));
        }
        let exists = self.live.lock().unwrap().contains(&content_ref.content_id);
        Ok(exists.then(|| ContentEntity {
            content_ref: content_ref.clone(),
            label: None,
        }))
    }
}

pub(crate) fn registry_with(lookups: &[(&str, Arc<MockLookup>)]) -> Arc<ContentRegistry> {
    let mut builder = ContentRegistry::builder();
    for (name, lookup) in lookups {
        builder.register(kind(name), lookup.clone()).unwrap();
    }
    Arc::new(builder.build())
}

/// In-memory repository that can fail creations with `Conflict` and hide
/// content kinds from `content_kinds_in_use`.
#[derive(Default)]
pub(crate) struct FlakyRepository {
    pub(crate) inner: InMemoryAssociationsRepository,
    conflicts_left: Mutex<u32>,
    create_calls: Mutex<u32>,
    hidden_kinds: Mutex<BTreeSet<ContentKind>>,
}

impl FlakyRepository {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The next `count` create-or-get calls fail with `Conflict`.
    pub(crate) fn fail_creates(&self, count: u32) {
        *self.conflicts_left.lock().unwrap() = count;
    }

    pub(crate) fn create_calls(&self) -> u32 {
        *self.create_calls.lock().unwrap()
    }

    pub(crate) fn hide_kind(&self, kind: ContentKind) {
        self.hidden_kinds.lock().unwrap().insert(kind);
    }

    fn next_create(&self) -> Result<(), AssociationsRepositoryError> {
        *self.create_calls.lock().unwrap() += 1;
        let mut conflicts_left = self.conflicts_left.lock().unwrap();
        if *conflicts_left > 0 {
            *conflicts_left -= 1;
            return Err(AssociationsRepositoryError::conflict(
                "existing row removed during creation",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AssociationsRepository for FlakyRepository {
    async fn get_or_create_profile_link(
        &self,
        link: &NewProfileLink,
    ) -> Result<CreateOutcome<ProfileLink>, AssociationsRepositoryError> {
        self.next_create()?;
        self.inner.get_or_create_profile_link(link).await
    }

    async fn get_profile_link(
        &self,
        id: AssociationId,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError> {
        self.inner.get_profile_link(id).await
    }

    async fn update_profile_link(
        &self,
        id: AssociationId,
        patch: &ProfileLinkPatch,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError> {
        self.inner.update_profile_link(id, patch).await
    }

    async fn list_profile_links(
        &self,
        filter: &ProfileLinkFilter,
    ) -> Result<Vec<ProfileLink>, AssociationsRepositoryError> {
        self.inner.list_profile_links(filter).await
    }

    async fn rank_linked_profiles(
        &self,
        request: &RankingRequest,
    ) -> Result<Vec<RankedProfile>, AssociationsRepositoryError> {
        self.inner.rank_linked_profiles(request).await
    }

    async fn get_or_create_vote(
        &self,
        vote: &NewVote,
    ) -> Result<CreateOutcome<Vote>, AssociationsRepositoryError> {
        self.next_create()?;
        self.inner.get_or_create_vote(vote).await
    }

    async fn get_vote(&self, id: AssociationId) -> Result<Option<Vote>, AssociationsRepositoryError> {
        self.inner.get_vote(id).await
    }

    async fn update_vote(
        &self,
        id: AssociationId,
        patch: &VotePatch,
    ) -> Result<Option<Vote>, AssociationsRepositoryError> {
        self.inner.update_vote(id, patch).await
    }

    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, AssociationsRepositoryError> {
        self.inner.list_votes(filter).await
    }

    async fn vote_tally(
        &self,
        content_ref: &ContentRef,
    ) -> Result<VoteTally, AssociationsRepositoryError> {
        self.inner.vote_tally(content_ref).await
    }

    async fn delete_association(
        &self,
        kind: AssociationKind,
        id: AssociationId,
    ) -> Result<bool, AssociationsRepositoryError> {
        self.inner.delete_association(kind, id).await
    }

    async fn content_kinds_in_use(
        &self,
        kind: AssociationKind,
    ) -> Result<Vec<ContentKind>, AssociationsRepositoryError> {
        let kinds = self.inner.content_kinds_in_use(kind).await?;
        let hidden = self.hidden_kinds.lock().unwrap().clone();
        Ok(kinds.into_iter().filter(|k| !hidden.contains(k)).collect())
    }

    async fn scan_associations(
        &self,
        kind: AssociationKind,
        after: AssociationId,
        limit: u32,
    ) -> Result<Vec<AssociationRecord>, AssociationsRepositoryError> {
        self.inner.scan_associations(kind, after, limit).await
    }
}
