//! Best-linked-profiles ranking and vote tallies.
use crate::config::ServiceConfig;
use crate::errors::AssociationError;
use crate::registry::ContentRegistry;
use associations_repository::AssociationsRepository;
use associations_shared::types::{
    ContentKind, ContentRef, LinkLevel, ProfileId, RankedProfile, RankingRequest, VoteTally,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Read-only aggregations over stored associations.
pub struct RankingQuery {
    repository: Arc<dyn AssociationsRepository>,
    registry: Arc<ContentRegistry>,
    excluded_profiles: BTreeSet<ProfileId>,
}

impl RankingQuery {
    pub fn new(
        repository: Arc<dyn AssociationsRepository>,
        registry: Arc<ContentRegistry>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            excluded_profiles: config.excluded_profiles.clone(),
        }
    }

    /// Ranks profiles by how many entities of `content_kind` they are linked to
    /// at one of `levels`.
    ///
    /// Scores are link counts, highest first; equal scores are ordered by
    /// ascending profile id. `limit` truncates the sorted ranking.
    ///
    /// # Errors
    ///
    /// * `UnknownKind` - `content_kind` is not registered
    /// * `ValidationError` - `limit` is zero
    pub async fn rank(
        &self,
        content_kind: &ContentKind,
        levels: &BTreeSet<LinkLevel>,
        limit: Option<usize>,
    ) -> Result<Vec<RankedProfile>, AssociationError> {
        self.registry.ensure_registered(content_kind)?;
        if limit == Some(0) {
            return Err(AssociationError::validation("limit must be positive"));
        }
        if levels.is_empty() {
            return Ok(Vec::new());
        }

        let request = RankingRequest {
            content_kind: content_kind.clone(),
            levels: levels.clone(),
            limit,
            excluded_profiles: self.excluded_profiles.clone(),
        };
        let ranking = self.repository.rank_linked_profiles(&request).await?;
        debug!(
            content_kind = %content_kind,
            levels = ?levels,
            rows = ranking.len(),
            "Ranked linked profiles"
        );
        Ok(ranking)
    }

    /// Sums the scores of every vote on a content entity.
    ///
    /// The entity itself is not resolved, so tallies of deleted entities stay
    /// readable until the next sweep.
    pub async fn rank_votes_for_entity(
        &self,
        content_ref: &ContentRef,
    ) -> Result<VoteTally, AssociationError> {
        self.registry.ensure_registered(&content_ref.content_kind)?;
        Ok(self.repository.vote_tally(content_ref).await?)
    }
}
