//! Create-or-get, update, delete and listing of associations.
//!
//! Creation is idempotent: submitting a record whose uniqueness key already
//! exists returns the stored record untouched and reports `created = false`.
use crate::config::ServiceConfig;
use crate::errors::AssociationError;
use crate::registry::ContentRegistry;
use crate::vote_kinds::VoteKindCatalog;
use associations_repository::{AssociationsRepository, AssociationsRepositoryError, CreateOutcome};
use associations_shared::types::{
    AssociationId, AssociationKind, ContentKind, LinkLevel, NewProfileLink, NewVote, ProfileLink,
    ProfileLinkFilter, ProfileLinkPatch, Vote, VoteFilter, VoteKind, VoteKindChoice, VotePatch,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_DETAIL_LEN: usize = 200;

fn validate_level(level: LinkLevel) -> Result<(), AssociationError> {
    if !(0..=LinkLevel::MAX.value()).contains(&level.value()) {
        return Err(AssociationError::validation(format!(
            "level must be between 0 and {}, got {level}",
            LinkLevel::MAX
        )));
    }
    Ok(())
}

fn validate_detail(detail: &str) -> Result<(), AssociationError> {
    if detail.chars().count() > MAX_DETAIL_LEN {
        return Err(AssociationError::validation(format!(
            "detail is longer than {MAX_DETAIL_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_score(score: f64) -> Result<(), AssociationError> {
    if !score.is_finite() {
        return Err(AssociationError::validation(format!(
            "score must be a finite number, got {score}"
        )));
    }
    Ok(())
}

/// Persistence front of the profile links and votes attached to content entities.
pub struct AssociationStore {
    repository: Arc<dyn AssociationsRepository>,
    registry: Arc<ContentRegistry>,
    vote_kinds: Arc<VoteKindCatalog>,
    max_create_attempts: u32,
}

impl AssociationStore {
    pub fn new(
        repository: Arc<dyn AssociationsRepository>,
        registry: Arc<ContentRegistry>,
        vote_kinds: Arc<VoteKindCatalog>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            vote_kinds,
            max_create_attempts: config.max_create_attempts.max(1),
        }
    }

    /// Links a profile to a content entity, or returns the identical link
    /// that already exists.
    ///
    /// # Errors
    ///
    /// * `ValidationError` - Bad profile id, level or detail
    /// * `UnknownKind` - The content kind is not registered
    /// * `NotFound` - The content entity does not exist
    /// * `Conflict` - Concurrent writers kept invalidating the existing row
    pub async fn create_or_get_profile_link(
        &self,
        link: &NewProfileLink,
    ) -> Result<CreateOutcome<ProfileLink>, AssociationError> {
        if link.profile_id <= 0 {
            return Err(AssociationError::validation(format!(
                "profile id must be positive, got {}",
                link.profile_id
            )));
        }
        validate_level(link.level)?;
        validate_detail(&link.detail)?;
        self.registry.resolve(&link.content_ref).await?;

        let mut attempt = 1;
        let outcome = loop {
            match self.repository.get_or_create_profile_link(link).await {
                Ok(outcome) => break outcome,
                Err(AssociationsRepositoryError::Conflict(reason))
                    if attempt < self.max_create_attempts =>
                {
                    warn!(attempt, reason = %reason, "Retrying profile link create-or-get");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if outcome.created {
            info!(
                link_id = outcome.record.id,
                profile_id = link.profile_id,
                content = %link.content_ref,
                level = %link.level,
                "Created profile link"
            );
        }
        Ok(outcome)
    }

    pub async fn get_profile_link(&self, id: AssociationId) -> Result<ProfileLink, AssociationError> {
        self.repository
            .get_profile_link(id)
            .await?
            .ok_or_else(|| AssociationError::not_found(format!("profile link {id}")))
    }

    /// Updates `detail` and `is_validated`. An empty patch returns the current link.
    pub async fn update_profile_link(
        &self,
        id: AssociationId,
        patch: &ProfileLinkPatch,
    ) -> Result<ProfileLink, AssociationError> {
        if let Some(detail) = &patch.detail {
            validate_detail(detail)?;
        }
        if patch.is_empty() {
            return self.get_profile_link(id).await;
        }

        let link = self
            .repository
            .update_profile_link(id, patch)
            .await?
            .ok_or_else(|| AssociationError::not_found(format!("profile link {id}")))?;
        debug!(link_id = id, "Updated profile link");
        Ok(link)
    }

    /// Deletes a profile link. Deleting a missing link is a no-op.
    pub async fn delete_profile_link(&self, id: AssociationId) -> Result<(), AssociationError> {
        self.delete(AssociationKind::ProfileLink, id).await
    }

    pub async fn list_profile_links(
        &self,
        filter: &ProfileLinkFilter,
    ) -> Result<Vec<ProfileLink>, AssociationError> {
        self.ensure_filter_kind(filter.content_kind.as_ref())?;
        Ok(self.repository.list_profile_links(filter).await?)
    }

    /// Records a vote on a content entity, or returns the vote of the same
    /// kind already recorded on it. The score of an existing vote is kept.
    ///
    /// # Errors
    ///
    /// * `ValidationError` - Vote kind not configured or score not finite
    /// * `UnknownKind` - The content kind is not registered
    /// * `NotFound` - The content entity does not exist
    /// * `Conflict` - Concurrent writers kept invalidating the existing row
    pub async fn create_or_get_vote(
        &self,
        vote: &NewVote,
    ) -> Result<CreateOutcome<Vote>, AssociationError> {
        if !self.vote_kinds.contains(&vote.vote_kind) {
            return Err(AssociationError::validation(format!(
                "unknown vote kind: {}",
                vote.vote_kind
            )));
        }
        validate_score(vote.score)?;
        self.registry.resolve(&vote.content_ref).await?;

        let mut attempt = 1;
        let outcome = loop {
            match self.repository.get_or_create_vote(vote).await {
                Ok(outcome) => break outcome,
                Err(AssociationsRepositoryError::Conflict(reason))
                    if attempt < self.max_create_attempts =>
                {
                    warn!(attempt, reason = %reason, "Retrying vote create-or-get");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if outcome.created {
            info!(
                vote_id = outcome.record.id,
                content = %vote.content_ref,
                vote_kind = %vote.vote_kind,
                "Recorded vote"
            );
        }
        Ok(outcome)
    }

    pub async fn get_vote(&self, id: AssociationId) -> Result<Vote, AssociationError> {
        self.repository
            .get_vote(id)
            .await?
            .ok_or_else(|| AssociationError::not_found(format!("vote {id}")))
    }

    pub async fn update_vote(
        &self,
        id: AssociationId,
        patch: &VotePatch,
    ) -> Result<Vote, AssociationError> {
        let Some(score) = patch.score else {
            return self.get_vote(id).await;
        };
        validate_score(score)?;

        let vote = self
            .repository
            .update_vote(id, patch)
            .await?
            .ok_or_else(|| AssociationError::not_found(format!("vote {id}")))?;
        debug!(vote_id = id, score, "Updated vote");
        Ok(vote)
    }

    /// Deletes a vote. Deleting a missing vote is a no-op.
    pub async fn delete_vote(&self, id: AssociationId) -> Result<(), AssociationError> {
        self.delete(AssociationKind::Vote, id).await
    }

    pub async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, AssociationError> {
        self.ensure_filter_kind(filter.content_kind.as_ref())?;
        Ok(self.repository.list_votes(filter).await?)
    }

    /// Configured vote types, optionally only the one with the given code.
    pub fn vote_kinds(&self, code_filter: Option<&str>) -> Vec<VoteKindChoice> {
        self.vote_kinds.list(code_filter)
    }

    pub fn vote_kind_label(&self, kind: &VoteKind) -> Option<&str> {
        self.vote_kinds.label(kind)
    }

    async fn delete(&self, kind: AssociationKind, id: AssociationId) -> Result<(), AssociationError> {
        let removed = self.repository.delete_association(kind, id).await?;
        debug!(kind = %kind, id, removed, "Deleted association");
        Ok(())
    }

    fn ensure_filter_kind(&self, kind: Option<&ContentKind>) -> Result<(), AssociationError> {
        if let Some(kind) = kind {
            self.registry.ensure_registered(kind)?;
        }
        Ok(())
    }
}
