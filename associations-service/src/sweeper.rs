//! Maintenance pass deleting associations whose content entity is gone.
//!
//! Records are scanned in id order, one batch at a time, profile links first.
//! A record is deleted only when its kind is registered and its entity is
//! missing on two consecutive lookups. Any unregistered kind aborts the sweep:
//! it is checked for every kind in use before the first deletion, and again for
//! each record in case new kinds appear while the sweep runs.
//!
//! Every deletion is a single statement, so dropping the sweep future between
//! awaits leaves no partially processed record behind.
use crate::config::ServiceConfig;
use crate::errors::{AssociationError, ResolveError};
use crate::registry::ContentRegistry;
use associations_repository::AssociationsRepository;
use associations_shared::types::{AssociationKind, AssociationRecord, ContentRef, SweepSummary};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct OrphanSweeper {
    repository: Arc<dyn AssociationsRepository>,
    registry: Arc<ContentRegistry>,
    batch_size: NonZeroU32,
}

impl OrphanSweeper {
    pub fn new(
        repository: Arc<dyn AssociationsRepository>,
        registry: Arc<ContentRegistry>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            batch_size: config.sweep_batch_size,
        }
    }

    /// Runs one full sweep over profile links and votes.
    ///
    /// # Returns
    ///
    /// * `Ok(SweepSummary)` - Records kept and deleted across both tables
    /// * `Err(AssociationError::UnknownKind)` - A record references an unregistered kind
    /// * `Err(AssociationError::LookupError)` - A content lookup failed
    pub async fn sweep(&self) -> Result<SweepSummary, AssociationError> {
        self.check_kinds_in_use().await?;

        let mut summary = SweepSummary::default();
        for kind in AssociationKind::ALL {
            let swept = self.sweep_kind(kind).await?;
            info!(
                kind = %kind,
                kept = swept.kept,
                deleted = swept.deleted,
                "Swept associations"
            );
            summary += swept;
        }

        info!(
            kept = summary.kept,
            deleted = summary.deleted,
            "Orphan sweep finished"
        );
        Ok(summary)
    }

    async fn check_kinds_in_use(&self) -> Result<(), AssociationError> {
        for kind in AssociationKind::ALL {
            for content_kind in self.repository.content_kinds_in_use(kind).await? {
                if let Err(e) = self.registry.ensure_registered(&content_kind) {
                    error!(
                        kind = %kind,
                        content_kind = %content_kind,
                        "Unregistered content kind in use, aborting sweep"
                    );
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    async fn sweep_kind(&self, kind: AssociationKind) -> Result<SweepSummary, AssociationError> {
        let mut summary = SweepSummary::default();
        let mut after = 0;

        loop {
            let batch = self
                .repository
                .scan_associations(kind, after, self.batch_size.get())
                .await?;
            let Some(last) = batch.last() else {
                break;
            };
            after = last.id();

            let mut swept = SweepSummary::default();
            for record in &batch {
                swept += self.sweep_record(record).await?;
            }
            debug!(
                kind = %kind,
                last_id = after,
                records = batch.len(),
                kept = swept.kept,
                deleted = swept.deleted,
                "Swept batch"
            );
            summary += swept;

            if batch.len() < self.batch_size.get() as usize {
                break;
            }
        }

        Ok(summary)
    }

    async fn sweep_record(
        &self,
        record: &AssociationRecord,
    ) -> Result<SweepSummary, AssociationError> {
        let kept = SweepSummary {
            kept: 1,
            deleted: 0,
        };
        // The entity may be recreated between two lookups; only a second miss deletes.
        for _ in 0..2 {
            if self.is_live(record.content_ref()).await? {
                return Ok(kept);
            }
        }

        let removed = self
            .repository
            .delete_association(record.kind(), record.id())
            .await?;
        if removed {
            debug!(
                kind = %record.kind(),
                id = record.id(),
                content = %record.content_ref(),
                "Deleted orphaned association"
            );
        }
        Ok(SweepSummary {
            kept: 0,
            deleted: u64::from(removed),
        })
    }

    async fn is_live(&self, content_ref: &ContentRef) -> Result<bool, AssociationError> {
        match self.registry.resolve(content_ref).await {
            Ok(_) => Ok(true),
            Err(ResolveError::NotFound(_)) => Ok(false),
            Err(e) => {
                error!(content = %content_ref, error = %e, "Aborting sweep");
                Err(e.into())
            }
        }
    }
}
