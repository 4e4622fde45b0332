use crate::config::Settings;
use crate::errors::AppError;
use associations_repository::{AssociationsRepository, PostgresAssociationsRepository};
use associations_service::{
    AssociationStore, ContentRegistry, OrphanSweeper, PostgresTableLookup, RankingQuery,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

/// `Dependencies` holds the wired service components.
///
/// The content registry is built once here and shared by every component.
pub struct Dependencies {
    pub pool: PgPool,
    pub store: AssociationStore,
    pub ranking: RankingQuery,
    pub sweeper: OrphanSweeper,
}

impl Dependencies {
    /// Connects to the database and wires every component.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - The connection failed or a content kind is misconfigured
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        info!(
            max_connections = settings.database_max_connections,
            content_kinds = settings.content_kinds.len(),
            "Initializing dependencies"
        );
        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect(settings.database_url()?)
            .await?;

        Self::from_pool(pool, settings)
    }

    /// Wires every component on top of an existing pool.
    pub fn from_pool(pool: PgPool, settings: &Settings) -> Result<Self, AppError> {
        let mut builder = ContentRegistry::builder();
        for source in &settings.content_kinds {
            let lookup = PostgresTableLookup::new(
                pool.clone(),
                &source.table,
                source.label_column.as_deref(),
            )?;
            builder.register(source.content_kind.clone(), Arc::new(lookup))?;
        }
        let registry = Arc::new(builder.build());

        let repository: Arc<dyn AssociationsRepository> =
            Arc::new(PostgresAssociationsRepository::new(pool.clone()));
        let store = AssociationStore::new(
            repository.clone(),
            registry.clone(),
            Arc::new(settings.vote_kinds.clone()),
            &settings.service,
        );
        let ranking = RankingQuery::new(repository.clone(), registry.clone(), &settings.service);
        let sweeper = OrphanSweeper::new(repository, registry, &settings.service);

        Ok(Self {
            pool,
            store,
            ranking,
            sweeper,
        })
    }
}
