//! PostgreSQL backend for the associations repository.
mod associations_repository;

pub use associations_repository::PostgresAssociationsRepository;

use crate::errors::AssociationsRepositoryError;

/// Applies the embedded schema migrations to the given pool.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), AssociationsRepositoryError> {
    sqlx::migrate!("src/postgres/migrations").run(pool).await?;
    Ok(())
}
