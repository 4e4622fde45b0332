use crate::errors::{AssociationError, LookupError};
use crate::registry::ContentLookup;
use associations_shared::types::{ContentEntity, ContentRef};
use async_trait::async_trait;

/// Resolves content entities by primary key in a PostgreSQL table owned by
/// another subsystem (`projects_project`, `megafon_post`, ...).
pub struct PostgresTableLookup {
    pool: sqlx::PgPool,
    query: String,
}

/// Accepts `name` or `schema.name`, each part `[a-z_][a-z0-9_]*`.
fn is_valid_identifier(identifier: &str) -> bool {
    let mut parts = 0;
    for part in identifier.split('.') {
        parts += 1;
        let mut bytes = part.bytes();
        let valid_head = matches!(bytes.next(), Some(b) if b.is_ascii_lowercase() || b == b'_');
        if !valid_head || !bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_') {
            return false;
        }
    }
    parts <= 2
}

impl PostgresTableLookup {
    /// Creates a lookup against `table`, keyed by its `id` column.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool of the database holding the entity table
    /// * `table` - Table name, optionally schema-qualified
    /// * `label_column` - Column used as the entity label, if any
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a name is not a plain SQL identifier.
    pub fn new(
        pool: sqlx::PgPool,
        table: &str,
        label_column: Option<&str>,
    ) -> Result<Self, AssociationError> {
        if !is_valid_identifier(table) {
            return Err(AssociationError::validation(format!(
                "invalid table name: {table}"
            )));
        }
        let label = match label_column {
            Some(column) if is_valid_identifier(column) && !column.contains('.') => {
                format!("{column}::TEXT")
            }
            Some(column) => {
                return Err(AssociationError::validation(format!(
                    "invalid label column: {column}"
                )));
            }
            None => "NULL::TEXT".to_string(),
        };

        Ok(Self {
            pool,
            query: format!("SELECT {label} FROM {table} WHERE id = $1"),
        })
    }
}

#[async_trait]
impl ContentLookup for PostgresTableLookup {
    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<ContentEntity>, LookupError> {
        let row: Option<Option<String>> = sqlx::query_scalar(&self.query)
            .bind(content_ref.content_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|label| ContentEntity {
            content_ref: content_ref.clone(),
            label,
        }))
    }
}
