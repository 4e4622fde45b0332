//! PostgreSQL implementation of the associations repository.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Atomic create-or-get using `INSERT ... ON CONFLICT DO NOTHING RETURNING`
//! - Dynamic listing filters built with `QueryBuilder`
//! - Ranking aggregated in SQL with a deterministic tie-break
//!
//! ## Database Tables
//!
//! - `profile_links`: links between profiles and content entities
//! - `votes`: anonymous scored votes on content entities
use crate::{AssociationsRepository, AssociationsRepositoryError, CreateOutcome};
use associations_shared::types::{
    AssociationId, AssociationKind, AssociationRecord, ContentKind, ContentRef, LinkLevel,
    NewProfileLink, NewVote, Page, ProfileLink, ProfileLinkFilter, ProfileLinkPatch,
    RankedProfile, RankingRequest, Vote, VoteFilter, VoteKind, VotePatch, VoteTally,
};
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::debug;

const PROFILE_LINK_COLUMNS: &str =
    "id, profile_id, content_kind, content_id, level, detail, is_validated, created_on";
const VOTE_COLUMNS: &str = "id, content_kind, content_id, score, vote_kind, created_on";

#[derive(sqlx::FromRow)]
struct ProfileLinkRow {
    id: i64,
    profile_id: i64,
    content_kind: String,
    content_id: i64,
    level: i32,
    detail: String,
    is_validated: bool,
    created_on: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: i64,
    content_kind: String,
    content_id: i64,
    score: f64,
    vote_kind: String,
    created_on: OffsetDateTime,
}

fn decode_content_ref(kind: String, id: i64) -> Result<ContentRef, AssociationsRepositoryError> {
    ContentRef::parse(&kind, id)
        .map_err(|e| AssociationsRepositoryError::InvalidContentRef(format!("{kind}:{id}: {e}")))
}

impl TryFrom<ProfileLinkRow> for ProfileLink {
    type Error = AssociationsRepositoryError;

    fn try_from(row: ProfileLinkRow) -> Result<Self, Self::Error> {
        Ok(ProfileLink {
            id: row.id,
            profile_id: row.profile_id,
            content_ref: decode_content_ref(row.content_kind, row.content_id)?,
            level: LinkLevel(row.level),
            detail: row.detail,
            is_validated: row.is_validated,
            created_on: row.created_on,
        })
    }
}

impl TryFrom<VoteRow> for Vote {
    type Error = AssociationsRepositoryError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Vote {
            id: row.id,
            content_ref: decode_content_ref(row.content_kind, row.content_id)?,
            score: row.score,
            vote_kind: VoteKind(row.vote_kind),
            created_on: row.created_on,
        })
    }
}

fn table_name(kind: AssociationKind) -> &'static str {
    match kind {
        AssociationKind::ProfileLink => "profile_links",
        AssociationKind::Vote => "votes",
    }
}

/// Maps unique-index violations to `Conflict`, everything else to `DatabaseError`.
fn map_write_error(err: sqlx::Error, what: &str) -> AssociationsRepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AssociationsRepositoryError::conflict(format!("{what} collides with an existing record"))
        }
        _ => AssociationsRepositoryError::DatabaseError(err),
    }
}

fn push_page(query_builder: &mut QueryBuilder<'_, Postgres>, page: &Page) {
    if let Some(limit) = page.limit {
        query_builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
    if page.offset > 0 {
        query_builder.push(" OFFSET ").push_bind(i64::from(page.offset));
    }
}

/// PostgreSQL implementation of the associations repository.
///
/// Uniqueness of profile links and votes is enforced by unique indexes
/// (`profile_links_key`, `votes_key`), which makes create-or-get atomic under
/// concurrent writers.
pub struct PostgresAssociationsRepository {
    pool: sqlx::PgPool,
}

impl PostgresAssociationsRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the schema migrated
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Checks that the association tables exist.
    pub async fn check_tables_created(&self) -> Result<bool, AssociationsRepositoryError> {
        for table in ["profile_links", "votes"] {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl AssociationsRepository for PostgresAssociationsRepository {
    async fn get_or_create_profile_link(
        &self,
        link: &NewProfileLink,
    ) -> Result<CreateOutcome<ProfileLink>, AssociationsRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<ProfileLinkRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO profile_links (profile_id, content_kind, content_id, level, detail, is_validated)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (profile_id, content_kind, content_id, level, detail, is_validated)
            DO NOTHING
            RETURNING {PROFILE_LINK_COLUMNS}
            "#
        ))
        .bind(link.profile_id)
        .bind(link.content_ref.content_kind.as_str())
        .bind(link.content_ref.content_id)
        .bind(link.level.value())
        .bind(&link.detail)
        .bind(link.is_validated)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome: CreateOutcome<ProfileLink> = match inserted {
            Some(row) => CreateOutcome::created(row.try_into()?),
            None => {
                let existing: Option<ProfileLinkRow> = sqlx::query_as(&format!(
                    r#"
                    SELECT {PROFILE_LINK_COLUMNS} FROM profile_links
                    WHERE profile_id = $1 AND content_kind = $2 AND content_id = $3
                      AND level = $4 AND detail = $5 AND is_validated = $6
                    "#
                ))
                .bind(link.profile_id)
                .bind(link.content_ref.content_kind.as_str())
                .bind(link.content_ref.content_id)
                .bind(link.level.value())
                .bind(&link.detail)
                .bind(link.is_validated)
                .fetch_optional(&mut *tx)
                .await?;

                match existing {
                    Some(row) => CreateOutcome::existing(row.try_into()?),
                    None => {
                        return Err(AssociationsRepositoryError::conflict(format!(
                            "profile link for profile {} on {} was removed during creation",
                            link.profile_id, link.content_ref
                        )));
                    }
                }
            }
        };

        tx.commit().await?;
        debug!(
            link_id = outcome.record.id,
            content_ref = %outcome.record.content_ref,
            created = outcome.created,
            "Profile link get-or-create"
        );
        Ok(outcome)
    }

    async fn get_profile_link(
        &self,
        id: AssociationId,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError> {
        let row: Option<ProfileLinkRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_LINK_COLUMNS} FROM profile_links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfileLink::try_from).transpose()
    }

    async fn update_profile_link(
        &self,
        id: AssociationId,
        patch: &ProfileLinkPatch,
    ) -> Result<Option<ProfileLink>, AssociationsRepositoryError> {
        let row: Option<ProfileLinkRow> = sqlx::query_as(&format!(
            r#"
            UPDATE profile_links
            SET detail = COALESCE($2, detail),
                is_validated = COALESCE($3, is_validated)
            WHERE id = $1
            RETURNING {PROFILE_LINK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.detail.as_deref())
        .bind(patch.is_validated)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "profile link update"))?;

        row.map(ProfileLink::try_from).transpose()
    }

    async fn list_profile_links(
        &self,
        filter: &ProfileLinkFilter,
    ) -> Result<Vec<ProfileLink>, AssociationsRepositoryError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PROFILE_LINK_COLUMNS} FROM profile_links WHERE TRUE"
        ));

        if let Some(kind) = &filter.content_kind {
            query_builder
                .push(" AND content_kind = ")
                .push_bind(kind.as_str().to_owned());
        }
        if let Some(content_id) = filter.content_id {
            query_builder.push(" AND content_id = ").push_bind(content_id);
        }
        if let Some(level) = filter.level {
            query_builder.push(" AND level = ").push_bind(level.value());
        }
        if let Some(profile_id) = filter.profile_id {
            query_builder.push(" AND profile_id = ").push_bind(profile_id);
        }
        if let Some(is_validated) = filter.is_validated {
            query_builder.push(" AND is_validated = ").push_bind(is_validated);
        }
        query_builder.push(" ORDER BY created_on DESC, id DESC");
        push_page(&mut query_builder, &filter.page);

        let rows = query_builder
            .build_query_as::<ProfileLinkRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProfileLink::try_from).collect()
    }

    async fn rank_linked_profiles(
        &self,
        request: &RankingRequest,
    ) -> Result<Vec<RankedProfile>, AssociationsRepositoryError> {
        if request.levels.is_empty() || request.limit == Some(0) {
            return Ok(Vec::new());
        }

        let levels: Vec<i32> = request.levels.iter().map(|l| l.value()).collect();
        let excluded: Vec<i64> = request.excluded_profiles.iter().copied().collect();
        let limit: Option<i64> = request.limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT profile_id, COUNT(*) AS score
            FROM profile_links
            WHERE content_kind = $1
              AND level = ANY($2)
              AND NOT (profile_id = ANY($3))
            GROUP BY profile_id
            ORDER BY score DESC, profile_id ASC
            LIMIT $4
            "#,
        )
        .bind(request.content_kind.as_str())
        .bind(&levels)
        .bind(&excluded)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(profile_id, score)| RankedProfile { profile_id, score })
            .collect())
    }

    async fn get_or_create_vote(
        &self,
        vote: &NewVote,
    ) -> Result<CreateOutcome<Vote>, AssociationsRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<VoteRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO votes (content_kind, content_id, score, vote_kind)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (content_kind, content_id, vote_kind)
            DO NOTHING
            RETURNING {VOTE_COLUMNS}
            "#
        ))
        .bind(vote.content_ref.content_kind.as_str())
        .bind(vote.content_ref.content_id)
        .bind(vote.score)
        .bind(vote.vote_kind.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let outcome: CreateOutcome<Vote> = match inserted {
            Some(row) => CreateOutcome::created(row.try_into()?),
            None => {
                let existing: Option<VoteRow> = sqlx::query_as(&format!(
                    r#"
                    SELECT {VOTE_COLUMNS} FROM votes
                    WHERE content_kind = $1 AND content_id = $2 AND vote_kind = $3
                    "#
                ))
                .bind(vote.content_ref.content_kind.as_str())
                .bind(vote.content_ref.content_id)
                .bind(vote.vote_kind.as_str())
                .fetch_optional(&mut *tx)
                .await?;

                match existing {
                    Some(row) => CreateOutcome::existing(row.try_into()?),
                    None => {
                        return Err(AssociationsRepositoryError::conflict(format!(
                            "{} vote on {} was removed during creation",
                            vote.vote_kind, vote.content_ref
                        )));
                    }
                }
            }
        };

        tx.commit().await?;
        debug!(
            vote_id = outcome.record.id,
            content_ref = %outcome.record.content_ref,
            created = outcome.created,
            "Vote get-or-create"
        );
        Ok(outcome)
    }

    async fn get_vote(&self, id: AssociationId) -> Result<Option<Vote>, AssociationsRepositoryError> {
        let row: Option<VoteRow> =
            sqlx::query_as(&format!("SELECT {VOTE_COLUMNS} FROM votes WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn update_vote(
        &self,
        id: AssociationId,
        patch: &VotePatch,
    ) -> Result<Option<Vote>, AssociationsRepositoryError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!(
            r#"
            UPDATE votes
            SET score = COALESCE($2, score)
            WHERE id = $1
            RETURNING {VOTE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.score)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "vote update"))?;

        row.map(Vote::try_from).transpose()
    }

    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, AssociationsRepositoryError> {
        let mut query_builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {VOTE_COLUMNS} FROM votes WHERE TRUE"));

        if let Some(kind) = &filter.content_kind {
            query_builder
                .push(" AND content_kind = ")
                .push_bind(kind.as_str().to_owned());
        }
        if let Some(content_id) = filter.content_id {
            query_builder.push(" AND content_id = ").push_bind(content_id);
        }
        if let Some(vote_kind) = &filter.vote_kind {
            query_builder
                .push(" AND vote_kind = ")
                .push_bind(vote_kind.as_str().to_owned());
        }
        query_builder.push(" ORDER BY created_on DESC, id DESC");
        push_page(&mut query_builder, &filter.page);

        let rows = query_builder
            .build_query_as::<VoteRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Vote::try_from).collect()
    }

    async fn vote_tally(
        &self,
        content_ref: &ContentRef,
    ) -> Result<VoteTally, AssociationsRepositoryError> {
        let (score, votes): (f64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(score), 0)::DOUBLE PRECISION, COUNT(*)
            FROM votes
            WHERE content_kind = $1 AND content_id = $2
            "#,
        )
        .bind(content_ref.content_kind.as_str())
        .bind(content_ref.content_id)
        .fetch_one(&self.pool)
        .await?;

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
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table_name(kind)))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn content_kinds_in_use(
        &self,
        kind: AssociationKind,
    ) -> Result<Vec<ContentKind>, AssociationsRepositoryError> {
        let kinds: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT content_kind FROM {} ORDER BY content_kind",
            table_name(kind)
        ))
        .fetch_all(&self.pool)
        .await?;

        kinds
            .into_iter()
            .map(|k| {
                ContentKind::new(k.clone())
                    .map_err(|e| AssociationsRepositoryError::InvalidContentRef(format!("{k}: {e}")))
            })
            .collect()
    }

    async fn scan_associations(
        &self,
        kind: AssociationKind,
        after: AssociationId,
        limit: u32,
    ) -> Result<Vec<AssociationRecord>, AssociationsRepositoryError> {
        match kind {
            AssociationKind::ProfileLink => {
                let rows: Vec<ProfileLinkRow> = sqlx::query_as(&format!(
                    "SELECT {PROFILE_LINK_COLUMNS} FROM profile_links WHERE id > $1 ORDER BY id LIMIT $2"
                ))
                .bind(after)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?;

                rows.into_iter()
                    .map(|row| ProfileLink::try_from(row).map(AssociationRecord::from))
                    .collect()
            }
            AssociationKind::Vote => {
                let rows: Vec<VoteRow> = sqlx::query_as(&format!(
                    "SELECT {VOTE_COLUMNS} FROM votes WHERE id > $1 ORDER BY id LIMIT $2"
                ))
                .bind(after)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?;

                rows.into_iter()
                    .map(|row| Vote::try_from(row).map(AssociationRecord::from))
                    .collect()
            }
        }
    }
}
