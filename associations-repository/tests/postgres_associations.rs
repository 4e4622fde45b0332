//! Integration tests for the PostgreSQL associations repository.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.

use associations_repository::{AssociationsRepository, PostgresAssociationsRepository};
use associations_shared::types::{
    AssociationKind, ContentKind, ContentRef, LinkLevel, NewProfileLink, NewVote, Page,
    ProfileLinkFilter, ProfileLinkPatch, RankedProfile, RankingRequest, VoteKind, VotePatch,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn make_link(profile_id: i64, kind: &str, content_id: i64, level: LinkLevel) -> NewProfileLink {
    NewProfileLink {
        profile_id,
        content_ref: ContentRef::parse(kind, content_id).unwrap(),
        level,
        detail: String::new(),
        is_validated: false,
    }
}

fn make_vote(content_id: i64, kind: &str, score: f64) -> NewVote {
    NewVote {
        content_ref: ContentRef::parse("post", content_id).unwrap(),
        vote_kind: VoteKind::new(kind),
        score,
    }
}

// ============================================================================
// Profile Link Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_get_or_create_profile_link_returns_existing(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool.clone());
    let link = make_link(10, "project", 1, LinkLevel::OWNER);

    let first = repository.get_or_create_profile_link(&link).await.unwrap();
    let second = repository.get_or_create_profile_link(&link).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.record.id, second.record.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile_links")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_concurrent_get_or_create_inserts_once(pool: sqlx::PgPool) {
    let repository = Arc::new(PostgresAssociationsRepository::new(pool.clone()));
    let link = make_link(10, "project", 1, LinkLevel::OWNER);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let repository = repository.clone();
        let link = link.clone();
        handles.push(tokio::spawn(async move {
            repository.get_or_create_profile_link(&link).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().created {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile_links")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_update_profile_link(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);
    let link = repository
        .get_or_create_profile_link(&make_link(10, "project", 1, LinkLevel::OWNER))
        .await
        .unwrap()
        .record;

    let patch = ProfileLinkPatch {
        detail: Some("maintainer".to_string()),
        is_validated: Some(true),
    };
    let updated = repository
        .update_profile_link(link.id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.detail, "maintainer");
    assert!(updated.is_validated);
    assert_eq!(updated.level, LinkLevel::OWNER);

    let missing = repository.update_profile_link(link.id + 100, &patch).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_list_profile_links_filters(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);
    repository
        .get_or_create_profile_link(&make_link(10, "project", 1, LinkLevel::OWNER))
        .await
        .unwrap();
    repository
        .get_or_create_profile_link(&make_link(11, "project", 1, LinkLevel::CONTRIBUTOR))
        .await
        .unwrap();
    repository
        .get_or_create_profile_link(&make_link(10, "post", 4, LinkLevel::OWNER))
        .await
        .unwrap();

    let filter = ProfileLinkFilter {
        content_kind: Some(ContentKind::new("project").unwrap()),
        content_id: Some(1),
        ..Default::default()
    };
    let links = repository.list_profile_links(&filter).await.unwrap();
    assert_eq!(links.len(), 2);
    assert!(links[0].id > links[1].id);

    let filter = ProfileLinkFilter {
        profile_id: Some(10),
        level: Some(LinkLevel::OWNER),
        page: Page {
            limit: Some(1),
            offset: 0,
        },
        ..Default::default()
    };
    let links = repository.list_profile_links(&filter).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].content_ref.content_kind.as_str(), "post");
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_rank_linked_profiles(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);
    for link in [
        make_link(10, "project", 1, LinkLevel(30)),
        make_link(10, "project", 2, LinkLevel(30)),
        make_link(20, "project", 3, LinkLevel(30)),
        make_link(20, "project", 3, LinkLevel(31)),
        make_link(1, "project", 4, LinkLevel(30)),
    ] {
        repository.get_or_create_profile_link(&link).await.unwrap();
    }

    let mut request = RankingRequest {
        content_kind: ContentKind::new("project").unwrap(),
        levels: BTreeSet::from([LinkLevel(30)]),
        limit: None,
        excluded_profiles: BTreeSet::from([1]),
    };
    let ranked = repository.rank_linked_profiles(&request).await.unwrap();
    assert_eq!(
        ranked,
        vec![
            RankedProfile { profile_id: 10, score: 2 },
            RankedProfile { profile_id: 20, score: 1 },
        ]
    );

    request.limit = Some(1);
    let ranked = repository.rank_linked_profiles(&request).await.unwrap();
    assert_eq!(ranked, vec![RankedProfile { profile_id: 10, score: 2 }]);
}

// ============================================================================
// Vote Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_get_or_create_vote_keeps_first_score(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);

    let first = repository.get_or_create_vote(&make_vote(3, "like", 1.0)).await.unwrap();
    let second = repository.get_or_create_vote(&make_vote(3, "like", 5.0)).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.record.score, 1.0);

    let updated = repository
        .update_vote(first.record.id, &VotePatch { score: Some(4.0) })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.score, 4.0);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_vote_tally(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);
    repository.get_or_create_vote(&make_vote(3, "like", 1.5)).await.unwrap();
    repository.get_or_create_vote(&make_vote(3, "useful", 2.0)).await.unwrap();
    repository.get_or_create_vote(&make_vote(4, "like", 9.0)).await.unwrap();

    let tally = repository
        .vote_tally(&ContentRef::parse("post", 3).unwrap())
        .await
        .unwrap();
    assert_eq!(tally.votes, 2);
    assert_eq!(tally.score, 3.5);

    let empty = repository
        .vote_tally(&ContentRef::parse("post", 99).unwrap())
        .await
        .unwrap();
    assert_eq!(empty.votes, 0);
    assert_eq!(empty.score, 0.0);
}

// ============================================================================
// Maintenance Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_scan_and_delete_associations(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);
    for content_id in 1..=5 {
        repository
            .get_or_create_profile_link(&make_link(10, "project", content_id, LinkLevel::OWNER))
            .await
            .unwrap();
    }

    let first = repository
        .scan_associations(AssociationKind::ProfileLink, 0, 2)
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    let last_id = first[1].id();

    let rest = repository
        .scan_associations(AssociationKind::ProfileLink, last_id, 10)
        .await
        .unwrap();
    assert_eq!(rest.len(), 3);
    assert!(rest.iter().all(|r| r.id() > last_id));

    assert!(repository
        .delete_association(AssociationKind::ProfileLink, last_id)
        .await
        .unwrap());
    assert!(!repository
        .delete_association(AssociationKind::ProfileLink, last_id)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_content_kinds_in_use(pool: sqlx::PgPool) {
    let repository = PostgresAssociationsRepository::new(pool);
    assert!(repository.check_tables_created().await.unwrap());

    repository
        .get_or_create_profile_link(&make_link(10, "project", 1, LinkLevel::OWNER))
        .await
        .unwrap();
    repository
        .get_or_create_profile_link(&make_link(10, "post", 1, LinkLevel::OWNER))
        .await
        .unwrap();

    let kinds = repository
        .content_kinds_in_use(AssociationKind::ProfileLink)
        .await
        .unwrap();
    let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["post", "project"]);

    let vote_kinds = repository
        .content_kinds_in_use(AssociationKind::Vote)
        .await
        .unwrap();
    assert!(vote_kinds.is_empty());
}
