//! Best-linked-profiles aggregation over an in-memory set of links.
//!
//! The PostgreSQL repository computes the same ranking in SQL; this function is
//! the reference used by the in-memory repository and by tests.
use crate::types::{ProfileId, ProfileLink, RankedProfile, RankingRequest};
use std::collections::BTreeMap;

/// Ranks profiles by the number of links they hold to entities of the requested kind.
///
/// Links are filtered by kind and level, counted per profile, ordered by score
/// descending with ties broken by ascending profile id, and only then truncated
/// to `limit`. Profiles without a matching link never appear.
pub fn rank_profile_links<'a, I>(links: I, request: &RankingRequest) -> Vec<RankedProfile>
where
    I: IntoIterator<Item = &'a ProfileLink>,
{
    let mut counts: BTreeMap<ProfileId, i64> = BTreeMap::new();
    for link in links {
        if link.content_ref.content_kind != request.content_kind
            || !request.levels.contains(&link.level)
            || request.excluded_profiles.contains(&link.profile_id)
        {
            continue;
        }
        *counts.entry(link.profile_id).or_default() += 1;
    }

    let mut ranked: Vec<RankedProfile> = counts
        .into_iter()
        .map(|(profile_id, score)| RankedProfile { profile_id, score })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.profile_id.cmp(&b.profile_id)));

    if let Some(limit) = request.limit {
        ranked.truncate(limit);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentKind, ContentRef, LinkLevel};
    use std::collections::BTreeSet;
    use time::macros::datetime;

    fn link(id: i64, profile_id: ProfileId, kind: &str, content_id: i64, level: i32) -> ProfileLink {
        ProfileLink {
            id,
            profile_id,
            content_ref: ContentRef::parse(kind, content_id).unwrap(),
            level: LinkLevel(level),
            detail: String::new(),
            is_validated: false,
            created_on: datetime!(2024-01-01 0:00 UTC),
        }
    }

    fn request(levels: &[i32], limit: Option<usize>) -> RankingRequest {
        RankingRequest {
            content_kind: ContentKind::new("project").unwrap(),
            levels: levels.iter().copied().map(LinkLevel).collect(),
            limit,
            excluded_profiles: BTreeSet::new(),
        }
    }

    const A: ProfileId = 10;
    const B: ProfileId = 20;

    fn sample_links() -> Vec<ProfileLink> {
        vec![
            link(1, A, "project", 1, 30),
            link(2, A, "project", 2, 30),
            link(3, B, "project", 3, 30),
            link(4, B, "project", 3, 31),
        ]
    }

    #[test]
    fn test_rank_counts_matching_levels_only() {
        let ranked = rank_profile_links(&sample_links(), &request(&[30], None));
        assert_eq!(
            ranked,
            vec![
                RankedProfile { profile_id: A, score: 2 },
                RankedProfile { profile_id: B, score: 1 },
            ]
        );
    }

    #[test]
    fn test_rank_truncates_after_aggregation() {
        let ranked = rank_profile_links(&sample_links(), &request(&[30], Some(1)));
        assert_eq!(ranked, vec![RankedProfile { profile_id: A, score: 2 }]);
    }

    #[test]
    fn test_rank_breaks_ties_by_profile_id() {
        let links = vec![
            link(1, 7, "project", 1, 30),
            link(2, 3, "project", 2, 30),
            link(3, 5, "project", 3, 30),
        ];
        let first = rank_profile_links(&links, &request(&[30], None));
        let reversed: Vec<ProfileLink> = links.into_iter().rev().collect();
        let second = rank_profile_links(&reversed, &request(&[30], None));

        let ids: Vec<ProfileId> = first.iter().map(|r| r.profile_id).collect();
        assert_eq!(ids, vec![3, 5, 7]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_ignores_other_kinds_and_excluded_profiles() {
        let mut links = sample_links();
        links.push(link(5, B, "post", 9, 30));
        links.push(link(6, 1, "project", 4, 30));

        let mut req = request(&[30], None);
        req.excluded_profiles.insert(1);

        let ranked = rank_profile_links(&links, &req);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.profile_id != 1));
        assert_eq!(ranked[1], RankedProfile { profile_id: B, score: 1 });
    }

    #[test]
    fn test_rank_with_no_levels_is_empty() {
        let ranked = rank_profile_links(&sample_links(), &request(&[], None));
        assert!(ranked.is_empty());
    }
}
