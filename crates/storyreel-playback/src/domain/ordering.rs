//! Session ordering: which entity plays after which.
//!
//! The order is fixed once at session open. Precedence, highest first:
//!
//! 1. the entity the viewer opened,
//! 2. the viewer's own entity,
//! 3. entities with at least one unviewed item (when enabled),
//! 4. freshest latest item first.
//!
//! Remaining ties fall back to the entity key so the order is total.

use std::cmp::Ordering;

use storyreel_core::ids::EntityId;

use super::grouping::{BucketMap, EntityBucket};

/// Tunable part of the ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingPolicy {
    /// Rank entities with unviewed items ahead of fully viewed ones.
    pub unviewed_first: bool,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            unviewed_first: true,
        }
    }
}

/// Orders the keys of `buckets` for a session opened on `start`.
///
/// `own` is the viewer's own entity and `has_unviewed` answers rule 3 per
/// entity. If `start` has no bucket it simply does not appear; callers treat
/// that as an unplayable session.
#[must_use]
pub fn order_session<F>(
    buckets: &BucketMap,
    start: EntityId,
    own: EntityId,
    has_unviewed: F,
    policy: OrderingPolicy,
) -> Vec<EntityId>
where
    F: Fn(&EntityBucket) -> bool,
{
    let mut ranked: Vec<(&EntityBucket, bool)> = buckets
        .values()
        .map(|bucket| (bucket, has_unviewed(bucket)))
        .collect();

    ranked.sort_by(|(a, a_unviewed), (b, b_unviewed)| {
        pinned_rank(a.entity(), start, own)
            .cmp(&pinned_rank(b.entity(), start, own))
            .then_with(|| {
                if policy.unviewed_first {
                    b_unviewed.cmp(a_unviewed)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| b.latest_created_at().cmp(&a.latest_created_at()))
            .then_with(|| a.entity().cmp(&b.entity()))
    });

    ranked.into_iter().map(|(bucket, _)| bucket.entity()).collect()
}

fn pinned_rank(entity: EntityId, start: EntityId, own: EntityId) -> u8 {
    if entity == start {
        0
    } else if entity == own {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_core::ids::{AuthorId, GroupId};
    use storyreel_core::item::StoryItem;
    use storyreel_test_support::{group_story, story};

    fn buckets(items: Vec<StoryItem>) -> BucketMap {
        let mut grouped: std::collections::BTreeMap<EntityId, Vec<StoryItem>> =
            std::collections::BTreeMap::new();
        for item in items {
            grouped.entry(item.owner()).or_default().push(item);
        }
        grouped
            .into_iter()
            .map(|(entity, items)| (entity, EntityBucket::new(entity, items).unwrap()))
            .collect()
    }

    #[test]
    fn test_start_entity_sorts_first_even_when_stale_and_viewed() {
        // Arrange
        let viewer = AuthorId::new_v4();
        let old = AuthorId::new_v4();
        let fresh = AuthorId::new_v4();
        let map = buckets(vec![
            story(old, 1).with_viewers([viewer]),
            story(fresh, 60),
            story(viewer, 30),
        ]);

        // Act
        let order = order_session(
            &map,
            EntityId::Author(old),
            EntityId::Author(viewer),
            |bucket| bucket.has_unviewed(viewer),
            OrderingPolicy::default(),
        );

        // Assert
        assert_eq!(
            order,
            vec![
                EntityId::Author(old),
                EntityId::Author(viewer),
                EntityId::Author(fresh)
            ]
        );
    }

    #[test]
    fn test_own_entity_beats_unviewed_and_fresher_entities() {
        // Arrange
        let viewer = AuthorId::new_v4();
        let start = AuthorId::new_v4();
        let other = AuthorId::new_v4();
        let map = buckets(vec![
            story(start, 1),
            story(other, 90),
            story(viewer, 2).with_viewers([viewer]),
        ]);

        // Act
        let order = order_session(
            &map,
            EntityId::Author(start),
            EntityId::Author(viewer),
            |bucket| bucket.has_unviewed(viewer),
            OrderingPolicy::default(),
        );

        // Assert
        assert_eq!(order[1], EntityId::Author(viewer));
    }

    #[test]
    fn test_unviewed_entities_precede_viewed_ones_regardless_of_recency() {
        // Arrange
        let viewer = AuthorId::new_v4();
        let start = AuthorId::new_v4();
        let seen_fresh = AuthorId::new_v4();
        let unseen_old = GroupId::new_v4();
        let map = buckets(vec![
            story(start, 0),
            story(seen_fresh, 100).with_viewers([viewer]),
            group_story(seen_fresh, unseen_old, 3),
        ]);

        // Act
        let order = order_session(
            &map,
            EntityId::Author(start),
            EntityId::Author(viewer),
            |bucket| bucket.has_unviewed(viewer),
            OrderingPolicy::default(),
        );

        // Assert
        assert_eq!(
            order,
            vec![
                EntityId::Author(start),
                EntityId::Group(unseen_old),
                EntityId::Author(seen_fresh)
            ]
        );
    }

    #[test]
    fn test_recency_only_when_unviewed_rule_disabled() {
        // Arrange
        let viewer = AuthorId::new_v4();
        let start = AuthorId::new_v4();
        let seen_fresh = AuthorId::new_v4();
        let unseen_old = AuthorId::new_v4();
        let map = buckets(vec![
            story(start, 0),
            story(seen_fresh, 100).with_viewers([viewer]),
            story(unseen_old, 3),
        ]);

        // Act
        let order = order_session(
            &map,
            EntityId::Author(start),
            EntityId::Author(viewer),
            |bucket| bucket.has_unviewed(viewer),
            OrderingPolicy {
                unviewed_first: false,
            },
        );

        // Assert
        assert_eq!(order[1], EntityId::Author(seen_fresh));
        assert_eq!(order[2], EntityId::Author(unseen_old));
    }

    #[test]
    fn test_recency_uses_latest_item_in_bucket() {
        // Arrange
        let viewer = AuthorId::new_v4();
        let start = AuthorId::new_v4();
        let busy = AuthorId::new_v4();
        let single = AuthorId::new_v4();
        let map = buckets(vec![
            story(start, 0),
            story(busy, 1),
            story(busy, 50),
            story(single, 40),
        ]);

        // Act
        let order = order_session(
            &map,
            EntityId::Author(start),
            EntityId::Author(viewer),
            |bucket| bucket.has_unviewed(viewer),
            OrderingPolicy::default(),
        );

        // Assert
        assert_eq!(order[1], EntityId::Author(busy));
        assert_eq!(order[2], EntityId::Author(single));
    }

    #[test]
    fn test_missing_start_entity_is_absent_from_order() {
        let viewer = AuthorId::new_v4();
        let map = buckets(vec![story(AuthorId::new_v4(), 1)]);
        let missing = EntityId::Author(AuthorId::new_v4());

        let order = order_session(
            &map,
            missing,
            EntityId::Author(viewer),
            |bucket| bucket.has_unviewed(viewer),
            OrderingPolicy::default(),
        );

        assert_eq!(order.len(), 1);
        assert!(!order.contains(&missing));
    }
}
