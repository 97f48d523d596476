//! Entity grouping: raw story items into per-entity buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use storyreel_core::directory::ViewerContext;
use storyreel_core::ids::{AuthorId, EntityId, StoryItemId};
use storyreel_core::item::StoryItem;

/// The time-ordered stories of one entity.
///
/// Constructed non-empty. Removal can drain it, and the engine drops a
/// drained bucket before anyone else can observe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBucket {
    entity: EntityId,
    items: Vec<StoryItem>,
}

impl EntityBucket {
    /// Builds a bucket sorted ascending by `created_at`, or `None` when
    /// `items` is empty.
    #[must_use]
    pub fn new(entity: EntityId, mut items: Vec<StoryItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Some(Self { entity, items })
    }

    /// The owning entity.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Items, oldest first.
    #[must_use]
    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StoryItem> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut StoryItem> {
        self.items.get_mut(index)
    }

    /// Index of the item with `id`.
    #[must_use]
    pub fn position_of(&self, id: StoryItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Creation time of the freshest item.
    #[must_use]
    pub fn latest_created_at(&self) -> Option<DateTime<Utc>> {
        self.items.last().map(|item| item.created_at)
    }

    /// Whether any item lacks `viewer` in its `viewed_by`.
    #[must_use]
    pub fn has_unviewed(&self, viewer: AuthorId) -> bool {
        self.items.iter().any(|item| !item.is_viewed_by(viewer))
    }

    /// Removes the item with `id`, returning its former index.
    pub(crate) fn remove(&mut self, id: StoryItemId) -> Option<(usize, StoryItem)> {
        let index = self.position_of(id)?;
        Some((index, self.items.remove(index)))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the contents with `fresh`, keeping viewers already recorded
    /// locally for items that survive.
    pub(crate) fn merge_from(&mut self, fresh: EntityBucket) {
        let mut merged = fresh.items;
        for item in &mut merged {
            if let Some(local) = self.items.iter().find(|local| local.id == item.id) {
                item.merge_viewers(local.viewed_by());
            }
        }
        self.items = merged;
    }
}

/// Buckets keyed by entity.
pub type BucketMap = BTreeMap<EntityId, EntityBucket>;

/// Groups `items` by owning entity, keeping only entities eligible for the
/// viewer. Entities without items are never materialized.
#[must_use]
pub fn group_by_entity<I>(items: I, context: &ViewerContext) -> BucketMap
where
    I: IntoIterator<Item = StoryItem>,
{
    let mut grouped: BTreeMap<EntityId, Vec<StoryItem>> = BTreeMap::new();
    for item in items {
        let owner = item.owner();
        if context.is_eligible(&owner) {
            grouped.entry(owner).or_default().push(item);
        }
    }

    grouped
        .into_iter()
        .filter_map(|(entity, items)| EntityBucket::new(entity, items).map(|b| (entity, b)))
        .collect()
}
