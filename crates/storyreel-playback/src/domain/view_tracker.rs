//! Once-per-pair "viewed" bookkeeping.

use std::collections::HashSet;

use storyreel_core::ids::{AuthorId, StoryItemId};
use storyreel_core::item::StoryItem;

/// Decides when an activation should produce a "mark viewed" effect.
#[derive(Debug, Default)]
pub struct ViewTracker {
    seen: HashSet<(AuthorId, StoryItemId)>,
}

impl ViewTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called whenever `item` becomes the active item for `viewer`.
    ///
    /// Returns `true` exactly once per `(viewer, item)` pair, and only when
    /// the viewer was not already in `viewed_by`. On `true` the viewer has
    /// been added to `viewed_by` locally.
    pub fn observe(&mut self, viewer: AuthorId, item: &mut StoryItem) -> bool {
        if !self.seen.insert((viewer, item.id)) {
            return false;
        }
        item.mark_viewed_by(viewer)
    }
}
