//! The ephemeral story item model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AuthorId, EntityId, GroupId, StoryItemId};

/// Media carried by a story item. Opaque to playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryContent {
    /// A still image.
    Image {
        /// Location of the image.
        url: String,
    },
    /// A video clip.
    Video {
        /// Location of the clip.
        url: String,
    },
    /// Plain text on a background.
    Text {
        /// The text shown.
        body: String,
    },
}

/// A single ephemeral post.
///
/// Everything except `viewed_by` is fixed at creation. `viewed_by` only
/// grows; there is no way to remove a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    /// Item identifier.
    pub id: StoryItemId,
    /// The author who posted the item.
    pub author_id: AuthorId,
    /// The group the item was posted into, if any.
    pub group_id: Option<GroupId>,
    /// Creation time, used for bucket order and recency ranking.
    pub created_at: DateTime<Utc>,
    /// Viewers who have seen this item.
    viewed_by: BTreeSet<AuthorId>,
    /// The displayed media.
    pub content: StoryContent,
}

impl StoryItem {
    /// Creates an item that nobody has viewed yet.
    #[must_use]
    pub fn new(
        id: StoryItemId,
        author_id: AuthorId,
        group_id: Option<GroupId>,
        created_at: DateTime<Utc>,
        content: StoryContent,
    ) -> Self {
        Self {
            id,
            author_id,
            group_id,
            created_at,
            viewed_by: BTreeSet::new(),
            content,
        }
    }

    /// Returns the item with the given viewers already recorded.
    #[must_use]
    pub fn with_viewers(mut self, viewers: impl IntoIterator<Item = AuthorId>) -> Self {
        self.viewed_by.extend(viewers);
        self
    }

    /// The entity this item is played under: its group when posted into
    /// one, otherwise its author.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        match self.group_id {
            Some(group_id) => EntityId::Group(group_id),
            None => EntityId::Author(self.author_id),
        }
    }

    /// Viewers recorded against this item.
    #[must_use]
    pub fn viewed_by(&self) -> &BTreeSet<AuthorId> {
        &self.viewed_by
    }

    /// Whether `viewer` has seen this item.
    #[must_use]
    pub fn is_viewed_by(&self, viewer: AuthorId) -> bool {
        self.viewed_by.contains(&viewer)
    }

    /// Records `viewer` against this item. Returns `false` if already present.
    pub fn mark_viewed_by(&mut self, viewer: AuthorId) -> bool {
        self.viewed_by.insert(viewer)
    }

    /// Unions another copy's viewers into this one.
    pub fn merge_viewers(&mut self, other: &BTreeSet<AuthorId>) {
        self.viewed_by.extend(other.iter().copied());
    }
}
