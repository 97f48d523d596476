//! Capability contracts of the systems surrounding playback.
//!
//! Persistence, authorization and transport live behind these traits. The
//! playback engine never awaits them directly; the session driver does.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::directory::Directory;
use crate::error::PlaybackError;
use crate::ids::{AuthorId, GroupId, StoryItemId};
use crate::item::StoryItem;

/// Read side: where story items and eligibility data come from.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Current ephemeral items, already filtered by access rules.
    async fn resolve_eligible_items(&self) -> Result<Vec<StoryItem>, PlaybackError>;

    /// Groups `viewer_id` currently follows.
    async fn resolve_entity_follow_state(
        &self,
        viewer_id: AuthorId,
    ) -> Result<HashSet<GroupId>, PlaybackError>;

    /// Author profiles and groups that `viewer_id` can resolve.
    async fn resolve_directory(&self, viewer_id: AuthorId) -> Result<Directory, PlaybackError>;
}

/// Write side: effects the engine asks the outside world to perform.
#[async_trait]
pub trait StoryActions: Send + Sync {
    /// Persists a "viewed" mark. At-least-once delivery is acceptable.
    async fn mark_viewed(&self, item_id: StoryItemId) -> Result<(), PlaybackError>;

    /// Deletes an item. An `Err` means the deletion was rejected.
    async fn delete_item(&self, item_id: StoryItemId) -> Result<(), PlaybackError>;

    /// Sends a direct reply to the author of a story.
    async fn submit_reply(&self, target_author_id: AuthorId, text: &str)
    -> Result<(), PlaybackError>;
}
