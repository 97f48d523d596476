//! Test collaborators: mock `StorySource` and `StoryActions` implementations.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use storyreel_core::collaborator::{StoryActions, StorySource};
use storyreel_core::directory::Directory;
use storyreel_core::error::PlaybackError;
use storyreel_core::ids::{AuthorId, GroupId, StoryItemId};
use storyreel_core::item::StoryItem;

/// A story source serving whatever the test last put into it. Items can be
/// replaced mid-session to simulate upstream changes.
#[derive(Debug)]
pub struct StaticStorySource {
    items: Mutex<Vec<StoryItem>>,
    followed_groups: Mutex<HashSet<GroupId>>,
    directory: Mutex<Directory>,
}

impl StaticStorySource {
    /// Creates a source with the given items, follows and directory.
    #[must_use]
    pub fn new(
        items: Vec<StoryItem>,
        followed_groups: HashSet<GroupId>,
        directory: Directory,
    ) -> Self {
        Self {
            items: Mutex::new(items),
            followed_groups: Mutex::new(followed_groups),
            directory: Mutex::new(directory),
        }
    }

    /// Replaces the served items.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_items(&self, items: Vec<StoryItem>) {
        *self.items.lock().unwrap() = items;
    }

    /// Replaces the served follow set.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_followed_groups(&self, groups: HashSet<GroupId>) {
        *self.followed_groups.lock().unwrap() = groups;
    }
}

#[async_trait]
impl StorySource for StaticStorySource {
    async fn resolve_eligible_items(&self) -> Result<Vec<StoryItem>, PlaybackError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn resolve_entity_follow_state(
        &self,
        _viewer_id: AuthorId,
    ) -> Result<HashSet<GroupId>, PlaybackError> {
        Ok(self.followed_groups.lock().unwrap().clone())
    }

    async fn resolve_directory(&self, _viewer_id: AuthorId) -> Result<Directory, PlaybackError> {
        Ok(self.directory.lock().unwrap().clone())
    }
}

/// Story actions that record every call and succeed, unless a deletion
/// rejection has been configured.
#[derive(Debug, Default)]
pub struct RecordingStoryActions {
    viewed: Mutex<Vec<StoryItemId>>,
    deleted: Mutex<Vec<StoryItemId>>,
    replies: Mutex<Vec<(AuthorId, String)>>,
    reject_deletions: Mutex<Option<String>>,
}

impl RecordingStoryActions {
    /// Creates actions that accept everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `delete_item` fail with `reason`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn reject_deletions(&self, reason: &str) {
        *self.reject_deletions.lock().unwrap() = Some(reason.to_owned());
    }

    /// Items passed to `mark_viewed`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn viewed(&self) -> Vec<StoryItemId> {
        self.viewed.lock().unwrap().clone()
    }

    /// Items passed to `delete_item`, in call order, including rejected ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted(&self) -> Vec<StoryItemId> {
        self.deleted.lock().unwrap().clone()
    }

    /// Replies passed to `submit_reply`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn replies(&self) -> Vec<(AuthorId, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryActions for RecordingStoryActions {
    async fn mark_viewed(&self, item_id: StoryItemId) -> Result<(), PlaybackError> {
        self.viewed.lock().unwrap().push(item_id);
        Ok(())
    }

    async fn delete_item(&self, item_id: StoryItemId) -> Result<(), PlaybackError> {
        self.deleted.lock().unwrap().push(item_id);
        match self.reject_deletions.lock().unwrap().clone() {
            Some(reason) => Err(PlaybackError::DeletionRejected { item_id, reason }),
            None => Ok(()),
        }
    }

    async fn submit_reply(
        &self,
        target_author_id: AuthorId,
        text: &str,
    ) -> Result<(), PlaybackError> {
        self.replies
            .lock()
            .unwrap()
            .push((target_author_id, text.to_owned()));
        Ok(())
    }
}

/// Story actions that always fail. Useful for testing that remote failures
/// leave local state alone.
#[derive(Debug)]
pub struct FailingStoryActions;

#[async_trait]
impl StoryActions for FailingStoryActions {
    async fn mark_viewed(&self, _item_id: StoryItemId) -> Result<(), PlaybackError> {
        Err(PlaybackError::Collaborator("connection refused".into()))
    }

    async fn delete_item(&self, _item_id: StoryItemId) -> Result<(), PlaybackError> {
        Err(PlaybackError::Collaborator("connection refused".into()))
    }

    async fn submit_reply(
        &self,
        _target_author_id: AuthorId,
        _text: &str,
    ) -> Result<(), PlaybackError> {
        Err(PlaybackError::Collaborator("connection refused".into()))
    }
}
