//! Shared helpers for playback integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use storyreel_core::clock::Clock;
use storyreel_core::directory::{Directory, GroupRecord, ViewerContext};
use storyreel_core::ids::{AuthorId, EntityId, GroupId};
use storyreel_core::item::StoryItem;
use storyreel_playback::application::engine::StoryPlaybackEngine;
use storyreel_playback::config::PlaybackConfig;
use storyreel_test_support::{FixedClock, base_time};

/// Fixed clock shared by engine-level tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(base_time()))
}

/// A viewer who can resolve `authors` and follows `groups`.
pub fn viewer_context(viewer: AuthorId, authors: &[AuthorId], groups: &[GroupId]) -> ViewerContext {
    ViewerContext {
        viewer_id: viewer,
        directory: directory(authors, groups),
        followed_groups: groups.iter().copied().collect(),
    }
}

/// A directory listing `authors` and unmanaged `groups`.
pub fn directory(authors: &[AuthorId], groups: &[GroupId]) -> Directory {
    Directory {
        authors: authors.iter().copied().collect(),
        groups: groups
            .iter()
            .map(|group| (*group, GroupRecord::default()))
            .collect(),
    }
}

/// Follow set for `groups`.
pub fn follows(groups: &[GroupId]) -> HashSet<GroupId> {
    groups.iter().copied().collect()
}

/// Opens an engine with default configuration.
pub fn open_engine(
    context: ViewerContext,
    items: Vec<StoryItem>,
    start: EntityId,
) -> StoryPlaybackEngine {
    StoryPlaybackEngine::open(&PlaybackConfig::default(), context, items, start, fixed_clock())
        .unwrap()
}
