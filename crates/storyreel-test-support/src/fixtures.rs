//! Story item fixtures.

use chrono::{DateTime, TimeZone, Utc};
use storyreel_core::ids::{AuthorId, GroupId, StoryItemId};
use storyreel_core::item::{StoryContent, StoryItem};

/// Fixed timestamp shared by fixtures and tests.
///
/// # Panics
///
/// Never in practice; the date is valid.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// `base_time()` shifted by `minutes`.
#[must_use]
pub fn minutes_after(minutes: i64) -> DateTime<Utc> {
    base_time() + chrono::Duration::minutes(minutes)
}

/// A text story by `author`, created `minutes` after `base_time()`.
#[must_use]
pub fn story(author: AuthorId, minutes: i64) -> StoryItem {
    StoryItem::new(
        StoryItemId::new_v4(),
        author,
        None,
        minutes_after(minutes),
        StoryContent::Text {
            body: format!("story at +{minutes}m"),
        },
    )
}

/// An image story by `author` posted into `group`.
#[must_use]
pub fn group_story(author: AuthorId, group: GroupId, minutes: i64) -> StoryItem {
    StoryItem::new(
        StoryItemId::new_v4(),
        author,
        Some(group),
        minutes_after(minutes),
        StoryContent::Image {
            url: format!("https://cdn.example/{group}/{minutes}.jpg"),
        },
    )
}
