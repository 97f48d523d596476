//! Async session driver tests on a paused tokio clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use storyreel_core::error::PlaybackError;
use storyreel_core::ids::{AuthorId, EntityId, GroupId};
use storyreel_core::item::StoryItem;
use storyreel_playback::application::driver::{PlaybackHandle, PlaybackNotice, open_session};
use storyreel_playback::application::engine::RenderState;
use storyreel_playback::config::PlaybackConfig;
use storyreel_playback::domain::events::CloseReason;
use storyreel_playback::domain::intents::PlaybackIntent;
use storyreel_test_support::{
    FailingStoryActions, RecordingStoryActions, StaticStorySource, group_story, init_tracing, story,
};

fn source(items: Vec<StoryItem>, authors: &[AuthorId], groups: &[GroupId]) -> Arc<StaticStorySource> {
    Arc::new(StaticStorySource::new(
        items,
        common::follows(groups),
        common::directory(authors, groups),
    ))
}

/// Waits until the published snapshot satisfies `done`.
async fn wait_for<F>(handle: &mut PlaybackHandle, done: F) -> Option<RenderState>
where
    F: Fn(&Option<RenderState>) -> bool,
{
    let current = handle.snapshot();
    if done(&current) {
        return current;
    }
    loop {
        match handle.changed().await {
            Ok(state) if done(&state) => return state,
            Ok(_) => {}
            Err(_) => return handle.snapshot(),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_items_auto_advance_and_session_closes_when_exhausted() {
    // Arrange
    init_tracing();
    let viewer = AuthorId::new_v4();
    let first = story(viewer, 1);
    let second = story(viewer, 2);
    let actions = Arc::new(RecordingStoryActions::new());
    let (handle, task) = open_session(
        source(vec![first.clone(), second.clone()], &[], &[]),
        actions.clone(),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();
    assert_eq!(handle.snapshot().unwrap().active_item.id, first.id);

    // Act
    let summary = task.await.unwrap();

    // Assert
    assert_eq!(summary.close_reason, Some(CloseReason::Exhausted));
    assert_eq!(summary.items_marked_viewed, 2);
    assert_eq!(summary.session_id, handle.session_id());
    assert_eq!(handle.snapshot(), None);
    tokio::task::yield_now().await;
    assert_eq!(actions.viewed(), vec![first.id, second.id]);
}

#[tokio::test(start_paused = true)]
async fn test_item_stays_until_full_duration_elapses() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let first = story(viewer, 1);
    let second = story(viewer, 2);
    let (handle, _task) = open_session(
        source(vec![first.clone(), second.clone()], &[], &[]),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();

    // Act / Assert
    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(handle.snapshot().unwrap().active_item.id, first.id);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.snapshot().unwrap().active_item.id, second.id);
}

#[tokio::test(start_paused = true)]
async fn test_paused_session_does_not_auto_advance() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let first = story(viewer, 1);
    let second = story(viewer, 2);
    let (mut handle, _task) = open_session(
        source(vec![first.clone(), second.clone()], &[], &[]),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();

    // Act
    handle.send(PlaybackIntent::Pause).await.unwrap();
    wait_for(&mut handle, |state| state.as_ref().is_some_and(|s| s.paused)).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    // Assert
    let state = handle.snapshot().unwrap();
    assert_eq!(state.active_item.id, first.id);
    assert!(state.paused);

    handle.send(PlaybackIntent::Resume).await.unwrap();
    let state = wait_for(&mut handle, |state| {
        state.as_ref().is_some_and(|s| s.active_item.id == second.id)
    })
    .await;
    assert!(state.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_delete_own_story_moves_to_next_entity() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let friend = AuthorId::new_v4();
    let mine = story(viewer, 1);
    let theirs = story(friend, 2);
    let actions = Arc::new(RecordingStoryActions::new());
    let (mut handle, _task) = open_session(
        source(vec![mine.clone(), theirs.clone()], &[friend], &[]),
        actions.clone(),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();
    handle.send(PlaybackIntent::Pause).await.unwrap();

    // Act
    handle.send(PlaybackIntent::RequestDelete).await.unwrap();
    let state = wait_for(&mut handle, |state| {
        state
            .as_ref()
            .is_some_and(|s| s.active_entity == EntityId::Author(friend))
    })
    .await
    .unwrap();

    // Assert
    assert_eq!(actions.deleted(), vec![mine.id]);
    assert_eq!(state.active_item.id, theirs.id);
    assert_eq!(state.ordered_entity_ids, vec![EntityId::Author(friend)]);
    assert!(state.paused);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_deletion_is_reported_and_state_kept() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let mine = story(viewer, 1);
    let actions = Arc::new(RecordingStoryActions::new());
    actions.reject_deletions("moderation hold");
    let (mut handle, _task) = open_session(
        source(vec![mine.clone()], &[], &[]),
        actions,
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();
    handle.send(PlaybackIntent::Pause).await.unwrap();

    // Act
    handle.send(PlaybackIntent::RequestDelete).await.unwrap();
    let notice = handle.next_notice().await;

    // Assert
    assert_eq!(
        notice,
        Some(PlaybackNotice::DeletionRejected {
            item_id: mine.id,
            reason: "moderation hold".to_owned(),
        })
    );
    assert_eq!(handle.snapshot().unwrap().active_item.id, mine.id);
}

#[tokio::test(start_paused = true)]
async fn test_forbidden_delete_is_reported_as_rejected_intent() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let friend = AuthorId::new_v4();
    let theirs = story(friend, 1);
    let (mut handle, _task) = open_session(
        source(vec![theirs.clone()], &[friend], &[]),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(friend),
    )
    .await
    .unwrap();

    // Act
    handle.send(PlaybackIntent::RequestDelete).await.unwrap();

    // Assert
    assert_eq!(
        handle.next_notice().await,
        Some(PlaybackNotice::IntentRejected(
            PlaybackError::DeletionNotPermitted(theirs.id)
        ))
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_reply_is_reported() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let friend = AuthorId::new_v4();
    let (mut handle, _task) = open_session(
        source(vec![story(friend, 1)], &[friend], &[]),
        Arc::new(FailingStoryActions),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(friend),
    )
    .await
    .unwrap();

    // Act
    handle
        .send(PlaybackIntent::Reply("see you there".to_owned()))
        .await
        .unwrap();

    // Assert
    match handle.next_notice().await {
        Some(PlaybackNotice::ReplyFailed {
            target_author_id,
            reason,
        }) => {
            assert_eq!(target_author_id, friend);
            assert!(reason.contains("connection refused"));
        }
        other => panic!("expected ReplyFailed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_reply_reaches_collaborator() {
    let viewer = AuthorId::new_v4();
    let friend = AuthorId::new_v4();
    let actions = Arc::new(RecordingStoryActions::new());
    let (handle, task) = open_session(
        source(vec![story(friend, 1)], &[friend], &[]),
        actions.clone(),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(friend),
    )
    .await
    .unwrap();

    handle
        .send(PlaybackIntent::Reply(" love it ".to_owned()))
        .await
        .unwrap();
    handle.send(PlaybackIntent::Close).await.unwrap();
    let summary = task.await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(summary.close_reason, Some(CloseReason::Explicit));
    assert_eq!(actions.replies(), vec![(friend, "love it".to_owned())]);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_after_unfollow_skips_the_group() {
    // Arrange
    let viewer = AuthorId::new_v4();
    let friend = AuthorId::new_v4();
    let group = GroupId::new_v4();
    let personal = story(friend, 2);
    let source = source(
        vec![group_story(friend, group, 1), personal.clone()],
        &[friend],
        &[group],
    );
    let (mut handle, _task) = open_session(
        source.clone(),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Group(group),
    )
    .await
    .unwrap();
    handle.send(PlaybackIntent::Pause).await.unwrap();

    // Act
    source.set_followed_groups(common::follows(&[]));
    handle.refresh().await.unwrap();
    let state = wait_for(&mut handle, |state| {
        state
            .as_ref()
            .is_some_and(|s| s.active_entity == EntityId::Author(friend))
    })
    .await
    .unwrap();

    // Assert
    assert_eq!(state.active_item.id, personal.id);
    assert_eq!(state.ordered_entity_ids, vec![EntityId::Author(friend)]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_handle_closes_the_session() {
    let viewer = AuthorId::new_v4();
    let (handle, task) = open_session(
        source(vec![story(viewer, 1)], &[], &[]),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();

    drop(handle);
    let summary = task.await.unwrap();

    assert_eq!(summary.close_reason, Some(CloseReason::Explicit));
}

#[tokio::test(start_paused = true)]
async fn test_open_session_without_stories_fails() {
    let viewer = AuthorId::new_v4();

    let result = open_session(
        source(Vec::new(), &[], &[]),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await;

    assert_eq!(result.err(), Some(PlaybackError::EmptySession));
}

#[tokio::test(start_paused = true)]
async fn test_closed_session_rejects_further_intents() {
    let viewer = AuthorId::new_v4();
    let (handle, task) = open_session(
        source(vec![story(viewer, 1)], &[], &[]),
        Arc::new(RecordingStoryActions::new()),
        common::fixed_clock(),
        PlaybackConfig::default(),
        viewer,
        EntityId::Author(viewer),
    )
    .await
    .unwrap();

    handle.send(PlaybackIntent::Close).await.unwrap();
    task.await.unwrap();

    assert_eq!(
        handle.send(PlaybackIntent::Advance).await,
        Err(PlaybackError::SessionClosed)
    );
}
