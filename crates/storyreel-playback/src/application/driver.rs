//! Async session driver.
//!
//! One tokio task owns the [`StoryPlaybackEngine`] for the lifetime of a
//! session. It takes messages one at a time, sleeps until the armed
//! countdown expires, and dispatches collaborator effects as detached
//! tasks so that the engine never waits on them.

use std::sync::Arc;

use storyreel_core::clock::Clock;
use storyreel_core::collaborator::{StoryActions, StorySource};
use storyreel_core::directory::ViewerContext;
use storyreel_core::error::PlaybackError;
use storyreel_core::ids::{AuthorId, EntityId, SessionId, StoryItemId};
use storyreel_core::item::StoryItem;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::engine::{PlaybackEffect, RenderState, SessionSummary, StoryPlaybackEngine};
use crate::config::PlaybackConfig;
use crate::domain::intents::PlaybackIntent;
use crate::domain::timer::TimerTicket;

const INTENT_BUFFER: usize = 32;

/// Something the presentation layer should tell the viewer about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackNotice {
    /// A requested deletion was refused.
    DeletionRejected {
        /// The item that was not deleted.
        item_id: StoryItemId,
        /// Reason given by the collaborator.
        reason: String,
    },
    /// A reply could not be delivered.
    ReplyFailed {
        /// Intended recipient.
        target_author_id: AuthorId,
        /// Failure description.
        reason: String,
    },
    /// An intent was refused by the engine.
    IntentRejected(PlaybackError),
}

/// Messages processed by the session task.
#[derive(Debug)]
enum SessionMessage {
    Intent(PlaybackIntent, Uuid),
    Refresh,
}

/// Results of detached effects flowing back into the session.
#[derive(Debug)]
enum EffectOutcome {
    Deletion(StoryItemId, Result<(), PlaybackError>),
}

/// Presentation-side handle to a running session.
#[derive(Debug)]
pub struct PlaybackHandle {
    session_id: SessionId,
    intents: mpsc::Sender<SessionMessage>,
    render: watch::Receiver<Option<RenderState>>,
    notices: mpsc::UnboundedReceiver<PlaybackNotice>,
}

impl PlaybackHandle {
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Queues `intent` behind everything already sent.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` if the session task has ended.
    pub async fn send(&self, intent: PlaybackIntent) -> Result<(), PlaybackError> {
        self.intents
            .send(SessionMessage::Intent(intent, Uuid::new_v4()))
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// Asks the session to re-read its source after an upstream change.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` if the session task has ended.
    pub async fn refresh(&self) -> Result<(), PlaybackError> {
        self.intents
            .send(SessionMessage::Refresh)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// Latest render snapshot; `None` once closed.
    #[must_use]
    pub fn snapshot(&self) -> Option<RenderState> {
        self.render.borrow().clone()
    }

    /// Waits for the next snapshot change.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` if the session task has ended
    /// and no further change will arrive.
    pub async fn changed(&mut self) -> Result<Option<RenderState>, PlaybackError> {
        self.render
            .changed()
            .await
            .map_err(|_| PlaybackError::SessionClosed)?;
        Ok(self.render.borrow_and_update().clone())
    }

    /// Next user-visible notice, or `None` after the session ended.
    pub async fn next_notice(&mut self) -> Option<PlaybackNotice> {
        self.notices.recv().await
    }

    /// Returns a pending notice without waiting.
    pub fn try_notice(&mut self) -> Option<PlaybackNotice> {
        self.notices.try_recv().ok()
    }
}

/// Resolves the viewer's stories from `source` and starts a session on
/// `start`.
///
/// # Errors
///
/// Returns the source's error if resolution fails, or
/// `PlaybackError::EmptySession` / `PlaybackError::StartEntityUnavailable`
/// when nothing can be played.
pub async fn open_session(
    source: Arc<dyn StorySource>,
    actions: Arc<dyn StoryActions>,
    clock: Arc<dyn Clock>,
    config: PlaybackConfig,
    viewer_id: AuthorId,
    start: EntityId,
) -> Result<(PlaybackHandle, JoinHandle<SessionSummary>), PlaybackError> {
    let (items, context) = resolve(source.as_ref(), viewer_id).await?;
    let engine = StoryPlaybackEngine::open(&config, context, items, start, clock)?;
    let session_id = engine.id();

    let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
    let (render_tx, render_rx) = watch::channel(engine.snapshot());
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    let session = SessionTask {
        engine,
        source,
        actions,
        viewer_id,
        render: render_tx,
        notices: notice_tx,
        armed: None,
    };
    let task = tokio::spawn(session.run(intent_rx));

    Ok((
        PlaybackHandle {
            session_id,
            intents: intent_tx,
            render: render_rx,
            notices: notice_rx,
        },
        task,
    ))
}

async fn resolve(
    source: &dyn StorySource,
    viewer_id: AuthorId,
) -> Result<(Vec<StoryItem>, ViewerContext), PlaybackError> {
    let items = source.resolve_eligible_items().await?;
    let followed_groups = source.resolve_entity_follow_state(viewer_id).await?;
    let directory = source.resolve_directory(viewer_id).await?;
    Ok((
        items,
        ViewerContext {
            viewer_id,
            directory,
            followed_groups,
        },
    ))
}

struct SessionTask {
    engine: StoryPlaybackEngine,
    source: Arc<dyn StorySource>,
    actions: Arc<dyn StoryActions>,
    viewer_id: AuthorId,
    render: watch::Sender<Option<RenderState>>,
    notices: mpsc::UnboundedSender<PlaybackNotice>,
    armed: Option<(TimerTicket, Instant)>,
}

impl SessionTask {
    #[instrument(skip_all, fields(session_id = %self.engine.id()))]
    async fn run(mut self, mut intents: mpsc::Receiver<SessionMessage>) -> SessionSummary {
        let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
        self.after_transition(&outcome_tx);

        while !self.engine.is_closed() {
            let deadline = self.armed.map(|(_, deadline)| deadline);
            tokio::select! {
                message = intents.recv() => match message {
                    Some(SessionMessage::Intent(intent, correlation_id)) => {
                        if let Err(error) = self.engine.dispatch(intent, correlation_id) {
                            debug!(%error, "intent rejected");
                            let _ = self.notices.send(PlaybackNotice::IntentRejected(error));
                        }
                    }
                    Some(SessionMessage::Refresh) => self.refresh().await,
                    None => {
                        debug!("handle dropped, closing session");
                        let _ = self.engine.close();
                    }
                },
                Some(outcome) = outcomes.recv() => match outcome {
                    EffectOutcome::Deletion(item_id, result) => {
                        if let Err(PlaybackError::DeletionRejected { item_id, reason }) =
                            self.engine.deletion_resolved(item_id, result)
                        {
                            let _ = self
                                .notices
                                .send(PlaybackNotice::DeletionRejected { item_id, reason });
                        }
                    }
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((ticket, _)) = self.armed.take() {
                        if let Err(error) = self.engine.handle_timer_fired(ticket) {
                            debug!(%error, epoch = ticket.epoch, "timer fire discarded");
                        }
                    }
                }
            }
            self.after_transition(&outcome_tx);
        }

        let summary = self.engine.summary();
        debug!(?summary, "session task finished");
        summary
    }

    async fn refresh(&mut self) {
        match resolve(self.source.as_ref(), self.viewer_id).await {
            Ok((items, context)) => self.engine.refresh(items, context),
            Err(error) => warn!(%error, "refresh failed, keeping current session state"),
        }
    }

    /// Publishes the new snapshot, re-syncs the countdown and launches
    /// queued effects.
    fn after_transition(&mut self, outcomes: &mpsc::UnboundedSender<EffectOutcome>) {
        let armed = self.engine.armed_ticket();
        let tracked_epoch = self.armed.map(|(ticket, _)| ticket.epoch);
        self.armed = match armed {
            Some(ticket) if Some(ticket.epoch) == tracked_epoch => {
                self.armed.map(|(_, deadline)| (ticket, deadline))
            }
            Some(ticket) => Some((ticket, Instant::now() + self.engine.item_duration())),
            None => None,
        };

        for event in self.engine.take_events() {
            debug!(
                event_type = event.kind.event_type(),
                sequence = event.metadata.sequence_number,
                "playback event"
            );
        }

        for effect in self.engine.take_effects() {
            self.spawn_effect(effect, outcomes.clone());
        }

        self.render.send_replace(self.engine.snapshot());
    }

    fn spawn_effect(
        &self,
        effect: PlaybackEffect,
        outcomes: mpsc::UnboundedSender<EffectOutcome>,
    ) {
        let actions = Arc::clone(&self.actions);
        match effect {
            PlaybackEffect::MarkViewed(item_id) => {
                tokio::spawn(async move {
                    if let Err(error) = actions.mark_viewed(item_id).await {
                        warn!(%item_id, %error, "mark viewed failed");
                    }
                });
            }
            PlaybackEffect::Delete(item_id) => {
                tokio::spawn(async move {
                    let result = actions.delete_item(item_id).await;
                    let _ = outcomes.send(EffectOutcome::Deletion(item_id, result));
                });
            }
            PlaybackEffect::Reply {
                target_author_id,
                text,
                ..
            } => {
                let notices = self.notices.clone();
                tokio::spawn(async move {
                    if let Err(error) = actions.submit_reply(target_author_id, &text).await {
                        warn!(%target_author_id, %error, "reply failed");
                        let _ = notices.send(PlaybackNotice::ReplyFailed {
                            target_author_id,
                            reason: error.to_string(),
                        });
                    }
                });
            }
        }
    }
}
