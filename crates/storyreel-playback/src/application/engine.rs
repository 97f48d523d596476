//! The story playback engine.
//!
//! Wires grouping, ordering, the cursor, the auto-advance timer and the view
//! tracker into one session object. The engine is synchronous and owns all
//! session state; it never awaits a collaborator. Side effects are queued as
//! [`PlaybackEffect`]s and observable changes as [`PlaybackEvent`]s, both
//! drained by the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use storyreel_core::clock::Clock;
use storyreel_core::directory::ViewerContext;
use storyreel_core::error::PlaybackError;
use storyreel_core::event::EventMetadata;
use storyreel_core::ids::{AuthorId, EntityId, SessionId, StoryItemId};
use storyreel_core::item::StoryItem;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PlaybackConfig;
use crate::domain::cursor::{PlaybackCursor, Position, Step};
use crate::domain::events::{
    CloseReason, EntityDropped, ItemActivated, ItemMarkedViewed, ItemRemoved, PlaybackEvent,
    PlaybackEventKind, ReplyRequested, SessionClosed, SessionOpened,
};
use crate::domain::grouping::{BucketMap, EntityBucket, group_by_entity};
use crate::domain::intents::PlaybackIntent;
use crate::domain::ordering::order_session;
use crate::domain::timer::{AutoAdvanceTimer, TimerTicket};
use crate::domain::view_tracker::ViewTracker;

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderState {
    /// The session.
    pub session_id: SessionId,
    /// Entity currently playing.
    pub active_entity: EntityId,
    /// Item currently playing.
    pub active_item: StoryItem,
    /// Session order.
    pub ordered_entity_ids: Vec<EntityId>,
    /// Index of `active_entity` in `ordered_entity_ids`.
    pub entity_index: usize,
    /// Index of `active_item` in its bucket.
    pub item_index: usize,
    /// Items in the active bucket.
    pub bucket_len: usize,
    /// Whether auto-advance is suspended.
    pub paused: bool,
    /// Whether the viewer may request deletion of `active_item`.
    pub can_delete: bool,
    /// How many others viewed `active_item`; only shown to its author.
    pub viewer_count: Option<usize>,
}

/// Work the engine needs done outside itself. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEffect {
    /// Persist a viewed mark.
    MarkViewed(StoryItemId),
    /// Delete an item; report the outcome via
    /// [`StoryPlaybackEngine::deletion_resolved`].
    Delete(StoryItemId),
    /// Send a reply to a story's author.
    Reply {
        /// The item replied to.
        item_id: StoryItemId,
        /// Recipient.
        target_author_id: AuthorId,
        /// Reply text, trimmed.
        text: String,
    },
}

/// Final accounting of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// The session.
    pub session_id: SessionId,
    /// Why it ended, `None` if still open.
    pub close_reason: Option<CloseReason>,
    /// Items newly marked viewed during the session.
    pub items_marked_viewed: usize,
}

/// One open story playback session.
pub struct StoryPlaybackEngine {
    id: SessionId,
    context: ViewerContext,
    start_entity_id: EntityId,
    order: Vec<EntityId>,
    buckets: BucketMap,
    cursor: PlaybackCursor,
    timer: AutoAdvanceTimer,
    tracker: ViewTracker,
    clock: Arc<dyn Clock>,
    active_item: Option<StoryItemId>,
    pending_delete: Option<StoryItemId>,
    close_reason: Option<CloseReason>,
    items_marked_viewed: usize,
    sequence: i64,
    uncommitted_events: Vec<PlaybackEvent>,
    pending_effects: Vec<PlaybackEffect>,
}

impl std::fmt::Debug for StoryPlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryPlaybackEngine")
            .field("id", &self.id)
            .field("order", &self.order)
            .field("cursor", &self.cursor)
            .field("close_reason", &self.close_reason)
            .finish_non_exhaustive()
    }
}

impl StoryPlaybackEngine {
    /// Opens a session on `start` over `items`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::EmptySession` if no eligible entity has items,
    /// or `PlaybackError::StartEntityUnavailable` if `start` has none. In
    /// both cases no session exists.
    pub fn open(
        config: &PlaybackConfig,
        context: ViewerContext,
        items: Vec<StoryItem>,
        start: EntityId,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PlaybackError> {
        let buckets = group_by_entity(items, &context);
        if buckets.is_empty() {
            return Err(PlaybackError::EmptySession);
        }
        if !buckets.contains_key(&start) {
            return Err(PlaybackError::StartEntityUnavailable(start));
        }

        let viewer_id = context.viewer_id;
        let order = order_session(
            &buckets,
            start,
            context.own_entity(),
            |bucket| bucket.has_unviewed(viewer_id),
            config.ordering_policy(),
        );

        let mut engine = Self {
            id: SessionId::new_v4(),
            context,
            start_entity_id: start,
            order,
            buckets,
            cursor: PlaybackCursor::open(0),
            timer: AutoAdvanceTimer::new(config.item_duration()),
            tracker: ViewTracker::new(),
            clock,
            active_item: None,
            pending_delete: None,
            close_reason: None,
            items_marked_viewed: 0,
            sequence: 0,
            uncommitted_events: Vec::new(),
            pending_effects: Vec::new(),
        };

        info!(
            session_id = %engine.id,
            viewer_id = %viewer_id,
            start = %start,
            entities = engine.order.len(),
            "story session opened"
        );

        let correlation_id = Uuid::new_v4();
        engine.record(
            PlaybackEventKind::SessionOpened(SessionOpened {
                viewer_id,
                start_entity_id: start,
                ordered_entity_ids: engine.order.clone(),
            }),
            correlation_id,
        );
        engine.settle(correlation_id);
        Ok(engine)
    }

    /// The session's identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The entity the viewer opened the session on.
    #[must_use]
    pub fn start_entity_id(&self) -> EntityId {
        self.start_entity_id
    }

    /// Session order. Only shrinks, when entities drain or become
    /// unresolvable.
    #[must_use]
    pub fn ordered_entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Cursor position, `None` once closed.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.cursor.position()
    }

    /// Whether the session has reached its terminal state.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cursor.is_closed()
    }

    /// Why the session ended, `None` while open.
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    /// The countdown currently armed, if any.
    #[must_use]
    pub fn armed_ticket(&self) -> Option<TimerTicket> {
        self.timer.armed()
    }

    /// Full auto-advance duration.
    #[must_use]
    pub fn item_duration(&self) -> Duration {
        self.timer.duration()
    }

    /// Close reason and view count so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            close_reason: self.close_reason,
            items_marked_viewed: self.items_marked_viewed,
        }
    }

    /// Render snapshot, `None` once closed.
    #[must_use]
    pub fn snapshot(&self) -> Option<RenderState> {
        let position = self.cursor.position()?;
        let entity = *self.order.get(position.entity_index)?;
        let bucket = self.buckets.get(&entity)?;
        let item = bucket.get(position.item_index)?;
        Some(RenderState {
            session_id: self.id,
            active_entity: entity,
            active_item: item.clone(),
            ordered_entity_ids: self.order.clone(),
            entity_index: position.entity_index,
            item_index: position.item_index,
            bucket_len: bucket.len(),
            paused: self.cursor.is_paused(),
            can_delete: self.can_delete(item),
            viewer_count: self.visible_viewers(item).map(|viewers| viewers.len()),
        })
    }

    /// Who viewed the active item, for its author only.
    #[must_use]
    pub fn active_viewers(&self) -> Option<Vec<AuthorId>> {
        let item = self.active()?;
        self.visible_viewers(item)
    }

    /// Fill percentage of each progress segment in the active bucket.
    #[must_use]
    pub fn segments(&self) -> Vec<u8> {
        let Some(position) = self.cursor.position() else {
            return Vec::new();
        };
        let Some(bucket) = self.bucket_at(position.entity_index) else {
            return Vec::new();
        };
        let current = if self.cursor.is_paused() {
            0
        } else {
            let elapsed = self
                .timer
                .armed_at()
                .map_or(Duration::ZERO, |at| self.clock.elapsed_since(at));
            self.timer.progress_percent(elapsed)
        };
        (0..bucket.len())
            .map(|index| match index.cmp(&position.item_index) {
                std::cmp::Ordering::Less => 100,
                std::cmp::Ordering::Equal => current,
                std::cmp::Ordering::Greater => 0,
            })
            .collect()
    }

    /// Drains recorded events.
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Drains queued effects.
    pub fn take_effects(&mut self) -> Vec<PlaybackEffect> {
        std::mem::take(&mut self.pending_effects)
    }

    /// Applies one intent.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` once closed,
    /// `PlaybackError::DeletionNotPermitted` for a delete the viewer may not
    /// request, and `PlaybackError::Validation` for a blank reply.
    pub fn dispatch(
        &mut self,
        intent: PlaybackIntent,
        correlation_id: Uuid,
    ) -> Result<Step, PlaybackError> {
        if self.cursor.is_closed() {
            return Err(PlaybackError::SessionClosed);
        }
        debug!(
            session_id = %self.id,
            intent = intent.intent_type(),
            %correlation_id,
            "dispatching intent"
        );

        match intent {
            PlaybackIntent::Advance => {
                let lengths = self.lengths();
                let step = self.cursor.advance(&lengths);
                self.settle(correlation_id);
                Ok(step)
            }
            PlaybackIntent::Retreat => {
                let lengths = self.lengths();
                let step = self.cursor.retreat(&lengths);
                self.settle(correlation_id);
                Ok(step)
            }
            PlaybackIntent::Pause => {
                let step = self.cursor.pause();
                if step == Step::Toggled {
                    self.timer.cancel();
                    self.record(PlaybackEventKind::PlaybackPaused, correlation_id);
                }
                Ok(step)
            }
            PlaybackIntent::Resume => {
                let step = self.cursor.resume();
                if step == Step::Toggled {
                    self.arm_timer();
                    self.record(PlaybackEventKind::PlaybackResumed, correlation_id);
                }
                Ok(step)
            }
            PlaybackIntent::Close => {
                self.finish(CloseReason::Explicit, correlation_id);
                Ok(Step::Closed)
            }
            PlaybackIntent::RequestDelete => {
                let item = self.active().ok_or(PlaybackError::SessionClosed)?;
                if !self.can_delete(item) {
                    return Err(PlaybackError::DeletionNotPermitted(item.id));
                }
                let item_id = item.id;
                if self.pending_delete == Some(item_id) {
                    debug!(session_id = %self.id, %item_id, "deletion already pending");
                    return Ok(Step::Unchanged);
                }
                self.pending_delete = Some(item_id);
                self.pending_effects.push(PlaybackEffect::Delete(item_id));
                Ok(Step::Unchanged)
            }
            PlaybackIntent::Reply(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(PlaybackError::Validation(
                        "reply text must not be empty".to_owned(),
                    ));
                }
                let item = self.active().ok_or(PlaybackError::SessionClosed)?;
                let (item_id, target_author_id) = (item.id, item.author_id);
                self.pending_effects.push(PlaybackEffect::Reply {
                    item_id,
                    target_author_id,
                    text: text.to_owned(),
                });
                self.record(
                    PlaybackEventKind::ReplyRequested(ReplyRequested {
                        item_id,
                        target_author_id,
                    }),
                    correlation_id,
                );
                Ok(Step::Unchanged)
            }
        }
    }

    /// Next item, next entity, or close.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` once closed.
    pub fn advance(&mut self) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::Advance, Uuid::new_v4())
    }

    /// Previous item, or last item of the previous entity.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` once closed.
    pub fn retreat(&mut self) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::Retreat, Uuid::new_v4())
    }

    /// Suspends auto-advance.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` once closed.
    pub fn pause(&mut self) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::Pause, Uuid::new_v4())
    }

    /// Restarts auto-advance with a full countdown.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` once closed.
    pub fn resume(&mut self) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::Resume, Uuid::new_v4())
    }

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionClosed` if already closed.
    pub fn close(&mut self) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::Close, Uuid::new_v4())
    }

    /// Queues deletion of the active item.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::DeletionNotPermitted` unless the viewer
    /// authored the item or manages its group.
    pub fn request_delete(&mut self) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::RequestDelete, Uuid::new_v4())
    }

    /// Queues a reply to the active item's author.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Validation` for blank text.
    pub fn reply(&mut self, text: &str) -> Result<Step, PlaybackError> {
        self.dispatch(PlaybackIntent::Reply(text.to_owned()), Uuid::new_v4())
    }

    /// Handles expiry of the countdown identified by `ticket`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::StaleTransition` if the session closed or the
    /// cursor left the position the ticket was armed for.
    pub fn handle_timer_fired(&mut self, ticket: TimerTicket) -> Result<Step, PlaybackError> {
        let current = self.timer.armed();
        let valid = current.is_some_and(|armed| {
            armed.epoch == ticket.epoch
                && armed.item_id == ticket.item_id
                && Some(armed.position) == self.cursor.position()
        });
        if self.cursor.is_closed() || !valid {
            debug!(session_id = %self.id, epoch = ticket.epoch, "discarding stale timer fire");
            return Err(PlaybackError::StaleTransition);
        }
        if let Some(armed) = current {
            self.timer.fire(armed);
        }
        let correlation_id = Uuid::new_v4();
        let lengths = self.lengths();
        let step = self.cursor.advance(&lengths);
        self.settle(correlation_id);
        Ok(step)
    }

    /// Applies the collaborator's answer to a queued deletion.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::DeletionRejected` when `outcome` is an error;
    /// local state is left untouched.
    pub fn deletion_resolved(
        &mut self,
        item_id: StoryItemId,
        outcome: Result<(), PlaybackError>,
    ) -> Result<(), PlaybackError> {
        if self.pending_delete == Some(item_id) {
            self.pending_delete = None;
        }
        if let Err(error) = outcome {
            warn!(session_id = %self.id, %item_id, %error, "story deletion rejected");
            return Err(match error {
                rejected @ PlaybackError::DeletionRejected { .. } => rejected,
                other => PlaybackError::DeletionRejected {
                    item_id,
                    reason: other.to_string(),
                },
            });
        }
        if self.cursor.is_closed() {
            return Ok(());
        }
        self.remove_item(item_id, Uuid::new_v4());
        Ok(())
    }

    /// Reconciles the session with recomputed upstream data.
    ///
    /// The order is kept. Entities that lost all items or eligibility are
    /// dropped, surviving buckets take the fresh items, and entities new to
    /// the session are ignored.
    pub fn refresh(&mut self, items: Vec<StoryItem>, context: ViewerContext) {
        if self.cursor.is_closed() {
            return;
        }
        let correlation_id = Uuid::new_v4();
        self.context = context;
        let mut fresh = group_by_entity(items, &self.context);

        for entity in &self.order {
            let Some(bucket) = self.buckets.get_mut(entity) else {
                continue;
            };
            match fresh.remove(entity) {
                Some(incoming) => bucket.merge_from(incoming),
                None => {
                    if !self.context.is_eligible(entity) {
                        warn!(
                            session_id = %self.id,
                            error = %PlaybackError::UnresolvedEntity(*entity),
                            "dropping unresolved entity"
                        );
                    }
                    bucket.clear();
                }
            }
        }

        if let Some(position) = self.cursor.position() {
            let lengths = self.lengths();
            let reseat = match self.bucket_at(position.entity_index) {
                Some(bucket) if !bucket.is_empty() => Some(
                    self.active_item
                        .and_then(|id| bucket.position_of(id))
                        .unwrap_or_else(|| position.item_index.min(bucket.len() - 1)),
                ),
                _ => None,
            };
            match reseat {
                Some(item_index) => self
                    .cursor
                    .relocate(Position::new(position.entity_index, item_index)),
                None => {
                    self.cursor.bucket_emptied(&lengths);
                }
            }
        }

        self.compact(correlation_id);
        self.settle(correlation_id);
    }

    /// Removes one item wherever it is in the session.
    fn remove_item(&mut self, item_id: StoryItemId, correlation_id: Uuid) {
        let Some((entity_index, entity)) = self
            .order
            .iter()
            .copied()
            .enumerate()
            .find(|(_, entity)| {
                self.buckets
                    .get(entity)
                    .is_some_and(|bucket| bucket.position_of(item_id).is_some())
            })
        else {
            return;
        };
        let Some((removed_index, remaining)) = self
            .buckets
            .get_mut(&entity)
            .and_then(|bucket| bucket.remove(item_id).map(|(index, _)| (index, bucket.len())))
        else {
            return;
        };
        self.record(
            PlaybackEventKind::ItemRemoved(ItemRemoved {
                entity_id: entity,
                item_id,
            }),
            correlation_id,
        );

        let on_active_entity = self
            .cursor
            .position()
            .filter(|position| position.entity_index == entity_index);
        if let Some(position) = on_active_entity {
            if remaining == 0 {
                let lengths = self.lengths();
                self.cursor.bucket_emptied(&lengths);
            } else if removed_index < position.item_index {
                self.cursor
                    .relocate(Position::new(entity_index, position.item_index - 1));
            } else if removed_index == position.item_index {
                self.cursor.relocate(Position::new(
                    entity_index,
                    position.item_index.min(remaining - 1),
                ));
            }
        }

        self.compact(correlation_id);
        self.settle(correlation_id);
    }

    /// Drops entities whose buckets drained and re-seats the cursor on the
    /// same entity in the shortened order.
    fn compact(&mut self, correlation_id: Uuid) {
        let active_entity = self
            .cursor
            .position()
            .and_then(|position| self.order.get(position.entity_index).copied());

        let (kept, dropped): (Vec<EntityId>, Vec<EntityId>) =
            self.order.iter().copied().partition(|entity| {
                self.buckets
                    .get(entity)
                    .is_some_and(|bucket| !bucket.is_empty())
            });
        if dropped.is_empty() {
            return;
        }
        for entity in dropped {
            self.buckets.remove(&entity);
            debug!(session_id = %self.id, %entity, "entity dropped from session");
            self.record(
                PlaybackEventKind::EntityDropped(EntityDropped { entity_id: entity }),
                correlation_id,
            );
        }
        self.order = kept;

        if let (Some(entity), Some(position)) = (active_entity, self.cursor.position()) {
            let entity_index = self.order.iter().position(|e| *e == entity);
            match entity_index {
                Some(entity_index) => self
                    .cursor
                    .relocate(Position::new(entity_index, position.item_index)),
                None => {
                    debug_assert!(
                        self.order.contains(&entity),
                        "active entity {entity} dropped while cursor still on it"
                    );
                    self.abort(
                        format!("active entity {entity} dropped while cursor still on it"),
                        correlation_id,
                    );
                }
            }
        }
    }

    /// Brings activation, view tracking and the timer in line with the
    /// cursor after any transition.
    fn settle(&mut self, correlation_id: Uuid) {
        let Some(position) = self.cursor.position() else {
            if self.close_reason.is_none() {
                self.finish(CloseReason::Exhausted, correlation_id);
            }
            return;
        };

        let entity = self.order.get(position.entity_index).copied();
        let item_id = self
            .bucket_at(position.entity_index)
            .and_then(|bucket| bucket.get(position.item_index))
            .map(|item| item.id);
        debug_assert!(
            item_id.is_some(),
            "cursor {position:?} points outside the session"
        );
        let (Some(entity), Some(item_id)) = (entity, item_id) else {
            self.abort(
                format!("cursor {position:?} points outside the session"),
                correlation_id,
            );
            return;
        };

        if self.active_item == Some(item_id) {
            let armed_here = self
                .timer
                .armed()
                .is_some_and(|ticket| ticket.position == position);
            if !armed_here && !self.cursor.is_paused() {
                self.arm_timer();
            }
            return;
        }

        self.active_item = Some(item_id);
        debug!(
            session_id = %self.id,
            %entity,
            %item_id,
            entity_index = position.entity_index,
            item_index = position.item_index,
            "item activated"
        );
        self.record(
            PlaybackEventKind::ItemActivated(ItemActivated {
                entity_id: entity,
                item_id,
                entity_index: position.entity_index,
                item_index: position.item_index,
            }),
            correlation_id,
        );

        let viewer_id = self.context.viewer_id;
        let tracker = &mut self.tracker;
        let newly_viewed = self
            .buckets
            .get_mut(&entity)
            .and_then(|bucket| bucket.get_mut(position.item_index))
            .is_some_and(|item| tracker.observe(viewer_id, item));
        if newly_viewed {
            self.items_marked_viewed += 1;
            self.pending_effects.push(PlaybackEffect::MarkViewed(item_id));
            self.record(
                PlaybackEventKind::ItemMarkedViewed(ItemMarkedViewed { item_id, viewer_id }),
                correlation_id,
            );
        }

        if self.cursor.is_paused() {
            self.timer.cancel();
        } else {
            self.arm_timer();
        }
    }

    fn finish(&mut self, reason: CloseReason, correlation_id: Uuid) {
        if self.close_reason.is_some() {
            return;
        }
        self.cursor.close();
        self.timer.cancel();
        self.active_item = None;
        self.close_reason = Some(reason);
        info!(
            session_id = %self.id,
            ?reason,
            items_marked_viewed = self.items_marked_viewed,
            "story session closed"
        );
        self.record(
            PlaybackEventKind::SessionClosed(SessionClosed { reason }),
            correlation_id,
        );
    }

    /// Closes a session whose state no longer holds together.
    fn abort(&mut self, detail: String, correlation_id: Uuid) {
        let error = PlaybackError::InvariantViolation(detail);
        error!(session_id = %self.id, %error, "closing inconsistent session");
        self.finish(CloseReason::InvariantViolation, correlation_id);
    }

    fn arm_timer(&mut self) {
        if let (Some(position), Some(item_id)) = (self.cursor.position(), self.active_item) {
            self.timer.arm(position, item_id, self.clock.now());
        }
    }

    fn record(&mut self, kind: PlaybackEventKind, correlation_id: Uuid) {
        self.sequence += 1;
        let event = PlaybackEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_id: self.id,
                sequence_number: self.sequence,
                correlation_id,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    fn lengths(&self) -> Vec<usize> {
        self.order
            .iter()
            .map(|entity| self.buckets.get(entity).map_or(0, EntityBucket::len))
            .collect()
    }

    fn bucket_at(&self, entity_index: usize) -> Option<&EntityBucket> {
        self.order
            .get(entity_index)
            .and_then(|entity| self.buckets.get(entity))
    }

    fn active(&self) -> Option<&StoryItem> {
        let position = self.cursor.position()?;
        self.bucket_at(position.entity_index)?
            .get(position.item_index)
    }

    fn can_delete(&self, item: &StoryItem) -> bool {
        item.author_id == self.context.viewer_id
            || item
                .group_id
                .is_some_and(|group| self.context.manages_group(group))
    }

    fn visible_viewers(&self, item: &StoryItem) -> Option<Vec<AuthorId>> {
        let viewer_id = self.context.viewer_id;
        (item.author_id == viewer_id).then(|| {
            item.viewed_by()
                .iter()
                .copied()
                .filter(|id| *id != viewer_id)
                .collect()
        })
    }
}
