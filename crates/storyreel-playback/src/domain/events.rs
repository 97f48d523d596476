//! Domain events for the Story Playback context.

use serde::{Deserialize, Serialize};
use storyreel_core::event::{DomainEvent, EventMetadata};
use storyreel_core::ids::{AuthorId, EntityId, StoryItemId};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The viewer closed it.
    Explicit,
    /// Playback ran past the last item of the last entity, or every
    /// remaining bucket emptied.
    Exhausted,
    /// Internal state became inconsistent and the session bailed out.
    InvariantViolation,
}

/// Emitted when a session opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpened {
    /// The viewer.
    pub viewer_id: AuthorId,
    /// The entity the viewer opened.
    pub start_entity_id: EntityId,
    /// Session order.
    pub ordered_entity_ids: Vec<EntityId>,
}

/// Emitted when an item becomes the active item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemActivated {
    /// Owning entity.
    pub entity_id: EntityId,
    /// The item.
    pub item_id: StoryItemId,
    /// Entity index in session order.
    pub entity_index: usize,
    /// Item index in the bucket.
    pub item_index: usize,
}

/// Emitted the first time the viewer sees an item they had not seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMarkedViewed {
    /// The item.
    pub item_id: StoryItemId,
    /// The viewer.
    pub viewer_id: AuthorId,
}

/// Emitted when an item leaves the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemoved {
    /// Owning entity.
    pub entity_id: EntityId,
    /// The removed item.
    pub item_id: StoryItemId,
}

/// Emitted when an entity leaves the session order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDropped {
    /// The dropped entity.
    pub entity_id: EntityId,
}

/// Emitted when the viewer replies to a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequested {
    /// The item replied to.
    pub item_id: StoryItemId,
    /// Recipient of the reply.
    pub target_author_id: AuthorId,
}

/// Emitted when the session closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClosed {
    /// Why it closed.
    pub reason: CloseReason,
}

/// Event type identifier for [`SessionOpened`].
pub const SESSION_OPENED_EVENT_TYPE: &str = "playback.session_opened";

/// Event type identifier for [`ItemActivated`].
pub const ITEM_ACTIVATED_EVENT_TYPE: &str = "playback.item_activated";

/// Event type identifier for [`ItemMarkedViewed`].
pub const ITEM_MARKED_VIEWED_EVENT_TYPE: &str = "playback.item_marked_viewed";

/// Event type identifier for `PlaybackPaused`.
pub const PLAYBACK_PAUSED_EVENT_TYPE: &str = "playback.paused";

/// Event type identifier for `PlaybackResumed`.
pub const PLAYBACK_RESUMED_EVENT_TYPE: &str = "playback.resumed";

/// Event type identifier for [`ItemRemoved`].
pub const ITEM_REMOVED_EVENT_TYPE: &str = "playback.item_removed";

/// Event type identifier for [`EntityDropped`].
pub const ENTITY_DROPPED_EVENT_TYPE: &str = "playback.entity_dropped";

/// Event type identifier for [`ReplyRequested`].
pub const REPLY_REQUESTED_EVENT_TYPE: &str = "playback.reply_requested";

/// Event type identifier for [`SessionClosed`].
pub const SESSION_CLOSED_EVENT_TYPE: &str = "playback.session_closed";

/// Event payload variants for the Story Playback context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    /// A session has opened.
    SessionOpened(SessionOpened),
    /// An item became active.
    ItemActivated(ItemActivated),
    /// An item was marked viewed.
    ItemMarkedViewed(ItemMarkedViewed),
    /// Auto-advance was suspended.
    PlaybackPaused,
    /// Auto-advance was restarted.
    PlaybackResumed,
    /// An item was removed.
    ItemRemoved(ItemRemoved),
    /// An entity was dropped from the order.
    EntityDropped(EntityDropped),
    /// A reply was requested.
    ReplyRequested(ReplyRequested),
    /// The session has closed.
    SessionClosed(SessionClosed),
}

impl PlaybackEventKind {
    /// Event type identifier for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionOpened(_) => SESSION_OPENED_EVENT_TYPE,
            Self::ItemActivated(_) => ITEM_ACTIVATED_EVENT_TYPE,
            Self::ItemMarkedViewed(_) => ITEM_MARKED_VIEWED_EVENT_TYPE,
            Self::PlaybackPaused => PLAYBACK_PAUSED_EVENT_TYPE,
            Self::PlaybackResumed => PLAYBACK_RESUMED_EVENT_TYPE,
            Self::ItemRemoved(_) => ITEM_REMOVED_EVENT_TYPE,
            Self::EntityDropped(_) => ENTITY_DROPPED_EVENT_TYPE,
            Self::ReplyRequested(_) => REPLY_REQUESTED_EVENT_TYPE,
            Self::SessionClosed(_) => SESSION_CLOSED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Story Playback context.
#[derive(Debug, Clone)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("PlaybackEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
