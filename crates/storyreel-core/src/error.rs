//! Playback error types.

use thiserror::Error;

use crate::ids::{EntityId, StoryItemId};

/// Top-level error type for story playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// No eligible entity has any story item.
    #[error("no eligible stories to play")]
    EmptySession,

    /// The entity the viewer opened has no playable items.
    #[error("start entity {0} has no playable stories")]
    StartEntityUnavailable(EntityId),

    /// A timer or async effect resolved against a position that is no
    /// longer current.
    #[error("stale transition discarded")]
    StaleTransition,

    /// The collaborator refused to delete an item.
    #[error("deletion of story {item_id} rejected: {reason}")]
    DeletionRejected {
        /// The item the viewer tried to delete.
        item_id: StoryItemId,
        /// Reason reported by the collaborator.
        reason: String,
    },

    /// The viewer may not request deletion of this item.
    #[error("not permitted to delete story {0}")]
    DeletionNotPermitted(StoryItemId),

    /// The active entity can no longer be resolved for the viewer.
    #[error("entity {0} is no longer resolvable")]
    UnresolvedEntity(EntityId),

    /// The session has already closed.
    #[error("playback session is closed")]
    SessionClosed,

    /// Invalid input from the presentation layer.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external collaborator failed.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Session state broke an internal invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
