//! Intents the presentation layer can dispatch to a session.

use serde::{Deserialize, Serialize};

/// A navigation or action request from the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "text", rename_all = "snake_case")]
pub enum PlaybackIntent {
    /// Next item, next entity, or close.
    Advance,
    /// Previous item, or last item of the previous entity.
    Retreat,
    /// Suspend auto-advance.
    Pause,
    /// Restart auto-advance with a full countdown.
    Resume,
    /// End the session.
    Close,
    /// Ask for the active item to be deleted.
    RequestDelete,
    /// Reply privately to the active item's author.
    Reply(String),
}

impl PlaybackIntent {
    /// Stable name for logging.
    #[must_use]
    pub fn intent_type(&self) -> &'static str {
        match self {
            Self::Advance => "playback.advance",
            Self::Retreat => "playback.retreat",
            Self::Pause => "playback.pause",
            Self::Resume => "playback.resume",
            Self::Close => "playback.close",
            Self::RequestDelete => "playback.request_delete",
            Self::Reply(_) => "playback.reply",
        }
    }
}
