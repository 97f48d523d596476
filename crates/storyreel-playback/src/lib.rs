//! Storyreel: Story Playback bounded context.
//!
//! Groups a viewer's stories by author or group, orders them for a session,
//! and drives playback with auto-advance, pause, deletion and replies.

pub mod application;
pub mod config;
pub mod domain;
