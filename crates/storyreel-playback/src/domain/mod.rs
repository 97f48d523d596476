//! Pure playback components. Nothing in here performs I/O or sleeps.

pub mod cursor;
pub mod events;
pub mod gesture;
pub mod grouping;
pub mod intents;
pub mod ordering;
pub mod timer;
pub mod view_tracker;
