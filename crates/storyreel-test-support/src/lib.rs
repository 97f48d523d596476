//! Shared test mocks and utilities for the Storyreel playback engine.

mod clock;
mod collaborators;
mod fixtures;
mod tracing;

pub use clock::{FixedClock, ManualClock};
pub use collaborators::{FailingStoryActions, RecordingStoryActions, StaticStorySource};
pub use fixtures::{base_time, group_story, minutes_after, story};
pub use tracing::init_tracing;
