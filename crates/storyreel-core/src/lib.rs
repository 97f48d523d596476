//! Storyreel Core: shared domain abstractions.
//!
//! This crate defines the identifiers, the story item model, and the
//! capability traits that the playback context depends on. It contains no
//! infrastructure code.

pub mod clock;
pub mod collaborator;
pub mod directory;
pub mod error;
pub mod event;
pub mod ids;
pub mod item;
