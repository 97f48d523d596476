//! Application layer: the playback engine and its async session driver.

pub mod driver;
pub mod engine;
