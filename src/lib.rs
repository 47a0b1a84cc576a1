// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod anthropic;
pub mod assemble;
pub mod classify;
pub mod config;
pub mod feeds;
pub mod item;
pub mod pipeline;
pub mod render;
pub mod seen;
pub mod select;
pub mod synthesize;

// ---- Re-exports for stable public API ----
pub use crate::config::DigestConfig;
pub use crate::item::{Item, Priority};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::seen::{SeenMap, SeenStore};
