//! Application layer: the orchestration loop.

pub mod watcher;

pub use watcher::{plan, Action, Watcher};
