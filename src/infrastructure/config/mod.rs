//! Configuration loading (figment-based, hierarchical).

mod loader;

pub use loader::{ConfigError, ConfigLoader};
