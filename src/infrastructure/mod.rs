//! Infrastructure layer: adapters for configuration, logging, the git
//! transport, and the file-backed queue store.

pub mod config;
pub mod git_transport;
pub mod logging;
pub mod queue_store;

pub use config::{ConfigError, ConfigLoader};
pub use git_transport::GitTransport;
pub use queue_store::FileQueueStore;
