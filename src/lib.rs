//! Vigil - Autonomous Process Supervisor
//!
//! Vigil keeps an external game-automation process alive: it restarts it
//! on failure and escalates unresolved failures to remote AI responders
//! through a file-based, git-synchronized message queue. The two machines
//! involved share no memory and no direct network channel; a git
//! repository is the only transport.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain`): models, port traits, and the error
//!   taxonomy
//! - **Service Layer** (`services`): supervision, detection, exchange,
//!   rebuild, and the responder loop
//! - **Application Layer** (`application`): the orchestration loop
//! - **Infrastructure Layer** (`infrastructure`): git transport, queue
//!   store, configuration, logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use vigil::services::exchange::ExchangeClient;
//!
//! # async fn example(client: ExchangeClient) {
//! let task_id = client.submit("gemini_1", "analyze this crash").await.unwrap();
//! let response = client.await_result(&task_id, std::time::Duration::from_secs(120)).await;
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{plan, Action, Watcher};
pub use domain::models::{
    Config, ExchangeResult, ExchangeTask, Issue, IssueKind, TaskId,
};
pub use domain::ports::{
    BuildError, ExchangeError, Fulfiller, NullTransport, SupervisorError, SyncTransport,
    TransportError, WatcherError,
};
pub use infrastructure::{ConfigError, ConfigLoader, FileQueueStore, GitTransport};
pub use services::{
    EchoFulfiller, ExchangeClient, IssueDetector, PullOutcome, Rebuilder, Responder, Supervisor,
    SupervisorState,
};
