//! Service layer: supervision, detection, exchange, rebuild, and the
//! responder loop.

pub mod builder;
pub mod detector;
pub mod exchange;
pub mod responder;
pub mod supervisor;

pub use builder::{PullOutcome, Rebuilder};
pub use detector::IssueDetector;
pub use exchange::ExchangeClient;
pub use responder::{EchoFulfiller, Responder};
pub use supervisor::{Supervisor, SupervisorState};
