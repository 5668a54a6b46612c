//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces infrastructure adapters must
//! implement:
//! - SyncTransport: the pull/push cycle around queue store access
//! - Fulfiller: the opaque response-producing backend of the responder
//!
//! These traits keep the exchange protocol independent of git and of any
//! specific AI service.

pub mod errors;
pub mod fulfiller;
pub mod transport;

pub use errors::{BuildError, ExchangeError, SupervisorError, TransportError, WatcherError};
pub use fulfiller::Fulfiller;
pub use transport::{NullTransport, SyncTransport};
