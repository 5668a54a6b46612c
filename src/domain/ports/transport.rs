//! Synchronization transport port.
//!
//! The queue store is a pair of plain directories; what makes it a
//! cross-machine channel is the transport that synchronizes them with the
//! peer. The cycle is pull-before-read, push-after-write: `sync_inbound`
//! must run before any read that expects freshly-arrived data, and
//! `sync_outbound` after any write that must become visible to the peer.

use async_trait::async_trait;

use crate::domain::ports::errors::TransportError;

/// Port for the pull/push cycle around queue store reads and writes.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Bring freshly-arrived peer records into the local store.
    async fn sync_inbound(&self) -> Result<(), TransportError>;

    /// Make local writes visible to the peer. A failure here means the
    /// write is local-only and must surface as a publish failure.
    async fn sync_outbound(&self, message: &str) -> Result<(), TransportError>;
}

/// No-op transport for co-located peers and tests, where both sides share
/// one filesystem and no synchronization is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

#[async_trait]
impl SyncTransport for NullTransport {
    async fn sync_inbound(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn sync_outbound(&self, _message: &str) -> Result<(), TransportError> {
        Ok(())
    }
}
