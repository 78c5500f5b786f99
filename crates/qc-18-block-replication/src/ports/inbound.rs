//! # Inbound Ports (Driving Ports)
//!
//! The API the host (block import, admin tooling) calls into.

use crate::domain::entities::Replica;
use crate::domain::errors::ReplicaError;
use crate::ports::outbound::SignerResolver;
use rlp::DecoderError;
use shared_bus::{
    DeliveryChannel, PublishReport, ReplicationEvent, ReplicationSubscription, SubscriptionError,
};
use shared_types::{Block, StateSpecimen};

/// An event that went out on the feed, with its delivery outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedReplica {
    pub event: ReplicationEvent,
    pub report: PublishReport,
}

/// Block replication API.
pub trait BlockReplicationApi {
    /// Assemble the replica of `block` without encoding or publishing it.
    ///
    /// All or nothing: any unreadable component or unrecoverable sender fails
    /// the whole call.
    fn create_replica<C: SignerResolver>(
        &self,
        block: &Block,
        chain: &C,
        state: StateSpecimen,
    ) -> Result<Replica, ReplicaError>;

    /// Assemble, encode and publish the replica of `block`.
    ///
    /// Returns `Ok(None)` when replication is disabled. On error nothing is
    /// published.
    fn create_block_replica<C: SignerResolver>(
        &self,
        block: &Block,
        chain: &C,
        state: StateSpecimen,
    ) -> Result<Option<PublishedReplica>, ReplicaError>;

    /// Register a delivery channel for replication events.
    fn subscribe_replication_events(
        &self,
        channel: DeliveryChannel<ReplicationEvent>,
    ) -> Result<ReplicationSubscription, SubscriptionError>;

    /// Decode an event payload back into a replica.
    fn decode_replica(&self, data: &[u8]) -> Result<Replica, DecoderError>;
}
