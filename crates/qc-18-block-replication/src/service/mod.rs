//! # Block Replication Service
//!
//! The application service implementing [`BlockReplicationApi`].
//!
//! ## Architecture
//!
//! This service:
//! 1. Reads the stored components of a block through a [`ChainReader`]
//! 2. Recovers senders with the scheme chosen by a `SignerResolver`
//! 3. Assembles, encodes and publishes the replica on its own feed
//! 4. Uses dependency injection for all external dependencies
//!
//! Assembly holds no mutable state, so one service can replicate many blocks
//! concurrently from `&self`.
//!
//! [`BlockReplicationApi`]: crate::ports::inbound::BlockReplicationApi

mod assembler;
mod reader;

pub use reader::read_components;

use crate::domain::config::ReplicationConfig;
use crate::ports::outbound::{ChainReader, ReplicaEncoder};
use shared_bus::{ReplicationEvent, ReplicationFeed, ReplicationSubscription, SubscriptionError};
use tokio::sync::mpsc;
use tracing::info;

/// The Block Replication Service.
pub struct ReplicationService<R, E>
where
    R: ChainReader,
    E: ReplicaEncoder,
{
    /// Raw chain record access.
    pub(crate) reader: R,
    /// Canonical replica encoding.
    pub(crate) encoder: E,
    /// Fan-out registry owned by this service.
    pub(crate) feed: ReplicationFeed,
    /// Service configuration.
    pub(crate) config: ReplicationConfig,
}

/// Dependencies for ReplicationService
pub struct ReplicationDependencies<R, E> {
    pub reader: R,
    pub encoder: E,
}

impl<R, E> ReplicationService<R, E>
where
    R: ChainReader,
    E: ReplicaEncoder,
{
    /// Create a new service with its own, empty replication feed.
    pub fn new(deps: ReplicationDependencies<R, E>, config: ReplicationConfig) -> Self {
        info!(
            enabled = config.enabled,
            channel_capacity = config.channel_capacity,
            "[qc-18] Block replication service created"
        );
        Self {
            reader: deps.reader,
            encoder: deps.encoder,
            feed: ReplicationFeed::new(),
            config,
        }
    }

    /// The replication feed. Clones share the same subscriber registry.
    pub fn feed(&self) -> &ReplicationFeed {
        &self.feed
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Subscribe with a fresh bounded channel sized by the configuration.
    pub fn subscribe_bounded(
        &self,
    ) -> Result<(ReplicationSubscription, mpsc::Receiver<ReplicationEvent>), SubscriptionError>
    {
        self.feed.subscribe_bounded(self.config.channel_capacity)
    }

    /// Subscribe with a fresh unbounded channel.
    pub fn subscribe_unbounded(
        &self,
    ) -> Result<
        (ReplicationSubscription, mpsc::UnboundedReceiver<ReplicationEvent>),
        SubscriptionError,
    > {
        self.feed.subscribe_unbounded()
    }

    /// Close the feed: every subscriber is released and sees end-of-stream.
    pub fn shutdown(&self) {
        let subscribers = self.feed.subscriber_count();
        self.feed.close();
        info!(
            subscribers,
            events_published = self.feed.events_published(),
            events_dropped = self.feed.events_dropped(),
            "[qc-18] Block replication feed closed"
        );
    }
}
