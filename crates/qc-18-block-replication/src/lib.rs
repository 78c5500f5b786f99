//! # Block Replication (qc-18)
//!
//! Turns a finalized block into a self-contained, canonically encoded
//! **block replica** and fans it out to every live subscriber.
//!
//! ## Flow
//!
//! ```text
//!                ┌─────────────────────────────────────────────┐
//!  Block ──────→ │ read TD → header → receipts  (ChainReader)  │
//!  ChainConfig → │ recover senders       (SignerResolver)      │
//!  Specimen ───→ │ project txs / receipts, copy uncles         │
//!                └──────────────────────┬──────────────────────┘
//!                                       ↓ Replica
//!                             encode (ReplicaEncoder)
//!                                       ↓ ReplicationEvent
//!                             ReplicationFeed::publish ──→ subscribers
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | All or Nothing | Any read, decode or recovery failure aborts; no event |
//! | 2 | Index Alignment | `len(transactions) == len(receipts) == len(senders)` |
//! | 3 | Deterministic Encoding | Same replica, same bytes |
//! | 4 | Verbatim Uncles | Uncles come from the block unmodified |
//! | 5 | Immutability | A `Replica` has no mutating accessors |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Replica entities, signers, sender recovery, projection
//! - `ports/` - Inbound API and outbound SPI traits
//! - `adapters/` - Key-value chain reader and the RLP replica codec
//! - `service/` - `ReplicationService` orchestrating the flow
//!
//! ## Usage
//!
//! ```ignore
//! use qc_18_block_replication::{
//!     BlockReplicationApi, InMemoryKVStore, KvChainReader, ReplicationConfig,
//!     ReplicationDependencies, ReplicationService, RlpReplicaCodec,
//! };
//!
//! let deps = ReplicationDependencies {
//!     reader: KvChainReader::new(store),
//!     encoder: RlpReplicaCodec,
//! };
//! let service = ReplicationService::new(deps, ReplicationConfig::default());
//!
//! let (_sub, mut rx) = service.feed().subscribe_unbounded()?;
//! service.create_block_replica(&block, &ChainConfig::mainnet(), specimen)?;
//! let event = rx.recv().await;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{ChainWriter, InMemoryKVStore, KeyPrefix, KvChainReader, RlpReplicaCodec};
pub use domain::config::ReplicationConfig;
pub use domain::entities::{
    ExportLog, ExportReceipt, ExportTransaction, RawComponents, Replica, ReplicaParts,
    REPLICA_TYPE_TAG,
};
pub use domain::errors::{Component, EncodeError, KVStoreError, ReplicaError, SignatureError};
pub use domain::signer::Signer;
pub use ports::inbound::{BlockReplicationApi, PublishedReplica};
pub use ports::outbound::{
    BatchOperation, ChainReader, KeyValueStore, ReplicaEncoder, SignatureScheme, SignerResolver,
};
pub use service::{ReplicationDependencies, ReplicationService};
pub use telemetry::init_tracing;

// Re-export feed types so consumers depend on one crate
pub use shared_bus::{
    DeliveryChannel, PublishReport, ReplicationEvent, ReplicationFeed, ReplicationSubscription,
    SubscriptionError,
};
