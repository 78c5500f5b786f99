//! # Replication Events
//!
//! The event delivered to every replication subscriber.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One encoded block replica, keyed by the block hash.
///
/// Created exactly once per successfully encoded replica. The payload is a
/// reference-counted buffer, so fanning an event out to many subscribers
/// clones a pointer, never the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationEvent {
    /// `0x`-prefixed lowercase hex of the block hash.
    pub hash: String,
    /// Canonical encoding of the replica.
    pub data: Bytes,
}

impl ReplicationEvent {
    pub fn new(hash: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            hash: hash.into(),
            data: data.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
