//! # Adapters Layer
//!
//! - `storage` - key schema, in-memory store, chain reader and writer
//! - `codec` - canonical RLP replica codec

pub mod codec;
pub mod storage;

pub use codec::RlpReplicaCodec;
pub use storage::{ChainWriter, InMemoryKVStore, KeyPrefix, KvChainReader};
