//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the replication service.

use crate::domain::entities::Replica;
use crate::domain::errors::{EncodeError, KVStoreError, SignatureError};
use bytes::Bytes;
use rlp::DecoderError;
use shared_types::{Address, BlockNumber, Hash, Transaction};

/// Read-only access to the raw, still-encoded chain records of one block.
///
/// `Ok(None)` means the record is absent. Implementations must be safe to
/// share between concurrent assemblies.
pub trait ChainReader: Send + Sync {
    /// RLP of the block's total difficulty.
    fn read_td_rlp(&self, hash: &Hash, number: BlockNumber)
        -> Result<Option<Vec<u8>>, KVStoreError>;

    /// RLP of the block header.
    fn read_header_rlp(
        &self,
        hash: &Hash,
        number: BlockNumber,
    ) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// RLP list of the block's receipts in storage form.
    fn read_receipts_rlp(
        &self,
        hash: &Hash,
        number: BlockNumber,
    ) -> Result<Option<Vec<u8>>, KVStoreError>;
}

/// Abstract interface for key-value database operations.
///
/// Testing: `InMemoryKVStore` (adapters/storage.rs)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Either all operations are applied or none are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// A transaction signature scheme.
pub trait SignatureScheme: Send + Sync {
    /// Short scheme name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Recover the address that signed `tx`.
    fn recover_sender(&self, tx: &Transaction) -> Result<Address, SignatureError>;
}

/// Chooses the signature scheme active at a block height.
pub trait SignerResolver: Send + Sync {
    type Scheme: SignatureScheme;

    fn signer_for(&self, number: BlockNumber) -> Self::Scheme;

    /// Network id stamped on every replica.
    fn network_id(&self) -> u64;
}

/// Canonical replica serialization.
pub trait ReplicaEncoder: Send + Sync {
    /// Encode deterministically. Fails only on an internal invariant violation.
    fn encode(&self, replica: &Replica) -> Result<Bytes, EncodeError>;

    /// Inverse of [`ReplicaEncoder::encode`].
    fn decode(&self, data: &[u8]) -> Result<Replica, DecoderError>;
}
