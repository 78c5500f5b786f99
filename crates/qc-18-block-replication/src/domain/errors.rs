//! # Replication Errors
//!
//! Every failure aborts the whole replica; nothing partial is ever published.

use shared_types::{BlockNumber, Hash, TxType};
use std::fmt;
use thiserror::Error;

/// Stored record that makes up part of a replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    TotalDifficulty,
    Header,
    Receipts,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::TotalDifficulty => write!(f, "total difficulty"),
            Component::Header => write!(f, "header"),
            Component::Receipts => write!(f, "receipts"),
        }
    }
}

/// Errors raised while assembling a replica.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplicaError {
    /// A stored component is missing or does not decode.
    #[error("Stored {component} for block #{block_number} ({block_hash:?}) is unusable: {reason}")]
    StorageDecode {
        component: Component,
        block_hash: Hash,
        block_number: BlockNumber,
        reason: String,
    },

    /// Components decoded but disagree on block identity or counts.
    #[error("Inconsistent components for block #{block_number} ({block_hash:?}): {reason}")]
    InconsistentComponents {
        block_hash: Hash,
        block_number: BlockNumber,
        reason: String,
    },

    /// A transaction signature did not yield a sender.
    #[error("Sender recovery failed for tx {tx_index} ({tx_hash:?}) in block #{block_number}: {source}")]
    SenderRecovery {
        block_hash: Hash,
        block_number: BlockNumber,
        tx_index: usize,
        tx_hash: Hash,
        source: SignatureError,
    },

    /// The key-value backend itself failed.
    #[error("Storage backend failed reading block #{block_number} ({block_hash:?}): {source}")]
    Storage {
        block_hash: Hash,
        block_number: BlockNumber,
        source: KVStoreError,
    },

    /// Encoding refused the replica.
    ///
    /// Unreachable with [`RlpReplicaCodec`](crate::RlpReplicaCodec): every
    /// [`Replica`](crate::Replica) is index-aligned by construction. Seeing it
    /// means a bug, and it is logged at `error!` before being returned.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Encoding failure. Only an internal invariant violation can cause one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error(
        "Replica sequences are not index-aligned: {transactions} transactions, \
         {receipts} receipts, {senders} senders"
    )]
    LengthMismatch {
        transactions: usize,
        receipts: usize,
        senders: usize,
    },
}

/// Sender recovery errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// r or s is zero or not below the curve order.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// High s under a scheme enforcing EIP-2.
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// `v` does not encode a recovery id this scheme understands.
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u64),

    #[error("Failed to recover public key")]
    RecoveryFailed,

    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("Transaction type {tx_type:?} not supported by the {scheme} signer")]
    UnsupportedTxType { tx_type: TxType, scheme: &'static str },
}

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}
