//! # Shared Types Crate
//!
//! Chain data types shared by every subsystem that reads finalized blocks:
//! headers, transactions, receipts, the state specimen and the chain
//! configuration.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types are defined here.
//! - **Canonical Encoding**: every entity implements `rlp::Encodable` and
//!   `rlp::Decodable`; the header encoding is the block-hash preimage.

pub mod chain_config;
pub mod entities;
pub mod hashing;
pub mod receipt;
pub mod specimen;
pub mod transaction;

pub use chain_config::ChainConfig;
pub use entities::*;
pub use hashing::{create_address, keccak256};
pub use receipt::{Log, Receipt, ReceiptOutcome};
pub use specimen::{AccountRead, BlockhashRead, CodeRead, StateSpecimen, StorageRead};
pub use transaction::{AccessListItem, Transaction, TxType};

// Re-exported so downstream crates decode with the same codec version.
pub use rlp;
