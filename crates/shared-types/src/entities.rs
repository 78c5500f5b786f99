//! # Core Chain Entities
//!
//! Block-level entities shared by every subsystem that reads finalized chain
//! data: primitive hash/address aliases, the canonical block header and the
//! in-memory block handed over by consensus.
//!
//! All entities carry their canonical RLP encoding. The header encoding is the
//! preimage of the block hash, so field order here is consensus-critical.

use crate::hashing::keccak256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::transaction::Transaction;

// Re-export the fixed-width primitives so subsystems never depend on
// primitive-types directly.
pub use primitive_types::{H160, H256, U256};

/// A 32-byte Keccak-256 hash.
pub type Hash = H256;

/// A 20-byte account address.
pub type Address = H160;

/// Height of a block in the chain.
pub type BlockNumber = u64;

/// Number of bytes in a logs bloom filter.
pub const BLOOM_SIZE: usize = 256;

/// Number of RLP items in a pre-London header.
const LEGACY_HEADER_FIELDS: usize = 15;

/// 2048-bit logs bloom carried in every header.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bloom(#[serde_as(as = "Bytes")] pub [u8; BLOOM_SIZE]);

impl Default for Bloom {
    fn default() -> Self {
        Self([0u8; BLOOM_SIZE])
    }
}

impl std::fmt::Debug for Bloom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = self.0.iter().filter(|b| **b != 0).count();
        write!(f, "Bloom({} non-zero bytes)", set)
    }
}

impl Encodable for Bloom {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for Bloom {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let bytes: Vec<u8> = rlp.as_val()?;
        let bloom: [u8; BLOOM_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| DecoderError::RlpInvalidLength)?;
        Ok(Self(bloom))
    }
}

/// The canonical block header.
///
/// `base_fee_per_gas` is only present from the London fork onwards and is
/// appended as the 16th RLP item when set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: Hash,
    pub uncle_hash: Hash,
    pub coinbase: Address,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub receipts_root: Hash,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: BlockNumber,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mix_hash: Hash,
    /// 64-bit proof-of-work nonce, encoded as 8 fixed bytes.
    pub nonce: u64,
    pub base_fee_per_gas: Option<U256>,
}

impl Header {
    /// Keccak-256 of the header's RLP encoding.
    pub fn hash(&self) -> Hash {
        keccak256(&rlp::encode(self))
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        let fields = LEGACY_HEADER_FIELDS + usize::from(self.base_fee_per_gas.is_some());
        s.begin_list(fields);
        s.append(&self.parent_hash);
        s.append(&self.uncle_hash);
        s.append(&self.coinbase);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.receipts_root);
        s.append(&self.logs_bloom);
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra_data);
        s.append(&self.mix_hash);
        s.append(&self.nonce.to_be_bytes().to_vec());
        if let Some(base_fee) = &self.base_fee_per_gas {
            s.append(base_fee);
        }
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let items = rlp.item_count()?;
        if items != LEGACY_HEADER_FIELDS && items != LEGACY_HEADER_FIELDS + 1 {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let nonce_bytes: Vec<u8> = rlp.val_at(14)?;
        let nonce: [u8; 8] = nonce_bytes
            .as_slice()
            .try_into()
            .map_err(|_| DecoderError::RlpInvalidLength)?;

        Ok(Self {
            parent_hash: rlp.val_at(0)?,
            uncle_hash: rlp.val_at(1)?,
            coinbase: rlp.val_at(2)?,
            state_root: rlp.val_at(3)?,
            transactions_root: rlp.val_at(4)?,
            receipts_root: rlp.val_at(5)?,
            logs_bloom: rlp.val_at(6)?,
            difficulty: rlp.val_at(7)?,
            number: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            timestamp: rlp.val_at(11)?,
            extra_data: rlp.val_at(12)?,
            mix_hash: rlp.val_at(13)?,
            nonce: u64::from_be_bytes(nonce),
            base_fee_per_gas: if items > LEGACY_HEADER_FIELDS {
                Some(rlp.val_at(15)?)
            } else {
                None
            },
        })
    }
}

/// A finalized block as held in memory by the chain.
///
/// Transactions and uncles come from the block body; receipts and total
/// difficulty live in storage and are read separately.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    pub uncles: Vec<Header>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>, uncles: Vec<Header>) -> Self {
        Self {
            header,
            transactions,
            uncles,
        }
    }

    /// The block hash (hash of the header).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn number(&self) -> BlockNumber {
        self.header.number
    }
}

/// The identity of a finalized block on a given network.
///
/// Used as the lookup key for every raw component read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockIdentity {
    pub hash: Hash,
    pub number: BlockNumber,
    pub network_id: u64,
}

impl BlockIdentity {
    pub fn new(hash: Hash, number: BlockNumber, network_id: u64) -> Self {
        Self {
            hash,
            number,
            network_id,
        }
    }

    /// Identity of `block` on the network `network_id`.
    pub fn of(block: &Block, network_id: u64) -> Self {
        Self::new(block.hash(), block.number(), network_id)
    }
}

impl std::fmt::Display for BlockIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({:?})", self.number, self.hash)
    }
}
