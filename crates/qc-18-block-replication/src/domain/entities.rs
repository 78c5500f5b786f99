//! # Replica Entities
//!
//! The replica and the export-shaped views it carries. Export views are
//! projections built during one assembly call; only the replica leaves it.

use super::errors::ReplicaError;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_types::{
    AccessListItem, Address, BlockNumber, Bloom, Hash, Header, Receipt, StateSpecimen, U256,
};

/// Schema marker carried as the first item of every encoded replica.
pub const REPLICA_TYPE_TAG: &str = "block-replica";

/// Number of RLP items in an encoded replica.
pub(crate) const REPLICA_FIELDS: usize = 10;

/// A transaction as consumers see it.
///
/// Legacy transactions get their chain id flattened out of `v` (0 when
/// unprotected); `recipient` is `None` for contract creation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTransaction {
    pub tx_type: u8,
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: U256,
    pub max_priority_fee_per_gas: U256,
    pub gas_limit: u64,
    pub recipient: Option<Address>,
    pub amount: U256,
    pub payload: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Encodable for ExportTransaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(13);
        s.append(&self.tx_type);
        s.append(&self.chain_id);
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.max_priority_fee_per_gas);
        s.append(&self.gas_limit);
        match &self.recipient {
            Some(address) => s.append(address),
            None => s.append_empty_data(),
        };
        s.append(&self.amount);
        s.append(&self.payload);
        s.append_list::<AccessListItem, _>(&self.access_list);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }
}

impl Decodable for ExportTransaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 13)?;
        let recipient = rlp.at(6)?;
        Ok(Self {
            tx_type: rlp.val_at(0)?,
            chain_id: rlp.val_at(1)?,
            nonce: rlp.val_at(2)?,
            gas_price: rlp.val_at(3)?,
            max_priority_fee_per_gas: rlp.val_at(4)?,
            gas_limit: rlp.val_at(5)?,
            recipient: if recipient.is_empty() {
                None
            } else {
                Some(recipient.as_val()?)
            },
            amount: rlp.val_at(7)?,
            payload: rlp.val_at(8)?,
            access_list: rlp.list_at(9)?,
            v: rlp.val_at(10)?,
            r: rlp.val_at(11)?,
            s: rlp.val_at(12)?,
        })
    }
}

/// A log with its position in the chain filled in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportLog {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Vec<u8>,
    pub block_number: BlockNumber,
    pub tx_hash: Hash,
    pub tx_index: u64,
    pub block_hash: Hash,
    /// Position of the log within the block.
    pub index: u64,
    pub removed: bool,
}

impl Encodable for ExportLog {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(9);
        s.append(&self.address);
        s.append_list::<Hash, _>(&self.topics);
        s.append(&self.data);
        s.append(&self.block_number);
        s.append(&self.tx_hash);
        s.append(&self.tx_index);
        s.append(&self.block_hash);
        s.append(&self.index);
        s.append(&self.removed);
    }
}

impl Decodable for ExportLog {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 9)?;
        Ok(Self {
            address: rlp.val_at(0)?,
            topics: rlp.list_at(1)?,
            data: rlp.val_at(2)?,
            block_number: rlp.val_at(3)?,
            tx_hash: rlp.val_at(4)?,
            tx_index: rlp.val_at(5)?,
            block_hash: rlp.val_at(6)?,
            index: rlp.val_at(7)?,
            removed: rlp.val_at(8)?,
        })
    }
}

/// A receipt with the fields a node derives on read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportReceipt {
    /// Raw post-state root or status byte.
    pub post_state_or_status: Vec<u8>,
    pub cumulative_gas_used: u64,
    pub bloom: Bloom,
    pub logs: Vec<ExportLog>,
    pub tx_hash: Hash,
    /// Zero unless the transaction created a contract.
    pub contract_address: Address,
    pub gas_used: u64,
}

impl Encodable for ExportReceipt {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(7);
        s.append(&self.post_state_or_status);
        s.append(&self.cumulative_gas_used);
        s.append(&self.bloom);
        s.append_list::<ExportLog, _>(&self.logs);
        s.append(&self.tx_hash);
        s.append(&self.contract_address);
        s.append(&self.gas_used);
    }
}

impl Decodable for ExportReceipt {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 7)?;
        Ok(Self {
            post_state_or_status: rlp.val_at(0)?,
            cumulative_gas_used: rlp.val_at(1)?,
            bloom: rlp.val_at(2)?,
            logs: rlp.list_at(3)?,
            tx_hash: rlp.val_at(4)?,
            contract_address: rlp.val_at(5)?,
            gas_used: rlp.val_at(6)?,
        })
    }
}

/// Components read back from storage for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComponents {
    pub total_difficulty: U256,
    pub header: Header,
    pub receipts: Vec<Receipt>,
}

/// Everything needed to build a [`Replica`].
#[derive(Debug, Clone, Default)]
pub struct ReplicaParts {
    pub network_id: u64,
    pub hash: Hash,
    pub total_difficulty: U256,
    pub header: Header,
    pub transactions: Vec<ExportTransaction>,
    pub uncles: Vec<Header>,
    pub receipts: Vec<ExportReceipt>,
    pub senders: Vec<Address>,
    pub state: StateSpecimen,
}

/// A self-contained, consumer-facing snapshot of one finalized block.
///
/// Transactions, receipts and senders are index-aligned. A replica cannot be
/// modified once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replica {
    network_id: u64,
    hash: Hash,
    total_difficulty: U256,
    header: Header,
    transactions: Vec<ExportTransaction>,
    uncles: Vec<Header>,
    receipts: Vec<ExportReceipt>,
    senders: Vec<Address>,
    state: StateSpecimen,
}

impl Replica {
    /// Build a replica, refusing sequences that are not index-aligned.
    pub fn from_parts(parts: ReplicaParts) -> Result<Self, ReplicaError> {
        let txs = parts.transactions.len();
        if parts.receipts.len() != txs || parts.senders.len() != txs {
            return Err(ReplicaError::InconsistentComponents {
                block_hash: parts.hash,
                block_number: parts.header.number,
                reason: format!(
                    "{} transactions, {} receipts, {} senders",
                    txs,
                    parts.receipts.len(),
                    parts.senders.len()
                ),
            });
        }

        Ok(Self {
            network_id: parts.network_id,
            hash: parts.hash,
            total_difficulty: parts.total_difficulty,
            header: parts.header,
            transactions: parts.transactions,
            uncles: parts.uncles,
            receipts: parts.receipts,
            senders: parts.senders,
            state: parts.state,
        })
    }

    pub fn type_tag(&self) -> &'static str {
        REPLICA_TYPE_TAG
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    pub fn total_difficulty(&self) -> U256 {
        self.total_difficulty
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn transactions(&self) -> &[ExportTransaction] {
        &self.transactions
    }

    pub fn uncles(&self) -> &[Header] {
        &self.uncles
    }

    pub fn receipts(&self) -> &[ExportReceipt] {
        &self.receipts
    }

    pub fn senders(&self) -> &[Address] {
        &self.senders
    }

    pub fn state_specimen(&self) -> &StateSpecimen {
        &self.state
    }

    /// Whether transactions, receipts and senders have equal lengths.
    pub fn is_index_aligned(&self) -> bool {
        self.receipts.len() == self.transactions.len()
            && self.senders.len() == self.transactions.len()
    }
}

impl Encodable for Replica {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(REPLICA_FIELDS);
        s.append(&REPLICA_TYPE_TAG.to_string());
        s.append(&self.network_id);
        s.append(&self.hash);
        s.append(&self.total_difficulty);
        s.append(&self.header);
        s.append_list::<ExportTransaction, _>(&self.transactions);
        s.append_list::<Header, _>(&self.uncles);
        s.append_list::<ExportReceipt, _>(&self.receipts);
        s.append_list::<Address, _>(&self.senders);
        s.append(&self.state);
    }
}

impl Decodable for Replica {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, REPLICA_FIELDS)?;
        let type_tag: String = rlp.val_at(0)?;
        if type_tag != REPLICA_TYPE_TAG {
            return Err(DecoderError::Custom("unexpected replica type tag"));
        }

        let parts = ReplicaParts {
            network_id: rlp.val_at(1)?,
            hash: rlp.val_at(2)?,
            total_difficulty: rlp.val_at(3)?,
            header: rlp.val_at(4)?,
            transactions: rlp.list_at(5)?,
            uncles: rlp.list_at(6)?,
            receipts: rlp.list_at(7)?,
            senders: rlp.list_at(8)?,
            state: rlp.val_at(9)?,
        };
        Replica::from_parts(parts)
            .map_err(|_| DecoderError::Custom("replica sequences are not index-aligned"))
    }
}

fn expect_items(rlp: &Rlp, count: usize) -> Result<(), DecoderError> {
    if rlp.item_count()? != count {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok(())
}
