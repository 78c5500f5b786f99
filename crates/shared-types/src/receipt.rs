//! # Receipts
//!
//! Receipts in their storage form: the consensus fields only. Everything that
//! can be derived from the block (transaction hash, gas used, contract
//! address, log positions) is recomputed by readers.

use crate::entities::{Address, Hash};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

/// Execution outcome recorded in a receipt.
///
/// Pre-Byzantium receipts commit to the intermediate state root, later ones
/// to a single success bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptOutcome {
    PostState(Hash),
    Status(bool),
}

impl Default for ReceiptOutcome {
    fn default() -> Self {
        ReceiptOutcome::Status(true)
    }
}

impl ReceiptOutcome {
    /// The raw `PostStateOrStatus` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ReceiptOutcome::PostState(root) => root.as_bytes().to_vec(),
            ReceiptOutcome::Status(true) => vec![0x01],
            ReceiptOutcome::Status(false) => Vec::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecoderError> {
        match bytes {
            [] => Ok(ReceiptOutcome::Status(false)),
            [0x01] => Ok(ReceiptOutcome::Status(true)),
            root if root.len() == 32 => Ok(ReceiptOutcome::PostState(Hash::from_slice(root))),
            _ => Err(DecoderError::Custom("invalid receipt status")),
        }
    }
}

/// An event log emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Vec<u8>,
}

impl Encodable for Log {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.address);
        s.append_list::<Hash, _>(&self.topics);
        s.append(&self.data);
    }
}

impl Decodable for Log {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            address: rlp.val_at(0)?,
            topics: rlp.list_at(1)?,
            data: rlp.val_at(2)?,
        })
    }
}

/// A receipt as persisted: `[postStateOrStatus, cumulativeGasUsed, logs]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Receipt {
    pub outcome: ReceiptOutcome,
    pub cumulative_gas_used: u64,
    pub logs: Vec<Log>,
}

impl Encodable for Receipt {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.outcome.to_bytes());
        s.append(&self.cumulative_gas_used);
        s.append_list::<Log, _>(&self.logs);
    }
}

impl Decodable for Receipt {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let outcome: Vec<u8> = rlp.val_at(0)?;
        Ok(Self {
            outcome: ReceiptOutcome::from_bytes(&outcome)?,
            cumulative_gas_used: rlp.val_at(1)?,
            logs: rlp.list_at(2)?,
        })
    }
}
