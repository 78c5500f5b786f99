//! # State Specimen
//!
//! The execution-trace payload attached to a block replica: every account,
//! storage slot, code blob and historical block hash that execution of the
//! block touched. It is built by the state layer and only carried here.

use crate::entities::{Address, BlockNumber, Hash, U256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountRead {
    pub address: Address,
    pub nonce: u64,
    pub balance: U256,
    pub code_hash: Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageRead {
    pub account: Address,
    pub slot_key: Hash,
    pub value: Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeRead {
    pub hash: Hash,
    pub code: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockhashRead {
    pub block_number: BlockNumber,
    pub block_hash: Hash,
}

/// Opaque state specimen supplied by the caller of replica creation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSpecimen {
    pub account_reads: Vec<AccountRead>,
    pub storage_reads: Vec<StorageRead>,
    pub code_reads: Vec<CodeRead>,
    pub block_hashes: Vec<BlockhashRead>,
}

impl StateSpecimen {
    /// Total number of recorded reads.
    pub fn len(&self) -> usize {
        self.account_reads.len()
            + self.storage_reads.len()
            + self.code_reads.len()
            + self.block_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn expect_items(rlp: &Rlp, count: usize) -> Result<(), DecoderError> {
    if rlp.item_count()? != count {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok(())
}

impl Encodable for AccountRead {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.address);
        s.append(&self.nonce);
        s.append(&self.balance);
        s.append(&self.code_hash);
    }
}

impl Decodable for AccountRead {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 4)?;
        Ok(Self {
            address: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            balance: rlp.val_at(2)?,
            code_hash: rlp.val_at(3)?,
        })
    }
}

impl Encodable for StorageRead {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.account);
        s.append(&self.slot_key);
        s.append(&self.value);
    }
}

impl Decodable for StorageRead {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 3)?;
        Ok(Self {
            account: rlp.val_at(0)?,
            slot_key: rlp.val_at(1)?,
            value: rlp.val_at(2)?,
        })
    }
}

impl Encodable for CodeRead {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.hash);
        s.append(&self.code);
    }
}

impl Decodable for CodeRead {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 2)?;
        Ok(Self {
            hash: rlp.val_at(0)?,
            code: rlp.val_at(1)?,
        })
    }
}

impl Encodable for BlockhashRead {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.block_number);
        s.append(&self.block_hash);
    }
}

impl Decodable for BlockhashRead {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 2)?;
        Ok(Self {
            block_number: rlp.val_at(0)?,
            block_hash: rlp.val_at(1)?,
        })
    }
}

impl Encodable for StateSpecimen {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append_list::<AccountRead, _>(&self.account_reads);
        s.append_list::<StorageRead, _>(&self.storage_reads);
        s.append_list::<CodeRead, _>(&self.code_reads);
        s.append_list::<BlockhashRead, _>(&self.block_hashes);
    }
}

impl Decodable for StateSpecimen {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 4)?;
        Ok(Self {
            account_reads: rlp.list_at(0)?,
            storage_reads: rlp.list_at(1)?,
            code_reads: rlp.list_at(2)?,
            block_hashes: rlp.list_at(3)?,
        })
    }
}
