//! # Chain Record Storage
//!
//! Key schema for the raw records replication reads back, plus a reader and
//! writer over any [`KeyValueStore`].
//!
//! | Record | Key | Value |
//! |--------|-----|-------|
//! | Header | `h ‖ number(8, BE) ‖ hash` | RLP header |
//! | Total difficulty | `h ‖ number ‖ hash ‖ t` | RLP U256 |
//! | Receipts | `r ‖ number ‖ hash` | RLP list of receipts |

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, ChainReader, KeyValueStore};
use shared_types::{Block, BlockNumber, Hash, Header, Receipt, U256};
use std::collections::HashMap;
use tracing::debug;

/// Key prefixes of the chain record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `h ‖ number ‖ hash` -> header
    Header,
    /// `h ‖ number ‖ hash ‖ t` -> total difficulty
    TotalDifficulty,
    /// `r ‖ number ‖ hash` -> receipts
    Receipts,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Header | KeyPrefix::TotalDifficulty => b"h",
            KeyPrefix::Receipts => b"r",
        }
    }

    /// Build the full key of this record for one block.
    pub fn key(&self, hash: &Hash, number: BlockNumber) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + 8 + 32 + 1);
        key.extend_from_slice(self.as_bytes());
        key.extend_from_slice(&number.to_be_bytes());
        key.extend_from_slice(hash.as_bytes());
        if *self == KeyPrefix::TotalDifficulty {
            key.push(b't');
        }
        key
    }

    pub fn header_key(hash: &Hash, number: BlockNumber) -> Vec<u8> {
        KeyPrefix::Header.key(hash, number)
    }

    pub fn td_key(hash: &Hash, number: BlockNumber) -> Vec<u8> {
        KeyPrefix::TotalDifficulty.key(hash, number)
    }

    pub fn receipts_key(hash: &Hash, number: BlockNumber) -> Vec<u8> {
        KeyPrefix::Receipts.key(hash, number)
    }
}

/// In-memory key-value store for tests and wiring.
///
/// Provides atomic batch writes via single-threaded HashMap.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// [`ChainReader`] over a key-value store using the chain record schema.
#[derive(Debug, Default, Clone)]
pub struct KvChainReader<KV: KeyValueStore> {
    store: KV,
}

impl<KV: KeyValueStore> KvChainReader<KV> {
    pub fn new(store: KV) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KV {
        &self.store
    }

    pub fn into_inner(self) -> KV {
        self.store
    }
}

impl<KV: KeyValueStore> ChainReader for KvChainReader<KV> {
    fn read_td_rlp(
        &self,
        hash: &Hash,
        number: BlockNumber,
    ) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.store.get(&KeyPrefix::td_key(hash, number))
    }

    fn read_header_rlp(
        &self,
        hash: &Hash,
        number: BlockNumber,
    ) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.store.get(&KeyPrefix::header_key(hash, number))
    }

    fn read_receipts_rlp(
        &self,
        hash: &Hash,
        number: BlockNumber,
    ) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.store.get(&KeyPrefix::receipts_key(hash, number))
    }
}

/// Writes chain records in the layout [`KvChainReader`] expects.
pub struct ChainWriter<'a, KV: KeyValueStore> {
    store: &'a mut KV,
}

impl<'a, KV: KeyValueStore> ChainWriter<'a, KV> {
    pub fn new(store: &'a mut KV) -> Self {
        Self { store }
    }

    pub fn write_header(&mut self, header: &Header) -> Result<(), KVStoreError> {
        let key = KeyPrefix::header_key(&header.hash(), header.number);
        self.store.put(&key, &rlp::encode(header))
    }

    pub fn write_total_difficulty(
        &mut self,
        hash: &Hash,
        number: BlockNumber,
        total_difficulty: U256,
    ) -> Result<(), KVStoreError> {
        self.store
            .put(&KeyPrefix::td_key(hash, number), &rlp::encode(&total_difficulty))
    }

    pub fn write_receipts(
        &mut self,
        hash: &Hash,
        number: BlockNumber,
        receipts: &[Receipt],
    ) -> Result<(), KVStoreError> {
        self.store.put(
            &KeyPrefix::receipts_key(hash, number),
            &rlp::encode_list::<Receipt, _>(receipts),
        )
    }

    /// Write header, total difficulty and receipts of `block` in one batch.
    pub fn write_block(
        &mut self,
        block: &Block,
        total_difficulty: U256,
        receipts: &[Receipt],
    ) -> Result<(), KVStoreError> {
        let hash = block.hash();
        let number = block.number();
        let operations = vec![
            BatchOperation::put(
                KeyPrefix::header_key(&hash, number),
                rlp::encode(&block.header).to_vec(),
            ),
            BatchOperation::put(
                KeyPrefix::td_key(&hash, number),
                rlp::encode(&total_difficulty).to_vec(),
            ),
            BatchOperation::put(
                KeyPrefix::receipts_key(&hash, number),
                rlp::encode_list::<Receipt, _>(receipts).to_vec(),
            ),
        ];
        self.store.atomic_batch_write(operations)?;
        debug!(number, ?hash, receipts = receipts.len(), "[qc-18] Chain records written");
        Ok(())
    }

    /// Remove every record of one block.
    pub fn delete_block(&mut self, hash: &Hash, number: BlockNumber) -> Result<(), KVStoreError> {
        self.store.atomic_batch_write(vec![
            BatchOperation::delete(KeyPrefix::header_key(hash, number)),
            BatchOperation::delete(KeyPrefix::td_key(hash, number)),
            BatchOperation::delete(KeyPrefix::receipts_key(hash, number)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let hash = Hash::repeat_byte(0xab);
        let header = KeyPrefix::header_key(&hash, 0x0102);
        assert_eq!(header.len(), 41);
        assert_eq!(header[0], b'h');
        assert_eq!(&header[1..9], &[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(&header[9..], hash.as_bytes());

        let td = KeyPrefix::td_key(&hash, 0x0102);
        assert_eq!(&td[..41], header.as_slice());
        assert_eq!(td[41], b't');

        let receipts = KeyPrefix::receipts_key(&hash, 0x0102);
        assert_eq!(receipts[0], b'r');
        assert_eq!(&receipts[1..], &header[1..]);
    }

    #[test]
    fn test_write_block_then_read_back() {
        let block = Block::new(
            Header {
                number: 12,
                ..Default::default()
            },
            vec![],
            vec![],
        );
        let mut store = InMemoryKVStore::new();
        ChainWriter::new(&mut store)
            .write_block(&block, U256::from(99u64), &[])
            .unwrap();
        assert_eq!(store.len(), 3);

        let reader = KvChainReader::new(store);
        let hash = block.hash();
        let td = reader.read_td_rlp(&hash, 12).unwrap().unwrap();
        assert_eq!(rlp::decode::<U256>(&td).unwrap(), U256::from(99u64));
        let header = reader.read_header_rlp(&hash, 12).unwrap().unwrap();
        assert_eq!(rlp::decode::<Header>(&header).unwrap(), block.header);
        let receipts = reader.read_receipts_rlp(&hash, 12).unwrap().unwrap();
        assert_eq!(receipts, vec![0xc0]);
    }

    #[test]
    fn test_missing_record_is_none() {
        let reader = KvChainReader::new(InMemoryKVStore::new());
        assert_eq!(reader.read_td_rlp(&Hash::zero(), 1).unwrap(), None);
    }

    #[test]
    fn test_delete_block_removes_all_records() {
        let header = Header::default();
        let hash = header.hash();
        let mut store = InMemoryKVStore::new();
        let mut writer = ChainWriter::new(&mut store);
        writer.write_header(&header).unwrap();
        writer.write_total_difficulty(&hash, 0, U256::one()).unwrap();
        writer.write_receipts(&hash, 0, &[]).unwrap();
        writer.delete_block(&hash, 0).unwrap();
        assert!(store.is_empty());
    }
}
