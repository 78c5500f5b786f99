//! Fixture builders shared by unit and integration tests.

#![allow(clippy::expect_used)]

use crate::adapters::{ChainWriter, InMemoryKVStore};
use k256::ecdsa::SigningKey;
use shared_types::{
    Address, Block, ChainConfig, Hash, Header, Log, Receipt, ReceiptOutcome, Transaction, TxType,
    U256,
};

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Recipient of every fixture call transaction.
pub fn recipient() -> Address {
    Address::repeat_byte(0x55)
}

/// A deterministic key; `seed` must be non-zero.
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).expect("valid scalar")
}

pub fn random_signing_key() -> SigningKey {
    SigningKey::random(&mut rand::thread_rng())
}

pub fn unsigned_legacy_tx(nonce: u64) -> Transaction {
    Transaction {
        tx_type: TxType::Legacy,
        nonce,
        gas_price: U256::from(1_000_000_000u64),
        gas_limit: 21_000,
        to: Some(recipient()),
        value: U256::from(1_000u64),
        ..Default::default()
    }
}

pub fn unsigned_create_tx(nonce: u64) -> Transaction {
    Transaction {
        to: None,
        gas_limit: 100_000,
        data: vec![0x60, 0x80, 0x60, 0x40, 0x52],
        value: U256::zero(),
        ..unsigned_legacy_tx(nonce)
    }
}

pub fn unsigned_dynamic_fee_tx(nonce: u64, chain_id: u64) -> Transaction {
    Transaction {
        tx_type: TxType::DynamicFee,
        chain_id,
        max_priority_fee_per_gas: U256::from(2_000_000_000u64),
        gas_price: U256::from(30_000_000_000u64),
        ..unsigned_legacy_tx(nonce)
    }
}

/// Sign `tx` with `key`.
///
/// Legacy transactions are EIP-155 protected when `chain_id` is given. Typed
/// transactions take `chain_id` as their own chain id when given.
pub fn sign_transaction(mut tx: Transaction, key: &SigningKey, chain_id: Option<u64>) -> Transaction {
    let hash = match tx.tx_type {
        TxType::Legacy => tx.signing_hash(chain_id),
        TxType::AccessList | TxType::DynamicFee => {
            if let Some(chain_id) = chain_id {
                tx.chain_id = chain_id;
            }
            tx.signing_hash(None)
        }
    };

    let (sig, recid) = key
        .sign_prehash_recoverable(hash.as_bytes())
        .expect("signing failed");
    let mut parity = u64::from(recid.is_y_odd());
    let sig = match sig.normalize_s() {
        Some(normalized) => {
            parity ^= 1;
            normalized
        }
        None => sig,
    };

    let sig_bytes = sig.to_bytes();
    tx.r = U256::from_big_endian(&sig_bytes[..32]);
    tx.s = U256::from_big_endian(&sig_bytes[32..]);
    tx.v = match (tx.tx_type, chain_id) {
        (TxType::Legacy, Some(chain_id)) => 35 + 2 * chain_id + parity,
        (TxType::Legacy, None) => 27 + parity,
        (TxType::AccessList | TxType::DynamicFee, _) => parity,
    };
    tx
}

/// The same signature with s replaced by n - s and the parity flipped.
pub fn into_high_s(mut tx: Transaction) -> Transaction {
    tx.s = U256::from_big_endian(&SECP256K1_ORDER) - tx.s;
    tx.v = match tx.tx_type {
        TxType::Legacy if tx.v == 27 || tx.v == 28 => 55 - tx.v,
        // EIP-155: parity is (v - 35) % 2
        TxType::Legacy if (tx.v - 35) % 2 == 0 => tx.v + 1,
        TxType::Legacy => tx.v - 1,
        TxType::AccessList | TxType::DynamicFee => tx.v ^ 1,
    };
    tx
}

/// Transactions signed the way `chain` expects at `number`.
pub fn signed_transactions(chain: &ChainConfig, number: u64, count: usize) -> Vec<Transaction> {
    let chain_id = chain.is_eip155(number).then_some(chain.chain_id);
    (0..count)
        .map(|i| {
            let key = signing_key(i as u8 + 1);
            let tx = if i % 3 == 2 {
                unsigned_create_tx(i as u64)
            } else {
                unsigned_legacy_tx(i as u64)
            };
            sign_transaction(tx, &key, chain_id)
        })
        .collect()
}

pub fn make_header(number: u64) -> Header {
    Header {
        parent_hash: Hash::from_low_u64_be(number.saturating_sub(1)),
        coinbase: Address::repeat_byte(0xcb),
        difficulty: U256::from(131_072u64),
        number,
        gas_limit: 30_000_000,
        timestamp: 1_600_000_000 + number * 12,
        ..Default::default()
    }
}

pub fn make_block(number: u64, transactions: Vec<Transaction>, uncles: Vec<Header>) -> Block {
    let mut header = make_header(number);
    header.gas_used = 21_000 * transactions.len() as u64;
    Block::new(header, transactions, uncles)
}

/// Successful receipts with one log each and 21k gas per transaction.
pub fn receipts_for(transactions: &[Transaction]) -> Vec<Receipt> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, _)| Receipt {
            outcome: ReceiptOutcome::Status(true),
            cumulative_gas_used: 21_000 * (i as u64 + 1),
            logs: vec![Log {
                address: recipient(),
                topics: vec![Hash::from_low_u64_be(i as u64)],
                data: vec![i as u8],
            }],
        })
        .collect()
}

/// Total difficulty stored for fixture blocks.
pub fn total_difficulty_of(block: &Block) -> U256 {
    U256::from(1_000_000u64) + U256::from(block.number())
}

/// A store holding every record `block` needs to be replicated.
pub fn store_with_block(block: &Block) -> InMemoryKVStore {
    let mut store = InMemoryKVStore::new();
    write_block(&mut store, block);
    store
}

pub fn write_block(store: &mut InMemoryKVStore, block: &Block) {
    ChainWriter::new(store)
        .write_block(
            block,
            total_difficulty_of(block),
            &receipts_for(&block.transactions),
        )
        .expect("in-memory write");
}
