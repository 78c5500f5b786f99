//! # Export Projection
//!
//! Pure mapping from chain entities to the export views carried in a
//! replica. Receipt projection pairs receipt *i* with transaction *i* and
//! sender *i* to fill the fields a node derives on read.

use super::entities::{ExportLog, ExportReceipt, ExportTransaction};
use shared_types::{
    create_address, keccak256, Address, BlockIdentity, Bloom, Log, Receipt, Transaction, TxType,
};

pub fn project_transaction(tx: &Transaction) -> ExportTransaction {
    let chain_id = match tx.tx_type {
        TxType::Legacy => tx.chain_id().unwrap_or_default(),
        TxType::AccessList | TxType::DynamicFee => tx.chain_id,
    };

    ExportTransaction {
        tx_type: tx.tx_type.as_u8(),
        chain_id,
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        gas_limit: tx.gas_limit,
        recipient: tx.to,
        amount: tx.value,
        payload: tx.data.clone(),
        access_list: tx.access_list.clone(),
        v: tx.v,
        r: tx.r,
        s: tx.s,
    }
}

pub fn project_transactions(transactions: &[Transaction]) -> Vec<ExportTransaction> {
    transactions.iter().map(project_transaction).collect()
}

/// Project stored receipts, deriving per-transaction and per-log fields.
///
/// The three slices must be index-aligned; extra trailing entries in any of
/// them are ignored.
pub fn project_receipts(
    block: &BlockIdentity,
    transactions: &[Transaction],
    senders: &[Address],
    receipts: &[Receipt],
) -> Vec<ExportReceipt> {
    let mut exported = Vec::with_capacity(receipts.len());
    let mut log_index = 0u64;
    let mut previous_cumulative = 0u64;

    for (tx_index, ((tx, sender), receipt)) in
        transactions.iter().zip(senders).zip(receipts).enumerate()
    {
        let tx_hash = tx.hash();

        let logs = receipt
            .logs
            .iter()
            .map(|log| {
                let exported = ExportLog {
                    address: log.address,
                    topics: log.topics.clone(),
                    data: log.data.clone(),
                    block_number: block.number,
                    tx_hash,
                    tx_index: tx_index as u64,
                    block_hash: block.hash,
                    index: log_index,
                    removed: false,
                };
                log_index += 1;
                exported
            })
            .collect();

        let contract_address = if tx.is_create() {
            create_address(sender, tx.nonce)
        } else {
            Address::zero()
        };

        exported.push(ExportReceipt {
            post_state_or_status: receipt.outcome.to_bytes(),
            cumulative_gas_used: receipt.cumulative_gas_used,
            bloom: logs_bloom(&receipt.logs),
            logs,
            tx_hash,
            contract_address,
            // The reader rejects decreasing cumulative gas.
            gas_used: receipt
                .cumulative_gas_used
                .saturating_sub(previous_cumulative),
        });
        previous_cumulative = receipt.cumulative_gas_used;
    }

    exported
}

/// The 2048-bit bloom over every log address and topic.
pub fn logs_bloom(logs: &[Log]) -> Bloom {
    let mut bloom = Bloom::default();
    for log in logs {
        accrue(&mut bloom, log.address.as_bytes());
        for topic in &log.topics {
            accrue(&mut bloom, topic.as_bytes());
        }
    }
    bloom
}

fn accrue(bloom: &mut Bloom, input: &[u8]) {
    let hash = keccak256(input);
    let hash = hash.as_bytes();
    for i in [0, 2, 4] {
        let bit = ((usize::from(hash[i]) << 8) | usize::from(hash[i + 1])) & 2047;
        bloom.0[255 - bit / 8] |= 1 << (bit % 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Hash, ReceiptOutcome, U256};

    fn identity() -> BlockIdentity {
        BlockIdentity::new(Hash::repeat_byte(0xbb), 100, 1)
    }

    fn tx(nonce: u64, to: Option<Address>) -> Transaction {
        Transaction {
            nonce,
            to,
            gas_limit: 100_000,
            v: 27,
            r: U256::one(),
            s: U256::one(),
            ..Default::default()
        }
    }

    fn receipt(cumulative: u64, logs: usize) -> Receipt {
        Receipt {
            outcome: ReceiptOutcome::Status(true),
            cumulative_gas_used: cumulative,
            logs: (0..logs)
                .map(|i| Log {
                    address: Address::repeat_byte(i as u8 + 1),
                    topics: vec![Hash::repeat_byte(0xee)],
                    data: vec![i as u8],
                })
                .collect(),
        }
    }

    #[test]
    fn test_legacy_chain_id_flattened_from_v() {
        let mut protected = tx(0, Some(Address::zero()));
        protected.v = 37;
        assert_eq!(project_transaction(&protected).chain_id, 1);

        let unprotected = tx(0, Some(Address::zero()));
        assert_eq!(project_transaction(&unprotected).chain_id, 0);
    }

    #[test]
    fn test_transaction_fields_preserved() {
        let mut source = tx(9, None);
        source.value = U256::from(5u64);
        source.data = vec![0xde, 0xad];
        let exported = project_transaction(&source);
        assert_eq!(exported.nonce, 9);
        assert_eq!(exported.recipient, None);
        assert_eq!(exported.amount, U256::from(5u64));
        assert_eq!(exported.payload, vec![0xde, 0xad]);
        assert_eq!(exported.tx_type, 0);
    }

    #[test]
    fn test_gas_used_and_log_indexes() {
        let txs = vec![tx(0, Some(Address::zero())), tx(1, Some(Address::zero()))];
        let senders = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        let receipts = vec![receipt(21_000, 2), receipt(63_000, 1)];

        let exported = project_receipts(&identity(), &txs, &senders, &receipts);

        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].gas_used, 21_000);
        assert_eq!(exported[1].gas_used, 42_000);
        let indexes: Vec<_> = exported
            .iter()
            .flat_map(|r| r.logs.iter().map(|l| (l.tx_index, l.index)))
            .collect();
        assert_eq!(indexes, vec![(0, 0), (0, 1), (1, 2)]);
        assert_eq!(exported[1].logs[0].tx_hash, txs[1].hash());
        assert_eq!(exported[1].logs[0].block_hash, Hash::repeat_byte(0xbb));
        assert_eq!(exported[1].logs[0].block_number, 100);
    }

    #[test]
    fn test_contract_address_only_for_creations() {
        let sender = Address::repeat_byte(0x42);
        let txs = vec![tx(7, None), tx(8, Some(Address::zero()))];
        let receipts = vec![receipt(53_000, 0), receipt(74_000, 0)];

        let exported = project_receipts(&identity(), &txs, &[sender, sender], &receipts);

        assert_eq!(exported[0].contract_address, create_address(&sender, 7));
        assert_eq!(exported[1].contract_address, Address::zero());
    }

    #[test]
    fn test_bloom_sets_bits_for_logs() {
        assert_eq!(logs_bloom(&[]), Bloom::default());

        let logs = receipt(0, 1).logs;
        let bloom = logs_bloom(&logs);
        let set_bits: u32 = bloom.0.iter().map(|b| b.count_ones()).sum();
        assert!(set_bits > 0 && set_bits <= 6);
    }
}
