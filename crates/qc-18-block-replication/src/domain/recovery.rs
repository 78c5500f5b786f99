//! # Sender Recovery
//!
//! Recovers every sender of a block in transaction order. The first failure
//! aborts the whole batch; no partial sender list is ever returned.

use super::errors::SignatureError;
use crate::ports::outbound::SignatureScheme;
use shared_types::{Address, Hash, Transaction};

/// The transaction that stopped recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryFailure {
    pub tx_index: usize,
    pub tx_hash: Hash,
    pub error: SignatureError,
}

/// Recover index-aligned senders for `transactions`.
pub fn recover_senders<S>(
    scheme: &S,
    transactions: &[Transaction],
) -> Result<Vec<Address>, RecoveryFailure>
where
    S: SignatureScheme + ?Sized,
{
    transactions
        .iter()
        .enumerate()
        .map(|(tx_index, tx)| {
            scheme.recover_sender(tx).map_err(|error| RecoveryFailure {
                tx_index,
                tx_hash: tx.hash(),
                error,
            })
        })
        .collect()
}
