//! # Raw Component Reader
//!
//! Reads total difficulty, header and receipts in that order. The first
//! missing or undecodable record stops the read.

use crate::domain::entities::RawComponents;
use crate::domain::errors::{Component, KVStoreError, ReplicaError};
use crate::ports::outbound::ChainReader;
use rlp::{Decodable, DecoderError, Rlp};
use shared_types::{BlockIdentity, Header, Receipt, U256};
use tracing::error;

/// Read and decode the stored components of one block.
///
/// The stored header must hash to the requested block hash. `expected_txs` is
/// the transaction count of the in-memory block; the stored receipts must
/// match it, and their cumulative gas must never decrease.
pub fn read_components<R>(
    reader: &R,
    block: &BlockIdentity,
    expected_txs: usize,
) -> Result<RawComponents, ReplicaError>
where
    R: ChainReader + ?Sized,
{
    let td_rlp = require(
        block,
        Component::TotalDifficulty,
        reader.read_td_rlp(&block.hash, block.number),
    )?;
    let total_difficulty: U256 =
        decode_component(block, Component::TotalDifficulty, &td_rlp, |rlp| rlp.as_val())?;

    let header_rlp = require(
        block,
        Component::Header,
        reader.read_header_rlp(&block.hash, block.number),
    )?;
    let header: Header = decode_component(block, Component::Header, &header_rlp, Header::decode)?;

    if header.number != block.number {
        return Err(inconsistent(
            block,
            format!("stored header carries number {}", header.number),
        ));
    }
    let stored_hash = header.hash();
    if stored_hash != block.hash {
        return Err(inconsistent(
            block,
            format!("stored header hashes to {:#x}", stored_hash),
        ));
    }

    let receipts_rlp = require(
        block,
        Component::Receipts,
        reader.read_receipts_rlp(&block.hash, block.number),
    )?;
    let receipts: Vec<Receipt> =
        decode_component(block, Component::Receipts, &receipts_rlp, |rlp| {
            rlp.as_list()
        })?;

    if receipts.len() != expected_txs {
        return Err(inconsistent(
            block,
            format!(
                "{} stored receipts for {} transactions",
                receipts.len(),
                expected_txs
            ),
        ));
    }

    if let Some(index) = receipts
        .windows(2)
        .position(|pair| pair[1].cumulative_gas_used < pair[0].cumulative_gas_used)
    {
        return Err(inconsistent(
            block,
            format!("cumulative gas decreases at receipt {}", index + 1),
        ));
    }

    Ok(RawComponents {
        total_difficulty,
        header,
        receipts,
    })
}

fn require(
    block: &BlockIdentity,
    component: Component,
    read: Result<Option<Vec<u8>>, KVStoreError>,
) -> Result<Vec<u8>, ReplicaError> {
    match read {
        Ok(Some(blob)) => Ok(blob),
        Ok(None) => {
            error!(block = %block, %component, "[qc-18] Stored component missing");
            Err(ReplicaError::StorageDecode {
                component,
                block_hash: block.hash,
                block_number: block.number,
                reason: "record not found".to_string(),
            })
        }
        Err(source) => {
            error!(block = %block, %component, error = %source, "[qc-18] Storage read failed");
            Err(ReplicaError::Storage {
                block_hash: block.hash,
                block_number: block.number,
                source,
            })
        }
    }
}

fn decode_component<T>(
    block: &BlockIdentity,
    component: Component,
    blob: &[u8],
    decode: impl FnOnce(&Rlp) -> Result<T, DecoderError>,
) -> Result<T, ReplicaError> {
    decode(&Rlp::new(blob)).map_err(|err| {
        error!(block = %block, %component, error = %err, "[qc-18] Invalid stored component RLP");
        ReplicaError::StorageDecode {
            component,
            block_hash: block.hash,
            block_number: block.number,
            reason: err.to_string(),
        }
    })
}

fn inconsistent(block: &BlockIdentity, reason: String) -> ReplicaError {
    error!(block = %block, %reason, "[qc-18] Stored components disagree with block");
    ReplicaError::InconsistentComponents {
        block_hash: block.hash,
        block_number: block.number,
        reason,
    }
}
