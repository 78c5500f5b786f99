//! # RLP Replica Codec
//!
//! The canonical wire form of a replica: one RLP list, in order, of type
//! tag, network id, block hash, total difficulty, header, transactions,
//! uncles, receipts, senders and state specimen.

use crate::domain::entities::Replica;
use crate::domain::errors::EncodeError;
use crate::ports::outbound::ReplicaEncoder;
use bytes::Bytes;
use rlp::{DecoderError, Rlp};

/// Encodes replicas with the `rlp` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RlpReplicaCodec;

impl ReplicaEncoder for RlpReplicaCodec {
    fn encode(&self, replica: &Replica) -> Result<Bytes, EncodeError> {
        debug_assert!(replica.is_index_aligned());
        if !replica.is_index_aligned() {
            return Err(EncodeError::LengthMismatch {
                transactions: replica.transactions().len(),
                receipts: replica.receipts().len(),
                senders: replica.senders().len(),
            });
        }
        Ok(rlp::encode(replica).freeze())
    }

    fn decode(&self, data: &[u8]) -> Result<Replica, DecoderError> {
        let rlp = Rlp::new(data);
        let info = rlp.payload_info()?;
        if info.header_len + info.value_len != data.len() {
            return Err(DecoderError::RlpInconsistentLengthAndData);
        }
        rlp.as_val()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ExportReceipt, ExportTransaction, ReplicaParts, REPLICA_FIELDS,
    };
    use rlp::RlpStream;
    use shared_types::{Address, Header};

    fn replica(txs: usize) -> Replica {
        let header = Header {
            number: 3,
            ..Default::default()
        };
        Replica::from_parts(ReplicaParts {
            network_id: 1337,
            hash: header.hash(),
            header,
            transactions: vec![ExportTransaction::default(); txs],
            receipts: vec![ExportReceipt::default(); txs],
            senders: vec![Address::repeat_byte(7); txs],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let codec = RlpReplicaCodec;
        let replica = replica(2);
        let first = codec.encode(&replica).unwrap();
        let second = codec.encode(&replica.clone()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let codec = RlpReplicaCodec;
        let replica = replica(1);
        let bytes = codec.encode(&replica).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), replica);
    }

    #[test]
    fn test_empty_block_encodes() {
        let codec = RlpReplicaCodec;
        let replica = replica(0);
        let bytes = codec.encode(&replica).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert!(decoded.transactions().is_empty());
        assert!(decoded.uncles().is_empty());
        assert!(decoded.senders().is_empty());
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let codec = RlpReplicaCodec;
        let mut bytes = codec.encode(&replica(0)).unwrap().to_vec();
        bytes.push(0x00);
        assert!(codec.decode(&bytes).is_err());
    }

    #[test]
    fn test_misaligned_replica_cannot_be_decoded() {
        let bytes = RlpReplicaCodec.encode(&replica(1)).unwrap();
        let rlp = Rlp::new(&bytes);

        // Same replica with the sender list emptied.
        let mut stream = RlpStream::new_list(REPLICA_FIELDS);
        for i in 0..REPLICA_FIELDS {
            if i == 8 {
                stream.begin_list(0);
            } else {
                stream.append_raw(rlp.at(i).unwrap().as_raw(), 1);
            }
        }
        let err = RlpReplicaCodec.decode(&stream.out()).unwrap_err();
        assert_eq!(
            err,
            DecoderError::Custom("replica sequences are not index-aligned")
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(RlpReplicaCodec.decode(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
