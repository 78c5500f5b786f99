//! # Replica Assembler
//!
//! `BlockReplicationApi` implementation: read → recover → project →
//! assemble, then encode and publish.

use super::reader::read_components;
use super::ReplicationService;
use crate::domain::entities::{Replica, ReplicaParts};
use crate::domain::errors::ReplicaError;
use crate::domain::projection::{project_receipts, project_transactions};
use crate::domain::recovery::recover_senders;
use crate::ports::inbound::{BlockReplicationApi, PublishedReplica};
use crate::ports::outbound::{ChainReader, ReplicaEncoder, SignatureScheme, SignerResolver};
use rlp::DecoderError;
use shared_bus::{DeliveryChannel, ReplicationEvent, ReplicationSubscription, SubscriptionError};
use shared_types::{Block, BlockIdentity, StateSpecimen};
use tracing::{debug, error, info, warn};

impl<R, E> BlockReplicationApi for ReplicationService<R, E>
where
    R: ChainReader,
    E: ReplicaEncoder,
{
    fn create_replica<C: SignerResolver>(
        &self,
        block: &Block,
        chain: &C,
        state: StateSpecimen,
    ) -> Result<Replica, ReplicaError> {
        let identity = BlockIdentity::of(block, chain.network_id());

        let raw = read_components(&self.reader, &identity, block.transactions.len())?;

        let signer = chain.signer_for(identity.number);
        let senders = recover_senders(&signer, &block.transactions).map_err(|failure| {
            warn!(
                block = %identity,
                scheme = signer.name(),
                tx_index = failure.tx_index,
                tx_hash = ?failure.tx_hash,
                error = %failure.error,
                "[qc-18] Sender recovery failed"
            );
            ReplicaError::SenderRecovery {
                block_hash: identity.hash,
                block_number: identity.number,
                tx_index: failure.tx_index,
                tx_hash: failure.tx_hash,
                source: failure.error,
            }
        })?;

        let transactions = project_transactions(&block.transactions);
        let receipts = project_receipts(&identity, &block.transactions, &senders, &raw.receipts);

        let replica = Replica::from_parts(ReplicaParts {
            network_id: identity.network_id,
            hash: identity.hash,
            total_difficulty: raw.total_difficulty,
            header: raw.header,
            transactions,
            uncles: block.uncles.clone(),
            receipts,
            senders,
            state,
        })?;

        debug!(
            block = %identity,
            txs = replica.transactions().len(),
            uncles = replica.uncles().len(),
            specimen_reads = replica.state_specimen().len(),
            "[qc-18] Replica assembled"
        );
        Ok(replica)
    }

    fn create_block_replica<C: SignerResolver>(
        &self,
        block: &Block,
        chain: &C,
        state: StateSpecimen,
    ) -> Result<Option<PublishedReplica>, ReplicaError> {
        if !self.config.enabled {
            debug!(block_number = block.number(), "[qc-18] Replication disabled, skipping");
            return Ok(None);
        }

        let replica = self.create_replica(block, chain, state)?;

        let data = self.encoder.encode(&replica).map_err(|err| {
            error!(
                block_number = replica.number(),
                error = %err,
                "[qc-18] Replica encoding violated an internal invariant"
            );
            ReplicaError::from(err)
        })?;

        let hash = format!("{:#x}", replica.hash());
        info!(
            block_number = replica.number(),
            hash = %hash,
            bytes = data.len(),
            "[qc-18] Creating block replication event"
        );

        let event = ReplicationEvent::new(hash, data);
        let report = self.feed.publish(event.clone());
        if !report.is_complete() {
            warn!(
                block_number = replica.number(),
                delivered = report.delivered,
                dropped = report.dropped,
                disconnected = report.disconnected,
                "[qc-18] Replication event not delivered to every subscriber"
            );
        }

        Ok(Some(PublishedReplica { event, report }))
    }

    fn subscribe_replication_events(
        &self,
        channel: DeliveryChannel<ReplicationEvent>,
    ) -> Result<ReplicationSubscription, SubscriptionError> {
        self.feed.subscribe(channel)
    }

    fn decode_replica(&self, data: &[u8]) -> Result<Replica, DecoderError> {
        self.encoder.decode(data)
    }
}
