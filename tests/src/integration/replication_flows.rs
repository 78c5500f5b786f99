//! # Block Replication Flows
//!
//! Tests that blocks written through the chain record schema come out of
//! qc-18 as replicas on the shared-bus feed, across a fork schedule.
//!
//! ## Flows Tested:
//!
//! 1. **Import → Replica → Subscriber**: every imported block reaches every
//!    subscriber, decodable, in import order
//! 2. **Fork boundaries**: the signer follows the schedule block by block
//! 3. **Failure isolation**: a bad block publishes nothing and does not
//!    disturb the blocks after it
//! 4. **Subscriber lifecycle**: unsubscribe, dropped receivers, shutdown

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use qc_18_block_replication::test_utils::{
        into_high_s, make_block, random_signing_key, sign_transaction, signed_transactions,
        signing_key, unsigned_dynamic_fee_tx, unsigned_legacy_tx, write_block,
    };
    use qc_18_block_replication::{
        BlockReplicationApi, InMemoryKVStore, KvChainReader, ReplicaError, ReplicationConfig,
        ReplicationDependencies, ReplicationService, RlpReplicaCodec, SignatureError,
    };
    use shared_types::{Block, ChainConfig, StateSpecimen};

    type Service = ReplicationService<KvChainReader<InMemoryKVStore>, RlpReplicaCodec>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// One fork per block: frontier at 1, homestead at 2, EIP-155 at 3,
    /// Berlin at 4 and London from 5.
    fn staged_chain() -> ChainConfig {
        ChainConfig {
            chain_id: 7,
            homestead_block: Some(2),
            eip155_block: Some(3),
            berlin_block: Some(4),
            london_block: Some(5),
        }
    }

    fn staged_blocks(chain: &ChainConfig) -> Vec<Block> {
        (1..=5)
            .map(|number| {
                let mut txs = signed_transactions(chain, number, 2);
                if chain.is_london(number) {
                    txs.push(sign_transaction(
                        unsigned_dynamic_fee_tx(9, chain.chain_id),
                        &random_signing_key(),
                        None,
                    ));
                }
                make_block(number, txs, vec![])
            })
            .collect()
    }

    fn service_with(blocks: &[Block]) -> Service {
        let mut store = InMemoryKVStore::new();
        for block in blocks {
            write_block(&mut store, block);
        }
        let deps = ReplicationDependencies {
            reader: KvChainReader::new(store),
            encoder: RlpReplicaCodec,
        };
        ReplicationService::new(deps, ReplicationConfig::default())
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_imported_blocks_reach_subscriber_in_order() {
        let chain = staged_chain();
        let blocks = staged_blocks(&chain);
        let service = service_with(&blocks);
        let (_sub, mut rx) = service.subscribe_unbounded().unwrap();

        for block in &blocks {
            service
                .create_block_replica(block, &chain, StateSpecimen::default())
                .unwrap();
        }

        for block in &blocks {
            let event = timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("event in time")
                .expect("feed open");
            assert_eq!(event.hash, format!("0x{}", hex::encode(block.hash())));

            let replica = service.decode_replica(&event.data).unwrap();
            assert_eq!(replica.network_id(), 7);
            assert_eq!(replica.number(), block.number());
            assert_eq!(replica.senders().len(), block.transactions.len());
            assert_eq!(replica.receipts().len(), block.transactions.len());
        }
    }

    #[test]
    fn test_typed_tx_lands_in_replica_after_london() {
        let chain = staged_chain();
        let blocks = staged_blocks(&chain);
        let service = service_with(&blocks);

        let replica = service
            .create_replica(&blocks[4], &chain, StateSpecimen::default())
            .unwrap();
        let typed = replica.transactions().last().unwrap();
        assert_eq!(typed.tx_type, 2);
        assert_eq!(typed.chain_id, 7);
    }

    #[test]
    fn test_typed_tx_rejected_before_london() {
        let chain = staged_chain();
        let tx = sign_transaction(unsigned_dynamic_fee_tx(0, 7), &signing_key(1), None);
        let block = make_block(4, vec![tx], vec![]);
        let service = service_with(std::slice::from_ref(&block));

        let err = service
            .create_replica(&block, &chain, StateSpecimen::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ReplicaError::SenderRecovery {
                source: SignatureError::UnsupportedTxType { scheme: "berlin", .. },
                ..
            }
        ));
    }

    #[test]
    fn test_high_s_accepted_only_before_homestead() {
        let chain = staged_chain();
        let high_s = || into_high_s(sign_transaction(unsigned_legacy_tx(0), &signing_key(3), None));
        let frontier = make_block(1, vec![high_s()], vec![]);
        let homestead = make_block(2, vec![high_s()], vec![]);
        let service = service_with(&[frontier.clone(), homestead.clone()]);

        assert!(service
            .create_replica(&frontier, &chain, StateSpecimen::default())
            .is_ok());
        let err = service
            .create_replica(&homestead, &chain, StateSpecimen::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ReplicaError::SenderRecovery {
                source: SignatureError::MalleableSignature,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_bad_block_does_not_disturb_neighbours() {
        let chain = staged_chain();
        let mut blocks = staged_blocks(&chain);
        blocks[2].transactions[0].s = 0u64.into();
        let service = service_with(&blocks);
        let (_sub, mut rx) = service.subscribe_unbounded().unwrap();

        let outcomes: Vec<_> = blocks
            .iter()
            .map(|block| service.create_block_replica(block, &chain, StateSpecimen::default()))
            .collect();

        assert!(outcomes[2].is_err());
        assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 4);

        let mut numbers = Vec::new();
        while let Ok(event) = rx.try_recv() {
            numbers.push(service.decode_replica(&event.data).unwrap().number());
        }
        assert_eq!(numbers, vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_consumer_task_sees_end_of_stream_on_shutdown() {
        let chain = staged_chain();
        let blocks = staged_blocks(&chain);
        let service = service_with(&blocks);
        let (sub, mut rx) = service.subscribe_bounded().unwrap();

        let consumer = tokio::spawn(async move {
            let mut received = 0usize;
            while rx.recv().await.is_some() {
                received += 1;
            }
            received
        });

        for block in &blocks {
            service
                .create_block_replica(block, &chain, StateSpecimen::default())
                .unwrap();
        }
        service.shutdown();

        let received = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer finished")
            .unwrap();
        assert_eq!(received, blocks.len());
        assert!(!sub.is_active());
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let chain = staged_chain();
        let blocks = staged_blocks(&chain);
        let service = service_with(&blocks);
        let (_kept_sub, _kept_rx) = service.subscribe_unbounded().unwrap();
        let (_gone_sub, gone_rx) = service.subscribe_unbounded().unwrap();
        drop(gone_rx);

        let first = service
            .create_block_replica(&blocks[0], &chain, StateSpecimen::default())
            .unwrap()
            .unwrap();
        assert_eq!(first.report.disconnected, 1);
        assert_eq!(service.feed().subscriber_count(), 1);

        let second = service
            .create_block_replica(&blocks[1], &chain, StateSpecimen::default())
            .unwrap()
            .unwrap();
        assert!(second.report.is_complete());
    }
}
