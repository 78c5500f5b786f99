//! # QC-18 Block Replication Benchmarks
//!
//! Measures the hot path of replica creation:
//! - sender recovery per transaction
//! - full assembly (read, recover, project) per block size
//! - canonical encoding of an assembled replica
//! - feed fan-out to many subscribers

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use qc_18_block_replication::domain::recovery::recover_senders;
use qc_18_block_replication::test_utils::{make_block, signed_transactions, store_with_block};
use qc_18_block_replication::{
    BlockReplicationApi, KvChainReader, ReplicaEncoder, ReplicationConfig,
    ReplicationDependencies, ReplicationEvent, ReplicationFeed, ReplicationService,
    RlpReplicaCodec, Signer,
};
use shared_types::{ChainConfig, StateSpecimen};
use std::time::Duration;

const BLOCK_SIZES: [usize; 3] = [10, 100, 250];

pub fn bench_sender_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-sender-recovery");
    let chain = ChainConfig::dev(1);
    let signer = Signer::for_block(&chain, 1);

    for size in BLOCK_SIZES {
        let txs = signed_transactions(&chain, 1, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("recover_senders", size), &txs, |b, txs| {
            b.iter(|| black_box(recover_senders(&signer, txs).is_ok()))
        });
    }
    group.finish();
}

pub fn bench_replica_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-replica-assembly");
    group.measurement_time(Duration::from_secs(10));
    let chain = ChainConfig::dev(1);

    for size in BLOCK_SIZES {
        let block = make_block(1, signed_transactions(&chain, 1, size), vec![]);
        let service = ReplicationService::new(
            ReplicationDependencies {
                reader: KvChainReader::new(store_with_block(&block)),
                encoder: RlpReplicaCodec,
            },
            ReplicationConfig::default(),
        );

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("create_replica", size), &block, |b, block| {
            b.iter(|| black_box(service.create_replica(block, &chain, StateSpecimen::default())))
        });

        let replica = match service.create_replica(&block, &chain, StateSpecimen::default()) {
            Ok(replica) => replica,
            Err(err) => panic!("fixture block must replicate: {err}"),
        };
        group.bench_with_input(BenchmarkId::new("encode", size), &replica, |b, replica| {
            b.iter(|| black_box(RlpReplicaCodec.encode(replica)))
        });
    }
    group.finish();
}

pub fn bench_feed_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-feed-fanout");
    let event = ReplicationEvent::new("0x00", vec![0u8; 64 * 1024]);

    for subscribers in [1usize, 16, 128] {
        let feed = ReplicationFeed::new();
        let mut handles: Vec<_> = (0..subscribers)
            .filter_map(|_| feed.subscribe_unbounded().ok())
            .collect();

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_function(BenchmarkId::new("publish", subscribers), |b| {
            b.iter(|| {
                let report = feed.publish(event.clone());
                // Drain so queues stay flat across iterations
                for (_, rx) in handles.iter_mut() {
                    while rx.try_recv().is_ok() {}
                }
                black_box(report)
            })
        });
    }
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_sender_recovery(c);
    bench_replica_assembly(c);
    bench_feed_fanout(c);
}
