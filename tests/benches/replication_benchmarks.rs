//! # Block Replication Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Sender recovery | < 200µs per transaction |
//! | Replica assembly, 100 txs | < 50ms |
//! | Publish to 128 subscribers | < 1ms |

use criterion::{criterion_group, criterion_main};
use qc_tests::benchmarks::qc_18_block_replication::register_benchmarks;

criterion_group!(benches, register_benchmarks);
criterion_main!(benches);
