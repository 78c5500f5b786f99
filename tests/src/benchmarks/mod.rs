//! # Quantum-Chain Benchmarks
//!
//! Performance benchmarks per subsystem.

pub mod qc_18_block_replication;
