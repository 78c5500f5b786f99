//! # Domain Layer
//!
//! Pure replication logic: the replica entity, signature schemes, sender
//! recovery and the export projection. No I/O happens here.

pub mod config;
pub mod entities;
pub mod errors;
pub mod projection;
pub mod recovery;
pub mod signer;

pub use config::ReplicationConfig;
pub use entities::*;
pub use errors::*;
