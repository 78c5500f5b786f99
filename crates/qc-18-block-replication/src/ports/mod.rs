//! # Ports Layer
//!
//! - `inbound` - the API this subsystem offers
//! - `outbound` - what it needs from the host (storage, signers, encoding)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
