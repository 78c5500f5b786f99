//! # Chain Configuration
//!
//! Network identity and the fork schedule that decides which transaction
//! signature rules apply at a given height.

use crate::entities::BlockNumber;
use serde::{Deserialize, Serialize};

/// Chain configuration.
///
/// A fork set to `None` never activates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id, also used as the network id stamped on exported data.
    pub chain_id: u64,
    /// EIP-2 (low-s signatures).
    pub homestead_block: Option<BlockNumber>,
    /// EIP-155 (replay-protected signatures).
    pub eip155_block: Option<BlockNumber>,
    /// EIP-2930 (access-list transactions).
    pub berlin_block: Option<BlockNumber>,
    /// EIP-1559 (dynamic-fee transactions).
    pub london_block: Option<BlockNumber>,
}

impl ChainConfig {
    /// Ethereum mainnet fork schedule.
    pub fn mainnet() -> Self {
        Self {
            chain_id: 1,
            homestead_block: Some(1_150_000),
            eip155_block: Some(2_675_000),
            berlin_block: Some(12_244_000),
            london_block: Some(12_965_000),
        }
    }

    /// A development chain with every fork active from genesis.
    pub fn dev(chain_id: u64) -> Self {
        Self {
            chain_id,
            homestead_block: Some(0),
            eip155_block: Some(0),
            berlin_block: Some(0),
            london_block: Some(0),
        }
    }

    /// A chain with no forks active: frontier rules at every height.
    pub fn frontier(chain_id: u64) -> Self {
        Self {
            chain_id,
            homestead_block: None,
            eip155_block: None,
            berlin_block: None,
            london_block: None,
        }
    }

    pub fn network_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_homestead(&self, number: BlockNumber) -> bool {
        is_active(self.homestead_block, number)
    }

    pub fn is_eip155(&self, number: BlockNumber) -> bool {
        is_active(self.eip155_block, number)
    }

    pub fn is_berlin(&self, number: BlockNumber) -> bool {
        is_active(self.berlin_block, number)
    }

    pub fn is_london(&self, number: BlockNumber) -> bool {
        is_active(self.london_block, number)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

fn is_active(fork: Option<BlockNumber>, number: BlockNumber) -> bool {
    fork.is_some_and(|activation| activation <= number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_fork_boundaries() {
        let config = ChainConfig::mainnet();
        assert!(!config.is_homestead(1_149_999));
        assert!(config.is_homestead(1_150_000));
        assert!(!config.is_london(12_964_999));
        assert!(config.is_london(12_965_000));
        assert_eq!(config.network_id(), 1);
    }

    #[test]
    fn test_unset_fork_never_activates() {
        let config = ChainConfig::frontier(7);
        assert!(!config.is_homestead(u64::MAX));
        assert!(!config.is_eip155(u64::MAX));
    }

    #[test]
    fn test_dev_all_active_at_genesis() {
        let config = ChainConfig::dev(1337);
        assert!(config.is_homestead(0) && config.is_eip155(0));
        assert!(config.is_berlin(0) && config.is_london(0));
    }
}
