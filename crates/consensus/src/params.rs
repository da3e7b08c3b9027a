//! Consensus parameters, fixed for the lifetime of a ledger.

use serde::{Deserialize, Serialize};
use utxochain_core::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    /// Every regular transaction must leave at least this much unspent as fee.
    pub minimum_fee: Amount,
    /// Largest accepted block difficulty value (lower is harder).
    pub difficulty_threshold: u64,
    /// Subsidy a coinbase may issue on top of collected fees.
    pub block_reward: Amount,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            minimum_fee: 1,
            difficulty_threshold: 0x00FF_FFFF_FFFF_FFFF,
            block_reward: 50,
        }
    }
}
