//! The block type consumed by the validation rules.
//!
//! A block's hash commits to its predecessor, timestamp, nonce and the merkle
//! root of its transaction ids. Its difficulty is read off the hash itself.

use crate::hash::{hash, Hash};
use crate::merkle::merkle_root;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub previous_block_hash: Hash,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    pub nonce: u64,
    /// Index 0 is the coinbase; every later entry is a regular transaction.
    pub transactions: Vec<Transaction>,
    pub hash: Hash,
}

#[derive(Serialize)]
struct HashPreimage {
    previous_block_hash: Hash,
    timestamp: u64,
    nonce: u64,
    merkle_root: Hash,
}

impl Block {
    /// Create an unmined block on top of `previous_block_hash`.
    pub fn new(previous_block_hash: Hash, transactions: Vec<Transaction>) -> Self {
        Self::with_timestamp(previous_block_hash, current_timestamp(), transactions)
    }

    pub fn with_timestamp(
        previous_block_hash: Hash,
        timestamp: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut block = Self {
            previous_block_hash,
            timestamp,
            nonce: 0,
            transactions,
            hash: Hash::ZERO,
        };
        block.hash = block.to_hash();
        block
    }

    /// The genesis block. Deterministic, so every ledger instance agrees on it.
    pub fn genesis() -> Self {
        Self::with_timestamp(Hash::ZERO, 0, Vec::new())
    }

    /// Recompute the hash from the block's contents.
    pub fn to_hash(&self) -> Hash {
        let tx_ids: Vec<Hash> = self.transactions.iter().map(|tx| tx.id).collect();
        let preimage = HashPreimage {
            previous_block_hash: self.previous_block_hash,
            timestamp: self.timestamp,
            nonce: self.nonce,
            merkle_root: merkle_root(&tx_ids),
        };
        let encoded = bincode::serialize(&preimage).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Whether the stored hash matches the block's contents.
    pub fn verify_structural_integrity(&self) -> bool {
        self.hash == self.to_hash()
    }

    /// Proof-of-work value derived from the hash. Lower is harder.
    pub fn difficulty(&self) -> u64 {
        self.hash.leading_u64()
    }

    /// Search nonces until the difficulty is at most `threshold`.
    pub fn mine(&mut self, threshold: u64) {
        self.hash = self.to_hash();
        while self.difficulty() > threshold {
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.to_hash();
        }
    }

    /// Builder form of [`Block::mine`].
    pub fn mined(mut self, threshold: u64) -> Self {
        self.mine(threshold);
        self
    }

    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Every transaction after the coinbase slot.
    pub fn regular_transactions(&self) -> &[Transaction] {
        self.transactions.get(1..).unwrap_or(&[])
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::transaction::Output;

    #[test]
    fn test_genesis_is_deterministic() {
        let genesis = Block::genesis();
        assert_eq!(genesis, Block::genesis());
        assert_eq!(genesis.previous_block_hash, Hash::ZERO);
        assert!(genesis.transactions.is_empty());
        assert!(genesis.verify_structural_integrity());
        assert!(genesis.regular_transactions().is_empty());
    }

    #[test]
    fn test_mining_meets_threshold() {
        let kp = Keypair::generate();
        let coinbase = Transaction::coinbase(vec![Output::new(kp.address(), 50)]);
        let threshold = u64::MAX >> 6;
        let block = Block::new(Block::genesis().hash, vec![coinbase]).mined(threshold);

        assert!(block.difficulty() <= threshold);
        assert!(block.verify_structural_integrity());
    }

    #[test]
    fn test_tampering_breaks_integrity() {
        let kp = Keypair::generate();
        let coinbase = Transaction::coinbase(vec![Output::new(kp.address(), 50)]);
        let mut block = Block::new(Block::genesis().hash, vec![coinbase.clone()]);

        block.transactions.push(coinbase);
        assert!(!block.verify_structural_integrity());
    }

    #[test]
    fn test_coinbase_slot() {
        let kp = Keypair::generate();
        let coinbase = Transaction::coinbase(vec![Output::new(kp.address(), 50)]);
        let block = Block::new(Hash::ZERO, vec![coinbase.clone()]);
        assert_eq!(block.coinbase(), Some(&coinbase));
        assert!(block.regular_transactions().is_empty());
    }
}
