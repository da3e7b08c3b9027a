//! Pool of validated transactions waiting to be included in a block.
//!
//! The mempool itself performs no chain checks; the ledger validates a
//! transaction before adding it and prunes the pool whenever its chain
//! changes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use utxochain_core::{Hash, Transaction};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction {0} already in mempool")]
    DuplicateTransaction(Hash),

    #[error("mempool is full (capacity: {0})")]
    MempoolFull(usize),
}

pub type Result<T> = std::result::Result<T, MempoolError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolConfig {
    /// Maximum number of transactions held at once.
    pub max_transactions: usize,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 10_000,
        }
    }
}

/// Unconfirmed transactions, kept in arrival order.
///
/// Ids are content hashes, so two transactions that passed the integrity
/// check share an id exactly when their contents are equal.
#[derive(Debug)]
pub struct Mempool {
    config: MempoolConfig,
    transactions: HashMap<Hash, Transaction>,
    arrival: VecDeque<Hash>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::with_config(MempoolConfig::default())
    }

    pub fn with_config(config: MempoolConfig) -> Self {
        Self {
            config,
            transactions: HashMap::new(),
            arrival: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn contains(&self, tx_id: &Hash) -> bool {
        self.transactions.contains_key(tx_id)
    }

    pub fn get(&self, tx_id: &Hash) -> Option<&Transaction> {
        self.transactions.get(tx_id)
    }

    /// Insert a transaction the caller has already validated.
    pub fn add(&mut self, tx: Transaction) -> Result<()> {
        if self.contains(&tx.id) {
            return Err(MempoolError::DuplicateTransaction(tx.id));
        }
        if self.transactions.len() >= self.config.max_transactions {
            return Err(MempoolError::MempoolFull(self.config.max_transactions));
        }

        self.arrival.push_back(tx.id);
        self.transactions.insert(tx.id, tx);
        Ok(())
    }

    pub fn remove(&mut self, tx_id: &Hash) -> Option<Transaction> {
        let tx = self.transactions.remove(tx_id)?;
        self.arrival.retain(|id| id != tx_id);
        Some(tx)
    }

    /// Keep only the transactions `keep` accepts. Returns how many were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Transaction) -> bool,
    {
        let before = self.transactions.len();
        self.transactions.retain(|_, tx| keep(tx));
        let transactions = &self.transactions;
        self.arrival.retain(|id| transactions.contains_key(id));
        before - self.transactions.len()
    }

    /// Iterate in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.arrival
            .iter()
            .filter_map(|id| self.transactions.get(id))
    }

    /// Up to `limit` transactions in arrival order, for block building.
    pub fn pending(&self, limit: usize) -> Vec<Transaction> {
        self.iter().take(limit).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.arrival.clear();
    }

    pub fn stats(&self) -> MempoolStats {
        MempoolStats {
            total_transactions: self.len(),
            capacity: self.config.max_transactions,
        }
    }
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolStats {
    pub total_transactions: usize,
    pub capacity: usize,
}
