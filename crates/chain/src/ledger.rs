//! The ledger: the accepted chain plus the mempool kept consistent with it.
//!
//! All mutation goes through [`Ledger::push`] and [`Ledger::swap_blockchain`].
//! Both finish reconciling the mempool, and then notify subscribers, before
//! they return, so no caller can observe a new chain next to a stale mempool.

use crate::config::LedgerConfig;
use crate::events::{LedgerEvent, Subscriber};
use crate::mempool::{Mempool, MempoolError};
use std::slice;
use thiserror::Error;
use tracing::{debug, info, warn};
use utxochain_consensus::{
    calculate_fee, is_unspent, lookup_output, BlockValidator, ChainValidator, ConsensusParams,
    TransactionValidator, ValidationError,
};
use utxochain_core::wire::{self, BlockDescriptor, WireError};
use utxochain_core::{Block, Hash, OutPoint, Output, Transaction};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("mempool error: {0}")]
    Mempool(#[from] MempoolError),

    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Owns one chain and one mempool. Separate instances share nothing.
pub struct Ledger {
    config: LedgerConfig,
    /// Never empty: index 0 is always the genesis block.
    chain: Vec<Block>,
    mempool: Mempool,
    subscribers: Vec<Subscriber>,
}

impl Ledger {
    /// Start from the genesis block with an empty mempool.
    pub fn new(config: LedgerConfig) -> Self {
        let mempool = Mempool::with_config(config.mempool.clone());
        Self {
            config,
            chain: vec![Block::genesis()],
            mempool,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.config.consensus
    }

    /// Number of blocks after genesis.
    pub fn height(&self) -> usize {
        self.chain.len() - 1
    }

    pub fn last_block(&self) -> &Block {
        &self.chain[self.chain.len() - 1]
    }

    /// The full chain, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// Up to `limit` mempool transactions in arrival order.
    pub fn pending_transactions(&self, limit: usize) -> Vec<Transaction> {
        self.mempool.pending(limit)
    }

    pub fn get_output(&self, tx_id: Hash, index: u32) -> Option<&Output> {
        lookup_output(&OutPoint { tx_id, index }, &self.chain)
    }

    pub fn is_unspent(&self, tx_id: Hash, index: u32) -> bool {
        is_unspent(&OutPoint { tx_id, index }, &self.chain)
    }

    /// Validate a regular transaction against the current chain.
    pub fn validate_transaction(&self, tx: &Transaction) -> std::result::Result<(), ValidationError> {
        TransactionValidator::validate(tx, &self.chain, self.params())
    }

    /// Fee paid by a transaction that spends outputs of the current chain.
    pub fn calculate_fee(&self, tx: &Transaction) -> std::result::Result<u128, ValidationError> {
        calculate_fee(tx, &self.chain)
    }

    /// Validate `tx` against the current chain and add it to the mempool.
    pub fn submit_to_mempool(&mut self, tx: Transaction) -> Result<()> {
        self.validate_transaction(&tx)?;
        let tx_id = tx.id;
        self.mempool.add(tx)?;
        debug!(%tx_id, pending = self.mempool.len(), "transaction added to mempool");
        Ok(())
    }

    /// Validate `block` against the current chain and append it.
    ///
    /// On failure the chain and mempool are left untouched.
    pub fn push(&mut self, block: Block) -> Result<()> {
        if let Err(err) = BlockValidator::validate(&block, &self.chain, self.params()) {
            warn!(hash = %block.hash, %err, "block rejected");
            return Err(err.into());
        }

        info!(
            hash = %block.hash,
            height = self.chain.len(),
            transactions = block.transactions.len(),
            "block accepted"
        );
        self.chain.push(block.clone());
        self.emit(LedgerEvent::BlockAccepted(block));
        Ok(())
    }

    /// Replace the whole chain with `candidate`.
    ///
    /// The candidate is replayed block by block first and refused if any block
    /// fails against its prefix. Whether a valid candidate should win a fork
    /// is the caller's decision.
    pub fn swap_blockchain(&mut self, candidate: Vec<Block>) -> Result<()> {
        if let Err(err) = ChainValidator::validate(&candidate, self.params()) {
            warn!(%err, "candidate chain rejected");
            return Err(err.into());
        }

        let height = candidate.len() - 1;
        info!(
            old_height = self.height(),
            new_height = height,
            tip = %candidate[height].hash,
            "chain replaced"
        );
        self.chain = candidate;
        self.emit(LedgerEvent::ChainReplaced { height });
        Ok(())
    }

    /// Decode a chain received from a peer and return it only if it is valid.
    ///
    /// Does not touch any ledger; see [`Ledger::adopt_chain`].
    pub fn reconstruct_chain(
        descriptors: &[BlockDescriptor],
        params: &ConsensusParams,
    ) -> Result<Vec<Block>> {
        let chain = wire::decode_chain(descriptors)?;
        ChainValidator::validate(&chain, params)?;
        Ok(chain)
    }

    /// Reconstruct a peer's chain and swap it in.
    pub fn adopt_chain(&mut self, descriptors: &[BlockDescriptor]) -> Result<()> {
        let chain = Self::reconstruct_chain(descriptors, self.params())?;
        self.swap_blockchain(chain)
    }

    /// Register a callback for ledger events. Callbacks run in registration
    /// order, after the mempool has been reconciled.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&LedgerEvent) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.height(),
            tip: self.last_block().hash,
            pending_transactions: self.mempool.len(),
            mempool_capacity: self.config.mempool.max_transactions,
        }
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.reconcile_mempool(&event);
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    fn reconcile_mempool(&mut self, event: &LedgerEvent) {
        let Self {
            config,
            chain,
            mempool,
            ..
        } = self;

        let dropped = match event {
            // Pool entries were valid against the previous tip, so only
            // conflicts with the new block need checking.
            LedgerEvent::BlockAccepted(block) => mempool.retain(|tx| {
                tx.outpoints()
                    .all(|outpoint| is_unspent(&outpoint, slice::from_ref(block)))
            }),
            LedgerEvent::ChainReplaced { .. } => mempool
                .retain(|tx| TransactionValidator::is_valid(tx, chain, &config.consensus)),
        };

        if dropped > 0 {
            debug!(dropped, remaining = mempool.len(), "mempool pruned");
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

/// Ledger statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    pub height: usize,
    pub tip: Hash,
    pub pending_transactions: usize,
    pub mempool_capacity: usize,
}
