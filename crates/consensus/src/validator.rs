//! Transaction, block and chain validation rules.
//!
//! Each rule validates against an explicit chain snapshot: `blocks` is the
//! prefix the transaction or block would be appended to. Rules return the
//! first violation found; the `is_valid*` forms collapse that to a boolean.

use crate::params::ConsensusParams;
use crate::utxo::{is_unspent, lookup_output};
use std::collections::HashSet;
use thiserror::Error;
use utxochain_core::{Amount, Block, Hash, OutPoint, Transaction, TransactionError};

/// Why a transaction, block or chain was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("transaction {tx_id} does not match its id")]
    TamperedTransaction { tx_id: Hash },

    #[error("transaction {tx_id}: input {index} is unsigned or its signature is invalid")]
    InvalidSignature { tx_id: Hash, index: usize },

    #[error("transaction {tx_id} is malformed: {source}")]
    MalformedTransaction {
        tx_id: Hash,
        source: TransactionError,
    },

    #[error("referenced output {outpoint} does not exist")]
    UnknownOutput { outpoint: OutPoint },

    #[error("output {outpoint} is not owned by the spending key")]
    OwnershipMismatch { outpoint: OutPoint },

    #[error("output {outpoint} is already spent")]
    DoubleSpend { outpoint: OutPoint },

    #[error("inputs {inputs} do not cover outputs {outputs} plus minimum fee {minimum_fee}")]
    InsufficientValue {
        inputs: u128,
        outputs: u128,
        minimum_fee: Amount,
    },

    #[error("block hash does not match its contents")]
    InvalidBlockHash,

    #[error("block difficulty {difficulty:#018x} exceeds threshold {threshold:#018x}")]
    DifficultyTooLow { difficulty: u64, threshold: u64 },

    #[error("block links to {got}, chain tip is {expected}")]
    BrokenLinkage { expected: Hash, got: Hash },

    #[error("malformed coinbase: {reason}")]
    MalformedCoinbase { reason: &'static str },

    #[error("coinbase pays {paid}, at most {allowed} allowed")]
    ExcessiveReward { paid: u128, allowed: u128 },

    #[error("chain does not start with the genesis block")]
    InvalidGenesis,

    #[error("invalid chain: block {height} rejected: {source}")]
    InvalidChain {
        height: usize,
        source: Box<ValidationError>,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

impl ValidationError {
    fn from_integrity(tx_id: Hash, err: TransactionError) -> Self {
        match err {
            TransactionError::Tampered => ValidationError::TamperedTransaction { tx_id },
            TransactionError::MissingSignature { index }
            | TransactionError::InvalidSignature { index } => {
                ValidationError::InvalidSignature { tx_id, index }
            }
            source => ValidationError::MalformedTransaction { tx_id, source },
        }
    }
}

/// Rules for regular transactions.
pub struct TransactionValidator;

impl TransactionValidator {
    /// Validate a regular transaction against `blocks`.
    ///
    /// Checks integrity and signatures, then for every input: the referenced
    /// output exists, belongs to the input's key, and is unspent in `blocks`.
    /// Finally the inputs must cover the outputs plus the minimum fee.
    pub fn validate(tx: &Transaction, blocks: &[Block], params: &ConsensusParams) -> Result<()> {
        Self::validate_with_pending(tx, blocks, params, &HashSet::new()).map(|_| ())
    }

    pub fn is_valid(tx: &Transaction, blocks: &[Block], params: &ConsensusParams) -> bool {
        Self::validate(tx, blocks, params).is_ok()
    }

    /// Validate `tx` while treating `pending` as already spent, and return
    /// the fee it pays.
    ///
    /// `pending` holds the outpoints consumed by earlier transactions of the
    /// block under validation, which are not yet part of `blocks`.
    pub fn validate_with_pending(
        tx: &Transaction,
        blocks: &[Block],
        params: &ConsensusParams,
        pending: &HashSet<OutPoint>,
    ) -> Result<u128> {
        if tx.is_coinbase() {
            return Err(ValidationError::MalformedCoinbase {
                reason: "coinbase outside the first block slot",
            });
        }
        tx.check_structure()
            .map_err(|source| ValidationError::MalformedTransaction { tx_id: tx.id, source })?;
        tx.verify()
            .map_err(|err| ValidationError::from_integrity(tx.id, err))?;

        let mut claimed = HashSet::with_capacity(tx.inputs.len());
        let mut inputs: u128 = 0;
        for input in &tx.inputs {
            let outpoint = input.outpoint();
            if !claimed.insert(outpoint) || pending.contains(&outpoint) {
                return Err(ValidationError::DoubleSpend { outpoint });
            }

            let output = lookup_output(&outpoint, blocks)
                .ok_or(ValidationError::UnknownOutput { outpoint })?;
            if output.address != input.pub_key.to_address() {
                return Err(ValidationError::OwnershipMismatch { outpoint });
            }
            if !is_unspent(&outpoint, blocks) {
                return Err(ValidationError::DoubleSpend { outpoint });
            }
            inputs += u128::from(output.amount);
        }

        let outputs = tx.output_total();
        if inputs < outputs + u128::from(params.minimum_fee) {
            return Err(ValidationError::InsufficientValue {
                inputs,
                outputs,
                minimum_fee: params.minimum_fee,
            });
        }

        Ok(inputs - outputs)
    }
}

/// Rules for a single block on top of a known prefix.
pub struct BlockValidator;

impl BlockValidator {
    /// Validate `block` as the direct successor of `blocks`.
    ///
    /// The checks run in order: structural hash, proof-of-work threshold,
    /// linkage to the tip, coinbase placement, every regular transaction, and
    /// finally that the coinbase pays no more than fees plus the subsidy.
    pub fn validate(block: &Block, blocks: &[Block], params: &ConsensusParams) -> Result<()> {
        Self::validate_header(block, blocks, params)?;
        let coinbase = Self::validate_coinbase_shape(block)?;

        let mut pending = HashSet::new();
        let mut fees: u128 = 0;
        for tx in block.regular_transactions() {
            fees += TransactionValidator::validate_with_pending(tx, blocks, params, &pending)?;
            pending.extend(tx.outpoints());
        }

        let paid = coinbase.output_total();
        let allowed = fees + u128::from(params.block_reward);
        if paid > allowed {
            return Err(ValidationError::ExcessiveReward { paid, allowed });
        }

        Ok(())
    }

    pub fn is_valid(block: &Block, blocks: &[Block], params: &ConsensusParams) -> bool {
        Self::validate(block, blocks, params).is_ok()
    }

    /// Hash integrity, difficulty and linkage.
    pub fn validate_header(block: &Block, blocks: &[Block], params: &ConsensusParams) -> Result<()> {
        if !block.verify_structural_integrity() {
            return Err(ValidationError::InvalidBlockHash);
        }

        let difficulty = block.difficulty();
        if difficulty > params.difficulty_threshold {
            return Err(ValidationError::DifficultyTooLow {
                difficulty,
                threshold: params.difficulty_threshold,
            });
        }

        let tip = blocks.last().ok_or(ValidationError::InvalidGenesis)?;
        if block.previous_block_hash != tip.hash {
            return Err(ValidationError::BrokenLinkage {
                expected: tip.hash,
                got: block.previous_block_hash,
            });
        }

        Ok(())
    }

    /// Exactly one coinbase, at index 0, untampered and without inputs.
    fn validate_coinbase_shape(block: &Block) -> Result<&Transaction> {
        let coinbase = block
            .coinbase()
            .filter(|tx| tx.is_coinbase())
            .ok_or(ValidationError::MalformedCoinbase {
                reason: "first transaction is not a coinbase",
            })?;

        if block.regular_transactions().iter().any(Transaction::is_coinbase) {
            return Err(ValidationError::MalformedCoinbase {
                reason: "more than one coinbase",
            });
        }

        coinbase.check_structure().map_err(|_| ValidationError::MalformedCoinbase {
            reason: "coinbase must have outputs and no inputs",
        })?;
        coinbase
            .verify()
            .map_err(|err| ValidationError::from_integrity(coinbase.id, err))?;

        Ok(coinbase)
    }
}

/// Rules for a whole candidate chain.
pub struct ChainValidator;

impl ChainValidator {
    /// Replay the chain: every block after genesis must validate against the
    /// exact prefix that precedes it.
    pub fn validate(chain: &[Block], params: &ConsensusParams) -> Result<()> {
        if chain.first() != Some(&Block::genesis()) {
            return Err(ValidationError::InvalidGenesis);
        }

        for height in 1..chain.len() {
            BlockValidator::validate(&chain[height], &chain[..height], params).map_err(|source| {
                ValidationError::InvalidChain {
                    height,
                    source: Box::new(source),
                }
            })?;
        }

        Ok(())
    }

    pub fn is_valid(chain: &[Block], params: &ConsensusParams) -> bool {
        Self::validate(chain, params).is_ok()
    }
}
