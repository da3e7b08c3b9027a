//! Validation rules for utxochain.
//!
//! Every rule here is a pure read over a chain snapshot (`&[Block]`):
//! - Output lookup and the unspent predicate, derived by scanning blocks
//! - Transaction validation (integrity, ownership, double-spend, conservation)
//! - Block validation (hash, proof-of-work, linkage, coinbase economics)
//! - Whole-chain validation by replaying each block against its prefix
//!
//! Nothing in this crate mutates a chain, so rules may run from several
//! threads at once as long as each is handed an immutable snapshot.
//!
//! # Example
//!
//! ```rust
//! use utxochain_consensus::{ChainValidator, ConsensusParams};
//! use utxochain_core::Block;
//!
//! let params = ConsensusParams::default();
//! let chain = vec![Block::genesis()];
//! assert!(ChainValidator::is_valid(&chain, &params));
//! ```

pub mod params;
pub mod utxo;
pub mod validator;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use params::ConsensusParams;
pub use utxo::{calculate_fee, is_unspent, lookup_output};
pub use validator::{BlockValidator, ChainValidator, TransactionValidator, ValidationError};
