//! Core primitives and transaction integrity for utxochain.
//!
//! This crate provides the types every other crate trusts:
//! - Hashing (blake3) and Ed25519 keys, signatures and addresses
//! - Transactions with content-addressed ids and per-input signatures
//! - The block type consumed by the validation rules
//! - The wire descriptors exchanged with peers and clients

pub mod block;
pub mod crypto;
pub mod hash;
pub mod merkle;
pub mod transaction;
pub mod wire;

// Re-export commonly used types at the crate root
pub use block::Block;
pub use crypto::{Address, CryptoError, Keypair, PublicKey, Signature};
pub use hash::{hash, hash_concat, Hash, H256};
pub use merkle::merkle_root;
pub use transaction::{
    Amount, Input, OutPoint, Output, Transaction, TransactionError, TransactionKind,
};
pub use wire::{BlockDescriptor, TransactionDescriptor, WireError};
