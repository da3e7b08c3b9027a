//! Transactions: content-addressed identity and input authorization.
//!
//! A transaction's `id` is the hash of its kind, inputs (signatures included)
//! and outputs. Any change to those fields without re-digesting makes
//! [`Transaction::verify`] fail, and re-digesting after a change to the outputs
//! invalidates every input signature, because each signature commits to the
//! serialized outputs.

use crate::crypto::{Address, Keypair, PublicKey, Signature};
use crate::hash::{hash, hash_concat, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Value in the smallest unit. There are no fractional amounts.
pub type Amount = u64;

/// Errors raised by the integrity and structure checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction id does not match its contents")]
    Tampered,

    #[error("input {index} is not signed")]
    MissingSignature { index: usize },

    #[error("input {index} carries an invalid signature")]
    InvalidSignature { index: usize },

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("regular transaction has no inputs")]
    NoInputs,

    #[error("coinbase transaction must not have inputs")]
    CoinbaseWithInputs,
}

pub type Result<T> = std::result::Result<T, TransactionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Issues the block reward plus collected fees. Only valid at index 0 of a block.
    Coinbase,
    Regular,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Coinbase => f.write_str("coinbase"),
            TransactionKind::Regular => f.write_str("regular"),
        }
    }
}

/// A reference to one output of a past transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub tx_id: Hash,
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

/// Spends the output `output_index` of transaction `output_tx_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub output_tx_id: Hash,
    pub output_index: u32,
    /// Key of the claimed owner; its hash must equal the spent output's address.
    pub pub_key: PublicKey,
    pub signature: Option<Signature>,
}

impl Input {
    /// Create an unsigned input.
    pub fn new(output_tx_id: Hash, output_index: u32, pub_key: PublicKey) -> Self {
        Self {
            output_tx_id,
            output_index,
            pub_key,
            signature: None,
        }
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            tx_id: self.output_tx_id,
            index: self.output_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub address: Address,
    pub amount: Amount,
}

impl Output {
    pub fn new(address: Address, amount: Amount) -> Self {
        Self { address, amount }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub id: Hash,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

/// Everything the id commits to.
#[derive(Serialize)]
struct IdPreimage<'a> {
    kind: TransactionKind,
    inputs: &'a [Input],
    outputs: &'a [Output],
}

impl Transaction {
    /// Create a coinbase paying `outputs`.
    pub fn coinbase(outputs: Vec<Output>) -> Self {
        Self::build(TransactionKind::Coinbase, Vec::new(), outputs)
    }

    /// Create a regular transaction with unsigned inputs. Call
    /// [`Transaction::sign`] for every owning keypair before submitting it.
    pub fn regular(inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        Self::build(TransactionKind::Regular, inputs, outputs)
    }

    fn build(kind: TransactionKind, inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        let mut tx = Self {
            kind,
            id: Hash::ZERO,
            inputs,
            outputs,
        };
        tx.digest();
        tx
    }

    /// Compute the id from the current contents. Pure and deterministic.
    pub fn compute_id(&self) -> Hash {
        let preimage = IdPreimage {
            kind: self.kind,
            inputs: &self.inputs,
            outputs: &self.outputs,
        };
        let encoded = bincode::serialize(&preimage).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Assign the id from the current contents.
    pub fn digest(&mut self) {
        self.id = self.compute_id();
    }

    /// The payload an input's signature covers:
    /// `output_tx_id || output_index || pub_key || serialized outputs`.
    pub fn signing_hash(&self, input: &Input) -> Hash {
        let outputs = bincode::serialize(&self.outputs).expect("serialization should not fail");
        hash_concat(&[
            input.output_tx_id.as_bytes(),
            &input.output_index.to_le_bytes(),
            &input.pub_key.as_bytes(),
            &outputs,
        ])
    }

    /// Sign every input whose claimed key belongs to `keypair`, then re-digest.
    pub fn sign(&mut self, keypair: &Keypair) {
        let signatures: Vec<Option<Signature>> = self
            .inputs
            .iter()
            .map(|input| {
                (input.pub_key == keypair.public_key)
                    .then(|| keypair.sign_hash(&self.signing_hash(input)))
            })
            .collect();

        for (input, signature) in self.inputs.iter_mut().zip(signatures) {
            if signature.is_some() {
                input.signature = signature;
            }
        }
        self.digest();
    }

    /// Builder form of [`Transaction::sign`].
    pub fn signed(mut self, keypair: &Keypair) -> Self {
        self.sign(keypair);
        self
    }

    /// Check that the transaction has not been tampered with and that every
    /// input is signed by its claimed key.
    ///
    /// Says nothing about whether the referenced outputs exist or are unspent;
    /// that needs chain context.
    pub fn verify(&self) -> Result<()> {
        if self.id != self.compute_id() {
            return Err(TransactionError::Tampered);
        }

        if self.is_coinbase() {
            return Ok(());
        }

        for (index, input) in self.inputs.iter().enumerate() {
            let signature = input
                .signature
                .as_ref()
                .ok_or(TransactionError::MissingSignature { index })?;
            let payload = self.signing_hash(input);
            input
                .pub_key
                .verify(payload.as_bytes(), signature)
                .map_err(|_| TransactionError::InvalidSignature { index })?;
        }

        Ok(())
    }

    /// Boolean form of [`Transaction::verify`].
    pub fn is_authentic(&self) -> bool {
        self.verify().is_ok()
    }

    /// Shape rules enforced at deserialization boundaries.
    pub fn check_structure(&self) -> Result<()> {
        if self.outputs.is_empty() {
            return Err(TransactionError::NoOutputs);
        }
        match self.kind {
            TransactionKind::Coinbase if !self.inputs.is_empty() => {
                Err(TransactionError::CoinbaseWithInputs)
            }
            TransactionKind::Regular if self.inputs.is_empty() => Err(TransactionError::NoInputs),
            _ => Ok(()),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.kind == TransactionKind::Coinbase
    }

    /// Sum of all output amounts, widened so it cannot overflow.
    pub fn output_total(&self) -> u128 {
        self.outputs.iter().map(|o| u128::from(o.amount)).sum()
    }

    pub fn outpoints(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.inputs.iter().map(Input::outpoint)
    }
}
