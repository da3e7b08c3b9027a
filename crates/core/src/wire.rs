//! Wire descriptors exchanged with peers and API clients.
//!
//! A chain travels as an ordered JSON array of block descriptors. Hashes, keys
//! and signatures are hex strings. Array order is significant: it fixes output
//! indices and the coinbase-at-zero rule.
//!
//! Decoding is strict. Bad hex, wrong lengths, off-curve keys and structurally
//! malformed transactions are rejected here, before any validation rule runs.
//! Ids and block hashes are carried as-is and checked later, never recomputed.

use crate::block::Block;
use crate::crypto::{Address, PublicKey, Signature};
use crate::hash::Hash;
use crate::transaction::{Amount, Input, Output, Transaction, TransactionError, TransactionKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid {field} hash")]
    InvalidHash { field: &'static str },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("invalid address")]
    InvalidAddress,

    #[error("malformed transaction at position {position}: {source}")]
    MalformedTransaction {
        position: usize,
        source: TransactionError,
    },

    #[error("malformed block at position {position}: {source}")]
    MalformedBlock {
        position: usize,
        source: Box<WireError>,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub output_tx_id: String,
    pub output_index: u32,
    pub pub_key: String,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub address: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDescriptor {
    pub kind: TransactionKind,
    pub id: String,
    #[serde(default)]
    pub inputs: Vec<InputDescriptor>,
    pub outputs: Vec<OutputDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDescriptor {
    pub hash: String,
    pub previous_block_hash: String,
    pub timestamp: u64,
    pub nonce: u64,
    pub transactions: Vec<TransactionDescriptor>,
}

fn parse_hash(s: &str, field: &'static str) -> Result<Hash> {
    Hash::from_hex(s).map_err(|_| WireError::InvalidHash { field })
}

impl From<&Input> for InputDescriptor {
    fn from(input: &Input) -> Self {
        Self {
            output_tx_id: input.output_tx_id.to_hex(),
            output_index: input.output_index,
            pub_key: input.pub_key.to_hex(),
            signature: input.signature.as_ref().map(Signature::to_hex),
        }
    }
}

impl TryFrom<&InputDescriptor> for Input {
    type Error = WireError;

    fn try_from(d: &InputDescriptor) -> Result<Self> {
        let signature = d
            .signature
            .as_deref()
            .map(Signature::from_hex)
            .transpose()
            .map_err(|_| WireError::InvalidSignature)?;
        Ok(Input {
            output_tx_id: parse_hash(&d.output_tx_id, "outputTxId")?,
            output_index: d.output_index,
            pub_key: PublicKey::from_hex(&d.pub_key).map_err(|_| WireError::InvalidPublicKey)?,
            signature,
        })
    }
}

impl From<&Output> for OutputDescriptor {
    fn from(output: &Output) -> Self {
        Self {
            address: output.address.to_hex(),
            amount: output.amount,
        }
    }
}

impl TryFrom<&OutputDescriptor> for Output {
    type Error = WireError;

    fn try_from(d: &OutputDescriptor) -> Result<Self> {
        let address = Address::from_hex(&d.address).map_err(|_| WireError::InvalidAddress)?;
        Ok(Output::new(address, d.amount))
    }
}

impl From<&Transaction> for TransactionDescriptor {
    fn from(tx: &Transaction) -> Self {
        Self {
            kind: tx.kind,
            id: tx.id.to_hex(),
            inputs: tx.inputs.iter().map(InputDescriptor::from).collect(),
            outputs: tx.outputs.iter().map(OutputDescriptor::from).collect(),
        }
    }
}

impl TransactionDescriptor {
    /// Decode and shape-check a transaction found at `position` in its block.
    pub fn decode_at(&self, position: usize) -> Result<Transaction> {
        let tx = Transaction {
            kind: self.kind,
            id: parse_hash(&self.id, "id")?,
            inputs: self.inputs.iter().map(Input::try_from).collect::<Result<_>>()?,
            outputs: self.outputs.iter().map(Output::try_from).collect::<Result<_>>()?,
        };
        tx.check_structure()
            .map_err(|source| WireError::MalformedTransaction { position, source })?;
        Ok(tx)
    }
}

impl TryFrom<&TransactionDescriptor> for Transaction {
    type Error = WireError;

    fn try_from(d: &TransactionDescriptor) -> Result<Self> {
        d.decode_at(0)
    }
}

impl From<&Block> for BlockDescriptor {
    fn from(block: &Block) -> Self {
        Self {
            hash: block.hash.to_hex(),
            previous_block_hash: block.previous_block_hash.to_hex(),
            timestamp: block.timestamp,
            nonce: block.nonce,
            transactions: block
                .transactions
                .iter()
                .map(TransactionDescriptor::from)
                .collect(),
        }
    }
}

impl TryFrom<&BlockDescriptor> for Block {
    type Error = WireError;

    fn try_from(d: &BlockDescriptor) -> Result<Self> {
        let transactions: Vec<Transaction> = d
            .transactions
            .iter()
            .enumerate()
            .map(|(position, tx)| tx.decode_at(position))
            .collect::<Result<_>>()?;
        Ok(Block {
            previous_block_hash: parse_hash(&d.previous_block_hash, "previousBlockHash")?,
            timestamp: d.timestamp,
            nonce: d.nonce,
            transactions,
            hash: parse_hash(&d.hash, "hash")?,
        })
    }
}

/// Decode every descriptor, reporting the first failing block's position.
pub fn decode_chain(descriptors: &[BlockDescriptor]) -> Result<Vec<Block>> {
    descriptors
        .iter()
        .enumerate()
        .map(|(position, d)| {
            Block::try_from(d).map_err(|source| WireError::MalformedBlock {
                position,
                source: Box::new(source),
            })
        })
        .collect()
}

pub fn encode_chain(blocks: &[Block]) -> Vec<BlockDescriptor> {
    blocks.iter().map(BlockDescriptor::from).collect()
}

/// Parse a JSON array of block descriptors.
pub fn chain_from_json(json: &str) -> Result<Vec<BlockDescriptor>> {
    Ok(serde_json::from_str(json)?)
}

pub fn chain_to_json(blocks: &[Block]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&encode_chain(blocks))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn sample_chain() -> (Keypair, Vec<Block>) {
        let kp = Keypair::generate();
        let genesis = Block::genesis();
        let coinbase = Transaction::coinbase(vec![Output::new(kp.address(), 50)]);
        let spend = Transaction::regular(
            vec![Input::new(coinbase.id, 0, kp.public_key.clone())],
            vec![Output::new(Address::default(), 40)],
        )
        .signed(&kp);
        let reward = Transaction::coinbase(vec![Output::new(kp.address(), 60)]);
        let block = Block::with_timestamp(genesis.hash, 7, vec![reward, spend]);
        (kp, vec![genesis, block])
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let (_, blocks) = sample_chain();
        let json = chain_to_json(&blocks).unwrap();
        for field in ["previousBlockHash", "outputTxId", "outputIndex", "pubKey", "\"regular\""] {
            assert!(json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_decoded_chain_matches_source() {
        let (_, blocks) = sample_chain();
        let json = chain_to_json(&blocks).unwrap();
        let decoded = decode_chain(&chain_from_json(&json).unwrap()).unwrap();
        assert_eq!(decoded, blocks);
    }

    #[test]
    fn test_bad_hex_rejected() {
        let (_, blocks) = sample_chain();
        let mut descriptors = encode_chain(&blocks);
        descriptors[1].transactions[1].inputs[0].output_tx_id = "nothex".into();

        let err = decode_chain(&descriptors).unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedBlock { position: 1, ref source }
                if matches!(**source, WireError::InvalidHash { field: "outputTxId" })
        ));
    }

    #[test]
    fn test_invalid_public_key_rejected() {
        let (_, blocks) = sample_chain();
        let mut descriptor = TransactionDescriptor::from(&blocks[1].transactions[1]);
        descriptor.inputs[0].pub_key = "00".repeat(31);
        assert!(matches!(
            Transaction::try_from(&descriptor),
            Err(WireError::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_coinbase_with_inputs_rejected() {
        let (_, blocks) = sample_chain();
        let mut descriptors = encode_chain(&blocks);
        let stolen = descriptors[1].transactions[1].inputs.clone();
        descriptors[1].transactions[0].inputs = stolen;

        let err = Block::try_from(&descriptors[1]).unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedTransaction {
                position: 0,
                source: TransactionError::CoinbaseWithInputs
            }
        ));
    }

    #[test]
    fn test_short_id_rejected() {
        let json = r#"{ "kind": "coinbase", "id": "00", "outputs": [] }"#;
        let d: TransactionDescriptor = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Transaction::try_from(&d),
            Err(WireError::InvalidHash { field: "id" })
        ));
    }

    #[test]
    fn test_absent_signature_decodes_as_unsigned() {
        let (_, blocks) = sample_chain();
        let mut descriptor = TransactionDescriptor::from(&blocks[1].transactions[1]);
        descriptor.inputs[0].signature = None;
        let json = serde_json::to_string(&descriptor).unwrap();

        let tx = Transaction::try_from(&serde_json::from_str::<TransactionDescriptor>(&json).unwrap())
            .unwrap();
        assert!(tx.inputs[0].signature.is_none());
        assert!(!tx.is_authentic());
    }
}
