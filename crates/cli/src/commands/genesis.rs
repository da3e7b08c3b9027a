//! Print the genesis block.

use anyhow::Result;
use utxochain_core::{wire, Block};

/// Printed as a one-block chain so the output can be fed back to `validate`.
pub fn run() -> Result<()> {
    println!("{}", wire::chain_to_json(&[Block::genesis()])?);
    Ok(())
}
