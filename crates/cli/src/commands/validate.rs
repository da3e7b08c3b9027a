//! Validate chain command.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use utxochain_consensus::{ChainValidator, ValidationError};
use utxochain_core::wire;

#[derive(Args)]
pub struct ValidateArgs {
    /// Chain file: a JSON array of block descriptors
    chain: PathBuf,

    /// Ledger configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let descriptors = super::read_chain(&args.chain)?;
    let chain = wire::decode_chain(&descriptors).context("Failed to decode chain")?;

    match ChainValidator::validate(&chain, &config.consensus) {
        Ok(()) => {
            let transactions: usize = chain.iter().map(|b| b.transactions.len()).sum();
            println!("{}  Chain is valid", "✓".green().bold());
            println!();
            println!("  Height:       {}", (chain.len() - 1).to_string().bright_cyan());
            println!("  Tip:          {}", chain[chain.len() - 1].hash.to_hex().bright_yellow());
            println!("  Transactions: {}", transactions.to_string().bright_cyan());
            Ok(())
        }
        Err(ValidationError::InvalidChain { height, source }) => {
            println!(
                "{}  Block {} rejected: {}",
                "✗".red().bold(),
                height.to_string().bright_cyan(),
                source
            );
            bail!("chain is invalid at height {}", height)
        }
        Err(err) => {
            println!("{}  {}", "✗".red().bold(), err);
            bail!("chain is invalid")
        }
    }
}
