//! Check a transaction against a chain.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use utxochain_chain::Ledger;
use utxochain_core::wire::TransactionDescriptor;
use utxochain_core::Transaction;

#[derive(Args)]
pub struct CheckTxArgs {
    /// Chain file: a JSON array of block descriptors
    chain: PathBuf,

    /// Transaction file: a single transaction descriptor
    tx: PathBuf,

    /// Ledger configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(args: CheckTxArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let descriptors = super::read_chain(&args.chain)?;

    let mut ledger = Ledger::new(config);
    ledger
        .adopt_chain(&descriptors)
        .context("Chain file is not a valid chain")?;

    let json = fs::read_to_string(&args.tx)
        .with_context(|| format!("Failed to read transaction file: {}", args.tx.display()))?;
    let descriptor: TransactionDescriptor =
        serde_json::from_str(&json).context("Invalid transaction JSON")?;
    let tx = Transaction::try_from(&descriptor).context("Failed to decode transaction")?;

    ledger
        .validate_transaction(&tx)
        .with_context(|| format!("Transaction {} rejected", tx.id))?;
    let fee = ledger.calculate_fee(&tx)?;

    println!("{}  Transaction is valid", "✓".green().bold());
    println!();
    println!("  Id:      {}", tx.id.to_hex().bright_yellow());
    println!("  Inputs:  {}", tx.inputs.len().to_string().bright_cyan());
    println!("  Outputs: {}", tx.outputs.len().to_string().bright_cyan());
    println!("  Fee:     {}", fee.to_string().bright_cyan());
    println!("  Height:  {}", ledger.height().to_string().bright_black());
    Ok(())
}
