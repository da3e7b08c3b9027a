//! CLI commands module.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::Path;
use utxochain_chain::LedgerConfig;
use utxochain_core::wire::{self, BlockDescriptor};

mod check_tx;
mod config;
mod genesis;
mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a chain file block by block
    Validate(validate::ValidateArgs),
    /// Check a transaction against a chain file
    CheckTx(check_tx::CheckTxArgs),
    /// Print the genesis block as a one-block chain
    Genesis,
    /// Print the effective configuration
    Config(config::ConfigArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Validate(args) => validate::run(args),
        Commands::CheckTx(args) => check_tx::run(args),
        Commands::Genesis => genesis::run(),
        Commands::Config(args) => config::run(args),
    }
}

/// Defaults, overridden by the config file when one is given.
fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    match path {
        Some(path) => LedgerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(LedgerConfig::default()),
    }
}

fn read_chain(path: &Path) -> Result<Vec<BlockDescriptor>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chain file: {}", path.display()))?;
    wire::chain_from_json(&json).with_context(|| format!("Invalid chain JSON: {}", path.display()))
}
