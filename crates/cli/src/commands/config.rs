//! Show configuration command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Ledger configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
