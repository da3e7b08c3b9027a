//! Ledger orchestration for utxochain.
//!
//! Ties the validation rules of `utxochain-consensus` to an owned chain and
//! mempool:
//! - **Ledger**: accepted blocks, fork replacement and peer chain adoption
//! - **Mempool**: validated transactions waiting for a block
//! - **Events**: callbacks run after every chain change
//!
//! # Example
//!
//! ```rust
//! use utxochain_chain::{Ledger, LedgerConfig};
//! use utxochain_core::{Block, Keypair, Output, Transaction};
//!
//! let mut ledger = Ledger::new(LedgerConfig::default());
//! let miner = Keypair::generate();
//!
//! let reward = Transaction::coinbase(vec![Output::new(miner.address(), 50)]);
//! let block = Block::new(ledger.last_block().hash, vec![reward])
//!     .mined(ledger.params().difficulty_threshold);
//!
//! ledger.push(block).unwrap();
//! assert_eq!(ledger.height(), 1);
//! ```

pub mod config;
pub mod events;
pub mod ledger;
pub mod mempool;

pub use config::{ConfigError, LedgerConfig};
pub use events::{LedgerEvent, Subscriber};
pub use ledger::{Ledger, LedgerError, LedgerStats};
pub use mempool::{Mempool, MempoolConfig, MempoolError, MempoolStats};
