//! Notifications raised after the ledger's chain changes.

use utxochain_core::Block;

/// Raised once the chain and the mempool are both up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A block was appended to the tip.
    BlockAccepted(Block),
    /// The whole chain was replaced by a competing one.
    ChainReplaced { height: usize },
}

/// Callback registered with [`crate::Ledger::subscribe`].
pub type Subscriber = Box<dyn FnMut(&LedgerEvent) + Send>;
