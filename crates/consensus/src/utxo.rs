//! Output lookup and the unspent predicate.
//!
//! There is no materialized UTXO set. Both queries scan the blocks they are
//! given, so their answers always agree with that exact block range.

use crate::validator::{Result, ValidationError};
use utxochain_core::{Block, OutPoint, Output, Transaction};

/// Find the output `outpoint` refers to within `blocks`.
///
/// Returns the output of the first transaction, in chain order, whose id
/// matches and whose outputs are long enough to contain the index. `None`
/// is an ordinary answer, not an error.
pub fn lookup_output<'a>(outpoint: &OutPoint, blocks: &'a [Block]) -> Option<&'a Output> {
    blocks
        .iter()
        .flat_map(|block| &block.transactions)
        .filter(|tx| tx.id == outpoint.tx_id)
        .find_map(|tx| tx.outputs.get(outpoint.index as usize))
}

/// True iff no input of any transaction in `blocks` spends `outpoint`.
pub fn is_unspent(outpoint: &OutPoint, blocks: &[Block]) -> bool {
    !blocks
        .iter()
        .flat_map(|block| &block.transactions)
        .flat_map(Transaction::outpoints)
        .any(|spent| spent == *outpoint)
}

/// Resolved input value minus output value.
///
/// Only meaningful for a transaction that already validated against
/// `blocks`; an unresolvable input yields `UnknownOutput` and outputs that
/// exceed inputs yield `InsufficientValue`.
pub fn calculate_fee(tx: &Transaction, blocks: &[Block]) -> Result<u128> {
    let mut inputs: u128 = 0;
    for outpoint in tx.outpoints() {
        let output =
            lookup_output(&outpoint, blocks).ok_or(ValidationError::UnknownOutput { outpoint })?;
        inputs += u128::from(output.amount);
    }

    let outputs = tx.output_total();
    inputs
        .checked_sub(outputs)
        .ok_or(ValidationError::InsufficientValue {
            inputs,
            outputs,
            minimum_fee: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Fixture;
    use utxochain_core::{Hash, Input, Keypair};

    #[test]
    fn test_lookup_output() {
        let fx = Fixture::new();
        let coinbase = &fx.chain[1].transactions[0];
        let found = lookup_output(&OutPoint { tx_id: coinbase.id, index: 0 }, &fx.chain);
        assert_eq!(found, Some(&coinbase.outputs[0]));
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let fx = Fixture::new();
        let coinbase = &fx.chain[1].transactions[0];
        assert!(lookup_output(&OutPoint { tx_id: coinbase.id, index: 9 }, &fx.chain).is_none());
        assert!(lookup_output(&OutPoint { tx_id: Hash::ZERO, index: 0 }, &fx.chain).is_none());
        // Out of range when only the genesis block is in scope.
        assert!(lookup_output(&OutPoint { tx_id: coinbase.id, index: 0 }, &fx.chain[..1]).is_none());
    }

    #[test]
    fn test_is_unspent_respects_range() {
        let mut fx = Fixture::new();
        let funding = fx.funding_outpoint();
        assert!(is_unspent(&funding, &fx.chain));

        let spend = fx.spend(funding, 40);
        fx.append(vec![spend]);

        assert!(!is_unspent(&funding, &fx.chain));
        // The prefix before the spending block still sees it unspent.
        assert!(is_unspent(&funding, &fx.chain[..2]));
    }

    #[test]
    fn test_calculate_fee() {
        let fx = Fixture::new();
        let spend = fx.spend(fx.funding_outpoint(), 42);
        assert_eq!(calculate_fee(&spend, &fx.chain), Ok(8));
    }

    #[test]
    fn test_calculate_fee_unknown_input() {
        let fx = Fixture::new();
        let stranger = Keypair::generate();
        let missing = OutPoint { tx_id: Hash::ZERO, index: 0 };
        let tx = utxochain_core::Transaction::regular(
            vec![Input::new(missing.tx_id, 0, stranger.public_key.clone())],
            fx.pay(1),
        );
        assert_eq!(
            calculate_fee(&tx, &fx.chain),
            Err(ValidationError::UnknownOutput { outpoint: missing })
        );
    }
}
