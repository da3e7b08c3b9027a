//! Chain fixtures shared by the rule tests.

use crate::ConsensusParams;
use utxochain_core::{Address, Amount, Block, Input, Keypair, OutPoint, Output, Transaction};

pub struct Fixture {
    pub params: ConsensusParams,
    pub owner: Keypair,
    pub chain: Vec<Block>,
}

impl Fixture {
    /// Genesis plus one block whose coinbase pays the full reward to `owner`.
    pub fn new() -> Self {
        let params = ConsensusParams::default();
        let owner = Keypair::generate();
        let genesis = Block::genesis();
        let funding = Transaction::coinbase(vec![Output::new(owner.address(), params.block_reward)]);
        let block = Block::new(genesis.hash, vec![funding]).mined(params.difficulty_threshold);
        Self {
            params,
            owner,
            chain: vec![genesis, block],
        }
    }

    pub fn funding_outpoint(&self) -> OutPoint {
        OutPoint {
            tx_id: self.chain[1].transactions[0].id,
            index: 0,
        }
    }

    pub fn pay(&self, amount: Amount) -> Vec<Output> {
        vec![Output::new(Address::default(), amount)]
    }

    /// A signed transaction moving `outpoint` (owned by `owner`) to a sink.
    pub fn spend(&self, outpoint: OutPoint, amount: Amount) -> Transaction {
        Transaction::regular(
            vec![Input::new(outpoint.tx_id, outpoint.index, self.owner.public_key.clone())],
            self.pay(amount),
        )
        .signed(&self.owner)
    }

    /// A coinbase paying `amount` to a fresh miner, so ids never collide.
    pub fn reward(&self, amount: Amount) -> Transaction {
        Transaction::coinbase(vec![Output::new(Keypair::generate().address(), amount)])
    }

    /// A mined block on the current tip carrying a full-subsidy coinbase.
    pub fn next_block(&self, regular: Vec<Transaction>) -> Block {
        let mut transactions = vec![self.reward(self.params.block_reward)];
        transactions.extend(regular);
        self.block_with(transactions)
    }

    /// A mined block on the current tip with exactly `transactions`.
    pub fn block_with(&self, transactions: Vec<Transaction>) -> Block {
        let tip = self.chain.last().map(|b| b.hash).unwrap_or_default();
        Block::new(tip, transactions).mined(self.params.difficulty_threshold)
    }

    pub fn append(&mut self, regular: Vec<Transaction>) {
        let block = self.next_block(regular);
        self.chain.push(block);
    }
}
