//! Builders for the bitcoin block and transaction shells tests feed into the
//! transition logic.  Headers are nonsensical filler; only heights, ordering
//! and outputs matter to the code under test.

use bitcoin::{
    absolute::{Height, LockTime},
    block::{Header, Version as BVersion},
    hashes::Hash,
    transaction::Version,
    Amount, Block, BlockHash, CompactTarget, ScriptBuf, Transaction, TxMerkleNode, TxOut,
};

/// Helper function to create a test transaction with given outputs
pub fn create_test_tx(outputs: Vec<TxOut>) -> Transaction {
    Transaction {
        version: Version(1),
        lock_time: LockTime::Blocks(Height::from_consensus(1).unwrap()),
        input: vec![],
        output: outputs,
    }
}

/// Helper function to create a TxOut with a given script and value
pub fn create_test_txout(value: u64, script_pubkey: ScriptBuf) -> TxOut {
    TxOut {
        value: Amount::from_sat(value),
        script_pubkey,
    }
}

/// Helper function to create a test block with given transactions
pub fn create_test_block(transactions: Vec<Transaction>) -> Block {
    let bhash = BlockHash::from_byte_array([0; 32]);
    Block {
        header: Header {
            version: BVersion::ONE,
            prev_blockhash: bhash,
            merkle_root: TxMerkleNode::from_byte_array(*bhash.as_byte_array()),
            time: 100,
            bits: CompactTarget::from_consensus(1),
            nonce: 1,
        },
        txdata: transactions,
    }
}
