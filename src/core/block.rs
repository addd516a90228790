use crate::core::transaction::Transaction;
use crate::crypto::hash::Hash256;
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A block moves Unmined -> Mined exactly once and is never revised after
/// that. `hash` is zero until mining stores the proof-of-work hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    /// Hash of the preceding block; empty for genesis.
    pub prev_hash: Vec<u8>,
    pub hash: Hash256,
    pub nonce: u64,
}

impl Block {
    /// An unmined candidate stamped with the current time.
    pub fn candidate(transactions: Vec<Transaction>, prev_hash: Vec<u8>) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            transactions,
            prev_hash,
            hash: Hash256::zero(),
            nonce: 0,
        }
    }

    pub fn is_mined(&self) -> bool {
        !self.hash.is_zero()
    }

    /// SHA-256 over the concatenated serialized transactions. Any change
    /// to any transaction changes this digest and therefore the block hash.
    pub fn transactions_digest(&self) -> Result<Hash256> {
        let mut data = Vec::new();
        for tx in &self.transactions {
            data.extend_from_slice(&tx.serialize()?);
        }
        Ok(Hash256::hash(&data))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hash      {}", self.hash)?;
        writeln!(f, "prev      {}", hex::encode(&self.prev_hash))?;
        writeln!(f, "timestamp {}  nonce {}", self.timestamp, self.nonce)?;
        for tx in &self.transactions {
            write!(f, "{}", tx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_starts_unmined() {
        let block = Block::candidate(
            vec![Transaction::coinbase("alice", 50, "reward")],
            Vec::new(),
        );
        assert!(!block.is_mined());
        assert_eq!(block.nonce, 0);
        assert!(block.prev_hash.is_empty());
    }

    #[test]
    fn test_transactions_digest_tracks_content() -> Result<()> {
        let mut block = Block::candidate(
            vec![Transaction::coinbase("alice", 50, "reward")],
            Vec::new(),
        );
        let digest = block.transactions_digest()?;
        assert_eq!(block.transactions_digest()?, digest);

        block
            .transactions
            .push(Transaction::coinbase("bob", 10, "extra"));
        assert_ne!(block.transactions_digest()?, digest);
        Ok(())
    }
}
