use crate::core::block::Block;
use crate::core::transaction::{OutPoint, TxOutput};
use crate::{MinicoinError, Result};
use std::collections::HashMap;

/// One unspent output together with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub output: TxOutput,
}

/// Incrementally maintained UTXO set: every committed output not yet
/// referenced by a committed input. Updated on each append; the ledger's
/// full-chain rescan stays around as the ground-truth oracle for tests.
#[derive(Debug, Clone, Default)]
pub struct UtxoIndex {
    entries: HashMap<OutPoint, TxOutput>,
}

impl UtxoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, outpoint: OutPoint, output: TxOutput) {
        self.entries.insert(outpoint, output);
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TxOutput> {
        self.entries.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.entries.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All tracked outputs locked to `owner`, in no particular order.
    pub fn unspent_for(&self, owner: &str) -> Vec<Utxo> {
        self.entries
            .iter()
            .filter(|(_, output)| output.owner == owner)
            .map(|(outpoint, output)| Utxo {
                outpoint: outpoint.clone(),
                output: output.clone(),
            })
            .collect()
    }

    /// Consumes the block's inputs and records its outputs. Spending an
    /// outpoint the index does not hold is a hard error; the caller must
    /// have validated the block's transactions first.
    pub fn apply_block(&mut self, block: &Block) -> Result<()> {
        for tx in &block.transactions {
            if !tx.is_coinbase() {
                for input in &tx.inputs {
                    let outpoint = input.outpoint().ok_or_else(|| {
                        MinicoinError::MalformedTransaction(format!(
                            "unresolvable input reference in {}",
                            tx.id
                        ))
                    })?;
                    if self.entries.remove(&outpoint).is_none() {
                        return Err(MinicoinError::MalformedTransaction(format!(
                            "UTXO not found: {}:{}",
                            outpoint.txid, outpoint.vout
                        )));
                    }
                }
            }

            for (vout, output) in tx.outputs.iter().enumerate() {
                let outpoint = OutPoint {
                    txid: tx.id,
                    vout: vout as u32,
                };
                self.entries.insert(outpoint, output.clone());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{Transaction, TxInput};

    #[test]
    fn test_apply_coinbase_then_spend() -> Result<()> {
        let mut index = UtxoIndex::new();

        let coinbase = Transaction::coinbase("alice", 100, "fund");
        let block = Block::candidate(vec![coinbase.clone()], Vec::new());
        index.apply_block(&block)?;

        assert_eq!(index.len(), 1);
        assert_eq!(index.unspent_for("alice")[0].output.value, 100);

        let spend = Transaction::new(
            vec![TxInput::spending(coinbase.id, 0)],
            vec![
                TxOutput { value: 60, owner: "bob".to_string() },
                TxOutput { value: 40, owner: "alice".to_string() },
            ],
        );
        let block = Block::candidate(vec![spend.clone()], Vec::new());
        index.apply_block(&block)?;

        assert_eq!(index.len(), 2);
        assert!(!index.contains(&OutPoint { txid: coinbase.id, vout: 0 }));
        assert_eq!(index.unspent_for("bob")[0].output.value, 60);
        assert_eq!(index.unspent_for("alice")[0].output.value, 40);

        // The same outpoint cannot be consumed twice.
        let double = Transaction::new(
            vec![TxInput::spending(coinbase.id, 0)],
            vec![TxOutput { value: 100, owner: "mallory".to_string() }],
        );
        let block = Block::candidate(vec![double], Vec::new());
        assert!(index.apply_block(&block).is_err());

        Ok(())
    }
}
