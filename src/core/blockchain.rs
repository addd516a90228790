use crate::config::ChainConfig;
use crate::core::block::Block;
use crate::core::transaction::{OutPoint, Transaction};
use crate::core::utxo::{Utxo, UtxoIndex};
use crate::mining;
use crate::{MinicoinError, Result};
use std::collections::HashMap;

/// The ledger: an append-only chain of mined blocks from genesis, owned
/// exclusively by one process, plus the incrementally maintained UTXO
/// index. Nothing here is safe for concurrent mutation; integrators must
/// serialize access behind a single lock.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    utxo_index: UtxoIndex,
    config: ChainConfig,
}

impl Blockchain {
    /// A fresh chain holding only the mined genesis block: one coinbase
    /// crediting the configured reward to the placeholder owner, with an
    /// empty previous hash.
    pub fn new(config: ChainConfig) -> Result<Self> {
        let genesis = Self::genesis_block(&config)?;
        let mut utxo_index = UtxoIndex::new();
        utxo_index.apply_block(&genesis)?;

        Ok(Self {
            blocks: vec![genesis],
            utxo_index,
            config,
        })
    }

    fn genesis_block(config: &ChainConfig) -> Result<Block> {
        let coinbase = Transaction::coinbase(
            &config.genesis_owner,
            config.genesis_reward,
            &config.genesis_message,
        );
        let mut block = Block::candidate(vec![coinbase], Vec::new());
        mining::seal(&mut block, config.difficulty_bits, config.max_nonce)?;
        Ok(block)
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks after genesis.
    pub fn height(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn tip(&self) -> &Block {
        // The chain always holds at least the genesis block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn utxo_index(&self) -> &UtxoIndex {
        &self.utxo_index
    }

    /// Builds a block on the current tip, mines it, and appends it.
    /// Atomic: a failure at any point after the push rolls the block back,
    /// leaving the chain exactly as it was.
    pub fn append(&mut self, transactions: Vec<Transaction>) -> Result<()> {
        // Reject invalid transactions before spending a proof-of-work run.
        // Externally this behaves like the reference's append-then-rollback:
        // invalid input means an error and an untouched chain.
        for tx in &transactions {
            if !tx.is_valid(&self.utxo_index, self.config.surplus_policy) {
                return Err(MinicoinError::MalformedTransaction(format!(
                    "transaction {} rejected against the current UTXO set",
                    tx.id
                )));
            }
        }

        let prev_hash = self.tip().hash.as_bytes().to_vec();
        let mut block = Block::candidate(transactions, prev_hash);
        mining::seal(&mut block, self.config.difficulty_bits, self.config.max_nonce)?;

        self.blocks.push(block);
        if !self.is_valid() {
            self.blocks.pop();
            log::warn!("append produced an invalid chain; block rolled back");
            return Err(MinicoinError::ChainIntegrity(
                "append produced an invalid chain".to_string(),
            ));
        }

        let appended = self.blocks.len() - 1;
        if let Err(e) = self.utxo_index.apply_block(&self.blocks[appended]) {
            self.blocks.pop();
            return Err(e);
        }

        log::info!(
            "block {} appended: {}",
            self.height(),
            self.tip().hash
        );
        Ok(())
    }

    /// Read-only integrity check: every consecutive pair must link by hash
    /// and every non-genesis block must carry a valid proof of work.
    /// Linear in chain length; nothing is cached.
    pub fn is_valid(&self) -> bool {
        for i in 1..self.blocks.len() {
            let current = &self.blocks[i];
            let previous = &self.blocks[i - 1];

            if current.prev_hash.as_slice() != previous.hash.as_bytes() {
                return false;
            }
            if !mining::validate(current, self.config.difficulty_bits) {
                return false;
            }
        }
        true
    }

    /// Ground-truth UTXO discovery: rescans the whole chain, newest block
    /// first, tracking per transaction id which output indices were already
    /// spent by an input whose attached key hashes to `owner`. O(chain
    /// size) per query; the incremental index exists for production
    /// lookups, and tests hold the two equal after every mutation.
    pub fn find_unspent_outputs_for(&self, owner: &str) -> Vec<Utxo> {
        let mut spent: HashMap<String, Vec<i64>> = HashMap::new();
        let mut unspent = Vec::new();

        for block in self.blocks.iter().rev() {
            for tx in block.transactions.iter().rev() {
                let txid_hex = tx.id.to_hex();

                for (vout, output) in tx.outputs.iter().enumerate() {
                    let already_spent = spent
                        .get(&txid_hex)
                        .map(|indices| indices.contains(&(vout as i64)))
                        .unwrap_or(false);
                    if already_spent || output.owner != owner {
                        continue;
                    }
                    unspent.push(Utxo {
                        outpoint: OutPoint {
                            txid: tx.id,
                            vout: vout as u32,
                        },
                        output: output.clone(),
                    });
                }

                if !tx.is_coinbase() {
                    for input in &tx.inputs {
                        if input.uses_key(owner) {
                            spent
                                .entry(hex::encode(&input.prev_txid))
                                .or_default()
                                .push(input.prev_vout);
                        }
                    }
                }
            }
        }

        unspent
    }

    /// Simple longest-valid-chain rule: among the candidates, the valid
    /// chain with the most blocks. No cumulative-work comparison.
    pub fn longest_valid<'a, I>(candidates: I) -> Option<&'a Blockchain>
    where
        I: IntoIterator<Item = &'a Blockchain>,
    {
        candidates
            .into_iter()
            .filter(|chain| chain.is_valid())
            .max_by_key(|chain| chain.blocks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{TxInput, TxOutput};
    use crate::crypto::hash::Hash256;
    use crate::crypto::keys::KeyPair;

    fn test_config() -> ChainConfig {
        ChainConfig {
            difficulty_bits: 8,
            ..ChainConfig::default()
        }
    }

    fn assert_index_matches_rescan(chain: &Blockchain, owner: &str) {
        let key = |u: &Utxo| (u.outpoint.txid.to_hex(), u.outpoint.vout);
        let mut from_index = chain.utxo_index().unspent_for(owner);
        let mut from_scan = chain.find_unspent_outputs_for(owner);
        from_index.sort_by_key(key);
        from_scan.sort_by_key(key);
        assert_eq!(from_index, from_scan);
    }

    #[test]
    fn test_genesis_chain() -> Result<()> {
        let chain = Blockchain::new(test_config())?;

        assert_eq!(chain.blocks().len(), 1);
        assert_eq!(chain.height(), 0);
        assert!(chain.tip().prev_hash.is_empty());
        assert!(chain.tip().transactions[0].is_coinbase());
        assert!(chain.is_valid());
        assert_eq!(chain.utxo_index().len(), 1);
        Ok(())
    }

    #[test]
    fn test_append_links_and_validates() -> Result<()> {
        let keypair = KeyPair::generate()?;
        let owner = keypair.owner_id();
        let mut chain = Blockchain::new(test_config())?;

        chain.append(vec![Transaction::coinbase(&owner, 100, "mint 1")])?;
        let first_hash = chain.tip().hash;
        chain.append(vec![Transaction::coinbase(&owner, 25, "mint 2")])?;

        assert_eq!(chain.height(), 2);
        assert_eq!(chain.tip().prev_hash, first_hash.as_bytes().to_vec());
        assert!(chain.is_valid());
        assert_index_matches_rescan(&chain, &owner);
        Ok(())
    }

    #[test]
    fn test_append_spending_transaction() -> Result<()> {
        let alice = KeyPair::generate()?;
        let mut chain = Blockchain::new(test_config())?;
        chain.append(vec![Transaction::coinbase(&alice.owner_id(), 100, "mint")])?;

        let utxos = chain.find_unspent_outputs_for(&alice.owner_id());
        assert_eq!(utxos.len(), 1);

        let mut tx = Transaction::new(
            vec![TxInput::spending(utxos[0].outpoint.txid, utxos[0].outpoint.vout)],
            vec![
                TxOutput { value: 30, owner: "bob-key-hash".to_string() },
                TxOutput { value: 70, owner: alice.owner_id() },
            ],
        );
        tx.sign(&alice.private_key);
        chain.append(vec![tx])?;

        assert!(chain.is_valid());
        let alice_utxos = chain.find_unspent_outputs_for(&alice.owner_id());
        assert_eq!(alice_utxos.len(), 1);
        assert_eq!(alice_utxos[0].output.value, 70);
        assert_index_matches_rescan(&chain, &alice.owner_id());
        assert_index_matches_rescan(&chain, "bob-key-hash");
        Ok(())
    }

    #[test]
    fn test_append_rejects_dangling_spend() -> Result<()> {
        let keypair = KeyPair::generate()?;
        let mut chain = Blockchain::new(test_config())?;
        let height_before = chain.height();

        let mut tx = Transaction::new(
            vec![TxInput::spending(Hash256::hash(b"no such tx"), 0)],
            vec![TxOutput { value: 10, owner: keypair.owner_id() }],
        );
        tx.sign(&keypair.private_key);

        assert!(matches!(
            chain.append(vec![tx]),
            Err(MinicoinError::MalformedTransaction(_))
        ));
        assert_eq!(chain.height(), height_before);
        assert!(chain.is_valid());
        Ok(())
    }

    #[test]
    fn test_tampering_invalidates_chain() -> Result<()> {
        let mut chain = Blockchain::new(test_config())?;
        chain.append(vec![Transaction::coinbase("someone", 100, "mint")])?;
        assert!(chain.is_valid());

        let mut broken_link = chain.clone();
        broken_link.blocks[1].prev_hash = Hash256::hash(b"forged").as_bytes().to_vec();
        assert!(!broken_link.is_valid());

        let mut rewritten = chain.clone();
        rewritten.blocks[1].transactions[0].outputs[0].value = 1_000_000;
        assert!(!rewritten.is_valid());
        Ok(())
    }

    #[test]
    fn test_longest_valid_chain_wins() -> Result<()> {
        let short = Blockchain::new(test_config())?;

        let mut long = Blockchain::new(test_config())?;
        long.append(vec![Transaction::coinbase("someone", 10, "mint 1")])?;
        long.append(vec![Transaction::coinbase("someone", 10, "mint 2")])?;

        let mut longest_but_broken = long.clone();
        longest_but_broken.append(vec![Transaction::coinbase("someone", 10, "mint 3")])?;
        longest_but_broken.blocks[1].prev_hash = Vec::new();

        let chains = [&short, &long, &longest_but_broken];
        let best = Blockchain::longest_valid(chains.iter().copied());
        assert!(std::ptr::eq(best.unwrap(), &long));
        Ok(())
    }
}
