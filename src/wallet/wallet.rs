use crate::config::ChainConfig;
use crate::core::blockchain::Blockchain;
use crate::core::transaction::{Transaction, TxInput, TxOutput};
use crate::wallet::account::{Account, AccountRepository, MemoryAccountRepository};
use crate::{MinicoinError, Result};

/// Orchestration over the ledger: named accounts, balances, minting and
/// transfers. Every mutating call mines its transaction into its own block
/// synchronously before returning - there is no pending pool.
pub struct Wallet {
    chain: Blockchain,
    accounts: Box<dyn AccountRepository>,
}

impl Wallet {
    pub fn new(chain: Blockchain, accounts: Box<dyn AccountRepository>) -> Self {
        Self { chain, accounts }
    }

    /// A wallet over a fresh chain with the in-memory account store.
    pub fn in_memory(config: ChainConfig) -> Result<Self> {
        Ok(Self::new(
            Blockchain::new(config)?,
            Box::new(MemoryAccountRepository::new()),
        ))
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn account_names(&self) -> Vec<String> {
        self.accounts.names()
    }

    pub fn is_valid(&self) -> bool {
        self.chain.is_valid()
    }

    /// Generates a keypair and registers the account. Existing names are
    /// rejected, never overwritten.
    pub fn create_account(&mut self, name: &str, credential: &str) -> Result<&Account> {
        let account = Account::create(name, credential)?;
        let owner = account.owner_id();
        self.accounts.put(account)?;
        log::info!("account {} registered, owner {}", name, owner);
        self.accounts
            .get(name)
            .ok_or_else(|| MinicoinError::Auth(format!("unknown account: {}", name)))
    }

    pub fn authenticate(&self, name: &str, credential: &str) -> Result<&Account> {
        match self.accounts.get(name) {
            Some(account) if account.credential_matches(credential) => Ok(account),
            _ => Err(MinicoinError::Auth(
                "unknown account or wrong credential".to_string(),
            )),
        }
    }

    /// Sum of unspent output values locked to the account's key hash,
    /// always derived from the chain. Refreshes the stored hint.
    pub fn balance_of(&mut self, name: &str, credential: &str) -> Result<u64> {
        let owner = self.authenticate(name, credential)?.owner_id();
        let balance = self
            .chain
            .find_unspent_outputs_for(&owner)
            .iter()
            .map(|utxo| utxo.output.value)
            .sum();

        if let Some(account) = self.accounts.get_mut(name) {
            account.balance_hint = balance;
        }
        Ok(balance)
    }

    /// Privileged, testing-only issuance: credits `amount` out of thin air
    /// in a new block. Not consensus-derived and not supply-capped; the
    /// height tag keeps repeated identical mints distinct.
    pub fn mint(&mut self, name: &str, credential: &str, amount: u64) -> Result<()> {
        let owner = self.authenticate(name, credential)?.owner_id();
        let hint = format!("mint at height {}", self.chain.height() + 1);
        let tx = Transaction::coinbase(&owner, amount, &hint);
        self.chain.append(vec![tx])?;

        if let Some(account) = self.accounts.get_mut(name) {
            account.balance_hint = account.balance_hint.saturating_add(amount);
        }
        log::info!("minted {} to {}", amount, name);
        Ok(())
    }

    /// Moves `amount` from one account to another in a single freshly
    /// mined block. Selection is greedy in rescan order - no attempt at
    /// optimal coin selection - with any surplus returned as a change
    /// output.
    pub fn transfer(&mut self, from: &str, credential: &str, to: &str, amount: u64) -> Result<()> {
        let (sender_owner, signer) = {
            let sender = self.authenticate(from, credential)?;
            (sender.owner_id(), sender.keypair.private_key.clone())
        };
        let recipient_owner = self
            .accounts
            .get(to)
            .ok_or_else(|| MinicoinError::Auth(format!("unknown account: {}", to)))?
            .owner_id();

        let utxos = self.chain.find_unspent_outputs_for(&sender_owner);
        let available: u64 = utxos.iter().map(|utxo| utxo.output.value).sum();
        if available < amount {
            return Err(MinicoinError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let mut inputs = Vec::new();
        let mut accumulated: u64 = 0;
        for utxo in &utxos {
            inputs.push(TxInput::spending(utxo.outpoint.txid, utxo.outpoint.vout));
            accumulated += utxo.output.value;
            if accumulated >= amount {
                break;
            }
        }

        let mut outputs = vec![TxOutput {
            value: amount,
            owner: recipient_owner,
        }];
        if accumulated > amount {
            outputs.push(TxOutput {
                value: accumulated - amount,
                owner: sender_owner,
            });
        }

        let mut tx = Transaction::new(inputs, outputs);
        tx.sign(&signer);
        self.chain.append(vec![tx])?;

        log::info!("transferred {} from {} to {}", amount, from, to);
        Ok(())
    }
}
