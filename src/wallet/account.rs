use crate::crypto::keys::KeyPair;
use crate::{MinicoinError, Result};
use std::collections::HashMap;

/// A named account backed by one keypair. The credential check is a
/// trivial equality test; real credential storage is out of scope.
#[derive(Debug, Clone)]
pub struct Account {
    pub name: String,
    credential: String,
    pub keypair: KeyPair,
    /// Last balance this layer derived for the account. Never
    /// authoritative - the chain is; refreshed on reads.
    pub balance_hint: u64,
}

impl Account {
    pub fn create(name: &str, credential: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            credential: credential.to_string(),
            keypair: KeyPair::generate()?,
            balance_hint: 0,
        })
    }

    pub fn credential_matches(&self, credential: &str) -> bool {
        self.credential == credential
    }

    /// The public-key hash this account's funds are locked to.
    pub fn owner_id(&self) -> String {
        self.keypair.owner_id()
    }
}

/// Capability the wallet layer needs from an account store: get, put,
/// list. Injected so alternative backing stores can be substituted
/// without touching ledger logic.
pub trait AccountRepository {
    fn get(&self, name: &str) -> Option<&Account>;
    fn get_mut(&mut self, name: &str) -> Option<&mut Account>;
    /// Registers a new account. Names are unique; re-registering an
    /// existing name is rejected, never an overwrite.
    fn put(&mut self, account: Account) -> Result<()>;
    fn names(&self) -> Vec<String>;
}

#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    accounts: HashMap<String, Account>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRepository for MemoryAccountRepository {
    fn get(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.accounts.get_mut(name)
    }

    fn put(&mut self, account: Account) -> Result<()> {
        if self.accounts.contains_key(&account.name) {
            return Err(MinicoinError::DuplicateAccount(account.name));
        }
        self.accounts.insert(account.name.clone(), account);
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.accounts.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_credentials() -> Result<()> {
        let account = Account::create("alice", "hunter2")?;
        assert!(account.credential_matches("hunter2"));
        assert!(!account.credential_matches("hunter3"));
        assert_eq!(account.owner_id(), account.keypair.owner_id());
        assert_eq!(account.balance_hint, 0);
        Ok(())
    }

    #[test]
    fn test_repository_rejects_duplicates() -> Result<()> {
        let mut repo = MemoryAccountRepository::new();
        repo.put(Account::create("alice", "pw")?)?;
        repo.put(Account::create("bob", "pw")?)?;

        let result = repo.put(Account::create("alice", "other")?);
        assert!(matches!(result, Err(MinicoinError::DuplicateAccount(_))));

        assert_eq!(repo.names(), vec!["alice", "bob"]);
        assert!(repo.get("alice").is_some());
        assert!(repo.get("carol").is_none());
        Ok(())
    }
}
