//! Accounts and the orchestration layer over the ledger

pub mod account;
pub mod wallet;

pub use account::{Account, AccountRepository, MemoryAccountRepository};
pub use wallet::Wallet;
