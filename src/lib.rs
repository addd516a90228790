//! Minicoin - a single-process UTXO ledger with proof-of-work admission
//!
//! This library implements a minimal cryptocurrency simulation:
//! - secp256k1 keypairs with hex and WIF codecs
//! - UTXO-style transactions with content-addressed ids
//! - SHA-256 proof-of-work mining at a fixed difficulty
//! - a hash-linked, append-only chain with full integrity re-validation
//! - named accounts with chain-derived balances, minting and transfers
//!
//! Everything is synchronous, single-threaded and in-memory; there is no
//! networking and no persistence.

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod mining;
pub mod wallet;

pub use error::{MinicoinError, Result};
