//! Cryptographic primitives for minicoin

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{Hash160, Hash256, Hashable};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use signatures::Signature;
