use crate::{MinicoinError, Result};
use secp256k1::ecdsa::Signature as Secp256k1Signature;
use serde::{Deserialize, Serialize};

/// Compact ECDSA signature (r || s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    pub const LEN: usize = 64;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(MinicoinError::MalformedTransaction(format!(
                "signature must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self { r, s })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LEN);
        bytes.extend_from_slice(&self.r);
        bytes.extend_from_slice(&self.s);
        bytes
    }

    pub fn from_secp256k1(signature: &Secp256k1Signature) -> Self {
        let compact = signature.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[0..32]);
        s.copy_from_slice(&compact[32..64]);
        Self { r, s }
    }

    pub fn to_secp256k1(&self) -> Result<Secp256k1Signature> {
        let mut compact = [0u8; 64];
        compact[0..32].copy_from_slice(&self.r);
        compact[32..64].copy_from_slice(&self.s);

        Secp256k1Signature::from_compact(&compact)
            .map_err(|e| MinicoinError::MalformedTransaction(format!("invalid signature: {}", e)))
    }
}
