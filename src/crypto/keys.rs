use crate::crypto::hash::{Hash160, Hash256};
use crate::crypto::signatures::Signature;
use crate::{MinicoinError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{Message, PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialized key sizes. Parsing enforces these exactly.
pub const PRIVATE_KEY_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 33; // compressed SEC1

const WIF_VERSION: u8 = 0x80;

#[derive(Debug, Clone)]
pub struct PrivateKey {
    key: SecretKey,
}

/// A validated, compressed secp256k1 public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    key: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl PrivateKey {
    /// Draws key material from the OS entropy source. Failure here is the
    /// one unrecoverable error in the crate.
    pub fn generate() -> Result<Self> {
        let mut secret_bytes = [0u8; PRIVATE_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut secret_bytes)
            .map_err(|e| MinicoinError::KeyGeneration(format!("entropy source unavailable: {}", e)))?;

        let key = SecretKey::from_slice(&secret_bytes)
            .map_err(|e| MinicoinError::KeyGeneration(format!("unusable key material: {}", e)))?;

        Ok(Self { key })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(MinicoinError::MalformedKey(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }

        let key = SecretKey::from_slice(bytes)
            .map_err(|e| MinicoinError::MalformedKey(format!("invalid private key: {}", e)))?;

        Ok(Self { key })
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        self.key.secret_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| MinicoinError::MalformedKey(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Wallet Import Format: base58check with a version byte.
    pub fn to_wif(&self) -> String {
        let mut data = Vec::with_capacity(PRIVATE_KEY_LEN + 5);
        data.push(WIF_VERSION);
        data.extend_from_slice(&self.key.secret_bytes());

        let checksum = Hash256::double_hash(&data);
        data.extend_from_slice(&checksum.as_bytes()[0..4]);

        bs58::encode(data).into_string()
    }

    pub fn from_wif(wif: &str) -> Result<Self> {
        let decoded = bs58::decode(wif)
            .into_vec()
            .map_err(|e| MinicoinError::MalformedKey(format!("invalid WIF: {}", e)))?;

        if decoded.len() != PRIVATE_KEY_LEN + 5 || decoded[0] != WIF_VERSION {
            return Err(MinicoinError::MalformedKey("invalid WIF format".to_string()));
        }

        let (data, checksum) = decoded.split_at(PRIVATE_KEY_LEN + 1);
        let expected = Hash256::double_hash(data);
        if checksum != &expected.as_bytes()[0..4] {
            return Err(MinicoinError::MalformedKey("invalid WIF checksum".to_string()));
        }

        Self::from_bytes(&data[1..])
    }

    pub fn public_key(&self) -> PublicKey {
        let secp = Secp256k1::new();
        let public_key = Secp256k1PublicKey::from_secret_key(&secp, &self.key);

        PublicKey {
            key: public_key.serialize().to_vec(),
        }
    }

    /// ECDSA over the 32-byte digest. Deterministic (RFC 6979 nonces).
    pub fn sign(&self, message: &Hash256) -> Signature {
        let secp = Secp256k1::new();
        let message = Message::from_digest(*message.as_bytes());
        let signature = secp.sign_ecdsa(&message, &self.key);
        Signature::from_secp256k1(&signature)
    }
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(MinicoinError::MalformedKey(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_LEN,
                bytes.len()
            )));
        }

        Secp256k1PublicKey::from_slice(bytes)
            .map_err(|e| MinicoinError::MalformedKey(format!("invalid public key: {}", e)))?;

        Ok(Self {
            key: bytes.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.key)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| MinicoinError::MalformedKey(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// The ownership predicate: outputs are locked to this hash.
    pub fn key_hash(&self) -> Hash160 {
        Hash160::of(&self.key)
    }

    /// Hex form of the key hash, as stored in `TxOutput::owner`.
    pub fn owner_id(&self) -> String {
        self.key_hash().to_hex()
    }

    /// Deterministic, side-effect free. A structurally broken key or
    /// signature simply fails verification.
    pub fn verify(&self, message: &Hash256, signature: &Signature) -> bool {
        let secp = Secp256k1::new();

        let public_key = match Secp256k1PublicKey::from_slice(&self.key) {
            Ok(pk) => pk,
            Err(_) => return false,
        };
        let secp_signature = match signature.to_secp256k1() {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        let message = Message::from_digest(*message.as_bytes());
        secp.verify_ecdsa(&message, &secp_signature, &public_key).is_ok()
    }
}

impl KeyPair {
    pub fn generate() -> Result<Self> {
        let private_key = PrivateKey::generate()?;
        let public_key = private_key.public_key();

        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn owner_id(&self) -> String {
        self.public_key.owner_id()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() -> Result<()> {
        let keypair = KeyPair::generate()?;
        assert_eq!(keypair.public_key.to_bytes().len(), PUBLIC_KEY_LEN);
        assert_eq!(keypair.owner_id().len(), Hash160::LEN * 2);
        Ok(())
    }

    #[test]
    fn test_hex_roundtrip() -> Result<()> {
        let keypair = KeyPair::generate()?;

        let private_hex = keypair.private_key.to_hex();
        assert_eq!(private_hex.len(), PRIVATE_KEY_LEN * 2);
        let restored = PrivateKey::from_hex(&private_hex)?;
        assert_eq!(keypair.private_key.to_bytes(), restored.to_bytes());

        let public_hex = keypair.public_key.to_hex();
        assert_eq!(public_hex.len(), PUBLIC_KEY_LEN * 2);
        let restored = PublicKey::from_hex(&public_hex)?;
        assert_eq!(keypair.public_key, restored);

        Ok(())
    }

    #[test]
    fn test_fixed_length_enforced() {
        // 32 bytes instead of 33: wrong size for a compressed public key.
        let short = hex::encode([2u8; 32]);
        assert!(matches!(
            PublicKey::from_hex(&short),
            Err(MinicoinError::MalformedKey(_))
        ));
        assert!(matches!(
            PrivateKey::from_hex("abcdef"),
            Err(MinicoinError::MalformedKey(_))
        ));
        assert!(PrivateKey::from_hex("not hex at all").is_err());
    }

    #[test]
    fn test_wif_roundtrip() -> Result<()> {
        let private_key = PrivateKey::generate()?;
        let wif = private_key.to_wif();
        let restored = PrivateKey::from_wif(&wif)?;
        assert_eq!(private_key.to_bytes(), restored.to_bytes());

        assert!(PrivateKey::from_wif("11111111111111111111").is_err());
        Ok(())
    }

    #[test]
    fn test_sign_verify() -> Result<()> {
        let keypair = KeyPair::generate()?;
        let other = KeyPair::generate()?;
        let message = Hash256::hash(b"payload");

        let signature = keypair.private_key.sign(&message);
        assert!(keypair.public_key.verify(&message, &signature));
        assert!(!other.public_key.verify(&message, &signature));

        Ok(())
    }
}
