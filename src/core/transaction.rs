use crate::config::SurplusPolicy;
use crate::core::utxo::UtxoIndex;
use crate::crypto::hash::Hash256;
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::crypto::signatures::Signature;
use crate::{MinicoinError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel output index marking a coinbase input.
pub const COINBASE_VOUT: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Content hash over inputs (minus signature material) and outputs.
    /// Set once at construction; signing never changes it.
    pub id: Hash256,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    /// Id of the transaction being spent; empty for coinbase inputs.
    pub prev_txid: Vec<u8>,
    /// Output index in that transaction; -1 for coinbase inputs.
    pub prev_vout: i64,
    pub signature: Option<Signature>,
    pub pubkey: Option<PublicKey>,
    /// Free-form annotation ("coinbase", mint tags). Participates in the
    /// content hash, which keeps otherwise identical coinbases distinct.
    pub unlock_hint: String,
}

/// Immutable once its transaction is committed. `owner` is the hex
/// public-key hash the value is locked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    pub owner: String,
}

/// A spendable location: transaction id plus output index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Hash256,
    pub vout: u32,
}

impl TxInput {
    pub fn spending(prev_txid: Hash256, prev_vout: u32) -> Self {
        Self {
            prev_txid: prev_txid.as_bytes().to_vec(),
            prev_vout: prev_vout as i64,
            signature: None,
            pubkey: None,
            unlock_hint: String::new(),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.prev_txid.is_empty() && self.prev_vout == COINBASE_VOUT
    }

    /// The outpoint this input spends. None for coinbase inputs and for
    /// structurally broken references, which then fail UTXO lookup.
    pub fn outpoint(&self) -> Option<OutPoint> {
        let txid = Hash256::from_slice(&self.prev_txid)?;
        let vout = u32::try_from(self.prev_vout).ok()?;
        Some(OutPoint { txid, vout })
    }

    /// Whether this input spends an output locked to `owner`, judged by
    /// the attached public key.
    pub fn uses_key(&self, owner: &str) -> bool {
        self.pubkey
            .as_ref()
            .map(|pk| pk.owner_id() == owner)
            .unwrap_or(false)
    }
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        let mut tx = Self {
            id: Hash256::zero(),
            inputs,
            outputs,
        };
        tx.id = tx.content_hash();
        tx
    }

    /// A value-issuing transaction with no real input: one input with an
    /// empty previous-tx reference and output index -1.
    pub fn coinbase(owner: &str, value: u64, hint: &str) -> Self {
        let input = TxInput {
            prev_txid: Vec::new(),
            prev_vout: COINBASE_VOUT,
            signature: None,
            pubkey: None,
            unlock_hint: hint.to_string(),
        };
        let output = TxOutput {
            value,
            owner: owner.to_string(),
        };
        Self::new(vec![input], vec![output])
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase()
    }

    /// Canonical content hash: a deterministic, order-preserving,
    /// length-prefixed encoding of inputs and outputs with all signature
    /// material excluded. This is both the transaction id and the message
    /// every input signature commits to.
    pub fn content_hash(&self) -> Hash256 {
        let mut data = Vec::new();

        data.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            data.extend_from_slice(&(input.prev_txid.len() as u32).to_le_bytes());
            data.extend_from_slice(&input.prev_txid);
            data.extend_from_slice(&input.prev_vout.to_le_bytes());
            data.extend_from_slice(&(input.unlock_hint.len() as u32).to_le_bytes());
            data.extend_from_slice(input.unlock_hint.as_bytes());
        }

        data.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_le_bytes());
            data.extend_from_slice(&(output.owner.len() as u32).to_le_bytes());
            data.extend_from_slice(output.owner.as_bytes());
        }

        Hash256::hash(&data)
    }

    /// Signs every input over the content hash and attaches the signature
    /// and signer key. Idempotent, and the id is untouched.
    pub fn sign(&mut self, private_key: &PrivateKey) {
        let message = self.content_hash();
        let signature = private_key.sign(&message);
        let pubkey = private_key.public_key();

        for input in &mut self.inputs {
            input.signature = Some(signature);
            input.pubkey = Some(pubkey.clone());
        }
    }

    /// Validates against the supplied UTXO set. Coinbase transactions are
    /// always valid. For everything else: every input must resolve to a
    /// live unspent output (a miss means a double spend or a dangling
    /// reference), carry a signature that verifies over the content hash,
    /// and the input value must cover the output value per `policy`.
    pub fn is_valid(&self, utxos: &UtxoIndex, policy: SurplusPolicy) -> bool {
        if self.is_coinbase() {
            return true;
        }

        let message = self.content_hash();
        let mut input_value: u64 = 0;

        for input in &self.inputs {
            let outpoint = match input.outpoint() {
                Some(outpoint) => outpoint,
                None => return false,
            };
            let prev_output = match utxos.get(&outpoint) {
                Some(output) => output,
                None => {
                    log::debug!(
                        "referenced output not in UTXO set: {}:{}",
                        outpoint.txid,
                        outpoint.vout
                    );
                    return false;
                }
            };

            let (signature, pubkey) = match (&input.signature, &input.pubkey) {
                (Some(signature), Some(pubkey)) => (signature, pubkey),
                _ => return false,
            };
            if !pubkey.verify(&message, signature) {
                log::debug!("signature check failed for {}", self.id);
                return false;
            }

            input_value = match input_value.checked_add(prev_output.value) {
                Some(total) => total,
                None => return false,
            };
        }

        let mut output_value: u64 = 0;
        for output in &self.outputs {
            output_value = match output_value.checked_add(output.value) {
                Some(total) => total,
                None => return false,
            };
        }

        match policy {
            SurplusPolicy::ImplicitFee => input_value >= output_value,
            SurplusPolicy::ExactBalance => input_value == output_value,
        }
    }

    pub fn total_output_value(&self) -> u64 {
        self.outputs.iter().map(|output| output.value).sum()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| MinicoinError::MalformedTransaction(format!("undecodable bytes: {}", e)))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tx {}", self.id)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if input.is_coinbase() {
                writeln!(f, "  in  {}: coinbase \"{}\"", i, input.unlock_hint)?;
            } else {
                writeln!(
                    f,
                    "  in  {}: {}:{} {}",
                    i,
                    hex::encode(&input.prev_txid),
                    input.prev_vout,
                    if input.signature.is_some() { "signed" } else { "unsigned" }
                )?;
            }
        }
        for (i, output) in self.outputs.iter().enumerate() {
            writeln!(f, "  out {}: {} -> {}", i, output.value, output.owner)?;
        }
        Ok(())
    }
}
