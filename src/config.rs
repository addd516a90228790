use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How transaction validation treats input value left over after all
/// outputs are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurplusPolicy {
    /// Surplus is accepted and burned (the reference behavior). A sender
    /// that omits a change output silently destroys the difference.
    ImplicitFee,
    /// Inputs must exactly cover outputs; any surplus is rejected.
    ExactBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Fixed proof-of-work difficulty in bits; target = 2^(256 - bits).
    /// Configuration, not derived state - there is no retargeting.
    pub difficulty_bits: u32,
    /// Upper bound on the nonce search. Exhaustion is a mining failure.
    pub max_nonce: u64,
    /// Value of the genesis coinbase output.
    pub genesis_reward: u64,
    /// Placeholder owner the genesis reward is locked to. No key hashes
    /// to this value, so the genesis output can never be spent.
    pub genesis_owner: String,
    /// Free-form unlock hint embedded in the genesis coinbase.
    pub genesis_message: String,
    pub surplus_policy: SurplusPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    pub prompt: String,
    pub show_key_material: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            shell: ShellConfig {
                prompt: "minicoin".to_string(),
                show_key_material: true,
            },
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: 16,
            max_nonce: u64::MAX,
            genesis_reward: 50,
            genesis_owner: "0000000000000000000000000000000000000000".to_string(),
            genesis_message: "minicoin genesis".to_string(),
            surplus_policy: SurplusPolicy::ImplicitFee,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
