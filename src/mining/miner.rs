use crate::core::block::Block;
use crate::crypto::hash::Hash256;
use crate::mining::difficulty::DifficultyTarget;
use crate::{MinicoinError, Result};

/// Result of a successful nonce search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningOutcome {
    pub hash: Hash256,
    pub nonce: u64,
}

/// The full proof-of-work preimage. The stored block hash commits to every
/// header field, including the difficulty the block was mined at.
fn pow_preimage(block: &Block, digest: &Hash256, bits: u32, nonce: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(block.prev_hash.len() + 32 + 8 + 4 + 8);
    data.extend_from_slice(&block.prev_hash);
    data.extend_from_slice(digest.as_bytes());
    data.extend_from_slice(&block.timestamp.to_le_bytes());
    data.extend_from_slice(&bits.to_le_bytes());
    data.extend_from_slice(&nonce.to_le_bytes());
    data
}

/// Sequential, blocking nonce search: tries 0, 1, 2, ... until the hash
/// falls below the target. Bounded by `max_nonce`; exhausting the range is
/// a mining failure, never a spin.
pub fn mine(block: &Block, bits: u32, max_nonce: u64) -> Result<MiningOutcome> {
    let target = DifficultyTarget::from_bits(bits)?;
    let digest = block.transactions_digest()?;

    let mut nonce: u64 = 0;
    loop {
        let hash = Hash256::hash(&pow_preimage(block, &digest, bits, nonce));
        if target.is_met_by(&hash) {
            log::debug!("nonce {} met {}-bit target: {}", nonce, bits, hash);
            return Ok(MiningOutcome { hash, nonce });
        }
        if nonce == max_nonce {
            return Err(MinicoinError::Mining(format!(
                "nonce space exhausted after {} attempts at {} bits",
                max_nonce, bits
            )));
        }
        nonce += 1;
    }
}

/// Mines `block` in place, storing the winning hash and nonce.
pub fn seal(block: &mut Block, bits: u32, max_nonce: u64) -> Result<()> {
    let outcome = mine(block, bits, max_nonce)?;
    block.hash = outcome.hash;
    block.nonce = outcome.nonce;
    Ok(())
}

/// Re-derives the proof-of-work hash at the stored nonce. The block is
/// valid only if that hash is below the target AND equals the stored hash
/// field - a block must not carry a hash inconsistent with its own header.
pub fn validate(block: &Block, bits: u32) -> bool {
    let target = match DifficultyTarget::from_bits(bits) {
        Ok(target) => target,
        Err(_) => return false,
    };
    let digest = match block.transactions_digest() {
        Ok(digest) => digest,
        Err(_) => return false,
    };

    let hash = Hash256::hash(&pow_preimage(block, &digest, bits, block.nonce));
    target.is_met_by(&hash) && hash == block.hash
}
