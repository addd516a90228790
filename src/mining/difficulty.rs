use crate::crypto::hash::Hash256;
use crate::{MinicoinError, Result};

/// The admission threshold: a block hash qualifies when its big-endian
/// numeric value is strictly below `2^(256 - bits)`. Difficulty is a fixed
/// configuration value; there is no retargeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyTarget([u8; 32]);

impl DifficultyTarget {
    /// Supported range is 1..=255 bits. 0 would admit every hash and 256
    /// none; both are rejected as misconfiguration.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits == 0 || bits > 255 {
            return Err(MinicoinError::Mining(format!(
                "difficulty must be within 1..=255 bits, got {}",
                bits
            )));
        }

        // 2^(256 - bits) as a big-endian byte array: a single set bit.
        let exponent = 256 - bits as usize;
        let mut target = [0u8; 32];
        target[31 - exponent / 8] = 1 << (exponent % 8);
        Ok(Self(target))
    }

    /// Numeric strictly-less comparison; for fixed-width big-endian bytes
    /// this is exactly lexicographic order.
    pub fn is_met_by(&self, hash: &Hash256) -> bool {
        *hash.as_bytes() < self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bit_position() -> Result<()> {
        // 2^240: one byte of leading zeros.
        let target = DifficultyTarget::from_bits(16)?;
        assert_eq!(target.as_bytes()[0], 0x00);
        assert_eq!(target.as_bytes()[1], 0x01);
        assert!(target.as_bytes()[2..].iter().all(|&b| b == 0));

        // 2^255: only the top bit.
        let target = DifficultyTarget::from_bits(1)?;
        assert_eq!(target.as_bytes()[0], 0x80);
        Ok(())
    }

    #[test]
    fn test_comparison_boundaries() -> Result<()> {
        let target = DifficultyTarget::from_bits(8)?;

        assert!(target.is_met_by(&Hash256::zero()));
        assert!(!target.is_met_by(&Hash256::from([0xFFu8; 32])));

        // Exactly the target value is not strictly below it.
        assert!(!target.is_met_by(&Hash256::from(*target.as_bytes())));

        // One below the target: first byte zero, everything else set.
        let mut just_under = [0xFFu8; 32];
        just_under[0] = 0x00;
        assert!(target.is_met_by(&Hash256::from(just_under)));
        Ok(())
    }

    #[test]
    fn test_unsupported_bits_rejected() {
        assert!(DifficultyTarget::from_bits(0).is_err());
        assert!(DifficultyTarget::from_bits(256).is_err());
        assert!(DifficultyTarget::from_bits(255).is_ok());
    }
}
