//! Development helper functions.

use num_bigint::{BigUint, ToBigUint};
use num_traits::cast::ToPrimitive;
use rand_core::{TryCryptoRng, TryRngCore};

/// Converts a byte array (big-endian) to BigUint.
pub fn bytes_to_biguint(bytes: &[u8; 32]) -> BigUint {
    bytes
        .iter()
        .enumerate()
        .map(|(i, w)| w.to_biguint().unwrap() << ((31 - i) * 8))
        .sum()
}

/// Converts a BigUint to a byte array (big-endian).
pub fn biguint_to_bytes(x: &BigUint) -> [u8; 32] {
    let mask = BigUint::from(u8::MAX);
    let mut bytes = [0u8; 32];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = ((x >> ((31 - i) * 8)) & &mask).to_u8().unwrap();
    }
    bytes
}

/// Converts little-endian 64-bit limbs to BigUint.
pub fn limbs_to_biguint(limbs: &[u64; 4]) -> BigUint {
    limbs
        .iter()
        .enumerate()
        .map(|(i, w)| BigUint::from(*w) << (i * 64))
        .sum()
}

/// Converts a BigUint below `2^256` to little-endian 64-bit limbs.
pub fn biguint_to_limbs(x: &BigUint) -> [u64; 4] {
    let mask = BigUint::from(u64::MAX);
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        *limb = ((x >> (i * 64)) & &mask).to_u64().unwrap();
    }
    limbs
}

/// Random source that serves `remaining` bytes of `0x5A` and then fails.
pub struct FailingRng {
    pub remaining: usize,
}

impl FailingRng {
    /// A source that fails on the first request.
    pub fn empty() -> Self {
        Self { remaining: 0 }
    }
}

#[derive(Debug)]
pub struct SourceUnavailable;

impl core::fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("random source unavailable")
    }
}

impl TryRngCore for FailingRng {
    type Error = SourceUnavailable;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        let mut buf = [0u8; 4];
        self.try_fill_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        let mut buf = [0u8; 8];
        self.try_fill_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
        if dst.len() > self.remaining {
            return Err(SourceUnavailable);
        }
        self.remaining -= dst.len();
        dst.fill(0x5A);
        Ok(())
    }
}

impl TryCryptoRng for FailingRng {}
