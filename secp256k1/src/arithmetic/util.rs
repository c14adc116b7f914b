//! Helper functions.

use crate::{Error, FieldBytes, Result};

/// Computes `a + b + carry`, returning the result along with the new carry.
#[inline(always)]
pub(crate) const fn adc64(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a - (b + borrow)`, returning the result along with the new borrow.
/// The borrow is either `0` or `u64::MAX`.
#[inline(always)]
pub(crate) const fn sbb64(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let ret = (a as u128).wrapping_sub((b as u128) + ((borrow >> 63) as u128));
    (ret as u64, (ret >> 64) as u64)
}

/// Loads big-endian bytes into little-endian 64-bit limbs.
pub(crate) const fn u64x4_from_be_bytes(bytes: &FieldBytes) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    let mut i = 0;
    while i < 4 {
        let mut j = 0;
        while j < 8 {
            limbs[3 - i] = (limbs[3 - i] << 8) | (bytes[i * 8 + j] as u64);
            j += 1;
        }
        i += 1;
    }
    limbs
}

/// Stores little-endian 64-bit limbs as big-endian bytes.
pub(crate) fn u64x4_to_be_bytes(limbs: &[u64; 4]) -> FieldBytes {
    let mut bytes = FieldBytes::default();
    for (chunk, limb) in bytes.chunks_exact_mut(8).zip(limbs.iter().rev()) {
        chunk.copy_from_slice(&limb.to_be_bytes());
    }
    bytes
}

/// Borrows the leading 32 bytes of `buf`.
pub(crate) fn leading_field_bytes(buf: &[u8]) -> Result<&FieldBytes> {
    buf.get(..32)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Error::InvalidLength)
}

/// Mutably borrows the leading 32 bytes of `buf`.
pub(crate) fn leading_field_bytes_mut(buf: &mut [u8]) -> Result<&mut FieldBytes> {
    buf.get_mut(..32)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Error::InvalidLength)
}
