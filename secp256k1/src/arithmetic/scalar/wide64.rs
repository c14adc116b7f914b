//! 512-bit products of scalars and their reduction modulo the group order.

use super::{MODULUS, Scalar};
use crate::arithmetic::util::sbb64;
use subtle::{Choice, ConditionallySelectable};

/// Limbs of `2^256 - n`. The top limb is zero and the third is one.
const NEG_MODULUS: [u64; 4] = [!MODULUS[0] + 1, !MODULUS[1], !MODULUS[2], !MODULUS[3]];

/// Unreduced product of two scalars, little-endian limbs.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WideScalar(pub(crate) [u64; 8]);

impl WideScalar {
    /// Multiplies two scalars without modulo reduction.
    #[inline(always)]
    pub(crate) fn mul_wide(a: &Scalar, b: &Scalar) -> Self {
        let a = a.0;
        let b = b.0;

        // 192-bit column accumulator (c0, c1, c2).
        let (c0, c1) = muladd_fast(a[0], b[0], 0, 0);
        let (l0, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = muladd(a[0], b[1], c0, c1, 0);
        let (c0, c1, c2) = muladd(a[1], b[0], c0, c1, c2);
        let (l1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(a[0], b[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[1], b[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[2], b[0], c0, c1, c2);
        let (l2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(a[0], b[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[1], b[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[2], b[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[3], b[0], c0, c1, c2);
        let (l3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(a[1], b[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[2], b[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[3], b[1], c0, c1, c2);
        let (l4, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(a[2], b[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(a[3], b[2], c0, c1, c2);
        let (l5, c0, c1) = (c0, c1, c2);
        let (c0, c1) = muladd_fast(a[3], b[3], c0, c1);
        let (l6, l7) = (c0, c1);

        Self([l0, l1, l2, l3, l4, l5, l6, l7])
    }

    /// Returns `round(a * b / 2^shift)` for `256 <= shift < 512`.
    ///
    /// Variable time in `shift`.
    pub(crate) fn mul_shift_vartime(a: &Scalar, b: &Scalar, shift: usize) -> Scalar {
        assert!((256..512).contains(&shift), "shift out of range");

        let l = Self::mul_wide(a, b).0;
        let limbs = shift / 64;
        let low = shift % 64;

        let mut r = [0u64; 4];
        for (i, word) in r.iter_mut().enumerate() {
            let idx = limbs + i;
            if idx >= 8 {
                break;
            }
            *word = l[idx] >> low;
            if low != 0 && idx + 1 < 8 {
                *word |= l[idx + 1] << (64 - low);
            }
        }

        // Round up on the highest discarded bit.
        let round = (l[(shift - 1) / 64] >> ((shift - 1) % 64)) & 1;
        Scalar(r).conditional_add_bit(0, Choice::from(round as u8))
    }

    /// Reduces modulo `n`, folding the high half in twice as multiples of `2^256 - n`.
    pub(crate) fn reduce(&self) -> Scalar {
        let w = self.0;
        let (n0, n1, n2, n3) = (w[4], w[5], w[6], w[7]);

        // 512 -> 385 bits: m[0..6] = w[0..3] + n[0..3] * NEG_MODULUS.
        let (c0, c1) = muladd_fast(n0, NEG_MODULUS[0], w[0], 0);
        let (m0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(w[1], c0, c1);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[0], c0, c1, 0);
        let (c0, c1, c2) = muladd(n0, NEG_MODULUS[1], c0, c1, c2);
        let (m1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(w[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n0, c0, c1, c2);
        let (m2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(w[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n1, c0, c1, c2);
        let (m3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n2, c0, c1, c2);
        let (m4, c0, c1) = (c0, c1, c2);
        let (c0, c1) = sumadd_fast(n3, c0, c1);
        let (m5, m6) = (c0, c1);
        debug_assert!(m6 <= 1);

        // 385 -> 258 bits: p[0..4] = m[0..3] + m[4..6] * NEG_MODULUS.
        let (c0, c1) = muladd_fast(m4, NEG_MODULUS[0], m0, 0);
        let (p0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(m1, c0, c1);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[0], c0, c1, 0);
        let (c0, c1, c2) = muladd(m4, NEG_MODULUS[1], c0, c1, c2);
        let (p1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(m2, c0, c1, c2);
        let (c0, c1, c2) = muladd(m6, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(m4, c0, c1, c2);
        let (p2, c0, c1) = (c0, c1, c2);
        let (c0, c1) = sumadd_fast(m3, c0, c1);
        let (c0, c1) = muladd_fast(m6, NEG_MODULUS[1], c0, c1);
        let (c0, c1) = sumadd_fast(m5, c0, c1);
        let p3 = c0;
        let p4 = c1 + m6;
        debug_assert!(p4 <= 2);

        // 258 -> 256 bits: r[0..3] = p[0..3] + p4 * NEG_MODULUS.
        let mut c = (p0 as u128) + (NEG_MODULUS[0] as u128) * (p4 as u128);
        let r0 = c as u64;
        c >>= 64;
        c += (p1 as u128) + (NEG_MODULUS[1] as u128) * (p4 as u128);
        let r1 = c as u64;
        c >>= 64;
        c += (p2 as u128) + (p4 as u128);
        let r2 = c as u64;
        c >>= 64;
        c += p3 as u128;
        let r3 = c as u64;
        c >>= 64;

        // At most one subtraction of n remains.
        let r = [r0, r1, r2, r3];
        let mut reduced = [0u64; 4];
        let mut borrow = 0;
        for i in 0..4 {
            (reduced[i], borrow) = sbb64(r[i], MODULUS[i], borrow);
        }
        let high_bit = Choice::from(c as u8);
        let underflow = Choice::from((borrow >> 63) as u8);
        Scalar::conditional_select(&Scalar(r), &Scalar(reduced), !underflow | high_bit)
    }
}

/// Add a to the number defined by (c0,c1,c2). c2 must never overflow.
fn sumadd(a: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let (new_c0, carry0) = c0.overflowing_add(a);
    let (new_c1, carry1) = c1.overflowing_add(carry0 as u64);
    let new_c2 = c2 + (carry1 as u64);
    (new_c0, new_c1, new_c2)
}

/// Add a to the number defined by (c0,c1). c1 must never overflow.
fn sumadd_fast(a: u64, c0: u64, c1: u64) -> (u64, u64) {
    let (new_c0, carry0) = c0.overflowing_add(a);
    let new_c1 = c1 + (carry0 as u64);
    (new_c0, new_c1)
}

/// Add a*b to the number defined by (c0,c1,c2). c2 must never overflow.
fn muladd(a: u64, b: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64; // at most 0xFFFFFFFFFFFFFFFE
    let tl = t as u64;

    let (new_c0, carry0) = c0.overflowing_add(tl);
    let new_th = th.wrapping_add(carry0 as u64);
    let (new_c1, carry1) = c1.overflowing_add(new_th);
    let new_c2 = c2 + (carry1 as u64);

    (new_c0, new_c1, new_c2)
}

/// Add a*b to the number defined by (c0,c1). c1 must never overflow.
fn muladd_fast(a: u64, b: u64, c0: u64, c1: u64) -> (u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64;
    let tl = t as u64;

    let (new_c0, carry0) = c0.overflowing_add(tl);
    let new_th = th.wrapping_add(carry0 as u64);
    let new_c1 = c1 + new_th;

    (new_c0, new_c1)
}
