//! Lazily reduced base field arithmetic on five 52-bit limbs.
//!
//! Values carry a *magnitude*: the number of unreduced additions folded into
//! the limbs. Multiplication accepts magnitudes up to 8 and always returns
//! magnitude 1. Only [`FieldElement5x52::normalize`] yields the canonical
//! representative in `[0, p)`.
//!
//! Limb layout and reduction follow <https://github.com/bitcoin-core/secp256k1>.

use crate::FieldBytes;
use core::ops::{Add, Mul};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

const LIMB_MASK: u64 = 0xF_FFFF_FFFF_FFFF;
const TOP_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// `2^256 - p`.
const MODULUS_COMPLEMENT: u64 = 0x1_0000_03D1;

/// Low limb of `p`.
const MODULUS_LOW: u64 = 0xF_FFFE_FFFF_FC2F;

#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldElement5x52(pub(crate) [u64; 5]);

impl FieldElement5x52 {
    pub(crate) const ZERO: Self = Self([0, 0, 0, 0, 0]);
    pub(crate) const ONE: Self = Self([1, 0, 0, 0, 0]);

    /// Loads a big-endian integer below `2^256` without reducing it.
    pub(crate) const fn from_bytes_unchecked(bytes: &FieldBytes) -> Self {
        let mut w = [0u64; 5];
        let mut bit = 0;
        let mut i = 31;
        loop {
            let byte = bytes[i] as u64;
            let limb = bit / 52;
            let shift = bit % 52;
            w[limb] |= (byte << shift) & LIMB_MASK;
            if shift > 44 && limb < 4 {
                w[limb + 1] |= byte >> (52 - shift);
            }
            bit += 8;
            if i == 0 {
                break;
            }
            i -= 1;
        }
        Self(w)
    }

    pub(crate) const fn from_u64(val: u64) -> Self {
        Self([val & LIMB_MASK, val >> 52, 0, 0, 0])
    }

    /// Big-endian encoding. Only meaningful once normalized.
    pub(crate) fn to_bytes(self) -> FieldBytes {
        let mut ret = FieldBytes::default();
        for (i, byte) in ret.iter_mut().rev().enumerate() {
            let bit = i * 8;
            let limb = bit / 52;
            let shift = bit % 52;
            let mut v = self.0[limb] >> shift;
            if shift > 44 && limb < 4 {
                v |= self.0[limb + 1] << (52 - shift);
            }
            *byte = v as u8;
        }
        ret
    }

    /// Folds `x * 2^256` back in as `x * (2^256 - p)` and carries through the limbs.
    fn add_modulus_correction(&self, x: u64) -> Self {
        let t0 = self.0[0] + x * MODULUS_COMPLEMENT;
        let t1 = self.0[1] + (t0 >> 52);
        let t2 = self.0[2] + (t1 >> 52);
        let t3 = self.0[3] + (t2 >> 52);
        let t4 = self.0[4] + (t3 >> 52);
        Self([
            t0 & LIMB_MASK,
            t1 & LIMB_MASK,
            t2 & LIMB_MASK,
            t3 & LIMB_MASK,
            t4,
        ])
    }

    /// Strips whole multiples of `2^256` from the top limb and returns them.
    fn subtract_modulus_approximation(&self) -> (Self, u64) {
        let x = self.0[4] >> 48;
        let t4 = self.0[4] & TOP_MASK;
        (Self([self.0[0], self.0[1], self.0[2], self.0[3], t4]), x)
    }

    /// Returns true if a magnitude-1 value is at least `p`.
    pub(crate) fn get_overflow(&self) -> Choice {
        let m = self.0[1] & self.0[2] & self.0[3];
        let x = (self.0[4] >> 48 != 0)
            | ((self.0[4] == TOP_MASK) & (m == LIMB_MASK) & (self.0[0] >= MODULUS_LOW));
        Choice::from(x as u8)
    }

    /// Brings the magnitude down to 1 without producing the canonical value.
    pub(crate) fn normalize_weak(&self) -> Self {
        let (t, x) = self.subtract_modulus_approximation();
        let res = t.add_modulus_correction(x);
        debug_assert!(res.0[4] >> 49 == 0);
        res
    }

    /// Produces the canonical representative in `[0, p)`.
    pub(crate) fn normalize(&self) -> Self {
        let res = self.normalize_weak();
        let overflow = res.get_overflow();

        // The final correction is computed unconditionally and selected.
        let (corrected, _) = res
            .add_modulus_correction(1)
            .subtract_modulus_approximation();

        Self::conditional_select(&res, &corrected, overflow)
    }

    /// Checks for zero without fully normalizing.
    pub(crate) fn normalizes_to_zero(&self) -> Choice {
        let res = self.normalize_weak();
        let [t0, t1, t2, t3, t4] = res.0;

        // z0 catches a raw zero, z1 catches a raw p.
        let z0 = t0 | t1 | t2 | t3 | t4;
        let z1 = (t0 ^ 0x1_0000_03D0) & t1 & t2 & t3 & (t4 ^ 0xF_0000_0000_0000);

        Choice::from(((z0 == 0) | (z1 == LIMB_MASK)) as u8)
    }

    pub(crate) fn is_zero(&self) -> Choice {
        Choice::from(((self.0[0] | self.0[1] | self.0[2] | self.0[3] | self.0[4]) == 0) as u8)
    }

    /// Parity of a normalized value.
    pub(crate) fn is_odd(&self) -> Choice {
        (self.0[0] as u8 & 1).into()
    }

    /// Returns `-self` for an input of at most `magnitude`; the output has `magnitude + 1`.
    pub(crate) const fn negate(&self, magnitude: u32) -> Self {
        let m = (magnitude + 1) as u64;
        Self([
            MODULUS_LOW * 2 * m - self.0[0],
            LIMB_MASK * 2 * m - self.0[1],
            LIMB_MASK * 2 * m - self.0[2],
            LIMB_MASK * 2 * m - self.0[3],
            TOP_MASK * 2 * m - self.0[4],
        ])
    }

    /// Limb-wise sum. Magnitudes add.
    pub(crate) const fn add(&self, rhs: &Self) -> Self {
        Self([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
            self.0[4] + rhs.0[4],
        ])
    }

    pub(crate) const fn double(&self) -> Self {
        self.add(self)
    }

    /// Multiplies by a small integer. The magnitude is multiplied by `rhs`.
    pub(crate) const fn mul_single(&self, rhs: u32) -> Self {
        let rhs = rhs as u64;
        Self([
            self.0[0] * rhs,
            self.0[1] * rhs,
            self.0[2] * rhs,
            self.0[3] * rhs,
            self.0[4] * rhs,
        ])
    }

    /// Schoolbook product with the `2^260 = 0x1000003D10` fold interleaved.
    ///
    /// Kept `inline(always)` so [`square`](Self::square) specializes on equal arguments.
    #[inline(always)]
    fn mul_inner(&self, rhs: &Self) -> Self {
        let a0 = self.0[0] as u128;
        let a1 = self.0[1] as u128;
        let a2 = self.0[2] as u128;
        let a3 = self.0[3] as u128;
        let a4 = self.0[4] as u128;
        let b0 = rhs.0[0] as u128;
        let b1 = rhs.0[1] as u128;
        let b2 = rhs.0[2] as u128;
        let b3 = rhs.0[3] as u128;
        let b4 = rhs.0[4] as u128;
        let m = LIMB_MASK as u128;
        let r = 0x10_0000_3D10u128;

        debug_assert!(a4 >> 52 == 0 && b4 >> 52 == 0);

        // [... a b c] stands for ... + a<<104 + b<<52 + c mod p,
        // and px for the column sum of a[i]*b[x-i].

        let mut d = a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0;
        let mut c = a4 * b4;
        // [c 0 0 0 0 d 0 0 0] = [p8 0 0 0 0 p3 0 0 0]
        d += (c & m) * r;
        c >>= 52;
        let c64 = c as u64;
        let t3 = (d & m) as u64;
        d >>= 52;
        let d64 = d as u64;
        // [c 0 0 0 0 d t3 0 0 0] = [p8 0 0 0 0 p3 0 0 0]

        d = d64 as u128 + a0 * b4 + a1 * b3 + a2 * b2 + a3 * b1 + a4 * b0;
        d += c64 as u128 * r;
        let t4 = (d & m) as u64;
        d >>= 52;
        let d64 = d as u64;
        let tx = t4 >> 48;
        let t4 = t4 & ((m as u64) >> 4);
        // [d t4+(tx<<48) t3 0 0 0] = [p8 0 0 0 p4 p3 0 0 0]

        c = a0 * b0;
        d = d64 as u128 + a1 * b4 + a2 * b3 + a3 * b2 + a4 * b1;
        let u0 = (d & m) as u64;
        d >>= 52;
        let d64 = d as u64;
        let u0 = (u0 << 4) | tx;
        c += u0 as u128 * ((r as u64) >> 4) as u128;
        let r0 = (c & m) as u64;
        c >>= 52;
        let c64 = c as u64;
        // [d 0 t4 t3 0 c r0] = [p8 0 0 p5 p4 p3 0 0 p0]

        c = c64 as u128 + a0 * b1 + a1 * b0;
        d = d64 as u128 + a2 * b4 + a3 * b3 + a4 * b2;
        c += (d & m) * r;
        d >>= 52;
        let d64 = d as u64;
        let r1 = (c & m) as u64;
        c >>= 52;
        let c64 = c as u64;
        // [d 0 0 t4 t3 c r1 r0] = [p8 0 p6 p5 p4 p3 0 p1 p0]

        c = c64 as u128 + a0 * b2 + a1 * b1 + a2 * b0;
        d = d64 as u128 + a3 * b4 + a4 * b3;
        c += (d & m) * r;
        d >>= 52;
        let d64 = d as u64;
        let r2 = (c & m) as u64;
        c >>= 52;
        let c64 = c as u64;
        // [d 0 0 0 t4 t3+c r2 r1 r0] = [p8 p7 p6 p5 p4 p3 p2 p1 p0]

        c = c64 as u128 + (d64 as u128) * r + t3 as u128;
        let r3 = (c & m) as u64;
        c >>= 52;
        let c64 = c as u64;
        c = c64 as u128 + t4 as u128;
        let r4 = c as u64;
        // [r4 r3 r2 r1 r0] = [p8 p7 p6 p5 p4 p3 p2 p1 p0]

        Self([r0, r1, r2, r3, r4])
    }

    /// Input magnitudes must not exceed 8. Output has magnitude 1.
    #[inline(always)]
    pub(crate) fn mul(&self, rhs: &Self) -> Self {
        self.mul_inner(rhs)
    }

    pub(crate) fn square(&self) -> Self {
        self.mul_inner(self)
    }

    /// Raises to the power `2^k`.
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Computes `2^n - 1` powers shared by the inversion and square root chains.
    fn pow_chain_223(&self) -> [Self; 4] {
        let x2 = self.pow2k(1).mul(self);
        let x3 = x2.pow2k(1).mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);
        [x2, x3, x22, x223]
    }

    /// Inverse by Fermat's little theorem, in time independent of the value.
    ///
    /// `p - 2` has runs of ones of lengths 223, 22, 2 and 1.
    pub(crate) fn invert(&self) -> CtOption<Self> {
        let [x2, _, x22, x223] = self.pow_chain_223();
        let res = x223
            .pow2k(23)
            .mul(&x22)
            .pow2k(5)
            .mul(self)
            .pow2k(3)
            .mul(&x2)
            .pow2k(2)
            .mul(self);

        CtOption::new(res, !self.normalizes_to_zero())
    }

    /// Square root as the `(p + 1) / 4`-th power, checked by squaring back.
    pub(crate) fn sqrt(&self) -> CtOption<Self> {
        let [x2, _, x22, x223] = self.pow_chain_223();
        let res = x223.pow2k(23).mul(&x22).pow2k(6).mul(&x2).pow2k(2);

        let is_root = (res.square().negate(1) + self).normalizes_to_zero();
        CtOption::new(res, is_root)
    }
}

impl Default for FieldElement5x52 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ConditionallySelectable for FieldElement5x52 {
    #[inline(always)]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut limbs = [0u64; 5];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u64::conditional_select(&a.0[i], &b.0[i], choice);
        }
        Self(limbs)
    }
}

impl ConstantTimeEq for FieldElement5x52 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl Add<&FieldElement5x52> for FieldElement5x52 {
    type Output = FieldElement5x52;

    fn add(self, other: &FieldElement5x52) -> FieldElement5x52 {
        FieldElement5x52::add(&self, other)
    }
}

impl Add<&FieldElement5x52> for &FieldElement5x52 {
    type Output = FieldElement5x52;

    fn add(self, other: &FieldElement5x52) -> FieldElement5x52 {
        FieldElement5x52::add(self, other)
    }
}

impl Mul<&FieldElement5x52> for FieldElement5x52 {
    type Output = FieldElement5x52;

    fn mul(self, other: &FieldElement5x52) -> FieldElement5x52 {
        FieldElement5x52::mul(&self, other)
    }
}

impl Mul<&FieldElement5x52> for &FieldElement5x52 {
    type Output = FieldElement5x52;

    fn mul(self, other: &FieldElement5x52) -> FieldElement5x52 {
        FieldElement5x52::mul(self, other)
    }
}

impl Zeroize for FieldElement5x52 {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::FieldElement5x52;
    use hex_literal::hex;
    use subtle::ConstantTimeEq;

    const P: [u8; 32] = hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");

    #[test]
    fn overflow_check_after_weak_normalize() {
        // 2^256 with the excess bit parked in the lowest limb.
        let z = FieldElement5x52([
            1 << 52,
            (1 << 52) - 1,
            (1 << 52) - 1,
            (1 << 52) - 1,
            (1 << 48) - 1,
        ]);
        assert_eq!(z.normalize().0, [0x1000003d1, 0, 0, 0, 0]);
    }

    #[test]
    fn byte_layout_round_trips_all_limb_boundaries() {
        let bytes = hex!("0123456789ABCDEF FEDCBA9876543210 0F1E2D3C4B5A6978 8796A5B4C3D2E1F0");
        let fe = FieldElement5x52::from_bytes_unchecked(&bytes);
        assert!(fe.0.iter().take(4).all(|limb| limb >> 52 == 0));
        assert_eq!(fe.0[4] >> 48, 0);
        assert_eq!(fe.to_bytes(), bytes);
    }

    #[test]
    fn modulus_is_detected() {
        let p = FieldElement5x52::from_bytes_unchecked(&P);
        assert!(bool::from(p.get_overflow()));
        assert!(bool::from(p.normalizes_to_zero()));
        assert!(bool::from(p.normalize().is_zero()));
    }

    #[test]
    fn lazy_sum_normalizes() {
        let one = FieldElement5x52::ONE;
        let minus_one = one.negate(1);
        let sum = minus_one + &one;
        assert!(!bool::from(sum.is_zero()));
        assert!(bool::from(sum.normalizes_to_zero()));
        assert!(bool::from(sum.normalize().ct_eq(&FieldElement5x52::ZERO)));
    }

    #[test]
    fn invert_and_sqrt_of_two() {
        let two = FieldElement5x52::from_u64(2);
        let inv = two.invert().unwrap();
        assert!(bool::from((two * &inv).normalize().ct_eq(&FieldElement5x52::ONE)));

        let four = two.square();
        let root = four.sqrt().unwrap().normalize();
        let neg_two = two.negate(1).normalize();
        assert!(bool::from(root.ct_eq(&two) | root.ct_eq(&neg_two)));
    }
}
