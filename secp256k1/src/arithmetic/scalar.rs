//! Scalar field arithmetic modulo n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141

mod wide64;

pub(crate) use wide64::WideScalar;

use super::{inversion, util};
use crate::{Error, FieldBytes, Result};
use core::fmt;
use ff::Field;
use rand_core::{TryCryptoRng, TryRngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use util::{adc64, sbb64};
use zeroize::DefaultIsZeroes;

/// Limbs of the curve order `n`, little-endian.
pub(crate) const MODULUS: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `(n - 1) / 2`.
const FRAC_MODULUS_2: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// `n - 2`, the Fermat inversion exponent.
const MODULUS_MINUS_TWO: [u64; 4] = [
    0xBFD2_5E8C_D036_413F,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// 2-adicity of `n - 1`.
const S: u32 = 6;

/// `t = (n - 1) / 2^S`.
const T: [u64; 4] = [
    0xEEFF_497A_3340_D905,
    0xFAEA_BB73_9ABD_2280,
    0xFFFF_FFFF_FFFF_FFFF,
    0x03FF_FFFF_FFFF_FFFF,
];

/// `(t + 1) / 2`.
const T_PLUS_ONE_DIV_2: [u64; 4] = [
    0x777F_A4BD_19A0_6C83,
    0xFD75_5DB9_CD5E_9140,
    0xFFFF_FFFF_FFFF_FFFF,
    0x01FF_FFFF_FFFF_FFFF,
];

/// `7^t`, a primitive `2^S`-th root of unity.
const ROOT_OF_UNITY: Scalar = Scalar([
    0x992F_4B54_02B0_52F2,
    0x98BD_EAB6_8075_6045,
    0xDF98_79A3_FBC4_83A8,
    0x0C1D_C060_E7A9_1986,
]);

/// Scalars are elements in the finite field modulo `n`.
///
/// Every `Scalar` holds the reduced representative in `[0, n)`.
///
/// # Trait impls
///
/// Much of the important functionality of scalars is provided by traits from
/// [`core::ops`] and [`subtle`]:
///
/// - [`Add`](core::ops::Add), [`Sub`](core::ops::Sub), [`Mul`](core::ops::Mul)
///   and [`Neg`](core::ops::Neg), with the matching `*Assign` traits
/// - [`ConditionallySelectable`], [`ConstantTimeEq`] and, through the blanket
///   impl, [`ConditionallyNegatable`](subtle::ConditionallyNegatable)
/// - [`Zeroize`](zeroize::Zeroize)
/// - [`Field`], with [`Sum`](core::iter::Sum) and [`Product`](core::iter::Product)
#[derive(Clone, Copy, Default)]
pub struct Scalar(pub(crate) [u64; 4]);

impl Scalar {
    /// Zero scalar.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Parses a big-endian integer, rejecting values not below `n`.
    pub fn from_bytes(bytes: &FieldBytes) -> CtOption<Self> {
        let (reduced, overflow) = Self::from_bytes_reduced_ct(bytes);
        CtOption::new(reduced, !overflow)
    }

    /// Parses a big-endian integer and reduces it modulo `n`.
    ///
    /// The flag is `true` when the input was `n` or larger.
    pub fn from_bytes_reduced(bytes: &FieldBytes) -> (Self, bool) {
        let (reduced, overflow) = Self::from_bytes_reduced_ct(bytes);
        (reduced, overflow.into())
    }

    fn from_bytes_reduced_ct(bytes: &FieldBytes) -> (Self, Choice) {
        let w = util::u64x4_from_be_bytes(bytes);

        // Inputs are below 2^256 < 2n, so one conditional subtraction suffices.
        let mut r = [0u64; 4];
        let mut borrow = 0;
        for i in 0..4 {
            (r[i], borrow) = sbb64(w[i], MODULUS[i], borrow);
        }
        let overflow = !Choice::from((borrow >> 63) as u8);
        (Self::conditional_select(&Self(w), &Self(r), overflow), overflow)
    }

    /// Sets `self` from the first 32 bytes of `buf`, reducing modulo `n`.
    ///
    /// Returns whether the input overflowed. Fails without touching `self`
    /// when `buf` is shorter than 32 bytes.
    pub fn set_bytes(&mut self, buf: &[u8]) -> Result<bool> {
        let (value, overflow) = Self::from_bytes_reduced(util::leading_field_bytes(buf)?);
        *self = value;
        Ok(overflow)
    }

    /// Sets `self` like [`set_bytes`](Self::set_bytes), but reports whether
    /// the bytes form a valid secret key: below `n` and non-zero.
    ///
    /// The reduced value is stored either way.
    pub fn set_bytes_as_key(&mut self, buf: &[u8]) -> Result<bool> {
        let overflow = self.set_bytes(buf)?;
        Ok(!overflow && !bool::from(self.is_zero()))
    }

    /// Big-endian encoding.
    pub fn to_bytes(&self) -> FieldBytes {
        util::u64x4_to_be_bytes(&self.0)
    }

    /// Writes the big-endian encoding into the first 32 bytes of `dst`.
    pub fn put_bytes(&self, dst: &mut [u8]) -> Result<()> {
        *util::leading_field_bytes_mut(dst)? = self.to_bytes();
        Ok(())
    }

    /// Samples a random scalar, panicking if `rng` fails.
    pub fn random<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::try_from_rng(rng).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Samples a random scalar from 32 bytes of `rng` output reduced modulo `n`.
    pub fn try_from_rng<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut bytes = FieldBytes::default();
        rng.try_fill_bytes(&mut bytes)
            .map_err(|_| Error::RandomSource)?;
        Ok(Self::from_bytes_reduced(&bytes).0)
    }

    /// Determine if this `Scalar` is zero.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Determine if this `Scalar` is one.
    pub fn is_one(&self) -> Choice {
        self.ct_eq(&Self::ONE)
    }

    /// Determine if this `Scalar` is odd.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.0[0] & 1) as u8)
    }

    /// Determine if this `Scalar` is even.
    pub fn is_even(&self) -> Choice {
        !self.is_odd()
    }

    /// Is this scalar greater than `n / 2`?
    pub fn is_high(&self) -> Choice {
        let mut borrow = 0;
        for i in 0..4 {
            (_, borrow) = sbb64(FRAC_MODULUS_2[i], self.0[i], borrow);
        }
        Choice::from((borrow >> 63) as u8)
    }

    /// Returns `self + rhs mod n`.
    pub fn add(&self, rhs: &Self) -> Self {
        let mut sum = [0u64; 4];
        let mut carry = 0;
        for i in 0..4 {
            (sum[i], carry) = adc64(self.0[i], rhs.0[i], carry);
        }

        let mut reduced = [0u64; 4];
        let mut borrow = 0;
        for i in 0..4 {
            (reduced[i], borrow) = sbb64(sum[i], MODULUS[i], borrow);
        }

        // Keep the subtraction if the sum carried out or did not underflow.
        let use_reduced = Choice::from(carry as u8) | !Choice::from((borrow >> 63) as u8);
        Self::conditional_select(&Self(sum), &Self(reduced), use_reduced)
    }

    /// Returns `self - rhs mod n`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let mut diff = [0u64; 4];
        let mut borrow = 0;
        for i in 0..4 {
            (diff[i], borrow) = sbb64(self.0[i], rhs.0[i], borrow);
        }

        // `borrow` is an all-ones mask on underflow.
        let mut carry = 0;
        for i in 0..4 {
            (diff[i], carry) = adc64(diff[i], MODULUS[i] & borrow, carry);
        }
        Self(diff)
    }

    /// Returns `self * rhs mod n`.
    pub fn mul(&self, rhs: &Self) -> Self {
        WideScalar::mul_wide(self, rhs).reduce()
    }

    /// Returns `self^2 mod n`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Returns `-self mod n`.
    pub fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Returns `2^bit + self` if `flag` is set, `self` otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= 256`.
    pub fn conditional_add_bit(&self, bit: usize, flag: Choice) -> Self {
        assert!(bit < 256, "bit index out of range");
        // Every power of two below 2^256 is also below n.
        let mut power = Self::ZERO;
        power.0[bit / 64] = 1 << (bit % 64);
        Self::conditional_select(self, &self.add(&power), flag)
    }

    /// Returns `round(a * b / 2^shift)` for `256 <= shift < 512`.
    ///
    /// Variable time in `shift`.
    ///
    /// # Panics
    ///
    /// Panics if `shift` is outside `256..512`.
    pub fn mul_shift_vartime(a: &Self, b: &Self, shift: usize) -> Self {
        WideScalar::mul_shift_vartime(a, b, shift)
    }

    /// Raises to `exp`, with running time depending only on `exp`.
    fn pow_public(&self, exp: &[u64; 4]) -> Self {
        let mut res = Self::ONE;
        for i in (0..256).rev() {
            res = res.square();
            if (exp[i / 64] >> (i % 64)) & 1 == 1 {
                res = res.mul(self);
            }
        }
        res
    }

    /// Returns the multiplicative inverse, or `None` for zero.
    ///
    /// Invariant-time: computes `self^(n - 2)` with a fixed exponent.
    pub fn invert(&self) -> CtOption<Self> {
        CtOption::new(self.pow_public(&MODULUS_MINUS_TWO), !self.is_zero())
    }

    /// Returns the multiplicative inverse, or `None` for zero.
    ///
    /// Runs in variable time: do not use on secret values.
    pub fn invert_vartime(&self) -> CtOption<Self> {
        CtOption::new(
            Self(inversion::invert_vartime(&self.0, &MODULUS)),
            !self.is_zero(),
        )
    }

    /// Returns a square root, or `None` if `self` is not a quadratic residue.
    ///
    /// Tonelli-Shanks. Runs in variable time: do not use on secret values.
    pub fn sqrt(&self) -> CtOption<Self> {
        let mut x = self.pow_public(&T_PLUS_ONE_DIV_2);
        let mut b = self.pow_public(&T);
        let mut z = ROOT_OF_UNITY;
        let mut m = S;

        while !bool::from(b.is_one() | b.is_zero()) {
            // Least `i` with `b^(2^i) = 1`; none below `m` means a non-residue.
            let mut i = 0;
            let mut t = b;
            while !bool::from(t.is_one()) && i < m {
                t = t.square();
                i += 1;
            }
            if i == m {
                break;
            }

            let mut c = z;
            for _ in 0..(m - i - 1) {
                c = c.square();
            }
            z = c.square();
            x = x.mul(&c);
            b = b.mul(&z);
            m = i;
        }

        CtOption::new(x, x.square().ct_eq(self))
    }

    /// Extracts `count` bits starting at `offset`, in constant time.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < count < 32` and the window lies inside one 64-bit limb.
    pub fn bits(&self, offset: usize, count: usize) -> u32 {
        assert!(count > 0 && count < 32, "bit count out of range");
        assert!(
            offset < 256 && (offset + count - 1) / 64 == offset / 64,
            "bit window crosses a limb"
        );
        ((self.0[offset / 64] >> (offset % 64)) & ((1u64 << count) - 1)) as u32
    }

    /// Extracts `count` bits starting at `offset`; the window may straddle two limbs.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < count < 32` and `offset + count <= 256`.
    pub fn bits_vartime(&self, offset: usize, count: usize) -> u32 {
        assert!(count > 0 && count < 32, "bit count out of range");
        assert!(offset + count <= 256, "bit window out of range");
        if (offset + count - 1) / 64 == offset / 64 {
            self.bits(offset, count)
        } else {
            let limb = offset / 64;
            let shift = offset % 64;
            let word = (self.0[limb] >> shift) | (self.0[limb + 1] << (64 - shift));
            (word & ((1u64 << count) - 1)) as u32
        }
    }

    /// Shifts right by `0 < n < 16` bits, returning the bits shifted out.
    ///
    /// # Panics
    ///
    /// Panics if `n` is outside `1..16`.
    pub fn shr_small(&mut self, n: u32) -> u32 {
        assert!(n > 0 && n < 16, "shift out of range");
        let ret = (self.0[0] & ((1 << n) - 1)) as u32;
        self.0[0] = (self.0[0] >> n) | (self.0[1] << (64 - n));
        self.0[1] = (self.0[1] >> n) | (self.0[2] << (64 - n));
        self.0[2] = (self.0[2] >> n) | (self.0[3] << (64 - n));
        self.0[3] >>= n;
        ret
    }

    /// Sets `self = a + b`.
    pub fn set_add(&mut self, a: &Self, b: &Self) {
        *self = a.add(b);
    }

    /// Sets `self = a - b`.
    pub fn set_sub(&mut self, a: &Self, b: &Self) {
        *self = a.sub(b);
    }

    /// Sets `self = a * b`.
    pub fn set_mul(&mut self, a: &Self, b: &Self) {
        *self = a.mul(b);
    }

    /// Sets `self = a^2`.
    pub fn set_square(&mut self, a: &Self) {
        *self = a.square();
    }

    /// Squares `self` in place.
    pub fn square_assign(&mut self) {
        *self = self.square();
    }

    /// Sets `self = -a`.
    pub fn set_negate(&mut self, a: &Self) {
        *self = a.negate();
    }

    /// Sets `self = a^-1` in invariant time.
    ///
    /// # Panics
    ///
    /// Panics if `a` is zero. Use [`invert`](Self::invert) to handle zero.
    pub fn set_invert(&mut self, a: &Self) {
        assert!(!bool::from(a.is_zero()), "inverse of zero");
        *self = a.pow_public(&MODULUS_MINUS_TWO);
    }

    /// Sets `self = a^-1` in variable time.
    ///
    /// # Panics
    ///
    /// Panics if `a` is zero. Use [`invert_vartime`](Self::invert_vartime) to
    /// handle zero.
    pub fn set_invert_vartime(&mut self, a: &Self) {
        assert!(!bool::from(a.is_zero()), "inverse of zero");
        *self = Self(inversion::invert_vartime(&a.0, &MODULUS));
    }
}

impl_binop!(Scalar, Scalar, Scalar, Add, add, add);
impl_binop!(Scalar, Scalar, Scalar, Sub, sub, sub);
impl_binop!(Scalar, Scalar, Scalar, Mul, mul, mul);
impl_assign_op!(Scalar, Scalar, AddAssign, add_assign, add);
impl_assign_op!(Scalar, Scalar, SubAssign, sub_assign, sub);
impl_assign_op!(Scalar, Scalar, MulAssign, mul_assign, mul);
impl_neg!(Scalar);
impl_sum_product!(Scalar);

impl Field for Scalar {
    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;

    fn try_from_rng<R: TryRngCore + ?Sized>(rng: &mut R) -> core::result::Result<Self, R::Error> {
        let mut bytes = FieldBytes::default();

        loop {
            rng.try_fill_bytes(&mut bytes)?;
            if let Some(s) = Self::from_bytes(&bytes).into() {
                return Ok(s);
            }
        }
    }

    fn is_zero(&self) -> Choice {
        self.is_zero()
    }

    fn square(&self) -> Self {
        self.square()
    }

    fn double(&self) -> Self {
        self.add(self)
    }

    fn invert(&self) -> CtOption<Self> {
        self.invert()
    }

    fn sqrt(&self) -> CtOption<Self> {
        self.sqrt()
    }

    fn sqrt_ratio(num: &Self, div: &Self) -> (Choice, Self) {
        ff::helpers::sqrt_ratio_generic(num, div)
    }
}

impl From<u32> for Scalar {
    fn from(k: u32) -> Self {
        Self([k.into(), 0, 0, 0])
    }
}

impl From<u64> for Scalar {
    fn from(k: u64) -> Self {
        Self([k, 0, 0, 0])
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl DefaultIsZeroes for Scalar {}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar(0x")?;
        for byte in self.to_bytes() {
            write!(f, "{byte:02X}")?;
        }
        write!(f, ")")
    }
}

#[cfg(feature = "serde")]
impl serdect::serde::Serialize for Scalar {
    fn serialize<S>(&self, s: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        serdect::array::serialize_hex_upper_or_bin(&self.to_bytes(), s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for Scalar {
    fn deserialize<D>(d: D) -> core::result::Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let mut bytes = FieldBytes::default();
        serdect::array::deserialize_hex_or_bin(&mut bytes, d)?;
        Option::from(Self::from_bytes(&bytes)).ok_or_else(|| {
            serdect::serde::de::Error::custom("scalar was not canonically encoded")
        })
    }
}
