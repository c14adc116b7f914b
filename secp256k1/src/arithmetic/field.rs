//! Field arithmetic modulo p = 2^256 - 2^32 - 2^9 - 2^8 - 2^7 - 2^6 - 2^4 - 1

mod field_5x52;

pub(crate) use field_5x52::FieldElement5x52;

use super::{inversion, util};
use crate::{Error, FieldBytes, Result};
use core::fmt;
use ff::Field;
use rand_core::{TryCryptoRng, TryRngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::DefaultIsZeroes;

/// Limbs of `p`, little-endian.
pub(crate) const MODULUS: [u64; 4] = [
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// An element of the base field, used for curve coordinates.
///
/// Always held in normalized form: every value has exactly one
/// representation, so equality and encoding are direct.
#[derive(Clone, Copy, Default)]
pub struct FieldElement(FieldElement5x52);

impl FieldElement {
    /// Zero element.
    pub const ZERO: Self = Self(FieldElement5x52::ZERO);

    /// Multiplicative identity.
    pub const ONE: Self = Self(FieldElement5x52::ONE);

    /// Wraps a lazily reduced value, normalizing it.
    pub(crate) fn from_lazy(value: &FieldElement5x52) -> Self {
        Self(value.normalize())
    }

    /// Builds a constant from bytes known to be below `p`.
    pub(crate) const fn from_bytes_canonical(bytes: &FieldBytes) -> Self {
        Self(FieldElement5x52::from_bytes_unchecked(bytes))
    }

    pub(crate) const fn to_lazy(&self) -> FieldElement5x52 {
        self.0
    }

    /// Parses a big-endian integer, rejecting values not below `p`.
    pub fn from_bytes(bytes: &FieldBytes) -> CtOption<Self> {
        let res = FieldElement5x52::from_bytes_unchecked(bytes);
        let overflow = res.get_overflow();
        CtOption::new(Self(res), !overflow)
    }

    /// Parses a big-endian integer and reduces it modulo `p`.
    ///
    /// The flag is `true` when the input was `p` or larger.
    pub fn from_bytes_reduced(bytes: &FieldBytes) -> (Self, bool) {
        let res = FieldElement5x52::from_bytes_unchecked(bytes);
        let overflow = res.get_overflow();
        (Self(res.normalize()), overflow.into())
    }

    /// Sets `self` from the first 32 bytes of `buf`, reducing modulo `p`.
    ///
    /// Returns whether the input overflowed. Fails without touching `self`
    /// when `buf` is shorter than 32 bytes.
    pub fn set_bytes(&mut self, buf: &[u8]) -> Result<bool> {
        let (value, overflow) = Self::from_bytes_reduced(util::leading_field_bytes(buf)?);
        *self = value;
        Ok(overflow)
    }

    /// Big-endian encoding.
    pub fn to_bytes(&self) -> FieldBytes {
        self.0.to_bytes()
    }

    /// Writes the big-endian encoding into the first 32 bytes of `dst`.
    pub fn put_bytes(&self, dst: &mut [u8]) -> Result<()> {
        *util::leading_field_bytes_mut(dst)? = self.to_bytes();
        Ok(())
    }

    /// Samples a uniformly distributed element, panicking if `rng` fails.
    pub fn random<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::try_from_rng(rng).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Samples a uniformly distributed element.
    pub fn try_from_rng<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut bytes = FieldBytes::default();
        rng.try_fill_bytes(&mut bytes)
            .map_err(|_| Error::RandomSource)?;
        Ok(Self::from_bytes_reduced(&bytes).0)
    }

    /// Determine if this `FieldElement` is zero.
    pub fn is_zero(&self) -> Choice {
        self.0.is_zero()
    }

    /// Determine if this `FieldElement` is one.
    pub fn is_one(&self) -> Choice {
        self.0.ct_eq(&FieldElement5x52::ONE)
    }

    /// Determine if this `FieldElement` is odd.
    pub fn is_odd(&self) -> Choice {
        self.0.is_odd()
    }

    /// Determine if this `FieldElement` is even.
    pub fn is_even(&self) -> Choice {
        !self.0.is_odd()
    }

    /// Returns `self + rhs mod p`.
    pub fn add(&self, rhs: &Self) -> Self {
        Self::from_lazy(&self.0.add(&rhs.0))
    }

    /// Returns `self - rhs mod p`.
    pub fn sub(&self, rhs: &Self) -> Self {
        Self::from_lazy(&self.0.add(&rhs.0.negate(1)))
    }

    /// Returns `self * rhs mod p`.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::from_lazy(&self.0.mul(&rhs.0))
    }

    /// Returns `self * rhs mod p` for a small integer `rhs`.
    pub fn mul_single(&self, rhs: u32) -> Self {
        Self::from_lazy(&self.0.mul(&FieldElement5x52::from_u64(rhs.into())))
    }

    /// Returns `self^2 mod p`.
    pub fn square(&self) -> Self {
        Self::from_lazy(&self.0.square())
    }

    /// Returns `2 * self mod p`.
    pub fn double(&self) -> Self {
        Self::from_lazy(&self.0.double())
    }

    /// Returns `-self mod p`.
    pub fn negate(&self) -> Self {
        Self::from_lazy(&self.0.negate(1))
    }

    /// Returns the multiplicative inverse, or `None` for zero.
    ///
    /// Runs in variable time: do not use on secret values.
    pub fn invert(&self) -> CtOption<Self> {
        let limbs = util::u64x4_from_be_bytes(&self.to_bytes());
        let inv = inversion::invert_vartime(&limbs, &MODULUS);
        let res = Self(FieldElement5x52::from_bytes_unchecked(&util::u64x4_to_be_bytes(&inv)));
        CtOption::new(res, !self.is_zero())
    }

    /// Returns a square root, or `None` if `self` is not a quadratic residue.
    ///
    /// Which of the two roots is returned is unspecified.
    pub fn sqrt(&self) -> CtOption<Self> {
        self.0.sqrt().map(|root| Self::from_lazy(&root))
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

    /// Sets `self = a * b`, writing the limbs of the product straight into `self`.
    ///
    /// `b` must not alias `a`. The product never depends on that, so this
    /// matches [`set_mul`](Self::set_mul) on every input.
    pub fn set_mul_no_alias(&mut self, a: &Self, b: &Self) {
        self.0 = a.0.mul(&b.0);
        self.0 = self.0.normalize();
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

    /// Sets `self = a^-1` in variable time.
    ///
    /// # Panics
    ///
    /// Panics if `a` is zero. Use [`invert`](Self::invert) to handle zero.
    pub fn set_invert(&mut self, a: &Self) {
        assert!(!bool::from(a.is_zero()), "inverse of zero");
        *self = a.invert().unwrap_or(Self::ZERO);
    }
}

impl_binop!(FieldElement, FieldElement, FieldElement, Add, add, add);
impl_binop!(FieldElement, FieldElement, FieldElement, Sub, sub, sub);
impl_binop!(FieldElement, FieldElement, FieldElement, Mul, mul, mul);
impl_assign_op!(FieldElement, FieldElement, AddAssign, add_assign, add);
impl_assign_op!(FieldElement, FieldElement, SubAssign, sub_assign, sub);
impl_assign_op!(FieldElement, FieldElement, MulAssign, mul_assign, mul);
impl_neg!(FieldElement);
impl_sum_product!(FieldElement);

impl Field for FieldElement {
    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;

    fn try_from_rng<R: TryRngCore + ?Sized>(rng: &mut R) -> core::result::Result<Self, R::Error> {
        let mut bytes = FieldBytes::default();

        loop {
            rng.try_fill_bytes(&mut bytes)?;
            if let Some(fe) = Self::from_bytes(&bytes).into() {
                return Ok(fe);
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
        self.double()
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

impl From<u32> for FieldElement {
    fn from(n: u32) -> FieldElement {
        Self(FieldElement5x52::from_u64(n.into()))
    }
}

impl From<u64> for FieldElement {
    fn from(n: u64) -> FieldElement {
        Self(FieldElement5x52::from_u64(n))
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(FieldElement5x52::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl DefaultIsZeroes for FieldElement {}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x")?;
        for byte in self.to_bytes() {
            write!(f, "{byte:02X}")?;
        }
        write!(f, ")")
    }
}

#[cfg(feature = "serde")]
impl serdect::serde::Serialize for FieldElement {
    fn serialize<S>(&self, s: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        serdect::array::serialize_hex_upper_or_bin(&self.to_bytes(), s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for FieldElement {
    fn deserialize<D>(d: D) -> core::result::Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let mut bytes = FieldBytes::default();
        serdect::array::deserialize_hex_or_bin(&mut bytes, d)?;
        Option::from(Self::from_bytes(&bytes)).ok_or_else(|| {
            serdect::serde::de::Error::custom("field element was not canonically encoded")
        })
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::{BigUint, ToBigUint};
    use proptest::prelude::*;

    use super::FieldElement;
    use crate::{
        Error, FieldBytes,
        arithmetic::dev::{FailingRng, biguint_to_bytes, bytes_to_biguint},
    };
    use hex_literal::hex;

    impl From<&BigUint> for FieldElement {
        fn from(x: &BigUint) -> Self {
            let bytes = biguint_to_bytes(x);
            Self::from_bytes(&bytes).unwrap()
        }
    }

    impl ToBigUint for FieldElement {
        fn to_biguint(&self) -> Option<BigUint> {
            Some(bytes_to_biguint(&self.to_bytes()))
        }
    }

    fn modulus_as_biguint() -> BigUint {
        FieldElement::ONE.negate().to_biguint().unwrap() + 1u32
    }

    /// Successive powers of two, starting from one.
    const DBL_TEST_VECTORS: &[FieldBytes] = &[
        hex!("0000000000000000000000000000000000000000000000000000000000000001"),
        hex!("0000000000000000000000000000000000000000000000000000000000000002"),
        hex!("0000000000000000000000000000000000000000000000000000000000000004"),
        hex!("0000000000000000000000000000000000000000000000000000000000000008"),
        hex!("0000000000000000000000000000000000000000000000000000000000000010"),
    ];

    #[test]
    fn zero_is_additive_identity() {
        let zero = FieldElement::ZERO;
        let one = FieldElement::ONE;
        assert_eq!(zero + &zero, zero);
        assert_eq!(one + &zero, one);
    }

    #[test]
    fn one_is_multiplicative_identity() {
        let one = FieldElement::ONE;
        assert_eq!(one * &one, one);
        assert!(bool::from(one.is_one()));
        assert!(bool::from(one.is_odd()));
        assert!(bool::from(FieldElement::ZERO.is_even()));
    }

    #[test]
    fn from_bytes() {
        assert_eq!(
            FieldElement::from_bytes(&FieldBytes::default()).unwrap(),
            FieldElement::ZERO
        );
        assert_eq!(
            FieldElement::from_bytes(&DBL_TEST_VECTORS[0]).unwrap(),
            FieldElement::ONE
        );
        assert!(bool::from(FieldElement::from_bytes(&[0xff; 32]).is_none()));
    }

    #[test]
    fn from_bytes_reduced_reports_overflow() {
        // p + 1
        let bytes = hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC30");
        let (fe, overflow) = FieldElement::from_bytes_reduced(&bytes);
        assert!(overflow);
        assert_eq!(fe, FieldElement::ONE);

        let (fe, overflow) = FieldElement::from_bytes_reduced(&DBL_TEST_VECTORS[1]);
        assert!(!overflow);
        assert_eq!(fe, FieldElement::from(2u32));
    }

    #[test]
    fn set_bytes_reads_prefix() {
        let mut buf = [0u8; 40];
        buf[31] = 7;
        buf[32..].fill(0xAA);

        let mut fe = FieldElement::ONE;
        assert_eq!(fe.set_bytes(&buf), Ok(false));
        assert_eq!(fe, FieldElement::from(7u32));

        assert_eq!(fe.set_bytes(&buf[..31]), Err(Error::InvalidLength));
        assert_eq!(fe, FieldElement::from(7u32));
    }

    #[test]
    fn put_bytes() {
        let fe = FieldElement::from(0x0102u32);
        let mut buf = [0xEEu8; 33];
        fe.put_bytes(&mut buf).unwrap();
        assert_eq!(buf[30..33], [0x01, 0x02, 0xEE]);
        assert_eq!(fe.put_bytes(&mut buf[..31]), Err(Error::InvalidLength));
    }

    #[test]
    fn to_bytes() {
        assert_eq!(FieldElement::ZERO.to_bytes(), [0; 32]);
        assert_eq!(FieldElement::ONE.to_bytes(), DBL_TEST_VECTORS[0]);
    }

    #[test]
    fn repeated_add() {
        let mut r = FieldElement::ONE;
        for vector in DBL_TEST_VECTORS {
            assert_eq!(r.to_bytes(), *vector);
            r = r + &r;
        }
    }

    #[test]
    fn repeated_double() {
        let mut r = FieldElement::ONE;
        for vector in DBL_TEST_VECTORS {
            assert_eq!(r.to_bytes(), *vector);
            r = r.double();
        }
    }

    #[test]
    fn repeated_mul() {
        let mut r = FieldElement::ONE;
        let two = r + &r;
        for vector in DBL_TEST_VECTORS {
            assert_eq!(r.to_bytes(), *vector);
            r *= two;
        }
    }

    #[test]
    fn negation() {
        let two = FieldElement::ONE.double();
        let neg_two = -two;
        assert_eq!(two + &neg_two, FieldElement::ZERO);
        assert_eq!(-neg_two, two);
        assert_eq!(-FieldElement::ZERO, FieldElement::ZERO);
    }

    #[test]
    fn subtraction_wraps() {
        let one = FieldElement::ONE;
        let two = FieldElement::from(2u64);
        assert_eq!(one - &two, -one);
        assert_eq!(two - &one, one);
    }

    #[test]
    fn invert() {
        assert!(bool::from(FieldElement::ZERO.invert().is_none()));

        let one = FieldElement::ONE;
        assert_eq!(one.invert().unwrap(), one);

        let two = one + &one;
        let inv_two = two.invert().unwrap();
        assert_eq!(two * &inv_two, one);
    }

    #[test]
    fn sqrt() {
        let two = FieldElement::from(2u32);
        let four = two.square();
        let root = four.sqrt().unwrap();
        assert!(root == two || root == -two);

        // -1 is a non-residue since p = 3 mod 4.
        assert!(bool::from((-FieldElement::ONE).sqrt().is_none()));
    }

    #[test]
    fn mul_single() {
        let x = FieldElement::from(3u32);
        assert_eq!(x.mul_single(u32::MAX), x * FieldElement::from(u32::MAX));
    }

    #[test]
    fn receiver_forms_tolerate_aliased_operands() {
        let x = FieldElement::from(12345u64);

        let mut r = FieldElement::ZERO;
        r.set_add(&x, &x);
        assert_eq!(r, x.double());
        r.set_mul(&x, &x);
        assert_eq!(r, x.square());
        r.set_sub(&x, &x);
        assert_eq!(r, FieldElement::ZERO);

        let mut acc = x;
        acc += acc;
        assert_eq!(acc, x.double());
        acc *= acc;
        assert_eq!(acc, x.double().square());
        acc.square_assign();
        assert_eq!(acc, x.double().square().square());
    }

    #[test]
    fn set_invert_of_nonzero() {
        let x = FieldElement::from(5u32);
        let mut r = FieldElement::ZERO;
        r.set_invert(&x);
        assert_eq!(r * &x, FieldElement::ONE);
    }

    #[test]
    #[should_panic(expected = "inverse of zero")]
    fn set_invert_of_zero_panics() {
        let mut r = FieldElement::ONE;
        r.set_invert(&FieldElement::ZERO);
    }

    #[test]
    fn try_from_rng_reports_failure() {
        assert_eq!(
            FieldElement::try_from_rng(&mut FailingRng::empty()),
            Err(Error::RandomSource)
        );
        let fe = FieldElement::try_from_rng(&mut FailingRng { remaining: 32 }).unwrap();
        assert_eq!(fe.to_bytes(), [0x5A; 32]);
    }

    #[test]
    #[should_panic]
    fn random_panics_on_failure() {
        FieldElement::random(&mut FailingRng::empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        let fe = FieldElement::from(0xABCDu32);
        let json = serde_json::to_string(&fe).unwrap();
        assert_eq!(
            json,
            "\"000000000000000000000000000000000000000000000000000000000000ABCD\""
        );
        assert_eq!(serde_json::from_str::<FieldElement>(&json).unwrap(), fe);

        let overflow = "\"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF\"";
        assert!(serde_json::from_str::<FieldElement>(overflow).is_err());
    }

    prop_compose! {
        fn field_element()(bytes in any::<[u8; 32]>()) -> FieldElement {
            FieldElement::from_bytes_reduced(&bytes).0
        }
    }

    proptest! {
        #[test]
        fn fuzzy_add(
            a in field_element(),
            b in field_element()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&a_bi + &b_bi) % modulus_as_biguint();
            prop_assert_eq!(a + &b, FieldElement::from(&res_bi));
        }

        #[test]
        fn fuzzy_sub(
            a in field_element(),
            b in field_element()
        ) {
            let m = modulus_as_biguint();
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&m + &a_bi - &b_bi) % &m;
            prop_assert_eq!(a - &b, FieldElement::from(&res_bi));
        }

        #[test]
        fn fuzzy_mul(
            a in field_element(),
            b in field_element()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&a_bi * &b_bi) % modulus_as_biguint();
            let res_ref = FieldElement::from(&res_bi);
            prop_assert_eq!(a * &b, res_ref);

            let mut no_alias = FieldElement::ZERO;
            no_alias.set_mul_no_alias(&a, &b);
            prop_assert_eq!(no_alias, res_ref);
        }

        #[test]
        fn fuzzy_square(
            a in field_element()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let res_bi = (&a_bi * &a_bi) % modulus_as_biguint();
            prop_assert_eq!(a.square(), FieldElement::from(&res_bi));
        }

        #[test]
        fn fuzzy_negate(
            a in field_element()
        ) {
            let m = modulus_as_biguint();
            let a_bi = a.to_biguint().unwrap();
            let res_bi = (&m - &a_bi) % &m;
            prop_assert_eq!(-a, FieldElement::from(&res_bi));
        }

        #[test]
        fn fuzzy_sqrt(
            a in field_element()
        ) {
            let root = a.square().sqrt().unwrap();
            prop_assert!(root == a || root == -a);
        }

        #[test]
        fn fuzzy_invert(
            a in field_element()
        ) {
            let a = if bool::from(a.is_zero()) { FieldElement::ONE } else { a };
            let inv = a.invert().unwrap();
            prop_assert_eq!(a * &inv, FieldElement::ONE);

            // Agrees with the invariant-time exponentiation chain.
            let chain = FieldElement::from_lazy(&a.to_lazy().invert().unwrap());
            prop_assert_eq!(inv, chain);
        }

        #[test]
        fn fuzzy_bytes_round_trip(
            a in field_element()
        ) {
            let mut b = FieldElement::ZERO;
            prop_assert_eq!(b.set_bytes(&a.to_bytes()), Ok(false));
            prop_assert_eq!(a, b);
        }
    }
}
