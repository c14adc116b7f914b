//! Public curve point type.

use super::{AffinePoint, FieldElement, ProjectivePoint, Scalar, mul::mul_windowed};
use crate::{Error, FieldBytes, Result};
use core::fmt;
use rand_core::TryCryptoRng;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::DefaultIsZeroes;

/// Size of a compressed point encoding.
pub const POINT_BYTES: usize = 33;

/// Leading byte of the encoding of the point at infinity.
const IDENTITY_TAG: u8 = 0xFF;

/// Compressed point encoding: one tag byte followed by the big-endian x.
pub type PointBytes = [u8; POINT_BYTES];

/// An element of the secp256k1 group: either the point at infinity or a
/// finite point `(x, y)` with `y^2 = x^3 + 7`.
///
/// Points are carried in projective coordinates. Equality, coordinate access
/// and encoding all go through the affine form, so two points compare equal
/// whenever they are the same group element.
#[derive(Clone, Copy)]
pub struct Point(ProjectivePoint);

impl Point {
    /// The point at infinity.
    pub const IDENTITY: Self = Self(ProjectivePoint::IDENTITY);

    /// The standard base point.
    pub const GENERATOR: Self = Self(ProjectivePoint::GENERATOR);

    /// Returns the point at infinity.
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Builds a finite point, checking the curve equation.
    pub fn from_xy(x: &FieldElement, y: &FieldElement) -> Result<Self> {
        if bool::from(AffinePoint::new(*x, *y).is_on_curve()) {
            Ok(Self::from_xy_unchecked(x, y))
        } else {
            Err(Error::NotOnCurve)
        }
    }

    /// Builds a finite point without checking the curve equation.
    pub(crate) fn from_xy_unchecked(x: &FieldElement, y: &FieldElement) -> Self {
        Self(ProjectivePoint::from(&AffinePoint::new(*x, *y)))
    }

    fn from_affine(affine: &AffinePoint) -> Self {
        Self(ProjectivePoint::from(affine))
    }

    /// Samples a random finite point, panicking if `rng` fails.
    pub fn random<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::try_from_rng(rng).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Samples a random finite point.
    ///
    /// One byte of `rng` output fixes the parity of y. Random x coordinates
    /// are then drawn until one lies on the curve, which happens for about
    /// half of them.
    pub fn try_from_rng<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut parity = [0u8; 1];
        rng.try_fill_bytes(&mut parity)
            .map_err(|_| Error::RandomSource)?;
        let y_is_odd = Choice::from(parity[0] & 1);

        loop {
            let x = FieldElement::try_from_rng(rng)?;
            if let Some(affine) = Option::<AffinePoint>::from(AffinePoint::decompress(&x, y_is_odd))
            {
                return Ok(Self::from_affine(&affine));
            }
        }
    }

    /// Returns the affine coordinates `(x, y)`.
    pub fn xy(&self) -> Result<(FieldElement, FieldElement)> {
        let affine = self.0.to_affine();
        if bool::from(affine.is_identity()) {
            Err(Error::PointAtInfinity)
        } else {
            Ok((affine.x, affine.y))
        }
    }

    /// Is this the point at infinity?
    pub fn is_identity(&self) -> Choice {
        self.0.is_identity()
    }

    /// Does this point satisfy the curve equation? `false` for the identity.
    pub fn is_on_curve(&self) -> Choice {
        self.0.to_affine().is_on_curve()
    }

    /// Is y even? `false` for the identity.
    pub fn has_even_y(&self) -> Choice {
        let affine = self.0.to_affine();
        !affine.y.is_odd() & !affine.is_identity()
    }

    /// Returns `-self`.
    pub fn negate(&self) -> Self {
        Self(self.0.neg())
    }

    /// Returns `self + rhs`.
    pub fn add(&self, rhs: &Self) -> Self {
        Self(self.0.add(&rhs.0))
    }

    /// Returns `self - rhs`.
    pub fn sub(&self, rhs: &Self) -> Self {
        Self(self.0.sub(&rhs.0))
    }

    /// Returns `2 * self`.
    pub fn double(&self) -> Self {
        Self(self.0.double())
    }

    /// Returns `k * self` for a finite point.
    ///
    /// Runs in time independent of `k`. Calling this on the identity is a
    /// caller error, caught in debug builds; use
    /// [`scale_total`](Self::scale_total) when `self` may be infinite.
    /// A zero `k` gives the identity.
    pub fn scale(&self, k: &Scalar) -> Self {
        debug_assert!(!bool::from(self.is_identity()), "scaling the identity");
        Self(mul_windowed(&self.0, k).normalize())
    }

    /// Returns `k * self`, with `k * ∞ = ∞`.
    pub fn scale_total(&self, k: &Scalar) -> Self {
        let product = Self(mul_windowed(&self.0, k).normalize());
        Self::conditional_select(&product, &Self::IDENTITY, self.is_identity())
    }

    /// Returns `k * G`.
    pub fn mul_by_generator(k: &Scalar) -> Self {
        Self::GENERATOR.scale(k)
    }

    /// Sets `self = -a`.
    pub fn set_negate(&mut self, a: &Self) {
        *self = a.negate();
    }

    /// Sets `self = a + b`.
    pub fn set_add(&mut self, a: &Self, b: &Self) {
        *self = a.add(b);
    }

    /// Sets `self = a - b`.
    pub fn set_sub(&mut self, a: &Self, b: &Self) {
        *self = a.sub(b);
    }

    /// Sets `self = 2 * a`.
    pub fn set_double(&mut self, a: &Self) {
        *self = a.double();
    }

    /// Doubles `self` in place.
    pub fn double_assign(&mut self) {
        *self = self.double();
    }

    /// Sets `self = k * p` for a finite `p`. See [`scale`](Self::scale).
    pub fn set_scale(&mut self, p: &Self, k: &Scalar) {
        *self = p.scale(k);
    }

    /// Sets `self = k * p`, accepting the identity for `p`.
    pub fn set_scale_total(&mut self, p: &Self, k: &Scalar) {
        *self = p.scale_total(k);
    }

    /// Sets `self = k * G`.
    pub fn set_scale_by_generator(&mut self, k: &Scalar) {
        *self = Self::mul_by_generator(k);
    }

    /// Compressed encoding.
    ///
    /// The identity encodes as `0xFF` followed by 32 zero bytes. A finite
    /// point encodes as the parity of y (`0x00` or `0x01`) followed by x.
    pub fn to_bytes(&self) -> PointBytes {
        let affine = self.0.to_affine();
        let mut out = [0u8; POINT_BYTES];
        out[0] = u8::conditional_select(
            &affine.y.is_odd().unwrap_u8(),
            &IDENTITY_TAG,
            affine.is_identity(),
        );
        let x = FieldElement::conditional_select(&affine.x, &FieldElement::ZERO, affine.is_identity());
        out[1..].copy_from_slice(&x.to_bytes());
        out
    }

    /// Decodes a compressed point.
    ///
    /// A leading `0xFF` is the identity and the remaining bytes are ignored.
    /// Otherwise only the low bit of the tag is read, and x is reduced
    /// modulo p before recovering y.
    pub fn from_bytes(bytes: &PointBytes) -> Result<Self> {
        if bytes[0] == IDENTITY_TAG {
            return Ok(Self::IDENTITY);
        }

        let mut x_bytes = FieldBytes::default();
        x_bytes.copy_from_slice(&bytes[1..]);
        let (x, _) = FieldElement::from_bytes_reduced(&x_bytes);
        Option::<AffinePoint>::from(AffinePoint::decompress(&x, Choice::from(bytes[0] & 1)))
            .map(|affine| Self::from_affine(&affine))
            .ok_or(Error::NotOnCurve)
    }

    /// Writes the compressed encoding into the first 33 bytes of `dst`.
    pub fn put_bytes(&self, dst: &mut [u8]) -> Result<()> {
        dst.get_mut(..POINT_BYTES)
            .ok_or(Error::InvalidLength)?
            .copy_from_slice(&self.to_bytes());
        Ok(())
    }

    /// Decodes the first 33 bytes of `buf` into `self`.
    ///
    /// `self` is left untouched on failure.
    pub fn set_bytes(&mut self, buf: &[u8]) -> Result<()> {
        let bytes: &PointBytes = buf
            .get(..POINT_BYTES)
            .and_then(|prefix| prefix.try_into().ok())
            .ok_or(Error::InvalidLength)?;
        *self = Self::from_bytes(bytes)?;
        Ok(())
    }
}

impl_binop!(Point, Point, Point, Add, add, add);
impl_binop!(Point, Point, Point, Sub, sub, sub);
impl_assign_op!(Point, Point, AddAssign, add_assign, add);
impl_assign_op!(Point, Point, SubAssign, sub_assign, sub);
impl_neg!(Point);
impl_binop!(Point, Scalar, Point, Mul, mul, scale_total);
impl_assign_op!(Point, Scalar, MulAssign, mul_assign, scale_total);

impl Default for Point {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ConditionallySelectable for Point {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(ProjectivePoint::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Point {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Point {}

impl DefaultIsZeroes for Point {}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.xy() {
            Ok((x, y)) => f.debug_struct("Point").field("x", &x).field("y", &y).finish(),
            Err(_) => f.write_str("Point(Identity)"),
        }
    }
}

#[cfg(feature = "serde")]
impl serdect::serde::Serialize for Point {
    fn serialize<S>(&self, s: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        serdect::array::serialize_hex_upper_or_bin(&self.to_bytes(), s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for Point {
    fn deserialize<D>(d: D) -> core::result::Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let mut bytes = [0u8; POINT_BYTES];
        serdect::array::deserialize_hex_or_bin(&mut bytes, d)?;
        Self::from_bytes(&bytes).map_err(serdect::serde::de::Error::custom)
    }
}
