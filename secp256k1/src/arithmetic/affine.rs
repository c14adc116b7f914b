//! Affine points

use super::{CURVE_EQUATION_B, FieldElement};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// A point on the curve in affine coordinates, or the point at infinity.
///
/// Coordinates are always normalized.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AffinePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    infinity: u8,
}

impl AffinePoint {
    /// Additive identity of the group: the point at infinity.
    pub(crate) const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// Base point of secp256k1.
    #[rustfmt::skip]
    pub(crate) const GENERATOR: Self = Self {
        x: FieldElement::from_bytes_canonical(&[
            0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac,
            0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
            0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9,
            0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
        ]),
        y: FieldElement::from_bytes_canonical(&[
            0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65,
            0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
            0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19,
            0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
        ]),
        infinity: 0,
    };

    /// Finite point from coordinates, without checking the curve equation.
    pub(crate) const fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, infinity: 0 }
    }

    pub(crate) fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// `y^2 = x^3 + 7` for finite points; the identity is not on the curve.
    pub(crate) fn is_on_curve(&self) -> Choice {
        let rhs = self.x.square() * self.x + CURVE_EQUATION_B;
        self.y.square().ct_eq(&rhs) & !self.is_identity()
    }

    /// Recovers the point with abscissa `x` whose ordinate has the given parity.
    ///
    /// `None` when `x^3 + 7` is not a square.
    pub(crate) fn decompress(x: &FieldElement, y_is_odd: Choice) -> CtOption<Self> {
        let alpha = x.square() * x + CURVE_EQUATION_B;
        alpha.sqrt().map(|beta| {
            let y = FieldElement::conditional_select(
                &beta.negate(),
                &beta,
                beta.is_odd().ct_eq(&y_is_odd),
            );
            Self::new(*x, y)
        })
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}
