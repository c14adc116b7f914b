//! Field, scalar and group arithmetic for secp256k1.

#[macro_use]
mod macros;

mod affine;
#[cfg(test)]
pub(crate) mod dev;
pub(crate) mod field;
mod inversion;
mod mul;
pub(crate) mod point;
mod projective;
pub(crate) mod scalar;
pub(crate) mod util;

pub(crate) use self::{affine::AffinePoint, field::FieldElement5x52, projective::ProjectivePoint};
pub use self::{
    field::FieldElement,
    point::{POINT_BYTES, Point, PointBytes},
    scalar::Scalar,
};

/// Coefficient `b` of the curve equation `y^2 = x^3 + b`.
pub(crate) const CURVE_EQUATION_B_SINGLE: u32 = 7u32;

#[rustfmt::skip]
pub(crate) const CURVE_EQUATION_B: FieldElement = FieldElement::from_bytes_canonical(&[
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, CURVE_EQUATION_B_SINGLE as u8,
]);
