//! Projective points

#![allow(clippy::op_ref)]

use super::{AffinePoint, CURVE_EQUATION_B_SINGLE, FieldElement, FieldElement5x52};
use core::ops::{Add, AddAssign, Neg};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A point on the secp256k1 curve in homogeneous projective coordinates.
///
/// Coordinates are kept lazily reduced between operations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProjectivePoint {
    x: FieldElement5x52,
    y: FieldElement5x52,
    z: FieldElement5x52,
}

impl ProjectivePoint {
    /// Additive identity of the group: the point at infinity.
    pub(crate) const IDENTITY: Self = Self {
        x: FieldElement5x52::ZERO,
        y: FieldElement5x52::ONE,
        z: FieldElement5x52::ZERO,
    };

    /// Base point of secp256k1.
    pub(crate) const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x.to_lazy(),
        y: AffinePoint::GENERATOR.y.to_lazy(),
        z: FieldElement5x52::ONE,
    };

    pub(crate) fn is_identity(&self) -> Choice {
        self.z.normalizes_to_zero()
    }

    /// Returns the affine representation of this point.
    pub(crate) fn to_affine(&self) -> AffinePoint {
        self.z
            .invert()
            .map(|zinv| {
                AffinePoint::new(
                    FieldElement::from_lazy(&(self.x * &zinv)),
                    FieldElement::from_lazy(&(self.y * &zinv)),
                )
            })
            .unwrap_or(AffinePoint::IDENTITY)
    }

    /// Fully reduces each coordinate without changing the projective class.
    pub(crate) fn normalize(&self) -> Self {
        Self {
            x: self.x.normalize(),
            y: self.y.normalize(),
            z: self.z.normalize(),
        }
    }

    /// Returns `-self`.
    pub(crate) fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            z: self.z,
        }
    }

    /// Returns `self + other`.
    pub(crate) fn add(&self, other: &Self) -> Self {
        // Complete addition formula from Renes-Costello-Batina 2015
        // (https://eprint.iacr.org/2015/1060 Algorithm 7).

        let xx = self.x * &other.x;
        let yy = self.y * &other.y;
        let zz = self.z * &other.z;

        let n_xx_yy = (xx + &yy).negate(2);
        let n_yy_zz = (yy + &zz).negate(2);
        let n_xx_zz = (xx + &zz).negate(2);
        let xy_pairs = ((self.x + &self.y) * &(other.x + &other.y)) + &n_xx_yy;
        let yz_pairs = ((self.y + &self.z) * &(other.y + &other.z)) + &n_yy_zz;
        let xz_pairs = ((self.x + &self.z) * &(other.x + &other.z)) + &n_xx_zz;

        let bzz = zz.mul_single(CURVE_EQUATION_B_SINGLE);
        let bzz3 = (bzz.double() + &bzz).normalize_weak();

        let yy_m_bzz3 = yy + &bzz3.negate(1);
        let yy_p_bzz3 = yy + &bzz3;

        let byz = yz_pairs
            .mul_single(CURVE_EQUATION_B_SINGLE)
            .normalize_weak();
        let byz3 = (byz.double() + &byz).normalize_weak();

        let xx3 = xx.double() + &xx;
        let bxx9 = (xx3.double() + &xx3)
            .normalize_weak()
            .mul_single(CURVE_EQUATION_B_SINGLE)
            .normalize_weak();

        Self {
            x: ((xy_pairs * &yy_m_bzz3) + &(byz3 * &xz_pairs).negate(1)).normalize_weak(),
            y: ((yy_p_bzz3 * &yy_m_bzz3) + &(bxx9 * &xz_pairs)).normalize_weak(),
            z: ((yz_pairs * &yy_p_bzz3) + &(xx3 * &xy_pairs)).normalize_weak(),
        }
    }

    /// Doubles this point.
    #[inline]
    pub(crate) fn double(&self) -> Self {
        // Complete doubling formula from Renes-Costello-Batina 2015
        // (https://eprint.iacr.org/2015/1060 Algorithm 9).

        let yy = self.y.square();
        let zz = self.z.square();
        let xy2 = (self.x * &self.y).double();

        let bzz = zz.mul_single(CURVE_EQUATION_B_SINGLE);
        let bzz3 = (bzz.double() + &bzz).normalize_weak();
        let bzz9 = (bzz3.double() + &bzz3).normalize_weak();

        let yy_m_bzz9 = yy + &bzz9.negate(1);
        let yy_p_bzz3 = yy + &bzz3;

        let yy_zz = yy * &zz;
        let yy_zz8 = yy_zz.double().double().double();
        let t = (yy_zz8.double() + &yy_zz8)
            .normalize_weak()
            .mul_single(CURVE_EQUATION_B_SINGLE);

        Self {
            x: xy2 * &yy_m_bzz9,
            y: ((yy_m_bzz9 * &yy_p_bzz3) + &t).normalize_weak(),
            z: ((yy * &self.y) * &self.z)
                .double()
                .double()
                .double()
                .normalize_weak(),
        }
    }

    /// Returns `self - other`.
    pub(crate) fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(p: &AffinePoint) -> Self {
        let finite = Self {
            x: p.x.to_lazy(),
            y: p.y.to_lazy(),
            z: FieldElement5x52::ONE,
        };
        Self::conditional_select(&finite, &Self::IDENTITY, p.is_identity())
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement5x52::conditional_select(&a.x, &b.x, choice),
            y: FieldElement5x52::conditional_select(&a.y, &b.y, choice),
            z: FieldElement5x52::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // Finite points (x1 z1 : y1 z1 : z1) and (x2 z2 : y2 z2 : z2) agree iff
        // the cross products X1 Z2 = X2 Z1 and Y1 Z2 = Y2 Z1 do. The identity
        // (0 : y : 0) gives (0, 0) on its own side and (0, y z2) against a
        // finite point, so it only matches itself.
        let lhs_x = self.x * &other.z;
        let rhs_x = other.x * &self.z;
        let x_eq = rhs_x.negate(1).add(&lhs_x).normalizes_to_zero();

        let lhs_y = self.y * &other.z;
        let rhs_y = other.y * &self.z;
        let y_eq = rhs_y.negate(1).add(&lhs_y).normalizes_to_zero();
        x_eq & y_eq
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::{AffinePoint, ProjectivePoint};
    use subtle::ConstantTimeEq;

    #[test]
    fn affine_to_projective() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert!(bool::from(
            ProjectivePoint::from(&basepoint_affine).ct_eq(&basepoint_projective)
        ));
        assert_eq!(basepoint_projective.to_affine().x, basepoint_affine.x);
        assert_eq!(basepoint_projective.to_affine().y, basepoint_affine.y);
        assert!(bool::from(
            ProjectivePoint::IDENTITY.to_affine().is_identity()
        ));
    }

    #[test]
    fn projective_identity_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let generator = ProjectivePoint::GENERATOR;

        assert!(bool::from(identity.add(&generator).ct_eq(&generator)));
        assert!(bool::from(generator.add(&identity).ct_eq(&generator)));
        assert!(bool::from(identity.add(&identity).is_identity()));
        assert!(bool::from(identity.double().is_identity()));
    }

    #[test]
    fn projective_add_vs_double() {
        let generator = ProjectivePoint::GENERATOR;
        assert!(bool::from(
            generator.add(&generator).ct_eq(&generator.double())
        ));
    }

    #[test]
    fn projective_add_and_sub() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert!(bool::from(
            basepoint_projective
                .add(&basepoint_projective)
                .sub(&basepoint_projective)
                .ct_eq(&ProjectivePoint::from(&basepoint_affine))
        ));
        assert!(bool::from(
            basepoint_projective
                .sub(&basepoint_projective)
                .is_identity()
        ));
    }

    #[test]
    fn identity_is_not_equal_to_finite_point() {
        let generator = ProjectivePoint::GENERATOR;
        assert!(!bool::from(ProjectivePoint::IDENTITY.ct_eq(&generator)));
        assert!(!bool::from(generator.ct_eq(&ProjectivePoint::IDENTITY)));
        assert!(bool::from(generator.ct_eq(&generator.neg().neg())));
        assert!(!bool::from(generator.ct_eq(&generator.neg())));
    }

    #[test]
    fn normalize_keeps_class() {
        let p = ProjectivePoint::GENERATOR.double().add(&ProjectivePoint::GENERATOR);
        assert!(bool::from(p.normalize().ct_eq(&p)));
    }
}
