//! Constant-time scalar multiplication with a signed 4-bit window.

use super::{ProjectivePoint, Scalar};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Odd and even multiples `[1P, 2P, .., 8P]` of a point.
struct LookupTable([ProjectivePoint; 8]);

impl From<&ProjectivePoint> for LookupTable {
    fn from(p: &ProjectivePoint) -> Self {
        let mut points = [*p; 8];
        for j in 1..8 {
            points[j] = points[j - 1] + p;
        }
        Self(points)
    }
}

impl LookupTable {
    /// Returns `digit * P` for `digit` in `-8..=8`, touching every entry.
    fn select(&self, digit: i8) -> ProjectivePoint {
        debug_assert!((-8..=8).contains(&digit));

        let sign = digit >> 7;
        let magnitude = ((digit + sign) ^ sign) as u8;

        let mut t = ProjectivePoint::IDENTITY;
        for (j, entry) in (1u8..).zip(self.0.iter()) {
            t.conditional_assign(entry, magnitude.ct_eq(&j));
        }

        t.conditional_assign(&-t, Choice::from((sign & 1) as u8));
        t
    }
}

/// Recodes `k` into 65 signed digits in `-8..=8`, least significant first,
/// with `k = sum(d[i] * 16^i)`.
///
/// The top digit absorbs the final carry, so every value below `2^256` fits.
fn to_radix_16(k: &Scalar) -> [i8; 65] {
    let bytes = k.to_bytes();
    let mut digits = [0i8; 65];
    for (i, byte) in bytes.iter().rev().enumerate() {
        digits[2 * i] = (byte & 0xf) as i8;
        digits[2 * i + 1] = (byte >> 4) as i8;
    }

    for i in 0..64 {
        let carry = (digits[i] + 8) >> 4;
        digits[i] -= carry << 4;
        digits[i + 1] += carry;
    }

    digits
}

/// Computes `k * p` with a fixed sequence of doublings, additions and table
/// scans, independent of the value of `k`.
pub(crate) fn mul_windowed(p: &ProjectivePoint, k: &Scalar) -> ProjectivePoint {
    let digits = to_radix_16(k);
    let table = LookupTable::from(p);

    let mut acc = table.select(digits[64]);
    for &digit in digits[..64].iter().rev() {
        acc = acc.double().double().double().double();
        acc += &table.select(digit);
    }
    acc
}
