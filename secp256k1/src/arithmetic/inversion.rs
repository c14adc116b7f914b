//! Variable-time modular inversion by the binary extended Euclidean algorithm.
//!
//! Shared by both prime fields. Operands are 256-bit little-endian limbs
//! already reduced below the odd modulus.

use super::util::{adc64, sbb64};

type Limbs = [u64; 4];

const ONE: Limbs = [1, 0, 0, 0];

fn is_zero(a: &Limbs) -> bool {
    a.iter().all(|&w| w == 0)
}

fn is_even(a: &Limbs) -> bool {
    a[0] & 1 == 0
}

/// `a >= b`, scanning from the most significant limb.
fn ge(a: &Limbs, b: &Limbs) -> bool {
    for i in (0..4).rev() {
        if a[i] != b[i] {
            return a[i] > b[i];
        }
    }
    true
}

/// Returns `a + b` and the carry out of the top limb.
fn add(a: &Limbs, b: &Limbs) -> (Limbs, u64) {
    let mut r = [0u64; 4];
    let mut carry = 0;
    for i in 0..4 {
        (r[i], carry) = adc64(a[i], b[i], carry);
    }
    (r, carry)
}

/// Returns `a - b` and the borrow (`0` or `u64::MAX`).
fn sub(a: &Limbs, b: &Limbs) -> (Limbs, u64) {
    let mut r = [0u64; 4];
    let mut borrow = 0;
    for i in 0..4 {
        (r[i], borrow) = sbb64(a[i], b[i], borrow);
    }
    (r, borrow)
}

/// Shifts right by one, feeding `top` in as bit 255.
fn shr1(a: &Limbs, top: u64) -> Limbs {
    [
        (a[0] >> 1) | (a[1] << 63),
        (a[1] >> 1) | (a[2] << 63),
        (a[2] >> 1) | (a[3] << 63),
        (a[3] >> 1) | (top << 63),
    ]
}

/// `x / 2 mod m` for odd `m`.
fn half_mod(x: &Limbs, m: &Limbs) -> Limbs {
    if is_even(x) {
        shr1(x, 0)
    } else {
        let (sum, carry) = add(x, m);
        shr1(&sum, carry)
    }
}

/// `a - b mod m` for `a, b < m`.
fn sub_mod(a: &Limbs, b: &Limbs, m: &Limbs) -> Limbs {
    let (diff, borrow) = sub(a, b);
    if borrow != 0 { add(&diff, m).0 } else { diff }
}

/// Returns `a^-1 mod m`, or zero for `a == 0`.
///
/// `m` must be an odd prime and `a < m`. Running time depends on `a`.
pub(crate) fn invert_vartime(a: &Limbs, m: &Limbs) -> Limbs {
    debug_assert!(m[0] & 1 == 1);
    debug_assert!(!ge(a, m));

    if is_zero(a) {
        return [0; 4];
    }

    // Invariants: x1 * a == u and x2 * a == v (mod m).
    let mut u = *a;
    let mut v = *m;
    let mut x1 = ONE;
    let mut x2 = [0u64; 4];

    while u != ONE && v != ONE {
        while is_even(&u) {
            u = shr1(&u, 0);
            x1 = half_mod(&x1, m);
        }
        while is_even(&v) {
            v = shr1(&v, 0);
            x2 = half_mod(&x2, m);
        }
        if ge(&u, &v) {
            u = sub(&u, &v).0;
            x1 = sub_mod(&x1, &x2, m);
        } else {
            v = sub(&v, &u).0;
            x2 = sub_mod(&x2, &x1, m);
        }
    }

    if u == ONE { x1 } else { x2 }
}
