//! Fixed-width binary codec shared by scalars, field elements and points.
//!
//! Every value has a single encoding width: 32 bytes for [`Scalar`] and
//! [`FieldElement`], 33 bytes for a compressed [`Point`]. [`Marshal`] and
//! [`Unmarshal`] walk a byte buffer while charging a caller-supplied size
//! budget, so a sequence of values can be packed back to back:
//!
//! ```
//! use secp256k1_arith::{Marshal, Point, Scalar, Unmarshal};
//!
//! let k = Scalar::from(7u32);
//! let p = Point::mul_by_generator(&k);
//!
//! let mut buf = [0u8; 65];
//! let (tail, rem) = k.marshal(&mut buf, 100)?;
//! let (tail, rem) = p.marshal(tail, rem)?;
//! assert!(tail.is_empty());
//! assert_eq!(rem, 35);
//!
//! let (mut k2, mut p2) = (Scalar::ZERO, Point::IDENTITY);
//! let (rest, rem) = k2.unmarshal(&buf, 65)?;
//! let (_, rem) = p2.unmarshal(rest, rem)?;
//! assert_eq!((k2, p2, rem), (k, p, 0));
//! # Ok::<(), secp256k1_arith::Error>(())
//! ```

use crate::{Error, FIELD_BYTES, FieldElement, POINT_BYTES, Point, Result, Scalar};

#[cfg(feature = "std")]
use std::io;

/// Largest encoding width of any codec type.
#[cfg(feature = "std")]
const MAX_SIZE: usize = POINT_BYTES;

/// Types with a fixed encoding width.
pub trait SizeHint {
    /// Encoding width in bytes.
    const SIZE: usize;

    /// Number of bytes [`Marshal::marshal`] writes for this value.
    fn size_hint(&self) -> usize {
        Self::SIZE
    }
}

/// Encoding into a byte buffer under a size budget.
pub trait Marshal: SizeHint {
    /// Writes the encoding at the front of `buf`.
    ///
    /// Returns the unwritten tail of `buf` and the budget left after charging
    /// [`SizeHint::SIZE`] bytes. Fails with [`Error::BudgetExceeded`] when
    /// `rem` is too small, and otherwise with [`Error::BufferTooSmall`] when
    /// `buf` is; nothing is written in either case.
    fn marshal<'a>(&self, buf: &'a mut [u8], rem: usize) -> Result<(&'a mut [u8], usize)>;

    /// Writes the encoding to `w`, returning the budget left.
    #[cfg(feature = "std")]
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W, rem: usize) -> Result<usize> {
        let mut bytes = [0u8; MAX_SIZE];
        let (_, rem) = self.marshal(&mut bytes[..Self::SIZE], rem)?;
        w.write_all(&bytes[..Self::SIZE])?;
        Ok(rem)
    }
}

/// Decoding from a byte buffer under a size budget.
pub trait Unmarshal: SizeHint {
    /// Reads the encoding at the front of `buf` into `self`.
    ///
    /// Returns the unread tail of `buf` and the budget left. The checks and
    /// their order match [`Marshal::marshal`]; decoding errors such as
    /// [`Error::NotOnCurve`] follow. `self` is unchanged on any error.
    fn unmarshal<'a>(&mut self, buf: &'a [u8], rem: usize) -> Result<(&'a [u8], usize)>;

    /// Reads an encoding from `r` into `self`, returning the budget left.
    ///
    /// The budget is checked before anything is read.
    #[cfg(feature = "std")]
    fn read_from<R: io::Read + ?Sized>(&mut self, r: &mut R, rem: usize) -> Result<usize> {
        charge(rem, Self::SIZE)?;
        let mut bytes = [0u8; MAX_SIZE];
        r.read_exact(&mut bytes[..Self::SIZE])?;
        let (_, rem) = self.unmarshal(&bytes[..Self::SIZE], rem)?;
        Ok(rem)
    }
}

/// Subtracts `size` from the budget.
fn charge(rem: usize, size: usize) -> Result<usize> {
    rem.checked_sub(size).ok_or(Error::BudgetExceeded)
}

macro_rules! impl_codec {
    ($ty:ty, $size:expr) => {
        impl SizeHint for $ty {
            const SIZE: usize = $size;
        }

        impl Marshal for $ty {
            fn marshal<'a>(
                &self,
                buf: &'a mut [u8],
                rem: usize,
            ) -> Result<(&'a mut [u8], usize)> {
                let rem = charge(rem, Self::SIZE)?;
                let (head, tail) = buf
                    .split_at_mut_checked(Self::SIZE)
                    .ok_or(Error::BufferTooSmall)?;
                self.put_bytes(head)?;
                Ok((tail, rem))
            }
        }

        impl Unmarshal for $ty {
            fn unmarshal<'a>(&mut self, buf: &'a [u8], rem: usize) -> Result<(&'a [u8], usize)> {
                let rem = charge(rem, Self::SIZE)?;
                let (head, tail) = buf
                    .split_at_checked(Self::SIZE)
                    .ok_or(Error::BufferTooSmall)?;
                self.set_bytes(head)?;
                Ok((tail, rem))
            }
        }
    };
}

impl_codec!(Scalar, FIELD_BYTES);
impl_codec!(FieldElement, FIELD_BYTES);
impl_codec!(Point, POINT_BYTES);

#[cfg(test)]
mod tests {
    use super::{Marshal, SizeHint, Unmarshal};
    use crate::{Error, FieldElement, Point, Scalar};
    use hex_literal::hex;

    #[test]
    fn size_hints() {
        assert_eq!(Scalar::ONE.size_hint(), 32);
        assert_eq!(FieldElement::ONE.size_hint(), 32);
        assert_eq!(Point::IDENTITY.size_hint(), 33);
        assert_eq!(<Point as SizeHint>::SIZE, 33);
    }

    #[test]
    fn marshal_advances_buffer_and_budget() {
        let x = FieldElement::from(0x0102_0304u32);
        let mut buf = [0xAAu8; 40];
        let (tail, rem) = x.marshal(&mut buf, 50).unwrap();
        assert_eq!(tail.len(), 8);
        assert_eq!(rem, 18);
        assert_eq!(
            buf[..32],
            hex!("0000000000000000000000000000000000000000000000000000000001020304")
        );
        assert_eq!(buf[32..], [0xAA; 8]);
    }

    #[test]
    fn budget_is_checked_before_buffer() {
        let k = Scalar::ONE;
        let mut small = [0u8; 10];
        assert_eq!(k.marshal(&mut small, 31), Err(Error::BudgetExceeded));
        assert_eq!(k.marshal(&mut small, 32), Err(Error::BufferTooSmall));
        assert_eq!(small, [0u8; 10]);

        let mut out = Scalar::ZERO;
        assert_eq!(out.unmarshal(&small, 31), Err(Error::BudgetExceeded));
        assert_eq!(out.unmarshal(&small, 32), Err(Error::BufferTooSmall));
        assert_eq!(out, Scalar::ZERO);
    }

    #[test]
    fn exact_fit() {
        let p = Point::GENERATOR;
        let mut buf = [0u8; 33];
        let (tail, rem) = p.marshal(&mut buf, 33).unwrap();
        assert!(tail.is_empty());
        assert_eq!(rem, 0);

        let mut q = Point::IDENTITY;
        let (tail, rem) = q.unmarshal(&buf, 33).unwrap();
        assert!(tail.is_empty());
        assert_eq!(rem, 0);
        assert_eq!(q, p);
    }

    #[test]
    fn unmarshal_reduces_scalars() {
        let mut k = Scalar::ZERO;
        let (_, rem) = k.unmarshal(&[0xFF; 32], 32).unwrap();
        assert_eq!(rem, 0);
        assert_eq!(
            k.to_bytes(),
            hex!("000000000000000000000000000000014551231950B75FC4402DA1732FC9BEBE")
        );
    }

    #[test]
    fn point_decode_error_keeps_receiver() {
        let mut bytes = [0u8; 33];
        bytes[32] = 5;
        let mut p = Point::GENERATOR;
        assert_eq!(p.unmarshal(&bytes, 100), Err(Error::NotOnCurve));
        assert_eq!(p, Point::GENERATOR);
    }

    #[test]
    fn sequence_round_trip() {
        let k = Scalar::from(99u32);
        let x = FieldElement::from(12345u64);
        let p = Point::mul_by_generator(&k);
        let total = 32 + 32 + 33;

        let mut buf = [0u8; 97];
        let (tail, rem) = k.marshal(&mut buf, total).unwrap();
        let (tail, rem) = x.marshal(tail, rem).unwrap();
        let (tail, rem) = Point::IDENTITY.marshal(tail, rem).unwrap();
        assert!(tail.is_empty());
        assert_eq!(rem, 0);

        let (mut k2, mut x2, mut p2) = (Scalar::ZERO, FieldElement::ZERO, p);
        let (rest, rem) = k2.unmarshal(&buf, total).unwrap();
        let (rest, rem) = x2.unmarshal(rest, rem).unwrap();
        let (rest, rem) = p2.unmarshal(rest, rem).unwrap();
        assert!(rest.is_empty());
        assert_eq!(rem, 0);
        assert_eq!((k2, x2, p2), (k, x, Point::IDENTITY));
    }

    #[cfg(feature = "std")]
    mod stream {
        use super::super::{Marshal, Unmarshal};
        use crate::{Error, FieldElement, Point, Scalar};
        use std::{io, vec::Vec};

        #[test]
        fn write_then_read() {
            let k = Scalar::from(42u32);
            let p = Point::mul_by_generator(&k);

            let mut out = Vec::new();
            let rem = k.write_to(&mut out, 100).unwrap();
            let rem = p.write_to(&mut out, rem).unwrap();
            assert_eq!(rem, 35);
            assert_eq!(out.len(), 65);

            let mut reader = out.as_slice();
            let (mut k2, mut p2) = (Scalar::ZERO, Point::IDENTITY);
            let rem = k2.read_from(&mut reader, 65).unwrap();
            let rem = p2.read_from(&mut reader, rem).unwrap();
            assert_eq!((k2, p2, rem), (k, p, 0));
        }

        #[test]
        fn budget_checked_before_io() {
            let mut out = Vec::new();
            assert_eq!(
                FieldElement::ONE.write_to(&mut out, 31),
                Err(Error::BudgetExceeded)
            );
            assert!(out.is_empty());

            let mut reader: &[u8] = &[0u8; 32];
            let mut x = FieldElement::ONE;
            assert_eq!(x.read_from(&mut reader, 10), Err(Error::BudgetExceeded));
            assert_eq!(reader.len(), 32);
        }

        #[test]
        fn short_stream() {
            let mut reader: &[u8] = &[0u8; 20];
            let mut x = FieldElement::ONE;
            assert_eq!(
                x.read_from(&mut reader, 32),
                Err(Error::Stream(io::ErrorKind::UnexpectedEof))
            );
            assert_eq!(x, FieldElement::ONE);
        }
    }
}
