//! Error types.

use core::fmt;

/// Error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Input byte slice shorter than the fixed encoding width.
    InvalidLength,

    /// Coordinates or encoding do not describe a point on the curve.
    NotOnCurve,

    /// Affine coordinates were requested for the point at infinity.
    PointAtInfinity,

    /// The injected random source failed.
    RandomSource,

    /// Output or input buffer too small for the encoding.
    BufferTooSmall,

    /// Remaining size budget too small for the encoding.
    BudgetExceeded,

    /// Underlying byte stream failed.
    #[cfg(feature = "std")]
    Stream(std::io::ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength => write!(f, "invalid input length"),
            Error::NotOnCurve => write!(f, "point is not on the secp256k1 curve"),
            Error::PointAtInfinity => write!(f, "point at infinity has no affine coordinates"),
            Error::RandomSource => write!(f, "random number generator failure"),
            Error::BufferTooSmall => write!(f, "buffer too small"),
            Error::BudgetExceeded => write!(f, "size budget exceeded"),
            #[cfg(feature = "std")]
            Error::Stream(kind) => write!(f, "stream error: {kind}"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Stream(err.kind())
    }
}

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;
