#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]
#![doc = include_str!("../README.md")]

#[cfg(any(feature = "std", test))]
extern crate std;

mod arithmetic;
mod codec;
mod error;

pub use crate::{
    arithmetic::{FieldElement, POINT_BYTES, Point, PointBytes, Scalar},
    codec::{Marshal, SizeHint, Unmarshal},
    error::{Error, Result},
};
pub use ff;
pub use rand_core;
pub use subtle;
pub use zeroize;

/// Big-endian encoding of a scalar or a field element.
pub type FieldBytes = [u8; 32];

/// Size of an encoded scalar or field element.
pub const FIELD_BYTES: usize = 32;
