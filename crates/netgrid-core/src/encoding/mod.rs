//! Binary encoding for persisted rows and keys.
//!
//! Rows are encoded with a compact hand-rolled format behind the
//! [`Encoder`] / [`Decoder`] traits; every row starts with a format-version
//! byte so the layout can evolve. Keys ([`keys`]) are big-endian so that
//! numeric order and byte order agree, which makes range scans over ids
//! and id pairs work without decoding. Row codecs cover [`crate::NetNode`],
//! [`crate::NetLink`], [`crate::NetworkInfo`], and [`crate::BBox`].

mod element;
pub mod keys;
mod reader;
mod traits;

pub use reader::ByteReader;
pub use traits::{Decoder, Encoder, FORMAT_VERSION};

#[cfg(test)]
mod proptest_tests;
