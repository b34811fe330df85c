/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii Codec
//!
//! Fixed-width ASCII field codecs and packet primitives for the torii
//! order-entry protocol toolkit.
//!
//! This crate provides:
//! - **Field writers**: exact-width encoders for padded strings, integers,
//!   decimal-scaled prices, dates and times ([`field`])
//! - **Field reader**: a cursor that consumes fields in declaration order
//!   and maps undefined sentinels back to `None` ([`reader`])
//! - **[`WireLayer`]**: the trait each packet layer implements for
//!   reversible encode/decode

pub mod field;
pub mod reader;

pub use reader::FieldReader;

use bytes::BytesMut;
use torii_core::error::CodecError;

/// A packet layer with a fixed-width wire representation.
///
/// Implementations serialize fields in declaration order and must satisfy
/// `decode(encode(v)) == v` on the value domain, with the undefined
/// sentinel round-tripping to `None`.
pub trait WireLayer: Sized {
    /// Appends this layer's bytes to `buf`.
    fn encode(&self, buf: &mut BytesMut);

    /// Decodes this layer from the reader, consuming exactly its width.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on truncated or malformed bytes.
    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError>;

    /// Serializes this layer into a fresh buffer.
    #[must_use]
    fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf
    }
}
