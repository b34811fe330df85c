/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! FIX message model.
//!
//! A [`FixMessage`] is an ordered mapping from tag number to ASCII value.
//! Three tags are positional on the wire: `8` (BeginString) first, `9`
//! (BodyLength) second, `10` (CheckSum) last; every other tag is emitted in
//! numeric order between them. `BodyLength` counts the bytes between the
//! end of the `9=…<SOH>` field and the start of `10=`; `CheckSum` is the
//! byte sum modulo 256 of everything before `10=`.

use crate::checksum::{checksum, checksum_digits, read_checksum};
use crate::tags::tag;
use bytes::{BufMut, BytesMut};
use memchr::memmem;
use std::collections::BTreeMap;
use torii_core::error::CodecError;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Default protocol version written when tag 8 is absent.
pub const DEFAULT_BEGIN_STRING: &str = "FIX.4.4";

/// An ordered tag-value FIX message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixMessage {
    fields: BTreeMap<u32, String>,
}

impl FixMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message with the given MsgType (tag 35).
    #[must_use]
    pub fn with_type(msg_type: &str) -> Self {
        let mut msg = Self::new();
        msg.set(tag::MSG_TYPE, msg_type);
        msg
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, tag: u32, value: impl Into<String>) -> &mut Self {
        self.fields.insert(tag, value.into());
        self
    }

    /// Removes a field.
    pub fn remove(&mut self, tag: u32) -> Option<String> {
        self.fields.remove(&tag)
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }

    /// Returns a field parsed as an unsigned integer.
    #[must_use]
    pub fn get_u64(&self, tag: u32) -> Option<u64> {
        self.get(tag).and_then(|v| v.parse().ok())
    }

    /// True if the field is present.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.fields.contains_key(&tag)
    }

    /// The MsgType (tag 35), if present.
    #[must_use]
    pub fn msg_type(&self) -> Option<&str> {
        self.get(tag::MSG_TYPE)
    }

    /// Iterates fields in numeric tag order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.fields.iter().map(|(t, v)| (*t, v.as_str()))
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes the message, recomputing `9` and `10` and storing them
    /// back into the map so callers can read what went on the wire.
    pub fn seal(&mut self) -> BytesMut {
        let begin_string = self
            .fields
            .get(&tag::BEGIN_STRING)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BEGIN_STRING.to_string());

        // Body: every tag except 8/9/10, numeric order, SOH-terminated.
        let mut body = BytesMut::with_capacity(256);
        let mut itoa_buf = itoa::Buffer::new();
        for (&t, value) in &self.fields {
            if matches!(t, tag::BEGIN_STRING | tag::BODY_LENGTH | tag::CHECKSUM) {
                continue;
            }
            body.put_slice(itoa_buf.format(t).as_bytes());
            body.put_u8(b'=');
            body.put_slice(value.as_bytes());
            body.put_u8(SOH);
        }

        let mut frame = BytesMut::with_capacity(body.len() + 32);
        frame.put_slice(b"8=");
        frame.put_slice(begin_string.as_bytes());
        frame.put_u8(SOH);
        frame.put_slice(b"9=");
        frame.put_slice(itoa_buf.format(body.len()).as_bytes());
        frame.put_u8(SOH);
        frame.put_slice(&body);

        let sum = checksum(&frame);
        frame.put_slice(b"10=");
        frame.put_slice(&checksum_digits(sum));
        frame.put_u8(SOH);

        self.fields.insert(tag::BEGIN_STRING, begin_string);
        self.fields.insert(tag::BODY_LENGTH, body.len().to_string());
        self.fields.insert(
            tag::CHECKSUM,
            String::from_utf8_lossy(&checksum_digits(sum)).into_owned(),
        );

        frame
    }

    /// Serializes without mutating the message.
    #[must_use]
    pub fn encode(&self) -> BytesMut {
        self.clone().seal()
    }

    /// Parses a frame into an ordered tag map, tolerating a missing
    /// trailing SOH.
    ///
    /// # Errors
    /// Rejects frames with no `10=` trailer or whose checksum does not
    /// recompute.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let checksum_field = memmem::rfind(bytes, b"\x0110=")
            .map(|pos| pos + 1)
            .ok_or(CodecError::MissingChecksum)?;

        let mut msg = Self::new();
        for pair in bytes.split(|&b| b == SOH) {
            if pair.is_empty() {
                continue;
            }
            let Some(eq) = memchr::memchr(b'=', pair) else {
                continue;
            };
            let Ok(key) = std::str::from_utf8(&pair[..eq]) else {
                continue;
            };
            let Ok(tag_no) = key.parse::<u32>() else {
                continue;
            };
            let value = std::str::from_utf8(&pair[eq + 1..])
                .map_err(|_| CodecError::InvalidTag(key.to_string()))?;
            msg.set(tag_no, value);
        }

        let declared = msg
            .get(tag::CHECKSUM)
            .and_then(|v| read_checksum(v.as_bytes()))
            .ok_or(CodecError::MissingChecksum)?;
        let calculated = checksum(&bytes[..checksum_field]);
        if calculated != declared {
            return Err(CodecError::ChecksumMismatch {
                calculated,
                declared,
            });
        }

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order_single() -> FixMessage {
        let mut msg = FixMessage::with_type("D");
        msg.set(tag::CL_ORD_ID, "ORD1")
            .set(tag::SYMBOL, "AAPL")
            .set(tag::SIDE, "1")
            .set(tag::ORDER_QTY, "100")
            .set(tag::PRICE, "101.25");
        msg
    }

    #[test]
    fn test_frame_shape() {
        let frame = new_order_single().encode();
        assert!(frame.starts_with(b"8=FIX.4.4\x01"));
        assert_eq!(frame[frame.len() - 1], SOH);
        // Trailer is the 7-byte `10=NNN<SOH>`.
        let tail = &frame[frame.len() - 7..];
        assert_eq!(&tail[..3], b"10=");
    }

    #[test]
    fn test_body_length_counts_between_tag9_and_tag10() {
        let frame = new_order_single().encode();
        let after_9 = memmem::find(&frame, b"\x019=").unwrap() + 3;
        let body_start = after_9 + memchr::memchr(SOH, &frame[after_9..]).unwrap() + 1;
        let body_end = memmem::rfind(&frame, b"\x0110=").unwrap() + 1;

        let decoded = FixMessage::decode(&frame).unwrap();
        assert_eq!(
            decoded.get_u64(tag::BODY_LENGTH).unwrap() as usize,
            body_end - body_start
        );
    }

    #[test]
    fn test_round_trip_preserves_tags() {
        let mut original = new_order_single();
        let frame = original.seal();
        let decoded = FixMessage::decode(&frame).unwrap();

        for (t, v) in original.iter() {
            assert_eq!(decoded.get(t), Some(v), "tag {t}");
        }
        assert_eq!(decoded.len(), original.len());
    }

    #[test]
    fn test_checksum_recomputes() {
        let frame = new_order_single().encode();
        let decoded = FixMessage::decode(&frame).unwrap();
        let boundary = memmem::rfind(&frame, b"\x0110=").unwrap() + 1;
        let expected = checksum(&frame[..boundary]);
        assert_eq!(
            decoded.get(tag::CHECKSUM).unwrap(),
            format!("{expected:03}")
        );
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let mut frame = new_order_single().encode().to_vec();
        let len = frame.len();
        frame[len - 2] = b'9';
        frame[len - 3] = b'9';
        frame[len - 4] = b'9';
        // Either an outright invalid value or a mismatch, depending on the
        // original digits.
        assert!(FixMessage::decode(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_missing_checksum() {
        let frame = b"8=FIX.4.4\x019=5\x0135=0\x01";
        assert!(matches!(
            FixMessage::decode(frame),
            Err(CodecError::MissingChecksum)
        ));
    }

    #[test]
    fn test_decode_tolerates_missing_trailing_soh() {
        let frame = new_order_single().encode();
        let without = &frame[..frame.len() - 1];
        let decoded = FixMessage::decode(without).unwrap();
        assert_eq!(decoded.get(tag::CL_ORD_ID), Some("ORD1"));
    }

    #[test]
    fn test_tags_sorted_numerically() {
        let mut msg = FixMessage::with_type("D");
        msg.set(54, "1").set(11, "A").set(38, "5");
        let frame = msg.seal();
        let pos_11 = memmem::find(&frame, b"\x0111=").unwrap();
        let pos_35 = memmem::find(&frame, b"\x0135=").unwrap();
        let pos_38 = memmem::find(&frame, b"\x0138=").unwrap();
        let pos_54 = memmem::find(&frame, b"\x0154=").unwrap();
        assert!(pos_11 < pos_35 && pos_35 < pos_38 && pos_38 < pos_54);
    }
}
