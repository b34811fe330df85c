/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Fixed-width field reader.
//!
//! [`FieldReader`] consumes a byte buffer field by field in declaration
//! order. Each accessor reads exactly the declared width and maps the
//! undefined sentinel (all spaces) back to `None`.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use torii_core::error::CodecError;
use torii_core::types::Price;

/// Cursor over a fixed-width encoded buffer.
#[derive(Debug)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Creates a reader over the given buffer.
    #[inline]
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Takes the next `needed` raw bytes.
    ///
    /// # Errors
    /// Returns [`CodecError::Truncated`] if the buffer is exhausted.
    pub fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let available = self.buf.len() - self.pos;
        if available < needed {
            return Err(CodecError::Truncated { needed, available });
        }
        let slice = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn take_str(&mut self, field: &'static str, len: usize) -> Result<&'a str, CodecError> {
        let raw = self.take(len)?;
        if !raw.is_ascii() {
            return Err(CodecError::NonAscii { field });
        }
        std::str::from_utf8(raw).map_err(|_| CodecError::NonAscii { field })
    }

    /// Reads a constant-width ASCII field verbatim.
    ///
    /// # Errors
    /// Returns a codec error on truncation or non-ASCII bytes.
    pub fn fixed(&mut self, field: &'static str, len: usize) -> Result<&'a str, CodecError> {
        self.take_str(field, len)
    }

    /// Skips `len` bytes (reserved filler).
    ///
    /// # Errors
    /// Returns [`CodecError::Truncated`] if the buffer is exhausted.
    pub fn skip(&mut self, len: usize) -> Result<(), CodecError> {
        self.take(len).map(|_| ())
    }

    /// Reads a right-padded string field; all spaces decodes to `None`.
    ///
    /// # Errors
    /// Returns a codec error on truncation or non-ASCII bytes.
    pub fn rpad(&mut self, field: &'static str, len: usize) -> Result<Option<String>, CodecError> {
        let s = self.take_str(field, len)?;
        let stripped = s.trim_end_matches(' ');
        Ok(if stripped.is_empty() {
            None
        } else {
            Some(stripped.to_string())
        })
    }

    /// Reads a left-padded string field; all spaces decodes to `None`.
    ///
    /// # Errors
    /// Returns a codec error on truncation or non-ASCII bytes.
    pub fn lpad(&mut self, field: &'static str, len: usize) -> Result<Option<String>, CodecError> {
        let s = self.take_str(field, len)?;
        let stripped = s.trim_start_matches(' ');
        Ok(if stripped.is_empty() {
            None
        } else {
            Some(stripped.to_string())
        })
    }

    /// Reads a left-padded base-10 integer field.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidFieldValue`] on non-digit content.
    pub fn int(&mut self, field: &'static str, len: usize) -> Result<Option<i64>, CodecError> {
        let s = self.take_str(field, len)?;
        let stripped = s.trim();
        if stripped.is_empty() {
            return Ok(None);
        }
        stripped
            .parse::<i64>()
            .map(Some)
            .map_err(|_| CodecError::InvalidFieldValue {
                field,
                reason: format!("expected integer, got {s:?}"),
            })
    }

    /// Reads a decimal-scaled price field of width
    /// `int_digits + dec_digits + 1`.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidFieldValue`] on malformed digits.
    pub fn price(
        &mut self,
        field: &'static str,
        int_digits: usize,
        dec_digits: u32,
    ) -> Result<Option<Price>, CodecError> {
        let width = int_digits + dec_digits as usize + 1;
        let s = self.take_str(field, width)?;
        let stripped = s.trim_start_matches(' ');
        if stripped.is_empty() {
            return Ok(None);
        }
        if stripped.len() == width - 1 && stripped.starts_with('0') && stripped[1..].trim().is_empty()
        {
            return Ok(Some(Price::Market));
        }
        let units = stripped
            .parse::<i64>()
            .map_err(|_| CodecError::InvalidFieldValue {
                field,
                reason: format!("expected scaled price, got {s:?}"),
            })?;
        Ok(Some(Price::Limit(Decimal::new(units, dec_digits))))
    }

    /// Reads a `YYYYMMDD` date field; all spaces decodes to `None`.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidFieldValue`] on a malformed date.
    pub fn date8(&mut self, field: &'static str) -> Result<Option<NaiveDate>, CodecError> {
        let s = self.take_str(field, 8)?;
        if s.trim().is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(Some)
            .map_err(|_| CodecError::InvalidFieldValue {
                field,
                reason: format!("expected YYYYMMDD, got {s:?}"),
            })
    }

    /// Reads an `HHMMSSmmm` millisecond time field.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidFieldValue`] on malformed digits.
    pub fn time9(&mut self, field: &'static str) -> Result<Option<NaiveTime>, CodecError> {
        let s = self.take_str(field, 9)?;
        if s.trim().is_empty() {
            return Ok(None);
        }
        let (h, m, sec) = parse_hms(field, s)?;
        let millis = parse_digits(field, &s[6..9])?;
        NaiveTime::from_hms_milli_opt(h, m, sec, millis)
            .map(Some)
            .ok_or(CodecError::InvalidFieldValue {
                field,
                reason: format!("out-of-range time {s:?}"),
            })
    }

    /// Reads an `HHMMSSmmmmmm` microsecond time field.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidFieldValue`] on malformed digits.
    pub fn time12(&mut self, field: &'static str) -> Result<Option<NaiveTime>, CodecError> {
        let s = self.take_str(field, 12)?;
        if s.trim().is_empty() {
            return Ok(None);
        }
        let (h, m, sec) = parse_hms(field, s)?;
        let micros = parse_digits(field, &s[6..12])?;
        NaiveTime::from_hms_micro_opt(h, m, sec, micros)
            .map(Some)
            .ok_or(CodecError::InvalidFieldValue {
                field,
                reason: format!("out-of-range time {s:?}"),
            })
    }

    /// Reads a single-character enumeration field, checked against `allowed`.
    ///
    /// A space is always accepted and stands for "absent".
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidEnum`] on a character outside the set.
    pub fn char_enum(
        &mut self,
        field: &'static str,
        allowed: &[char],
    ) -> Result<char, CodecError> {
        let s = self.take_str(field, 1)?;
        let c = s.as_bytes()[0] as char;
        if c == ' ' || allowed.contains(&c) {
            Ok(c)
        } else {
            Err(CodecError::InvalidEnum { field, value: c })
        }
    }

    /// Returns the bytes not yet consumed.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Returns the current byte offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns true once every byte has been consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }
}

fn parse_hms(field: &'static str, s: &str) -> Result<(u32, u32, u32), CodecError> {
    Ok((
        parse_digits(field, &s[0..2])?,
        parse_digits(field, &s[2..4])?,
        parse_digits(field, &s[4..6])?,
    ))
}

fn parse_digits(field: &'static str, s: &str) -> Result<u32, CodecError> {
    s.parse::<u32>().map_err(|_| CodecError::InvalidFieldValue {
        field,
        reason: format!("expected digits, got {s:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{put_date8, put_int, put_price, put_rpad, put_time9, put_time12};
    use bytes::BytesMut;

    #[test]
    fn test_rpad_round_trip() {
        let mut buf = BytesMut::new();
        put_rpad(&mut buf, Some("6758"), 12);
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.rpad("IssueCode", 12).unwrap().as_deref(), Some("6758"));
        assert!(r.is_empty());
    }

    #[test]
    fn test_rpad_none_round_trip() {
        let mut buf = BytesMut::new();
        put_rpad(&mut buf, None, 12);
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.rpad("IssueCode", 12).unwrap(), None);
    }

    #[test]
    fn test_int_round_trip() {
        for v in [Some(0), Some(1), Some(99_999_999), None] {
            let mut buf = BytesMut::new();
            put_int(&mut buf, v, 8);
            assert_eq!(buf.len(), 8);
            let mut r = FieldReader::new(&buf);
            assert_eq!(r.int("SeqNo", 8).unwrap(), v);
        }
    }

    #[test]
    fn test_int_rejects_garbage() {
        let mut r = FieldReader::new(b"   12a  ");
        assert!(matches!(
            r.int("SeqNo", 8),
            Err(CodecError::InvalidFieldValue { field: "SeqNo", .. })
        ));
    }

    #[test]
    fn test_price_round_trip() {
        let cases = [
            Some(Price::Limit("101.25".parse().unwrap())),
            Some(Price::Limit("0.0001".parse().unwrap())),
            Some(Price::Market),
            None,
        ];
        for v in cases {
            let mut buf = BytesMut::new();
            put_price(&mut buf, v.as_ref(), 8, 4);
            assert_eq!(buf.len(), 13);
            let mut r = FieldReader::new(&buf);
            assert_eq!(r.price("OrderPrice", 8, 4).unwrap(), v);
        }
    }

    #[test]
    fn test_date_round_trip() {
        let d = NaiveDate::from_ymd_opt(2026, 7, 29);
        let mut buf = BytesMut::new();
        put_date8(&mut buf, d);
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.date8("TransmissionDate").unwrap(), d);
    }

    #[test]
    fn test_time_round_trips() {
        let t = NaiveTime::from_hms_micro_opt(14, 5, 9, 123_456).unwrap();

        let mut buf = BytesMut::new();
        put_time12(&mut buf, Some(t));
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.time12("TransmissionTime").unwrap(), Some(t));

        // Time9 truncates to milliseconds.
        let mut buf = BytesMut::new();
        put_time9(&mut buf, Some(t));
        let mut r = FieldReader::new(&buf);
        let truncated = NaiveTime::from_hms_milli_opt(14, 5, 9, 123).unwrap();
        assert_eq!(r.time9("EffectiveTime").unwrap(), Some(truncated));
    }

    #[test]
    fn test_char_enum_checked() {
        let mut r = FieldReader::new(b"3");
        assert_eq!(r.char_enum("Side", &['1', '3']).unwrap(), '3');

        let mut r = FieldReader::new(b"9");
        assert!(matches!(
            r.char_enum("Side", &['1', '3']),
            Err(CodecError::InvalidEnum { field: "Side", value: '9' })
        ));

        // Space always passes as "absent".
        let mut r = FieldReader::new(b" ");
        assert_eq!(r.char_enum("Side", &['1', '3']).unwrap(), ' ');
    }

    #[test]
    fn test_truncated() {
        let mut r = FieldReader::new(b"12");
        let err = r.int("SeqNo", 8).unwrap_err();
        assert_eq!(err, CodecError::Truncated { needed: 8, available: 2 });
    }
}
