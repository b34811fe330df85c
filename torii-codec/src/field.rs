/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Fixed-width ASCII field writers.
//!
//! Every writer emits exactly the declared field width. Absent values
//! (`None`) encode as the field's undefined sentinel: all spaces for padded
//! strings, integers, prices, dates and times.

use bytes::{BufMut, BytesMut};
use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use torii_core::types::Price;

/// Writes a constant-width ASCII literal.
#[inline]
pub fn put_fixed(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
}

/// Writes `count` space bytes.
#[inline]
pub fn put_spaces(buf: &mut BytesMut, count: usize) {
    buf.put_bytes(b' ', count);
}

/// Writes a right-padded string field of width `len`.
///
/// `None` encodes as all spaces. Over-long values are truncated.
pub fn put_rpad(buf: &mut BytesMut, value: Option<&str>, len: usize) {
    let bytes = value.unwrap_or("").as_bytes();
    let n = bytes.len().min(len);
    buf.put_slice(&bytes[..n]);
    buf.put_bytes(b' ', len - n);
}

/// Writes a left-padded string field of width `len`.
///
/// `None` encodes as all spaces. Over-long values are truncated.
pub fn put_lpad(buf: &mut BytesMut, value: Option<&str>, len: usize) {
    let bytes = value.unwrap_or("").as_bytes();
    let n = bytes.len().min(len);
    buf.put_bytes(b' ', len - n);
    buf.put_slice(&bytes[..n]);
}

/// Writes a base-10 integer left-padded with spaces to width `len`.
pub fn put_int(buf: &mut BytesMut, value: Option<i64>, len: usize) {
    match value {
        Some(v) => {
            let mut itoa_buf = itoa::Buffer::new();
            put_lpad(buf, Some(itoa_buf.format(v)), len);
        }
        None => put_lpad(buf, None, len),
    }
}

/// Writes a decimal-scaled price field of width `int_digits + dec_digits + 1`.
///
/// A limit price stores `round(x * 10^dec_digits)` zero-padded to
/// `dec_digits + 1` digits inside the space-left-padded field. The market
/// sentinel is a leading space, `0`, then trailing spaces.
pub fn put_price(buf: &mut BytesMut, value: Option<&Price>, int_digits: usize, dec_digits: u32) {
    let width = int_digits + dec_digits as usize + 1;
    match value {
        None => buf.put_bytes(b' ', width),
        Some(Price::Market) => {
            buf.put_u8(b' ');
            buf.put_u8(b'0');
            buf.put_bytes(b' ', width - 2);
        }
        Some(Price::Limit(d)) => {
            let factor = Decimal::from(10u64.pow(dec_digits));
            let units = (*d * factor).round().to_i64().unwrap_or(0);
            let digits = format!("{:0width$}", units, width = dec_digits as usize + 1);
            put_lpad(buf, Some(&digits), width);
        }
    }
}

/// Writes a `YYYYMMDD` date field; `None` encodes as eight spaces.
pub fn put_date8(buf: &mut BytesMut, value: Option<NaiveDate>) {
    match value {
        Some(d) => put_fixed(buf, &d.format("%Y%m%d").to_string()),
        None => buf.put_bytes(b' ', 8),
    }
}

/// Writes an `HHMMSSmmm` millisecond time field; `None` encodes as spaces.
pub fn put_time9(buf: &mut BytesMut, value: Option<NaiveTime>) {
    match value {
        Some(t) => {
            let millis = (t.nanosecond() / 1_000_000).min(999);
            put_fixed(
                buf,
                &format!("{:02}{:02}{:02}{:03}", t.hour(), t.minute(), t.second(), millis),
            );
        }
        None => buf.put_bytes(b' ', 9),
    }
}

/// Writes an `HHMMSSmmmmmm` microsecond time field; `None` encodes as spaces.
pub fn put_time12(buf: &mut BytesMut, value: Option<NaiveTime>) {
    match value {
        Some(t) => {
            let micros = (t.nanosecond() / 1_000).min(999_999);
            put_fixed(
                buf,
                &format!("{:02}{:02}{:02}{:06}", t.hour(), t.minute(), t.second(), micros),
            );
        }
        None => buf.put_bytes(b' ', 12),
    }
}

/// Writes a single ASCII character field.
#[inline]
pub fn put_char(buf: &mut BytesMut, value: char) {
    buf.put_u8(value as u8);
}
