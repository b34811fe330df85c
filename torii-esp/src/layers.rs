/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! ESP layer headers.
//!
//! Every ESP frame starts with [`EspCommon`]; order, notice, and admin
//! frames carry a middle layer ([`OrderCommon`], [`NoticeCommon`],
//! [`AdminCommon`]) between it and the payload. The length fields of all
//! layers are recomputed from actual serialized sizes on build and are never
//! trusted from caller-supplied values.

use crate::codes;
use bytes::BytesMut;
use chrono::{NaiveDate, NaiveTime};
use torii_codec::field::{put_char, put_date8, put_int, put_rpad, put_spaces, put_time12};
use torii_codec::reader::FieldReader;
use torii_core::error::CodecError;

/// Serialized width of [`EspCommon`] in bytes.
pub const ESP_COMMON_LEN: usize = 72;

/// Serialized width of [`OrderCommon`] in bytes.
pub const ORDER_COMMON_LEN: usize = 42;

/// Serialized width of [`NoticeCommon`] in bytes.
pub const NOTICE_COMMON_LEN: usize = 64;

/// Serialized width of [`AdminCommon`] in bytes.
pub const ADMIN_COMMON_LEN: usize = 49;

/// Session framing header carried by every ESP frame.
///
/// All scalars are optional; the session client fills unset fields with
/// session defaults before transmission, and `message_length` /
/// `data_area_length` are always recomputed on build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EspCommon {
    pub message_length: Option<i64>,
    pub message_type: Option<String>,
    pub seq_no: Option<i64>,
    pub resend_flag: Option<char>,
    pub participant_code: Option<String>,
    pub virtual_server_no: Option<String>,
    pub armsn: Option<i64>,
    pub samsn: Option<i64>,
    pub data_area_length: Option<i64>,
    pub number_of_data_transactions: Option<i64>,
    pub transmission_date: Option<NaiveDate>,
    pub transmission_time: Option<NaiveTime>,
}

impl EspCommon {
    /// Serializes the header with recomputed lengths.
    ///
    /// `message_length` is the full frame size minus the five-byte length
    /// field itself; `data_area_length` is the payload byte count.
    pub fn encode_header(
        &self,
        buf: &mut BytesMut,
        message_type: &str,
        message_length: i64,
        data_area_length: i64,
    ) {
        put_int(buf, Some(message_length), 5);
        put_rpad(buf, Some(message_type), 2);
        put_int(buf, self.seq_no, 8);
        put_char(buf, self.resend_flag.unwrap_or('0'));
        put_rpad(buf, self.participant_code.as_deref(), 5);
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_int(buf, self.armsn, 8);
        put_int(buf, self.samsn, 8);
        put_int(buf, Some(data_area_length), 5);
        put_int(buf, Some(self.number_of_data_transactions.unwrap_or(1)), 3);
        put_date8(buf, self.transmission_date);
        put_time12(buf, self.transmission_time);
        put_spaces(buf, 1);
    }

    /// Decodes the 72-byte header.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on truncated or malformed bytes.
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let message_length = r.int("MessageLength", 5)?;
        let message_type = r.fixed("MessageType", 2)?.to_string();
        let seq_no = r.int("SeqNo", 8)?;
        let resend_flag = r.char_enum("ResendFlag", codes::RESEND_FLAG)?;
        let participant_code = r.rpad("ParticipantCode", 5)?;
        let virtual_server_no = r.rpad("VirtualServerNo", 6)?;
        let armsn = r.int("ARMSN", 8)?;
        let samsn = r.int("SAMSN", 8)?;
        let data_area_length = r.int("DataAreaLength", 5)?;
        let number_of_data_transactions = r.int("NumberOfDataTransactions", 3)?;
        let transmission_date = r.date8("TransmissionDate")?;
        let transmission_time = r.time12("TransmissionTime")?;
        r.skip(1)?;
        Ok(Self {
            message_length,
            message_type: Some(message_type),
            seq_no,
            resend_flag: if resend_flag == ' ' { None } else { Some(resend_flag) },
            participant_code,
            virtual_server_no,
            armsn,
            samsn,
            data_area_length,
            number_of_data_transactions,
            transmission_date,
            transmission_time,
        })
    }
}

/// Middle layer for order-entry traffic (message types 40/41/42).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderCommon {
    pub data_length: Option<i64>,
    pub data_code: Option<String>,
    pub exchange_code: Option<String>,
    pub market_code: Option<String>,
    pub participant_code: Option<String>,
    pub virtual_server_no: Option<String>,
    pub order_entry_seq_no: Option<i64>,
}

impl OrderCommon {
    /// Serializes the layer with a recomputed `DataLength`.
    pub fn encode_with(&self, buf: &mut BytesMut, data_code: &str, data_length: i64) {
        put_int(buf, Some(data_length), 5);
        put_rpad(buf, Some(data_code), 4);
        put_rpad(buf, self.exchange_code.as_deref(), 1);
        put_rpad(buf, self.market_code.as_deref(), 2);
        put_rpad(buf, self.participant_code.as_deref(), 5);
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_spaces(buf, 6);
        put_int(buf, self.order_entry_seq_no, 8);
        put_spaces(buf, 5);
    }

    /// Decodes the 42-byte layer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on truncated or malformed bytes.
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let data_length = r.int("DataLength", 5)?;
        let data_code = r.rpad("DataCode", 4)?;
        let exchange_code = r.rpad("ExchangeCode", 1)?;
        let market_code = r.rpad("MarketCode", 2)?;
        let participant_code = r.rpad("ParticipantCode", 5)?;
        let virtual_server_no = r.rpad("VirtualServerNo", 6)?;
        r.skip(6)?;
        let order_entry_seq_no = r.int("OrderEntrySeqNo", 8)?;
        r.skip(5)?;
        Ok(Self {
            data_length,
            data_code,
            exchange_code,
            market_code,
            participant_code,
            virtual_server_no,
            order_entry_seq_no,
        })
    }
}

/// Middle layer for notice traffic (message types 50/51/52).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeCommon {
    pub data_length: Option<i64>,
    pub data_code: Option<String>,
    pub exchange_code: Option<String>,
    pub market_code: Option<String>,
    pub participant_code: Option<String>,
    pub source_virtual_server_no: Option<String>,
    pub destination_virtual_server_no: Option<String>,
    pub order_entry_seq_no: Option<i64>,
    pub notice_seq_no: Option<i64>,
    pub reason_code: Option<String>,
    pub retransmission_flag: Option<char>,
    pub time: Option<NaiveTime>,
}

impl NoticeCommon {
    /// Serializes the layer with a recomputed `DataLength`.
    pub fn encode_with(&self, buf: &mut BytesMut, data_code: &str, data_length: i64) {
        put_int(buf, Some(data_length), 5);
        put_rpad(buf, Some(data_code), 4);
        put_rpad(buf, self.exchange_code.as_deref(), 1);
        put_rpad(buf, self.market_code.as_deref(), 2);
        put_rpad(buf, self.participant_code.as_deref(), 5);
        put_rpad(buf, self.source_virtual_server_no.as_deref(), 6);
        put_rpad(buf, self.destination_virtual_server_no.as_deref(), 6);
        put_int(buf, self.order_entry_seq_no, 8);
        put_int(buf, self.notice_seq_no, 8);
        put_rpad(buf, self.reason_code.as_deref(), 4);
        put_char(buf, self.retransmission_flag.unwrap_or('0'));
        put_time12(buf, self.time);
        put_spaces(buf, 2);
    }

    /// Decodes the 64-byte layer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on truncated or malformed bytes.
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let data_length = r.int("DataLength", 5)?;
        let data_code = r.rpad("DataCode", 4)?;
        let exchange_code = r.rpad("ExchangeCode", 1)?;
        let market_code = r.rpad("MarketCode", 2)?;
        let participant_code = r.rpad("ParticipantCode", 5)?;
        let source_virtual_server_no = r.rpad("SourceVirtualServerNo", 6)?;
        let destination_virtual_server_no = r.rpad("DestinationVirtualServerNo", 6)?;
        let order_entry_seq_no = r.int("OrderEntrySeqNo", 8)?;
        let notice_seq_no = r.int("NoticeSeqNo", 8)?;
        let reason_code = r.rpad("ReasonCode", 4)?;
        let retransmission_flag = r.char_enum("RetransmissionFlag", codes::RETRANSMISSION_FLAG)?;
        let time = r.time12("Time")?;
        r.skip(2)?;
        Ok(Self {
            data_length,
            data_code,
            exchange_code,
            market_code,
            participant_code,
            source_virtual_server_no,
            destination_virtual_server_no,
            order_entry_seq_no,
            notice_seq_no,
            reason_code,
            retransmission_flag: if retransmission_flag == ' ' {
                None
            } else {
                Some(retransmission_flag)
            },
            time,
        })
    }
}

/// Middle layer for administrative traffic (message types 80/90/81/91/82/92).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminCommon {
    pub data_length: Option<i64>,
    pub data_code: Option<String>,
    pub exchange_code: Option<String>,
    pub market_code: Option<String>,
    pub participant_code: Option<String>,
    pub virtual_server_no: Option<String>,
    pub number_of_response_records: Option<i64>,
    pub reason_code: Option<String>,
}

impl AdminCommon {
    /// Serializes the layer with a recomputed `DataLength`.
    pub fn encode_with(&self, buf: &mut BytesMut, data_code: &str, data_length: i64) {
        put_int(buf, Some(data_length), 5);
        put_rpad(buf, Some(data_code), 4);
        put_rpad(buf, self.exchange_code.as_deref(), 1);
        put_rpad(buf, self.market_code.as_deref(), 2);
        put_rpad(buf, self.participant_code.as_deref(), 5);
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_int(buf, Some(self.number_of_response_records.unwrap_or(1)), 5);
        put_spaces(buf, 17);
        put_rpad(buf, self.reason_code.as_deref(), 4);
    }

    /// Decodes the 49-byte layer.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on truncated or malformed bytes.
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let data_length = r.int("DataLength", 5)?;
        let data_code = r.rpad("DataCode", 4)?;
        let exchange_code = r.rpad("ExchangeCode", 1)?;
        let market_code = r.rpad("MarketCode", 2)?;
        let participant_code = r.rpad("ParticipantCode", 5)?;
        let virtual_server_no = r.rpad("VirtualServerNo", 6)?;
        let number_of_response_records = r.int("NumberOfResponseRecords", 5)?;
        r.skip(17)?;
        let reason_code = r.rpad("ReasonCode", 4)?;
        Ok(Self {
            data_length,
            data_code,
            exchange_code,
            market_code,
            participant_code,
            virtual_server_no,
            number_of_response_records,
            reason_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esp_common_width() {
        let mut buf = BytesMut::new();
        EspCommon::default().encode_header(&mut buf, "05", 83, 16);
        assert_eq!(buf.len(), ESP_COMMON_LEN);
    }

    #[test]
    fn test_esp_common_round_trip() {
        let common = EspCommon {
            message_type: Some("40".to_string()),
            seq_no: Some(7),
            resend_flag: Some('0'),
            participant_code: Some("12345".to_string()),
            virtual_server_no: Some("VS0001".to_string()),
            armsn: Some(3),
            samsn: Some(0),
            number_of_data_transactions: Some(1),
            transmission_date: NaiveDate::from_ymd_opt(2026, 7, 29),
            transmission_time: NaiveTime::from_hms_micro_opt(9, 0, 0, 1),
            ..EspCommon::default()
        };
        let mut buf = BytesMut::new();
        common.encode_header(&mut buf, "40", 200, 133);

        let mut r = FieldReader::new(&buf);
        let decoded = EspCommon::decode(&mut r).unwrap();
        assert_eq!(decoded.message_length, Some(200));
        assert_eq!(decoded.data_area_length, Some(133));
        assert_eq!(decoded.seq_no, common.seq_no);
        assert_eq!(decoded.participant_code, common.participant_code);
        assert_eq!(decoded.transmission_time, common.transmission_time);
    }

    #[test]
    fn test_order_common_width_and_round_trip() {
        let layer = OrderCommon {
            exchange_code: Some("1".to_string()),
            market_code: Some("11".to_string()),
            participant_code: Some("12345".to_string()),
            virtual_server_no: Some("VS0001".to_string()),
            order_entry_seq_no: Some(42),
            ..OrderCommon::default()
        };
        let mut buf = BytesMut::new();
        layer.encode_with(&mut buf, "1111", 128);
        assert_eq!(buf.len(), ORDER_COMMON_LEN);

        let mut r = FieldReader::new(&buf);
        let decoded = OrderCommon::decode(&mut r).unwrap();
        assert_eq!(decoded.data_length, Some(128));
        assert_eq!(decoded.data_code.as_deref(), Some("1111"));
        assert_eq!(decoded.order_entry_seq_no, Some(42));
    }

    #[test]
    fn test_notice_common_width() {
        let mut buf = BytesMut::new();
        NoticeCommon::default().encode_with(&mut buf, "A111", 164);
        assert_eq!(buf.len(), NOTICE_COMMON_LEN);
    }

    #[test]
    fn test_admin_common_width() {
        let mut buf = BytesMut::new();
        AdminCommon::default().encode_with(&mut buf, "6211", 100);
        assert_eq!(buf.len(), ADMIN_COMMON_LEN);
    }
}
