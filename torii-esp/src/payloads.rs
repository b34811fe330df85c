/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! ESP payload layouts.
//!
//! One struct per distinct wire layout. Several data codes share a layout
//! (acceptance notices and their error twins, response/error-response
//! pairs); the payload enums in [`crate::message`] keep those codes as
//! separate variants over the shared struct, mirroring the binding table.
//!
//! Field order and widths are bit-exact; reserved filler is emitted as
//! spaces and skipped on decode.

use crate::codes;
use bytes::BytesMut;
use chrono::NaiveTime;
use torii_codec::field::{
    put_char, put_int, put_price, put_rpad, put_spaces, put_time9,
};
use torii_codec::reader::FieldReader;
use torii_codec::WireLayer;
use torii_core::error::CodecError;
use torii_core::types::Price;

/// Width of the blank session-layer data area (login, heartbeat, ...).
pub const BLANK_DATA_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Session layer
// ---------------------------------------------------------------------------

/// Logout request carrying a four-character reason code.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoutRequest {
    pub logout_reason: String,
}

impl Default for LogoutRequest {
    fn default() -> Self {
        Self {
            logout_reason: codes::logout_reason::LOGOUT_REQUEST_IS_VALID.to_string(),
        }
    }
}

impl WireLayer for LogoutRequest {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.logout_reason), 4);
        put_spaces(buf, 12);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let logout_reason = r.fixed("LogoutReason", 4)?.to_string();
        r.skip(12)?;
        Ok(Self { logout_reason })
    }
}

/// Session-layer resend request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResendRequest {
    pub resend_start_seq_no: Option<i64>,
}

impl WireLayer for ResendRequest {
    fn encode(&self, buf: &mut BytesMut) {
        put_int(buf, self.resend_start_seq_no, 8);
        put_spaces(buf, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let resend_start_seq_no = r.int("ResendStartSeqNo", 8)?;
        r.skip(8)?;
        Ok(Self { resend_start_seq_no })
    }
}

/// Session-layer skip message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skip {
    pub skip_seq_no: Option<i64>,
}

impl WireLayer for Skip {
    fn encode(&self, buf: &mut BytesMut) {
        put_int(buf, self.skip_seq_no, 8);
        put_spaces(buf, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let skip_seq_no = r.int("SkipSeqNo", 8)?;
        r.skip(8)?;
        Ok(Self { skip_seq_no })
    }
}

/// Session-layer reject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reject {
    pub reject_seq_no: Option<i64>,
    pub reject_message_type: Option<String>,
    pub reject_reason_code: Option<String>,
}

impl WireLayer for Reject {
    fn encode(&self, buf: &mut BytesMut) {
        put_int(buf, self.reject_seq_no, 8);
        put_rpad(buf, self.reject_message_type.as_deref(), 2);
        put_rpad(buf, self.reject_reason_code.as_deref(), 4);
        put_spaces(buf, 2);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let reject_seq_no = r.int("RejectSeqNo", 8)?;
        let reject_message_type = r.rpad("RejectMessageType", 2)?;
        let reject_reason_code = r.rpad("RejectReasonCode", 4)?;
        r.skip(2)?;
        Ok(Self {
            reject_seq_no,
            reject_message_type,
            reject_reason_code,
        })
    }
}

// ---------------------------------------------------------------------------
// Order entry
// ---------------------------------------------------------------------------

/// New order entry (data code 1111).
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub issue_code: Option<String>,
    pub side: char,
    pub execution_condition: char,
    pub order_price: Option<Price>,
    pub order_quantity: Option<i64>,
    pub proprietary_brokerage: char,
    pub cash_margin_code: char,
    pub short_sell_flag: char,
    pub stabilization_arbitrage_code: char,
    pub order_attribute: char,
    pub support_member: char,
    pub internal_processing: Option<String>,
    pub optional: Option<String>,
}

impl Default for NewOrder {
    fn default() -> Self {
        Self {
            issue_code: None,
            side: codes::SIDE_BUY,
            execution_condition: '0',
            order_price: None,
            order_quantity: None,
            proprietary_brokerage: '0',
            cash_margin_code: '0',
            short_sell_flag: '0',
            stabilization_arbitrage_code: '0',
            order_attribute: '1',
            support_member: '0',
            internal_processing: None,
            optional: Some("0000".to_string()),
        }
    }
}

impl WireLayer for NewOrder {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_char(buf, self.side);
        put_char(buf, self.execution_condition);
        put_price(buf, self.order_price.as_ref(), 8, 4);
        put_int(buf, self.order_quantity, 13);
        put_char(buf, self.proprietary_brokerage);
        put_char(buf, self.cash_margin_code);
        put_char(buf, self.short_sell_flag);
        put_char(buf, self.stabilization_arbitrage_code);
        put_char(buf, self.order_attribute);
        put_char(buf, self.support_member);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_rpad(buf, self.optional.as_deref(), 4);
        put_spaces(buf, 19);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let side = r.char_enum("Side", codes::SIDE)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let order_price = r.price("OrderPrice", 8, 4)?;
        let order_quantity = r.int("OrderQuantity", 13)?;
        let proprietary_brokerage = r.char_enum("ProprietaryBrokerage", codes::PROP_BROKERAGE)?;
        let cash_margin_code = r.char_enum("CashMarginCode", codes::CASH_MARGIN)?;
        let short_sell_flag = r.char_enum("ShortSellFlag", codes::SHORT_SELL)?;
        let stabilization_arbitrage_code =
            r.char_enum("StabilizationArbitrageCode", codes::STAB_ARB)?;
        let order_attribute = r.char_enum("OrderAttribute", codes::ORDER_ATTRIBUTE)?;
        let support_member = r.char_enum("SupportMember", codes::SUPPORT_MEMBER)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let optional = r.rpad("Optional", 4)?;
        r.skip(19)?;
        Ok(Self {
            issue_code,
            side,
            execution_condition,
            order_price,
            order_quantity,
            proprietary_brokerage,
            cash_margin_code,
            short_sell_flag,
            stabilization_arbitrage_code,
            order_attribute,
            support_member,
            internal_processing,
            optional,
        })
    }
}

/// Order modification (data codes 5131 by acceptance-no, 9132 by internal).
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationOrder {
    pub issue_code: Option<String>,
    pub order_acceptance_no: Option<i64>,
    pub internal_processing: Option<String>,
    pub execution_condition: char,
    pub order_price: Option<Price>,
    pub reduction_quantity: Option<i64>,
    pub optional: Option<String>,
}

impl Default for ModificationOrder {
    fn default() -> Self {
        Self {
            issue_code: None,
            order_acceptance_no: None,
            internal_processing: None,
            execution_condition: ' ',
            order_price: None,
            reduction_quantity: None,
            optional: None,
        }
    }
}

impl WireLayer for ModificationOrder {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_int(buf, self.order_acceptance_no, 14);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_char(buf, self.execution_condition);
        put_price(buf, self.order_price.as_ref(), 8, 4);
        put_int(buf, self.reduction_quantity, 13);
        put_rpad(buf, self.optional.as_deref(), 4);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let order_acceptance_no = r.int("OrderAcceptanceNo", 14)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let order_price = r.price("OrderPrice", 8, 4)?;
        let reduction_quantity = r.int("ReductionQuantity", 13)?;
        let optional = r.rpad("Optional", 4)?;
        Ok(Self {
            issue_code,
            order_acceptance_no,
            internal_processing,
            execution_condition,
            order_price,
            reduction_quantity,
            optional,
        })
    }
}

/// Order cancellation (data codes 3121 by acceptance-no, 7122 by internal).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelOrder {
    pub issue_code: Option<String>,
    pub order_acceptance_no: Option<i64>,
    pub internal_processing: Option<String>,
}

impl WireLayer for CancelOrder {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_int(buf, self.order_acceptance_no, 14);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let order_acceptance_no = r.int("OrderAcceptanceNo", 14)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        Ok(Self {
            issue_code,
            order_acceptance_no,
            internal_processing,
        })
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// New-order acceptance notice layout (data codes A111, C119, K219).
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderAcceptanceNotice {
    pub issue_code: Option<String>,
    pub side: char,
    pub execution_condition: char,
    pub order_price: Option<Price>,
    pub order_quantity: Option<i64>,
    pub proprietary_brokerage: char,
    pub cash_margin_code: char,
    pub short_sell_flag: char,
    pub stabilization_arbitrage_code: char,
    pub order_attribute: char,
    pub support_member: char,
    pub internal_processing: Option<String>,
    pub optional: Option<String>,
    pub order_acceptance_no: Option<String>,
}

impl Default for NewOrderAcceptanceNotice {
    fn default() -> Self {
        Self {
            issue_code: None,
            side: codes::SIDE_BUY,
            execution_condition: '0',
            order_price: None,
            order_quantity: None,
            proprietary_brokerage: '0',
            cash_margin_code: '0',
            short_sell_flag: '0',
            stabilization_arbitrage_code: '0',
            order_attribute: '1',
            support_member: '0',
            internal_processing: None,
            optional: Some("0000".to_string()),
            order_acceptance_no: None,
        }
    }
}

impl WireLayer for NewOrderAcceptanceNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_char(buf, self.side);
        put_char(buf, self.execution_condition);
        put_price(buf, self.order_price.as_ref(), 8, 4);
        put_int(buf, self.order_quantity, 13);
        put_char(buf, self.proprietary_brokerage);
        put_char(buf, self.cash_margin_code);
        put_char(buf, self.short_sell_flag);
        put_char(buf, self.stabilization_arbitrage_code);
        put_char(buf, self.order_attribute);
        put_char(buf, self.support_member);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_rpad(buf, self.optional.as_deref(), 4);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_spaces(buf, 19);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let side = r.char_enum("Side", codes::SIDE)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let order_price = r.price("OrderPrice", 8, 4)?;
        let order_quantity = r.int("OrderQuantity", 13)?;
        let proprietary_brokerage = r.char_enum("ProprietaryBrokerage", codes::PROP_BROKERAGE)?;
        let cash_margin_code = r.char_enum("CashMarginCode", codes::CASH_MARGIN)?;
        let short_sell_flag = r.char_enum("ShortSellFlag", codes::SHORT_SELL)?;
        let stabilization_arbitrage_code =
            r.char_enum("StabilizationArbitrageCode", codes::STAB_ARB)?;
        let order_attribute = r.char_enum("OrderAttribute", codes::ORDER_ATTRIBUTE)?;
        let support_member = r.char_enum("SupportMember", codes::SUPPORT_MEMBER)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let optional = r.rpad("Optional", 4)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        r.skip(19)?;
        Ok(Self {
            issue_code,
            side,
            execution_condition,
            order_price,
            order_quantity,
            proprietary_brokerage,
            cash_margin_code,
            short_sell_flag,
            stabilization_arbitrage_code,
            order_attribute,
            support_member,
            internal_processing,
            optional,
            order_acceptance_no,
        })
    }
}

/// Modification acceptance notice layout (data codes B131, D139, K239).
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationOrderAcceptanceNotice {
    pub issue_code: Option<String>,
    pub order_acceptance_no: Option<String>,
    pub internal_processing: Option<String>,
    pub execution_condition: char,
    pub order_price: Option<Price>,
    pub reduction_quantity: Option<i64>,
    pub optional: Option<String>,
}

impl Default for ModificationOrderAcceptanceNotice {
    fn default() -> Self {
        Self {
            issue_code: None,
            order_acceptance_no: None,
            internal_processing: None,
            execution_condition: '0',
            order_price: None,
            reduction_quantity: None,
            optional: None,
        }
    }
}

impl WireLayer for ModificationOrderAcceptanceNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_char(buf, self.execution_condition);
        put_price(buf, self.order_price.as_ref(), 8, 4);
        put_int(buf, self.reduction_quantity, 13);
        put_rpad(buf, self.optional.as_deref(), 4);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let order_price = r.price("OrderPrice", 8, 4)?;
        let reduction_quantity = r.int("ReductionQuantity", 13)?;
        let optional = r.rpad("Optional", 4)?;
        Ok(Self {
            issue_code,
            order_acceptance_no,
            internal_processing,
            execution_condition,
            order_price,
            reduction_quantity,
            optional,
        })
    }
}

/// Modification result notice layout (data code F231).
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationOrderResultNotice {
    pub issue_code: Option<String>,
    pub order_acceptance_no: Option<String>,
    pub internal_processing: Option<String>,
    pub optional: Option<String>,
    pub execution_condition: char,
    pub order_price: Option<Price>,
    pub order_quantity: Option<i64>,
    pub optional2: Option<String>,
    pub partially_executed_quantity: Option<i64>,
    pub reduction_completed_quantity: Option<i64>,
    pub notice_no: Option<i64>,
}

impl Default for ModificationOrderResultNotice {
    fn default() -> Self {
        Self {
            issue_code: None,
            order_acceptance_no: None,
            internal_processing: None,
            optional: None,
            execution_condition: '0',
            order_price: None,
            order_quantity: None,
            optional2: None,
            partially_executed_quantity: None,
            reduction_completed_quantity: None,
            notice_no: None,
        }
    }
}

impl WireLayer for ModificationOrderResultNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_rpad(buf, self.optional.as_deref(), 4);
        put_char(buf, self.execution_condition);
        put_price(buf, self.order_price.as_ref(), 8, 4);
        put_int(buf, self.order_quantity, 13);
        put_rpad(buf, self.optional2.as_deref(), 4);
        put_int(buf, self.partially_executed_quantity, 13);
        put_int(buf, self.reduction_completed_quantity, 13);
        put_int(buf, self.notice_no, 13);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let optional = r.rpad("Optional", 4)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let order_price = r.price("OrderPrice", 8, 4)?;
        let order_quantity = r.int("OrderQuantity", 13)?;
        let optional2 = r.rpad("Optional2", 4)?;
        let partially_executed_quantity = r.int("PartiallyExecutedQuantity", 13)?;
        let reduction_completed_quantity = r.int("ReductionCompletedQuantity", 13)?;
        let notice_no = r.int("NoticeNo", 13)?;
        Ok(Self {
            issue_code,
            order_acceptance_no,
            internal_processing,
            optional,
            execution_condition,
            order_price,
            order_quantity,
            optional2,
            partially_executed_quantity,
            reduction_completed_quantity,
            notice_no,
        })
    }
}

/// Cancel acceptance notice layout (data codes B121, D129, K229).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelOrderAcceptanceNotice {
    pub issue_code: Option<String>,
    pub order_acceptance_no: Option<String>,
    pub internal_processing: Option<String>,
}

impl WireLayer for CancelOrderAcceptanceNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        Ok(Self {
            issue_code,
            order_acceptance_no,
            internal_processing,
        })
    }
}

/// Cancel result notice layout (data code F221).
#[derive(Debug, Clone, PartialEq)]
pub struct CancelOrderResultNotice {
    pub issue_code: Option<String>,
    pub order_acceptance_no: Option<String>,
    pub internal_processing: Option<String>,
    pub optional: Option<String>,
    pub partially_executed_quantity: Option<i64>,
    pub reduction_completed_quantity: Option<i64>,
    pub notice_no: Option<i64>,
}

impl Default for CancelOrderResultNotice {
    fn default() -> Self {
        Self {
            issue_code: None,
            order_acceptance_no: None,
            internal_processing: None,
            optional: Some("0000".to_string()),
            partially_executed_quantity: None,
            reduction_completed_quantity: None,
            notice_no: None,
        }
    }
}

impl WireLayer for CancelOrderResultNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_rpad(buf, self.optional.as_deref(), 4);
        put_int(buf, self.partially_executed_quantity, 13);
        put_int(buf, self.reduction_completed_quantity, 13);
        put_int(buf, self.notice_no, 13);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let optional = r.rpad("Optional", 4)?;
        let partially_executed_quantity = r.int("PartiallyExecutedQuantity", 13)?;
        let reduction_completed_quantity = r.int("ReductionCompletedQuantity", 13)?;
        let notice_no = r.int("NoticeNo", 13)?;
        Ok(Self {
            issue_code,
            order_acceptance_no,
            internal_processing,
            optional,
            partially_executed_quantity,
            reduction_completed_quantity,
            notice_no,
        })
    }
}

/// Execution completion notice layout (data code J211).
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionCompletionNotice {
    pub issue_code: Option<String>,
    pub side: char,
    pub execution_condition: char,
    pub execution_price: Option<Price>,
    pub executed_quantity: Option<i64>,
    pub proprietary_brokerage: char,
    pub cash_margin_code: char,
    pub short_sell_flag: char,
    pub stabilization_arbitrage_code: char,
    pub order_attribute: char,
    pub support_member: char,
    pub internal_processing: Option<String>,
    pub optional: Option<String>,
    pub valid_order_quantity: Option<i64>,
    pub cross_flag: char,
    pub price_flag: char,
    pub execution_notice_no: Option<i64>,
    pub order_acceptance_no: Option<String>,
    pub notice_no: Option<i64>,
}

impl Default for ExecutionCompletionNotice {
    fn default() -> Self {
        Self {
            issue_code: None,
            side: ' ',
            execution_condition: '0',
            execution_price: None,
            executed_quantity: None,
            proprietary_brokerage: '0',
            cash_margin_code: '0',
            short_sell_flag: '0',
            stabilization_arbitrage_code: '0',
            order_attribute: '1',
            support_member: '0',
            internal_processing: None,
            optional: Some("0000".to_string()),
            valid_order_quantity: None,
            cross_flag: ' ',
            price_flag: ' ',
            execution_notice_no: None,
            order_acceptance_no: None,
            notice_no: None,
        }
    }
}

impl WireLayer for ExecutionCompletionNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_char(buf, self.side);
        put_char(buf, self.execution_condition);
        put_price(buf, self.execution_price.as_ref(), 8, 4);
        put_int(buf, self.executed_quantity, 13);
        put_char(buf, self.proprietary_brokerage);
        put_char(buf, self.cash_margin_code);
        put_char(buf, self.short_sell_flag);
        put_char(buf, self.stabilization_arbitrage_code);
        put_char(buf, self.order_attribute);
        put_char(buf, self.support_member);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_rpad(buf, self.optional.as_deref(), 4);
        put_spaces(buf, 19);
        put_int(buf, self.valid_order_quantity, 13);
        put_char(buf, self.cross_flag);
        put_char(buf, self.price_flag);
        put_int(buf, self.execution_notice_no, 8);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_int(buf, self.notice_no, 13);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let side = r.char_enum("Side", codes::SIDE)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let execution_price = r.price("ExecutionPrice", 8, 4)?;
        let executed_quantity = r.int("ExecutedQuantity", 13)?;
        let proprietary_brokerage = r.char_enum("ProprietaryBrokerage", codes::PROP_BROKERAGE)?;
        let cash_margin_code = r.char_enum("CashMarginCode", codes::CASH_MARGIN)?;
        let short_sell_flag = r.char_enum("ShortSellFlag", codes::SHORT_SELL)?;
        let stabilization_arbitrage_code =
            r.char_enum("StabilizationArbitrageCode", codes::STAB_ARB)?;
        let order_attribute = r.char_enum("OrderAttribute", codes::ORDER_ATTRIBUTE)?;
        let support_member = r.char_enum("SupportMember", codes::SUPPORT_MEMBER)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let optional = r.rpad("Optional", 4)?;
        r.skip(19)?;
        let valid_order_quantity = r.int("ValidOrderQuantity", 13)?;
        let cross_flag = r.char_enum("CrossFlag", codes::CROSS_FLAG)?;
        let price_flag = r.char_enum("PriceFlag", codes::PRICE_FLAG)?;
        let execution_notice_no = r.int("ExecutionNoticeNo", 8)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        let notice_no = r.int("NoticeNo", 13)?;
        Ok(Self {
            issue_code,
            side,
            execution_condition,
            execution_price,
            executed_quantity,
            proprietary_brokerage,
            cash_margin_code,
            short_sell_flag,
            stabilization_arbitrage_code,
            order_attribute,
            support_member,
            internal_processing,
            optional,
            valid_order_quantity,
            cross_flag,
            price_flag,
            execution_notice_no,
            order_acceptance_no,
            notice_no,
        })
    }
}

/// Invalidation result notice layout (data code K241).
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationResultNotice {
    pub issue_code: Option<String>,
    pub side: char,
    pub execution_condition: char,
    pub execution_price: Option<Price>,
    pub executed_quantity: Option<i64>,
    pub proprietary_brokerage: char,
    pub cash_margin_code: char,
    pub short_sell_flag: char,
    pub stabilization_arbitrage_code: char,
    pub order_attribute: char,
    pub support_member: char,
    pub internal_processing: Option<String>,
    pub optional: Option<String>,
    pub order_acceptance_no: Option<String>,
    pub partially_executed_quantity: Option<i64>,
    pub limit_flag: char,
    pub notice_no: Option<i64>,
}

impl Default for InvalidationResultNotice {
    fn default() -> Self {
        Self {
            issue_code: None,
            side: ' ',
            execution_condition: '0',
            execution_price: None,
            executed_quantity: None,
            proprietary_brokerage: '0',
            cash_margin_code: '0',
            short_sell_flag: '0',
            stabilization_arbitrage_code: '0',
            order_attribute: '1',
            support_member: '0',
            internal_processing: None,
            optional: Some("0000".to_string()),
            order_acceptance_no: None,
            partially_executed_quantity: None,
            limit_flag: ' ',
            notice_no: None,
        }
    }
}

impl WireLayer for InvalidationResultNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_char(buf, self.side);
        put_char(buf, self.execution_condition);
        put_price(buf, self.execution_price.as_ref(), 8, 4);
        put_int(buf, self.executed_quantity, 13);
        put_char(buf, self.proprietary_brokerage);
        put_char(buf, self.cash_margin_code);
        put_char(buf, self.short_sell_flag);
        put_char(buf, self.stabilization_arbitrage_code);
        put_char(buf, self.order_attribute);
        put_char(buf, self.support_member);
        put_rpad(buf, self.internal_processing.as_deref(), 20);
        put_rpad(buf, self.optional.as_deref(), 4);
        put_rpad(buf, self.order_acceptance_no.as_deref(), 14);
        put_spaces(buf, 19);
        put_int(buf, self.partially_executed_quantity, 13);
        put_char(buf, self.limit_flag);
        put_int(buf, self.notice_no, 13);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let side = r.char_enum("Side", codes::SIDE)?;
        let execution_condition = r.char_enum("ExecutionCondition", codes::EXEC_CONDITION)?;
        let execution_price = r.price("ExecutionPrice", 8, 4)?;
        let executed_quantity = r.int("ExecutedQuantity", 13)?;
        let proprietary_brokerage = r.char_enum("ProprietaryBrokerage", codes::PROP_BROKERAGE)?;
        let cash_margin_code = r.char_enum("CashMarginCode", codes::CASH_MARGIN)?;
        let short_sell_flag = r.char_enum("ShortSellFlag", codes::SHORT_SELL)?;
        let stabilization_arbitrage_code =
            r.char_enum("StabilizationArbitrageCode", codes::STAB_ARB)?;
        let order_attribute = r.char_enum("OrderAttribute", codes::ORDER_ATTRIBUTE)?;
        let support_member = r.char_enum("SupportMember", codes::SUPPORT_MEMBER)?;
        let internal_processing = r.rpad("InternalProcessing", 20)?;
        let optional = r.rpad("Optional", 4)?;
        let order_acceptance_no = r.rpad("OrderAcceptanceNo", 14)?;
        r.skip(19)?;
        let partially_executed_quantity = r.int("PartiallyExecutedQuantity", 13)?;
        let limit_flag = r.char_enum("LimitFlag", codes::LIMIT_FLAG)?;
        let notice_no = r.int("NoticeNo", 13)?;
        Ok(Self {
            issue_code,
            side,
            execution_condition,
            execution_price,
            executed_quantity,
            proprietary_brokerage,
            cash_margin_code,
            short_sell_flag,
            stabilization_arbitrage_code,
            order_attribute,
            support_member,
            internal_processing,
            optional,
            order_acceptance_no,
            partially_executed_quantity,
            limit_flag,
            notice_no,
        })
    }
}

/// Output completion notice layout (data codes A191, J291).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCompletionNotice {
    pub session_type: String,
}

impl Default for OutputCompletionNotice {
    fn default() -> Self {
        Self {
            session_type: "1".to_string(),
        }
    }
}

impl WireLayer for OutputCompletionNotice {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.session_type), 1);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let session_type = r.fixed("SessionType", 1)?.to_string();
        Ok(Self { session_type })
    }
}

// ---------------------------------------------------------------------------
// Administrative (down)
// ---------------------------------------------------------------------------

/// Market operation/acceptance status (data code T111).
#[derive(Debug, Clone, PartialEq)]
pub struct MarketAdmin {
    pub operation_status: char,
    pub order_status: char,
}

impl Default for MarketAdmin {
    fn default() -> Self {
        Self {
            operation_status: '1',
            order_status: '1',
        }
    }
}

impl WireLayer for MarketAdmin {
    fn encode(&self, buf: &mut BytesMut) {
        put_char(buf, self.operation_status);
        put_char(buf, self.order_status);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let operation_status = r.char_enum("OperationStatus", codes::OPERATION_STATUS)?;
        let order_status = r.char_enum("OrderStatus", codes::ORDER_STATUS)?;
        Ok(Self {
            operation_status,
            order_status,
        })
    }
}

/// Trading halt notification (data code T311).
#[derive(Debug, Clone, PartialEq)]
pub struct TradingHalt {
    pub type_code: String,
    pub target_range_code: String,
    pub target_exchange_code: String,
    pub target_market_code: String,
    pub target_issue_code: Option<String>,
    pub time_of_occurrence: Option<NaiveTime>,
    pub order_acceptance_restart_time: Option<NaiveTime>,
    pub effective_time: Option<NaiveTime>,
    pub issue_codes: [Option<String>; 10],
}

impl Default for TradingHalt {
    fn default() -> Self {
        Self {
            type_code: "A001".to_string(),
            target_range_code: " 1".to_string(),
            target_exchange_code: "1".to_string(),
            target_market_code: "11".to_string(),
            target_issue_code: None,
            time_of_occurrence: None,
            order_acceptance_restart_time: None,
            effective_time: None,
            issue_codes: Default::default(),
        }
    }
}

impl WireLayer for TradingHalt {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.type_code), 4);
        put_rpad(buf, Some(&self.target_range_code), 2);
        put_rpad(buf, Some(&self.target_exchange_code), 1);
        put_rpad(buf, Some(&self.target_market_code), 2);
        put_spaces(buf, 2);
        put_rpad(buf, self.target_issue_code.as_deref(), 12);
        put_time9(buf, self.time_of_occurrence);
        put_time9(buf, self.order_acceptance_restart_time);
        put_time9(buf, self.effective_time);
        for code in &self.issue_codes {
            put_rpad(buf, code.as_deref(), 12);
        }
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let type_code = r.fixed("TypeCode", 4)?.to_string();
        let target_range_code = r.fixed("TargetRangeCode", 2)?.to_string();
        let target_exchange_code = r.fixed("TargetExchangeCode", 1)?.to_string();
        let target_market_code = r.fixed("TargetMarketCode", 2)?.to_string();
        r.skip(2)?;
        let target_issue_code = r.rpad("TargetIssueCode", 12)?;
        let time_of_occurrence = r.time9("TimeOfOccurrence")?;
        let order_acceptance_restart_time = r.time9("OrderAcceptanceRestartTime")?;
        let effective_time = r.time9("EffectiveTime")?;
        let mut issue_codes: [Option<String>; 10] = Default::default();
        for slot in &mut issue_codes {
            *slot = r.rpad("IssueCode", 12)?;
        }
        Ok(Self {
            type_code,
            target_range_code,
            target_exchange_code,
            target_market_code,
            target_issue_code,
            time_of_occurrence,
            order_acceptance_restart_time,
            effective_time,
            issue_codes,
        })
    }
}

/// Daily price limit information (data code T321).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLimitInfo {
    pub type_code: String,
    pub target_range_code: String,
    pub target_exchange_code: String,
    pub target_market_code: String,
    pub issue_code: Option<String>,
    pub time_of_occurrence: Option<NaiveTime>,
    pub base_price: Option<Price>,
    pub daily_upper_price_limit: Option<Price>,
    pub daily_lower_price_limit: Option<Price>,
}

impl Default for PriceLimitInfo {
    fn default() -> Self {
        Self {
            type_code: "A031".to_string(),
            target_range_code: " 1".to_string(),
            target_exchange_code: "1".to_string(),
            target_market_code: "11".to_string(),
            issue_code: None,
            time_of_occurrence: None,
            base_price: None,
            daily_upper_price_limit: None,
            daily_lower_price_limit: None,
        }
    }
}

impl WireLayer for PriceLimitInfo {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.type_code), 4);
        put_rpad(buf, Some(&self.target_range_code), 2);
        put_rpad(buf, Some(&self.target_exchange_code), 1);
        put_rpad(buf, Some(&self.target_market_code), 2);
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_time9(buf, self.time_of_occurrence);
        put_price(buf, self.base_price.as_ref(), 8, 4);
        put_price(buf, self.daily_upper_price_limit.as_ref(), 8, 4);
        put_price(buf, self.daily_lower_price_limit.as_ref(), 8, 4);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let type_code = r.fixed("TypeCode", 4)?.to_string();
        let target_range_code = r.fixed("TargetRangeCode", 2)?.to_string();
        let target_exchange_code = r.fixed("TargetExchangeCode", 1)?.to_string();
        let target_market_code = r.fixed("TargetMarketCode", 2)?.to_string();
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let time_of_occurrence = r.time9("TimeOfOccurrence")?;
        let base_price = r.price("BasePrice", 8, 4)?;
        let daily_upper_price_limit = r.price("DailyUpperPriceLimit", 8, 4)?;
        let daily_lower_price_limit = r.price("DailyLowerPriceLimit", 8, 4)?;
        Ok(Self {
            type_code,
            target_range_code,
            target_exchange_code,
            target_market_code,
            issue_code,
            time_of_occurrence,
            base_price,
            daily_upper_price_limit,
            daily_lower_price_limit,
        })
    }
}

/// Free-form warning broadcast (data code T331).
#[derive(Debug, Clone, PartialEq)]
pub struct FreeFormWarning {
    pub type_code: String,
    pub target_range_code: String,
    pub target_exchange_code: String,
    pub target_market_code: String,
    pub issue_code: Option<String>,
    pub time_of_occurrence: Option<NaiveTime>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Default for FreeFormWarning {
    fn default() -> Self {
        Self {
            type_code: "A081".to_string(),
            target_range_code: " 1".to_string(),
            target_exchange_code: "1".to_string(),
            target_market_code: "11".to_string(),
            issue_code: None,
            time_of_occurrence: None,
            title: None,
            body: None,
        }
    }
}

impl WireLayer for FreeFormWarning {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.type_code), 4);
        put_rpad(buf, Some(&self.target_range_code), 2);
        put_rpad(buf, Some(&self.target_exchange_code), 1);
        put_rpad(buf, Some(&self.target_market_code), 2);
        put_spaces(buf, 2);
        put_rpad(buf, self.issue_code.as_deref(), 12);
        put_time9(buf, self.time_of_occurrence);
        put_rpad(buf, self.title.as_deref(), 60);
        put_rpad(buf, self.body.as_deref(), 600);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let type_code = r.fixed("TypeCode", 4)?.to_string();
        let target_range_code = r.fixed("TargetRangeCode", 2)?.to_string();
        let target_exchange_code = r.fixed("TargetExchangeCode", 1)?.to_string();
        let target_market_code = r.fixed("TargetMarketCode", 2)?.to_string();
        r.skip(2)?;
        let issue_code = r.rpad("IssueCode", 12)?;
        let time_of_occurrence = r.time9("TimeOfOccurrence")?;
        let title = r.rpad("Title", 60)?;
        let body = r.rpad("Body", 600)?;
        Ok(Self {
            type_code,
            target_range_code,
            target_exchange_code,
            target_market_code,
            issue_code,
            time_of_occurrence,
            title,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Administrative (up) and query responses
// ---------------------------------------------------------------------------

/// A proxy-source triplet carried in operation start messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProxySource {
    pub virtual_server_no: Option<String>,
    pub acceptance_seq_no: Option<i64>,
    pub execution_seq_no: Option<i64>,
}

impl ProxySource {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_int(buf, self.acceptance_seq_no, 8);
        put_int(buf, self.execution_seq_no, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            virtual_server_no: r.rpad("ProxySourceVirtualServerNo", 6)?,
            acceptance_seq_no: r.int("ProxySourceAcceptanceSeqNo", 8)?,
            execution_seq_no: r.int("ProxySourceExecutionSeqNo", 8)?,
        })
    }
}

/// Operation start request (data code 6211).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpStart {
    pub acceptance_seq_no: Option<i64>,
    pub execution_seq_no: Option<i64>,
    pub proxy_sources: [ProxySource; 3],
}

impl WireLayer for OpStart {
    fn encode(&self, buf: &mut BytesMut) {
        put_int(buf, self.acceptance_seq_no, 8);
        put_int(buf, self.execution_seq_no, 8);
        for source in &self.proxy_sources {
            source.encode(buf);
        }
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let acceptance_seq_no = r.int("AcceptanceSeqNo", 8)?;
        let execution_seq_no = r.int("ExecutionSeqNo", 8)?;
        let mut proxy_sources: [ProxySource; 3] = Default::default();
        for slot in &mut proxy_sources {
            *slot = ProxySource::decode(r)?;
        }
        Ok(Self {
            acceptance_seq_no,
            execution_seq_no,
            proxy_sources,
        })
    }
}

/// Operation start response layout (data codes T211, T219).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpStartResponse {
    pub acceptance_seq_no: Option<i64>,
    pub execution_seq_no: Option<i64>,
    pub order_entry_seq_no: Option<i64>,
    pub proxy_sources: [ProxySource; 3],
}

impl WireLayer for OpStartResponse {
    fn encode(&self, buf: &mut BytesMut) {
        put_int(buf, self.acceptance_seq_no, 8);
        put_int(buf, self.execution_seq_no, 8);
        put_int(buf, self.order_entry_seq_no, 8);
        for source in &self.proxy_sources {
            source.encode(buf);
        }
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let acceptance_seq_no = r.int("AcceptanceSeqNo", 8)?;
        let execution_seq_no = r.int("ExecutionSeqNo", 8)?;
        let order_entry_seq_no = r.int("OrderEntrySeqNo", 8)?;
        let mut proxy_sources: [ProxySource; 3] = Default::default();
        for slot in &mut proxy_sources {
            *slot = ProxySource::decode(r)?;
        }
        Ok(Self {
            acceptance_seq_no,
            execution_seq_no,
            order_entry_seq_no,
            proxy_sources,
        })
    }
}

/// Retransmission request/response layout (data codes 6231, T231, T239).
#[derive(Debug, Clone, PartialEq)]
pub struct Retransmission {
    pub virtual_server_no: Option<String>,
    pub notice_type: String,
    pub start_seq_no: Option<i64>,
    pub end_seq_no: Option<i64>,
}

impl Default for Retransmission {
    fn default() -> Self {
        Self {
            virtual_server_no: None,
            notice_type: "0".to_string(),
            start_seq_no: None,
            end_seq_no: None,
        }
    }
}

impl WireLayer for Retransmission {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_rpad(buf, Some(&self.notice_type), 1);
        put_int(buf, self.start_seq_no, 8);
        put_int(buf, self.end_seq_no, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let virtual_server_no = r.rpad("VirtualServerNo", 6)?;
        let notice_type = r.fixed("NoticeType", 1)?.to_string();
        let start_seq_no = r.int("StartSeqNo", 8)?;
        let end_seq_no = r.int("EndSeqNo", 8)?;
        Ok(Self {
            virtual_server_no,
            notice_type,
            start_seq_no,
            end_seq_no,
        })
    }
}

/// Proxy request/response layout (data codes 6241, T241, T249).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proxy {
    pub proxy_src_virtual_server_no: Option<String>,
    pub proxy_dest_virtual_server_no: Option<String>,
    pub acceptance_seq_no: Option<i64>,
    pub execution_seq_no: Option<i64>,
}

impl WireLayer for Proxy {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.proxy_src_virtual_server_no.as_deref(), 6);
        put_rpad(buf, self.proxy_dest_virtual_server_no.as_deref(), 6);
        put_int(buf, self.acceptance_seq_no, 8);
        put_int(buf, self.execution_seq_no, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            proxy_src_virtual_server_no: r.rpad("ProxySrcVirtualServerNo", 6)?,
            proxy_dest_virtual_server_no: r.rpad("ProxyDestVirtualServerNo", 6)?,
            acceptance_seq_no: r.int("AcceptanceSeqNo", 8)?,
            execution_seq_no: r.int("ExecutionSeqNo", 8)?,
        })
    }
}

/// Proxy abort layout (data codes 6251, T251, T259).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProxyAbort {
    pub proxy_src_virtual_server_no: Option<String>,
}

impl WireLayer for ProxyAbort {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.proxy_src_virtual_server_no.as_deref(), 6);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            proxy_src_virtual_server_no: r.rpad("ProxySrcVirtualServerNo", 6)?,
        })
    }
}

/// Notice destination setup layout (data codes 6291, T291, T299).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeDestSetup {
    pub virtual_server_no: Option<String>,
}

impl WireLayer for NoticeDestSetup {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_spaces(buf, 6);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let virtual_server_no = r.rpad("VirtualServerNo", 6)?;
        r.skip(6)?;
        Ok(Self { virtual_server_no })
    }
}

/// Notice destination enquiry request layout (data codes 62A1, 6261).
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeDestEnqRequest {
    pub enquiry_target: String,
    pub virtual_server_no: Option<String>,
}

impl Default for NoticeDestEnqRequest {
    fn default() -> Self {
        Self {
            enquiry_target: "0".to_string(),
            virtual_server_no: None,
        }
    }
}

impl WireLayer for NoticeDestEnqRequest {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.enquiry_target), 1);
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let enquiry_target = r.fixed("EnquiryTarget", 1)?.to_string();
        let virtual_server_no = r.rpad("VirtualServerNo", 6)?;
        Ok(Self {
            enquiry_target,
            virtual_server_no,
        })
    }
}

/// Notice destination enquiry response layout (data codes T2A1, T2A9, T261,
/// T269).
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeDestEnqResponse {
    pub enquiry_target: String,
    pub virtual_server_no1: Option<String>,
    pub virtual_server_no2: Option<String>,
    pub virtual_server_no3: Option<String>,
}

impl Default for NoticeDestEnqResponse {
    fn default() -> Self {
        Self {
            enquiry_target: "0".to_string(),
            virtual_server_no1: None,
            virtual_server_no2: None,
            virtual_server_no3: None,
        }
    }
}

impl WireLayer for NoticeDestEnqResponse {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, Some(&self.enquiry_target), 1);
        put_rpad(buf, self.virtual_server_no1.as_deref(), 6);
        put_rpad(buf, self.virtual_server_no2.as_deref(), 6);
        put_rpad(buf, self.virtual_server_no3.as_deref(), 6);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        let enquiry_target = r.fixed("EnquiryTarget", 1)?.to_string();
        let virtual_server_no1 = r.rpad("VirtualServerNo1", 6)?;
        let virtual_server_no2 = r.rpad("VirtualServerNo2", 6)?;
        let virtual_server_no3 = r.rpad("VirtualServerNo3", 6)?;
        Ok(Self {
            enquiry_target,
            virtual_server_no1,
            virtual_server_no2,
            virtual_server_no3,
        })
    }
}

/// Virtual-server reference layout used by sequence enquiries, order
/// suspension, and hard-limit enquiry requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualServerRef {
    pub virtual_server_no: Option<String>,
}

impl WireLayer for VirtualServerRef {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            virtual_server_no: r.rpad("VirtualServerNo", 6)?,
        })
    }
}

/// Order sequence number enquiry response layout (data codes T271, T279).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSeqNoEnquiryResponse {
    pub virtual_server_no: Option<String>,
    pub last_seq_no: Option<i64>,
    pub last_order_classification: Option<i64>,
}

impl WireLayer for OrderSeqNoEnquiryResponse {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_int(buf, self.last_seq_no, 8);
        put_int(buf, self.last_order_classification, 1);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            virtual_server_no: r.rpad("VirtualServerNo", 6)?,
            last_seq_no: r.int("LastSeqNo", 8)?,
            last_order_classification: r.int("LastOrderClassification", 1)?,
        })
    }
}

/// Notice sequence number enquiry response layout (data codes T281, T289).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeSeqNoEnquiryResponse {
    pub virtual_server_no: Option<String>,
    pub acceptance_seq_no: Option<i64>,
    pub execution_seq_no: Option<i64>,
}

impl WireLayer for NoticeSeqNoEnquiryResponse {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_int(buf, self.acceptance_seq_no, 8);
        put_int(buf, self.execution_seq_no, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            virtual_server_no: r.rpad("VirtualServerNo", 6)?,
            acceptance_seq_no: r.int("AcceptanceSeqNo", 8)?,
            execution_seq_no: r.int("ExecutionSeqNo", 8)?,
        })
    }
}

/// Hard limit setup layout (data codes 62D1, T2D1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardLimitSetup {
    pub virtual_server_no: Option<String>,
    pub order_limit: Option<Price>,
    pub cumulative_order_limit: Option<Price>,
    pub cumulative_order_interval: Option<i64>,
    pub cumulative_execution_limit: Option<Price>,
    pub cumulative_execution_interval: Option<i64>,
}

impl WireLayer for HardLimitSetup {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.virtual_server_no.as_deref(), 6);
        put_price(buf, self.order_limit.as_ref(), 15, 4);
        put_price(buf, self.cumulative_order_limit.as_ref(), 15, 4);
        put_int(buf, self.cumulative_order_interval, 5);
        put_price(buf, self.cumulative_execution_limit.as_ref(), 15, 4);
        put_int(buf, self.cumulative_execution_interval, 5);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            virtual_server_no: r.rpad("VirtualServerNo", 6)?,
            order_limit: r.price("OrderLimit", 15, 4)?,
            cumulative_order_limit: r.price("CumulativeOrderLimit", 15, 4)?,
            cumulative_order_interval: r.int("CumulativeOrderInterval", 5)?,
            cumulative_execution_limit: r.price("CumulativeExecutionLimit", 15, 4)?,
            cumulative_execution_interval: r.int("CumulativeExecutionInterval", 5)?,
        })
    }
}

/// Hard limit enquiry response layout (data code T2E1).
#[derive(Debug, Clone, PartialEq)]
pub struct HardLimitEnquiryResponse {
    pub target_virtual_server_no: Option<String>,
    pub suspension_status: char,
    pub order_limit: Option<Price>,
    pub cumulative_order_limit: Option<Price>,
    pub cumulative_order_interval: Option<i64>,
    pub cumulative_order_last: Option<Price>,
    pub cumulative_order_start_time: Option<NaiveTime>,
    pub cumulative_order_first_seq_no: Option<i64>,
    pub cumulative_order_last_seq_no: Option<i64>,
    pub cumulative_execution_limit: Option<Price>,
    pub cumulative_execution_interval: Option<i64>,
    pub cumulative_execution_last: Option<Price>,
    pub cumulative_execution_start_time: Option<NaiveTime>,
    pub cumulative_execution_first_seq_no: Option<i64>,
    pub cumulative_execution_last_seq_no: Option<i64>,
}

impl Default for HardLimitEnquiryResponse {
    fn default() -> Self {
        Self {
            target_virtual_server_no: None,
            suspension_status: ' ',
            order_limit: None,
            cumulative_order_limit: None,
            cumulative_order_interval: None,
            cumulative_order_last: None,
            cumulative_order_start_time: None,
            cumulative_order_first_seq_no: None,
            cumulative_order_last_seq_no: None,
            cumulative_execution_limit: None,
            cumulative_execution_interval: None,
            cumulative_execution_last: None,
            cumulative_execution_start_time: None,
            cumulative_execution_first_seq_no: None,
            cumulative_execution_last_seq_no: None,
        }
    }
}

impl WireLayer for HardLimitEnquiryResponse {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.target_virtual_server_no.as_deref(), 6);
        put_char(buf, self.suspension_status);
        put_price(buf, self.order_limit.as_ref(), 15, 4);
        put_price(buf, self.cumulative_order_limit.as_ref(), 15, 4);
        put_int(buf, self.cumulative_order_interval, 5);
        put_price(buf, self.cumulative_order_last.as_ref(), 15, 4);
        put_time9(buf, self.cumulative_order_start_time);
        put_int(buf, self.cumulative_order_first_seq_no, 8);
        put_int(buf, self.cumulative_order_last_seq_no, 8);
        put_price(buf, self.cumulative_execution_limit.as_ref(), 15, 4);
        put_int(buf, self.cumulative_execution_interval, 5);
        put_price(buf, self.cumulative_execution_last.as_ref(), 15, 4);
        put_time9(buf, self.cumulative_execution_start_time);
        put_int(buf, self.cumulative_execution_first_seq_no, 8);
        put_int(buf, self.cumulative_execution_last_seq_no, 8);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            target_virtual_server_no: r.rpad("TargetVirtualServerNo", 6)?,
            suspension_status: r.char_enum("SuspensionStatus", codes::SUSPENSION_STATUS)?,
            order_limit: r.price("OrderLimit", 15, 4)?,
            cumulative_order_limit: r.price("CumulativeOrderLimit", 15, 4)?,
            cumulative_order_interval: r.int("CumulativeOrderInterval", 5)?,
            cumulative_order_last: r.price("CumulativeOrderLast", 15, 4)?,
            cumulative_order_start_time: r.time9("CumulativeOrderStartTime")?,
            cumulative_order_first_seq_no: r.int("CumulativeOrderFirstSeqNo", 8)?,
            cumulative_order_last_seq_no: r.int("CumulativeOrderLastSeqNo", 8)?,
            cumulative_execution_limit: r.price("CumulativeExecutionLimit", 15, 4)?,
            cumulative_execution_interval: r.int("CumulativeExecutionInterval", 5)?,
            cumulative_execution_last: r.price("CumulativeExecutionLast", 15, 4)?,
            cumulative_execution_start_time: r.time9("CumulativeExecutionStartTime")?,
            cumulative_execution_first_seq_no: r.int("CumulativeExecutionFirstSeqNo", 8)?,
            cumulative_execution_last_seq_no: r.int("CumulativeExecutionLastSeqNo", 8)?,
        })
    }
}

/// System error dump layout (data code T999).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemError {
    pub received_data: Option<String>,
}

impl WireLayer for SystemError {
    fn encode(&self, buf: &mut BytesMut) {
        put_rpad(buf, self.received_data.as_deref(), 200);
    }

    fn decode(r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            received_data: r.rpad("ReceivedData", 200)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: WireLayer + PartialEq + std::fmt::Debug>(value: &T, expect_len: usize) {
        let bytes = value.to_bytes();
        assert_eq!(bytes.len(), expect_len);
        let mut r = FieldReader::new(&bytes);
        let decoded = T::decode(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(&decoded, value);
    }

    #[test]
    fn test_new_order_round_trip() {
        let order = NewOrder {
            issue_code: Some("6758".to_string()),
            side: codes::SIDE_SELL,
            order_price: Some(Price::Limit("1500.5".parse().unwrap())),
            order_quantity: Some(100),
            internal_processing: Some("VIRTUA00000000000001".to_string()),
            ..NewOrder::default()
        };
        round_trip(&order, 91);
    }

    #[test]
    fn test_new_order_market_price() {
        let order = NewOrder {
            issue_code: Some("6758".to_string()),
            order_price: Some(Price::Market),
            order_quantity: Some(100),
            ..NewOrder::default()
        };
        round_trip(&order, 91);
    }

    #[test]
    fn test_modification_order_round_trip() {
        let modify = ModificationOrder {
            issue_code: Some("6758".to_string()),
            internal_processing: Some("VIRTUA00000000000001".to_string()),
            execution_condition: '0',
            order_price: Some(Price::Limit("1501.5".parse().unwrap())),
            reduction_quantity: Some(1),
            ..ModificationOrder::default()
        };
        round_trip(&modify, 79);
    }

    #[test]
    fn test_cancel_order_round_trip() {
        let cancel = CancelOrder {
            issue_code: Some("6758".to_string()),
            internal_processing: Some("VIRTUA00000000000001".to_string()),
            ..CancelOrder::default()
        };
        round_trip(&cancel, 48);
    }

    #[test]
    fn test_acceptance_notice_round_trip() {
        let notice = NewOrderAcceptanceNotice {
            issue_code: Some("6758".to_string()),
            side: codes::SIDE_SELL,
            order_price: Some(Price::Limit("1500.5".parse().unwrap())),
            order_quantity: Some(100),
            internal_processing: Some("VIRTUA00000000000001".to_string()),
            order_acceptance_no: Some("10000001".to_string()),
            ..NewOrderAcceptanceNotice::default()
        };
        round_trip(&notice, 105);
    }

    #[test]
    fn test_execution_completion_notice_round_trip() {
        let notice = ExecutionCompletionNotice {
            issue_code: Some("6758".to_string()),
            side: codes::SIDE_SELL,
            execution_price: Some(Price::Limit("1501.5".parse().unwrap())),
            executed_quantity: Some(50),
            internal_processing: Some("VIRTUA00000000000001".to_string()),
            order_acceptance_no: Some("10000001".to_string()),
            notice_no: Some(3),
            ..ExecutionCompletionNotice::default()
        };
        round_trip(&notice, 141);
    }

    #[test]
    fn test_cancel_result_notice_round_trip() {
        let notice = CancelOrderResultNotice {
            issue_code: Some("6758".to_string()),
            order_acceptance_no: Some("10000001".to_string()),
            internal_processing: Some("VIRTUA00000000000001".to_string()),
            partially_executed_quantity: Some(0),
            reduction_completed_quantity: Some(100),
            notice_no: Some(2),
            ..CancelOrderResultNotice::default()
        };
        round_trip(&notice, 91);
    }

    #[test]
    fn test_op_start_round_trip() {
        let op = OpStart {
            acceptance_seq_no: Some(12),
            execution_seq_no: Some(7),
            ..OpStart::default()
        };
        round_trip(&op, 8 + 8 + 3 * 22);
    }

    #[test]
    fn test_market_admin_round_trip() {
        round_trip(&MarketAdmin::default(), 2);
    }

    #[test]
    fn test_hard_limit_setup_round_trip() {
        let setup = HardLimitSetup {
            virtual_server_no: Some("VS0001".to_string()),
            order_limit: Some(Price::Limit("100000".parse().unwrap())),
            cumulative_order_interval: Some(60),
            ..HardLimitSetup::default()
        };
        round_trip(&setup, 6 + 20 + 20 + 5 + 20 + 5);
    }

    #[test]
    fn test_trading_halt_round_trip() {
        let mut halt = TradingHalt::default();
        halt.target_issue_code = Some("6758".to_string());
        halt.issue_codes[0] = Some("6758".to_string());
        round_trip(&halt, 4 + 2 + 1 + 2 + 2 + 12 + 9 * 3 + 12 * 10);
    }
}
