/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Character and code enumerations for ESP message fields.
//!
//! Single-character fields are checked against these sets on decode; a space
//! always passes and stands for "absent".

/// Side: `1` = Sell, `3` = Buy.
pub const SIDE: &[char] = &['1', '3'];

/// Side character for a buy order.
pub const SIDE_BUY: char = '3';

/// Side character for a sell order.
pub const SIDE_SELL: char = '1';

/// Execution condition: none, at-open, at-close, funari, IOC.
pub const EXEC_CONDITION: &[char] = &['0', '2', '4', '6', '8'];

/// Proprietary/brokerage class: `0` = brokerage, `9` = proprietary.
pub const PROP_BROKERAGE: &[char] = &['0', '9'];

/// Cash/margin code: cash, trust, liquidation.
pub const CASH_MARGIN: &[char] = &['0', '2', '4'];

/// Short-sell flag: none, with price regulation, without price regulation.
pub const SHORT_SELL: &[char] = &['0', '5', '7'];

/// Short-sell with price regulation.
pub const SHORT_SELL_WITH_PRICE_REG: char = '5';

/// Short-sell without price regulation.
pub const SHORT_SELL_WITHOUT_PRICE_REG: char = '7';

/// Stabilization/arbitrage code: none, stabilization, arbitrage.
pub const STAB_ARB: &[char] = &['0', '6', '8'];

/// Order attribute: automatic, manual, LLT market-making/arbitrage/
/// directional/other.
pub const ORDER_ATTRIBUTE: &[char] = &['1', '2', '3', '4', '5', '6'];

/// Support-member class: none, support-member order.
pub const SUPPORT_MEMBER: &[char] = &['0', '1'];

/// Resend flag: `0` = normal, `1` = resent.
pub const RESEND_FLAG: &[char] = &['0', '1'];

/// Retransmission flag on notices: `0` = normal, `1` = retransmission.
pub const RETRANSMISSION_FLAG: &[char] = &['0', '1'];

/// Market-admin operation status: `1` = start, `0` = end.
pub const OPERATION_STATUS: &[char] = &['1', '0'];

/// Market-admin order status: `1` = accepting, `0` = non-accepting.
pub const ORDER_STATUS: &[char] = &['1', '0'];

/// Cross flag on execution notices.
pub const CROSS_FLAG: &[char] = &['0', '8'];

/// Price flag: fixed, limit allocation, other.
pub const PRICE_FLAG: &[char] = &['1', '9', '0'];

/// Limit flag on invalidation notices.
pub const LIMIT_FLAG: &[char] = &['9', '0'];

/// Hard-limit suspension status: `1` = suspending, `0` = not suspending.
pub const SUSPENSION_STATUS: &[char] = &['1', '0'];

/// Session-layer reject reason codes.
pub mod reject_reason {
    pub const INCORRECT_MESSAGE_TYPE: &str = "0001";
    pub const INCORRECT_MESSAGE_SEQUENCE_NUMBER: &str = "0002";
    pub const INCORRECT_PARTICIPANT_CODE: &str = "0003";
    pub const INCORRECT_VIRTUAL_SERVER_NUMBER: &str = "0004";
    pub const INCORRECT_RESEND_FLAG: &str = "0005";
    pub const INCORRECT_RESEND_START_MESSAGE_SEQ_NUM: &str = "0006";
    pub const MSN_GREATER_THAN_CURRENT_SAMSN: &str = "0007";
    pub const INCORRECT_ARMSN: &str = "0008";
    pub const INCORRECT_SAMSN: &str = "0009";
    pub const INCORRECT_MESSAGE_LENGTH: &str = "0010";
    pub const INCORRECT_NUM_OF_DATA_TRANSACTION: &str = "0011";
    pub const INCORRECT_SKIP_MSG_SEQ_NUM: &str = "0012";
    pub const INCORRECT_FORMAT: &str = "0013";
}

/// Session-layer logout reason codes.
pub mod logout_reason {
    pub const LOGOUT_REQUEST_IS_VALID: &str = "0000";
    pub const INCORRECT_MSG_LENGTH: &str = "0101";
    pub const TIME_OUT_PRE_LOGOUT_RESPONSE_TIMER: &str = "0102";
    pub const TIME_OUT_LOGOUT_REQUEST_TIMER: &str = "0103";
    pub const TIME_OUT_HEARTBEAT_RECEIPT_TIMER: &str = "0105";
    pub const RESEND_REQUEST_LIMIT_REACHED: &str = "0106";
    pub const REJECT_MESSAGE_LIMIT_REACHED: &str = "0107";
    pub const SAME_MESSAGE_LIMIT_REACHED: &str = "0108";
    pub const LINK_RELEASED_BY_UPPER_LAYER: &str = "0109";
    pub const SYSTEM_ERROR: &str = "0199";
}
