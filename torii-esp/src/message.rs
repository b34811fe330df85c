/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! ESP frame composition and dispatch.
//!
//! An [`EspMessage`] is the linear layer chain `EspCommon / middle /
//! payload`. Dispatch follows two binding tables: `MessageType` selects the
//! child of the session header, and `DataCode` selects the payload of a
//! middle layer. Codes without a binding decode to a `Raw` payload carrying
//! the untouched bytes.

use crate::layers::{
    AdminCommon, EspCommon, NoticeCommon, OrderCommon, ADMIN_COMMON_LEN, ESP_COMMON_LEN,
    NOTICE_COMMON_LEN, ORDER_COMMON_LEN,
};
use crate::payloads::*;
use bytes::{Bytes, BytesMut};
use torii_codec::field::put_spaces;
use torii_codec::reader::FieldReader;
use torii_codec::WireLayer;
use torii_core::error::CodecError;

/// Direction/kind of an order-entry middle layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Operation message (order/notice), message type 40.
    Order,
    /// Query, message type 41.
    Query,
    /// Drop copy, message type 42.
    DropCopy,
}

impl OrderKind {
    /// Wire message type for this kind.
    #[must_use]
    pub const fn message_type(self) -> &'static str {
        match self {
            Self::Order => "40",
            Self::Query => "41",
            Self::DropCopy => "42",
        }
    }
}

/// Direction/kind of a notice middle layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Order/notice, message type 50.
    Order,
    /// Query, message type 51.
    Query,
    /// Drop copy, message type 52.
    DropCopy,
}

impl NoticeKind {
    /// Wire message type for this kind.
    #[must_use]
    pub const fn message_type(self) -> &'static str {
        match self {
            Self::Order => "50",
            Self::Query => "51",
            Self::DropCopy => "52",
        }
    }
}

/// Direction/kind of an administrative middle layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminKind {
    /// Order/notice up, message type 80.
    OrderUp,
    /// Order/notice down, message type 90.
    OrderDown,
    /// Query up, message type 81.
    QueryUp,
    /// Query down, message type 91.
    QueryDown,
    /// Drop-copy up, message type 82.
    DropCopyUp,
    /// Drop-copy down, message type 92.
    DropCopyDown,
}

impl AdminKind {
    /// Wire message type for this kind.
    #[must_use]
    pub const fn message_type(self) -> &'static str {
        match self {
            Self::OrderUp => "80",
            Self::OrderDown => "90",
            Self::QueryUp => "81",
            Self::QueryDown => "91",
            Self::DropCopyUp => "82",
            Self::DropCopyDown => "92",
        }
    }
}

/// Payload of an order-entry middle layer, keyed by `DataCode`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPayload {
    New(NewOrder),
    ModificationByAcceptanceNo(ModificationOrder),
    ModificationByInternal(ModificationOrder),
    CancelByAcceptanceNo(CancelOrder),
    CancelByInternal(CancelOrder),
    Raw(Bytes),
}

impl OrderPayload {
    /// Canonical `DataCode` from the binding table, `None` for raw bytes.
    #[must_use]
    pub const fn data_code(&self) -> Option<&'static str> {
        match self {
            Self::New(_) => Some("1111"),
            Self::ModificationByAcceptanceNo(_) => Some("5131"),
            Self::ModificationByInternal(_) => Some("9132"),
            Self::CancelByAcceptanceNo(_) => Some("3121"),
            Self::CancelByInternal(_) => Some("7122"),
            Self::Raw(_) => None,
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::New(p) => p.encode(buf),
            Self::ModificationByAcceptanceNo(p) | Self::ModificationByInternal(p) => p.encode(buf),
            Self::CancelByAcceptanceNo(p) | Self::CancelByInternal(p) => p.encode(buf),
            Self::Raw(b) => buf.extend_from_slice(b),
        }
    }

    fn decode(data_code: &str, r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(match data_code {
            "1111" => Self::New(NewOrder::decode(r)?),
            "5131" => Self::ModificationByAcceptanceNo(ModificationOrder::decode(r)?),
            "9132" => Self::ModificationByInternal(ModificationOrder::decode(r)?),
            "3121" => Self::CancelByAcceptanceNo(CancelOrder::decode(r)?),
            "7122" => Self::CancelByInternal(CancelOrder::decode(r)?),
            _ => {
                let rest = Bytes::copy_from_slice(r.remaining());
                r.skip(rest.len())?;
                Self::Raw(rest)
            }
        })
    }
}

/// Payload of a notice middle layer, keyed by `DataCode`.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticePayload {
    NewOrderAcceptance(NewOrderAcceptanceNotice),
    NewOrderAcceptanceError(NewOrderAcceptanceNotice),
    NewOrderRegistrationError(NewOrderAcceptanceNotice),
    ModificationAcceptance(ModificationOrderAcceptanceNotice),
    ModificationAcceptanceError(ModificationOrderAcceptanceNotice),
    ModificationRegistrationError(ModificationOrderAcceptanceNotice),
    ModificationResult(ModificationOrderResultNotice),
    CancelAcceptance(CancelOrderAcceptanceNotice),
    CancelAcceptanceError(CancelOrderAcceptanceNotice),
    CancelRegistrationError(CancelOrderAcceptanceNotice),
    CancelResult(CancelOrderResultNotice),
    ExecutionCompletion(ExecutionCompletionNotice),
    InvalidationResult(InvalidationResultNotice),
    AcceptanceOutputCompletion(OutputCompletionNotice),
    ExecutionOutputCompletion(OutputCompletionNotice),
    Raw(Bytes),
}

impl NoticePayload {
    /// Canonical `DataCode` from the binding table, `None` for raw bytes.
    #[must_use]
    pub const fn data_code(&self) -> Option<&'static str> {
        match self {
            Self::NewOrderAcceptance(_) => Some("A111"),
            Self::NewOrderAcceptanceError(_) => Some("C119"),
            Self::NewOrderRegistrationError(_) => Some("K219"),
            Self::ModificationAcceptance(_) => Some("B131"),
            Self::ModificationAcceptanceError(_) => Some("D139"),
            Self::ModificationRegistrationError(_) => Some("K239"),
            Self::ModificationResult(_) => Some("F231"),
            Self::CancelAcceptance(_) => Some("B121"),
            Self::CancelAcceptanceError(_) => Some("D129"),
            Self::CancelRegistrationError(_) => Some("K229"),
            Self::CancelResult(_) => Some("F221"),
            Self::ExecutionCompletion(_) => Some("J211"),
            Self::InvalidationResult(_) => Some("K241"),
            Self::AcceptanceOutputCompletion(_) => Some("A191"),
            Self::ExecutionOutputCompletion(_) => Some("J291"),
            Self::Raw(_) => None,
        }
    }

    /// Payload name, used for labels and notice classification.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewOrderAcceptance(_) => "NewOrderAcceptanceNotice",
            Self::NewOrderAcceptanceError(_) => "NewOrderAcceptanceError",
            Self::NewOrderRegistrationError(_) => "NewOrderRegistrationError",
            Self::ModificationAcceptance(_) => "ModificationOrderAcceptanceNotice",
            Self::ModificationAcceptanceError(_) => "ModificationOrderAcceptanceError",
            Self::ModificationRegistrationError(_) => "ModificationOrderRegistrationError",
            Self::ModificationResult(_) => "ModificationOrderResultNotice",
            Self::CancelAcceptance(_) => "CancelOrderAcceptanceNotice",
            Self::CancelAcceptanceError(_) => "CancelOrderAcceptanceError",
            Self::CancelRegistrationError(_) => "CancelOrderRegistrationError",
            Self::CancelResult(_) => "CancelOrderResultNotice",
            Self::ExecutionCompletion(_) => "ExecutionCompletionNotice",
            Self::InvalidationResult(_) => "InvalidationResultNotice",
            Self::AcceptanceOutputCompletion(_) => "AcceptanceOutputCompletionNotice",
            Self::ExecutionOutputCompletion(_) => "ExecutionOutputCompletionNotice",
            Self::Raw(_) => "Raw",
        }
    }

    /// True for acceptance notices and acceptance errors, which advance the
    /// acceptance sequence counter; every other notice advances the
    /// execution counter.
    #[must_use]
    pub fn is_acceptance(&self) -> bool {
        let name = self.name();
        name.ends_with("AcceptanceNotice") || name.ends_with("AcceptanceError")
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::NewOrderAcceptance(p)
            | Self::NewOrderAcceptanceError(p)
            | Self::NewOrderRegistrationError(p) => p.encode(buf),
            Self::ModificationAcceptance(p)
            | Self::ModificationAcceptanceError(p)
            | Self::ModificationRegistrationError(p) => p.encode(buf),
            Self::ModificationResult(p) => p.encode(buf),
            Self::CancelAcceptance(p)
            | Self::CancelAcceptanceError(p)
            | Self::CancelRegistrationError(p) => p.encode(buf),
            Self::CancelResult(p) => p.encode(buf),
            Self::ExecutionCompletion(p) => p.encode(buf),
            Self::InvalidationResult(p) => p.encode(buf),
            Self::AcceptanceOutputCompletion(p) | Self::ExecutionOutputCompletion(p) => {
                p.encode(buf)
            }
            Self::Raw(b) => buf.extend_from_slice(b),
        }
    }

    fn decode(data_code: &str, r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(match data_code {
            "A111" => Self::NewOrderAcceptance(NewOrderAcceptanceNotice::decode(r)?),
            "C119" => Self::NewOrderAcceptanceError(NewOrderAcceptanceNotice::decode(r)?),
            "K219" => Self::NewOrderRegistrationError(NewOrderAcceptanceNotice::decode(r)?),
            "B131" => Self::ModificationAcceptance(ModificationOrderAcceptanceNotice::decode(r)?),
            "D139" => {
                Self::ModificationAcceptanceError(ModificationOrderAcceptanceNotice::decode(r)?)
            }
            "K239" => {
                Self::ModificationRegistrationError(ModificationOrderAcceptanceNotice::decode(r)?)
            }
            "F231" => Self::ModificationResult(ModificationOrderResultNotice::decode(r)?),
            "B121" => Self::CancelAcceptance(CancelOrderAcceptanceNotice::decode(r)?),
            "D129" => Self::CancelAcceptanceError(CancelOrderAcceptanceNotice::decode(r)?),
            "K229" => Self::CancelRegistrationError(CancelOrderAcceptanceNotice::decode(r)?),
            "F221" => Self::CancelResult(CancelOrderResultNotice::decode(r)?),
            "J211" => Self::ExecutionCompletion(ExecutionCompletionNotice::decode(r)?),
            "K241" => Self::InvalidationResult(InvalidationResultNotice::decode(r)?),
            "A191" => Self::AcceptanceOutputCompletion(OutputCompletionNotice::decode(r)?),
            "J291" => Self::ExecutionOutputCompletion(OutputCompletionNotice::decode(r)?),
            _ => {
                let rest = Bytes::copy_from_slice(r.remaining());
                r.skip(rest.len())?;
                Self::Raw(rest)
            }
        })
    }
}

/// Payload of an administrative middle layer, keyed by `DataCode`.
///
/// The up and down binding tables are kept verbatim, including the
/// request types the source binds under the down direction
/// (order-suspension and hard-limit families).
#[derive(Debug, Clone, PartialEq)]
pub enum AdminPayload {
    // Up (message type 80)
    OpStart(OpStart),
    OpEnd,
    RetransmissionRequest(Retransmission),
    ProxyRequest(Proxy),
    ProxyAbortRequest(ProxyAbort),
    ProxyStatusEnqRequest(NoticeDestEnqRequest),
    OrderSeqNoEnquiryRequest(VirtualServerRef),
    NoticeSeqNoEnquiryRequest(VirtualServerRef),
    NoticeDestSetupRequest(NoticeDestSetup),
    NoticeDestEnqRequest(NoticeDestEnqRequest),
    // Down (message type 90)
    MarketAdmin(MarketAdmin),
    TradingHalt(TradingHalt),
    PriceLimitInfo(PriceLimitInfo),
    FreeFormWarning(FreeFormWarning),
    OpStartResponse(OpStartResponse),
    OpStartErrorResponse(OpStartResponse),
    OpEndResponse,
    OpEndErrorResponse,
    RetransmissionResponse(Retransmission),
    RetransmissionErrorResponse(Retransmission),
    ProxyResponse(Proxy),
    ProxyErrorResponse(Proxy),
    ProxyAbortResponse(ProxyAbort),
    ProxyAbortErrorResponse(ProxyAbort),
    ProxyStatusEnqResponse(NoticeDestEnqResponse),
    ProxyStatusEnqErrorResponse(NoticeDestEnqResponse),
    OrderSeqNoEnquiryResponse(OrderSeqNoEnquiryResponse),
    OrderSeqNoEnquiryErrorResponse(OrderSeqNoEnquiryResponse),
    NoticeSeqNoEnquiryResponse(NoticeSeqNoEnquiryResponse),
    NoticeSeqNoEnquiryErrorResponse(NoticeSeqNoEnquiryResponse),
    NoticeDestSetupResponse(NoticeDestSetup),
    NoticeDestSetupErrorResponse(NoticeDestSetup),
    NoticeDestEnqResponse(NoticeDestEnqResponse),
    NoticeDestEnqErrorResponse(NoticeDestEnqResponse),
    OrderSuspensionRequest(VirtualServerRef),
    OrderSuspensionErrorResponse(VirtualServerRef),
    OrderSuspensionReleaseRequest(VirtualServerRef),
    OrderSuspensionReleaseErrorResponse(VirtualServerRef),
    HardLimitSetupRequest(HardLimitSetup),
    HardLimitSetupErrorResponse(HardLimitSetup),
    HardLimitEnquiryRequest(VirtualServerRef),
    HardLimitEnquiryErrorResponse(HardLimitEnquiryResponse),
    SystemError(SystemError),
    Raw(Bytes),
}

impl AdminPayload {
    /// Canonical `DataCode` from the binding table, `None` for raw bytes.
    #[must_use]
    pub const fn data_code(&self) -> Option<&'static str> {
        match self {
            Self::OpStart(_) => Some("6211"),
            Self::OpEnd => Some("6221"),
            Self::RetransmissionRequest(_) => Some("6231"),
            Self::ProxyRequest(_) => Some("6241"),
            Self::ProxyAbortRequest(_) => Some("6251"),
            Self::ProxyStatusEnqRequest(_) => Some("6261"),
            Self::OrderSeqNoEnquiryRequest(_) => Some("6271"),
            Self::NoticeSeqNoEnquiryRequest(_) => Some("6281"),
            Self::NoticeDestSetupRequest(_) => Some("6291"),
            Self::NoticeDestEnqRequest(_) => Some("62A1"),
            Self::MarketAdmin(_) => Some("T111"),
            Self::TradingHalt(_) => Some("T311"),
            Self::PriceLimitInfo(_) => Some("T321"),
            Self::FreeFormWarning(_) => Some("T331"),
            Self::OpStartResponse(_) => Some("T211"),
            Self::OpStartErrorResponse(_) => Some("T219"),
            Self::OpEndResponse => Some("T221"),
            Self::OpEndErrorResponse => Some("T229"),
            Self::RetransmissionResponse(_) => Some("T231"),
            Self::RetransmissionErrorResponse(_) => Some("T239"),
            Self::ProxyResponse(_) => Some("T241"),
            Self::ProxyErrorResponse(_) => Some("T249"),
            Self::ProxyAbortResponse(_) => Some("T251"),
            Self::ProxyAbortErrorResponse(_) => Some("T259"),
            Self::ProxyStatusEnqResponse(_) => Some("T261"),
            Self::ProxyStatusEnqErrorResponse(_) => Some("T269"),
            Self::OrderSeqNoEnquiryResponse(_) => Some("T271"),
            Self::OrderSeqNoEnquiryErrorResponse(_) => Some("T279"),
            Self::NoticeSeqNoEnquiryResponse(_) => Some("T281"),
            Self::NoticeSeqNoEnquiryErrorResponse(_) => Some("T289"),
            Self::NoticeDestSetupResponse(_) => Some("T291"),
            Self::NoticeDestSetupErrorResponse(_) => Some("T299"),
            Self::NoticeDestEnqResponse(_) => Some("T2A1"),
            Self::NoticeDestEnqErrorResponse(_) => Some("T2A9"),
            Self::OrderSuspensionRequest(_) => Some("62B1"),
            Self::OrderSuspensionErrorResponse(_) => Some("T2B1"),
            Self::OrderSuspensionReleaseRequest(_) => Some("62C1"),
            Self::OrderSuspensionReleaseErrorResponse(_) => Some("T2C1"),
            Self::HardLimitSetupRequest(_) => Some("62D1"),
            Self::HardLimitSetupErrorResponse(_) => Some("T2D1"),
            Self::HardLimitEnquiryRequest(_) => Some("62E1"),
            Self::HardLimitEnquiryErrorResponse(_) => Some("T2E1"),
            Self::SystemError(_) => Some("T999"),
            Self::Raw(_) => None,
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::OpStart(p) => p.encode(buf),
            Self::OpEnd | Self::OpEndResponse | Self::OpEndErrorResponse => {}
            Self::RetransmissionRequest(p)
            | Self::RetransmissionResponse(p)
            | Self::RetransmissionErrorResponse(p) => p.encode(buf),
            Self::ProxyRequest(p) | Self::ProxyResponse(p) | Self::ProxyErrorResponse(p) => {
                p.encode(buf)
            }
            Self::ProxyAbortRequest(p)
            | Self::ProxyAbortResponse(p)
            | Self::ProxyAbortErrorResponse(p) => p.encode(buf),
            Self::ProxyStatusEnqRequest(p) | Self::NoticeDestEnqRequest(p) => p.encode(buf),
            Self::OrderSeqNoEnquiryRequest(p)
            | Self::NoticeSeqNoEnquiryRequest(p)
            | Self::OrderSuspensionRequest(p)
            | Self::OrderSuspensionErrorResponse(p)
            | Self::OrderSuspensionReleaseRequest(p)
            | Self::OrderSuspensionReleaseErrorResponse(p)
            | Self::HardLimitEnquiryRequest(p) => p.encode(buf),
            Self::NoticeDestSetupRequest(p)
            | Self::NoticeDestSetupResponse(p)
            | Self::NoticeDestSetupErrorResponse(p) => p.encode(buf),
            Self::MarketAdmin(p) => p.encode(buf),
            Self::TradingHalt(p) => p.encode(buf),
            Self::PriceLimitInfo(p) => p.encode(buf),
            Self::FreeFormWarning(p) => p.encode(buf),
            Self::OpStartResponse(p) | Self::OpStartErrorResponse(p) => p.encode(buf),
            Self::ProxyStatusEnqResponse(p)
            | Self::ProxyStatusEnqErrorResponse(p)
            | Self::NoticeDestEnqResponse(p)
            | Self::NoticeDestEnqErrorResponse(p) => p.encode(buf),
            Self::OrderSeqNoEnquiryResponse(p) | Self::OrderSeqNoEnquiryErrorResponse(p) => {
                p.encode(buf)
            }
            Self::NoticeSeqNoEnquiryResponse(p) | Self::NoticeSeqNoEnquiryErrorResponse(p) => {
                p.encode(buf)
            }
            Self::HardLimitSetupRequest(p) | Self::HardLimitSetupErrorResponse(p) => p.encode(buf),
            Self::HardLimitEnquiryErrorResponse(p) => p.encode(buf),
            Self::SystemError(p) => p.encode(buf),
            Self::Raw(b) => buf.extend_from_slice(b),
        }
    }

    fn decode_up(data_code: &str, r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(match data_code {
            "6211" => Self::OpStart(OpStart::decode(r)?),
            "6221" => Self::OpEnd,
            "6231" => Self::RetransmissionRequest(Retransmission::decode(r)?),
            "6241" => Self::ProxyRequest(Proxy::decode(r)?),
            "6251" => Self::ProxyAbortRequest(ProxyAbort::decode(r)?),
            "6261" => Self::ProxyStatusEnqRequest(NoticeDestEnqRequest::decode(r)?),
            "6271" => Self::OrderSeqNoEnquiryRequest(VirtualServerRef::decode(r)?),
            "6281" => Self::NoticeSeqNoEnquiryRequest(VirtualServerRef::decode(r)?),
            "6291" => Self::NoticeDestSetupRequest(NoticeDestSetup::decode(r)?),
            "62A1" => Self::NoticeDestEnqRequest(NoticeDestEnqRequest::decode(r)?),
            _ => {
                let rest = Bytes::copy_from_slice(r.remaining());
                r.skip(rest.len())?;
                Self::Raw(rest)
            }
        })
    }

    fn decode_down(data_code: &str, r: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(match data_code {
            "T111" => Self::MarketAdmin(MarketAdmin::decode(r)?),
            "T311" => Self::TradingHalt(TradingHalt::decode(r)?),
            "T321" => Self::PriceLimitInfo(PriceLimitInfo::decode(r)?),
            "T331" => Self::FreeFormWarning(FreeFormWarning::decode(r)?),
            "T211" => Self::OpStartResponse(OpStartResponse::decode(r)?),
            "T219" => Self::OpStartErrorResponse(OpStartResponse::decode(r)?),
            "T221" => Self::OpEndResponse,
            "T229" => Self::OpEndErrorResponse,
            "T231" => Self::RetransmissionResponse(Retransmission::decode(r)?),
            "T239" => Self::RetransmissionErrorResponse(Retransmission::decode(r)?),
            "T241" => Self::ProxyResponse(Proxy::decode(r)?),
            "T249" => Self::ProxyErrorResponse(Proxy::decode(r)?),
            "T251" => Self::ProxyAbortResponse(ProxyAbort::decode(r)?),
            "T259" => Self::ProxyAbortErrorResponse(ProxyAbort::decode(r)?),
            "T261" => Self::ProxyStatusEnqResponse(NoticeDestEnqResponse::decode(r)?),
            "T269" => Self::ProxyStatusEnqErrorResponse(NoticeDestEnqResponse::decode(r)?),
            "T271" => Self::OrderSeqNoEnquiryResponse(OrderSeqNoEnquiryResponse::decode(r)?),
            "T279" => Self::OrderSeqNoEnquiryErrorResponse(OrderSeqNoEnquiryResponse::decode(r)?),
            "T281" => Self::NoticeSeqNoEnquiryResponse(NoticeSeqNoEnquiryResponse::decode(r)?),
            "T289" => Self::NoticeSeqNoEnquiryErrorResponse(NoticeSeqNoEnquiryResponse::decode(r)?),
            "T291" => Self::NoticeDestSetupResponse(NoticeDestSetup::decode(r)?),
            "T299" => Self::NoticeDestSetupErrorResponse(NoticeDestSetup::decode(r)?),
            "T2A1" => Self::NoticeDestEnqResponse(NoticeDestEnqResponse::decode(r)?),
            "T2A9" => Self::NoticeDestEnqErrorResponse(NoticeDestEnqResponse::decode(r)?),
            "62B1" => Self::OrderSuspensionRequest(VirtualServerRef::decode(r)?),
            "T2B1" => Self::OrderSuspensionErrorResponse(VirtualServerRef::decode(r)?),
            "62C1" => Self::OrderSuspensionReleaseRequest(VirtualServerRef::decode(r)?),
            "T2C1" => Self::OrderSuspensionReleaseErrorResponse(VirtualServerRef::decode(r)?),
            "62D1" => Self::HardLimitSetupRequest(HardLimitSetup::decode(r)?),
            "T2D1" => Self::HardLimitSetupErrorResponse(HardLimitSetup::decode(r)?),
            "62E1" => Self::HardLimitEnquiryRequest(VirtualServerRef::decode(r)?),
            "T2E1" => Self::HardLimitEnquiryErrorResponse(HardLimitEnquiryResponse::decode(r)?),
            "T999" => Self::SystemError(SystemError::decode(r)?),
            _ => {
                let rest = Bytes::copy_from_slice(r.remaining());
                r.skip(rest.len())?;
                Self::Raw(rest)
            }
        })
    }
}

/// Child of the session header, selected by `MessageType`.
#[derive(Debug, Clone, PartialEq)]
pub enum EspBody {
    LoginRequest,
    LoginResponse,
    PreLogoutRequest,
    PreLogoutResponse,
    LogoutRequest(LogoutRequest),
    LogoutResponse,
    Heartbeat,
    ResendRequest(ResendRequest),
    Skip(Skip),
    Reject(Reject),
    Order {
        kind: OrderKind,
        common: OrderCommon,
        payload: OrderPayload,
    },
    Notice {
        kind: NoticeKind,
        common: NoticeCommon,
        payload: NoticePayload,
    },
    Admin {
        kind: AdminKind,
        common: AdminCommon,
        payload: AdminPayload,
    },
    Raw(Bytes),
}

impl EspBody {
    /// The message type written on encode when the header leaves it unset.
    ///
    /// Session-layer bodies use the uplink code; downlink codes appear only
    /// on decode.
    #[must_use]
    pub const fn default_message_type(&self) -> &'static str {
        match self {
            Self::LoginRequest => "01",
            Self::LoginResponse => "11",
            Self::PreLogoutRequest => "02",
            Self::PreLogoutResponse => "12",
            Self::LogoutRequest(_) => "03",
            Self::LogoutResponse => "04",
            Self::Heartbeat => "05",
            Self::ResendRequest(_) => "06",
            Self::Skip(_) => "07",
            Self::Reject(_) => "08",
            Self::Order { kind, .. } => kind.message_type(),
            Self::Notice { kind, .. } => kind.message_type(),
            Self::Admin { kind, .. } => kind.message_type(),
            Self::Raw(_) => "  ",
        }
    }
}

/// A complete ESP frame: session header, body, and any opaque trailing
/// bytes left by an unmatched remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct EspMessage {
    pub common: EspCommon,
    pub body: EspBody,
    pub trailing: Bytes,
}

impl EspMessage {
    /// Wraps a body in a default session header.
    #[must_use]
    pub fn new(body: EspBody) -> Self {
        Self {
            common: EspCommon::default(),
            body,
            trailing: Bytes::new(),
        }
    }

    /// Heartbeat frame.
    #[must_use]
    pub fn heartbeat() -> Self {
        Self::new(EspBody::Heartbeat)
    }

    /// Login request frame.
    #[must_use]
    pub fn login_request() -> Self {
        Self::new(EspBody::LoginRequest)
    }

    /// Pre-logout request frame.
    #[must_use]
    pub fn pre_logout_request() -> Self {
        Self::new(EspBody::PreLogoutRequest)
    }

    /// Logout request frame with the default reason.
    #[must_use]
    pub fn logout_request() -> Self {
        Self::new(EspBody::LogoutRequest(LogoutRequest::default()))
    }

    /// Wraps an order-entry payload in a default operation middle layer.
    #[must_use]
    pub fn order_entry(payload: OrderPayload) -> Self {
        Self::new(EspBody::Order {
            kind: OrderKind::Order,
            common: OrderCommon::default(),
            payload,
        })
    }

    /// Wraps an admin payload in a default admin-up middle layer.
    #[must_use]
    pub fn admin_up(payload: AdminPayload) -> Self {
        Self::new(EspBody::Admin {
            kind: AdminKind::OrderUp,
            common: AdminCommon::default(),
            payload,
        })
    }

    /// Wraps a notice payload in a notice middle layer; used by tests and
    /// scripted counterparties standing in for the exchange.
    #[must_use]
    pub fn notice(kind: NoticeKind, common: NoticeCommon, payload: NoticePayload) -> Self {
        Self::new(EspBody::Notice {
            kind,
            common,
            payload,
        })
    }

    /// Wraps an admin payload for the downlink direction.
    #[must_use]
    pub fn admin_down(payload: AdminPayload) -> Self {
        Self::new(EspBody::Admin {
            kind: AdminKind::OrderDown,
            common: AdminCommon::default(),
            payload,
        })
    }

    /// Serializes the frame, recomputing `MessageLength`, `DataAreaLength`,
    /// and the middle layer's `DataLength` from actual byte counts.
    /// Caller-supplied values in those fields are ignored.
    #[must_use]
    pub fn build(&self) -> BytesMut {
        let mut body = BytesMut::new();
        match &self.body {
            EspBody::LoginRequest
            | EspBody::LoginResponse
            | EspBody::PreLogoutRequest
            | EspBody::PreLogoutResponse
            | EspBody::LogoutResponse
            | EspBody::Heartbeat => put_spaces(&mut body, BLANK_DATA_LEN),
            EspBody::LogoutRequest(p) => p.encode(&mut body),
            EspBody::ResendRequest(p) => p.encode(&mut body),
            EspBody::Skip(p) => p.encode(&mut body),
            EspBody::Reject(p) => p.encode(&mut body),
            EspBody::Order {
                common, payload, ..
            } => {
                let mut data = BytesMut::new();
                payload.encode(&mut data);
                let code = common
                    .data_code
                    .as_deref()
                    .or(payload.data_code())
                    .unwrap_or("    ")
                    .to_string();
                let data_length = (ORDER_COMMON_LEN + data.len() - 5) as i64;
                common.encode_with(&mut body, &code, data_length);
                body.extend_from_slice(&data);
            }
            EspBody::Notice {
                common, payload, ..
            } => {
                let mut data = BytesMut::new();
                payload.encode(&mut data);
                let code = common
                    .data_code
                    .as_deref()
                    .or(payload.data_code())
                    .unwrap_or("    ")
                    .to_string();
                let data_length = (NOTICE_COMMON_LEN + data.len() - 5) as i64;
                common.encode_with(&mut body, &code, data_length);
                body.extend_from_slice(&data);
            }
            EspBody::Admin {
                common, payload, ..
            } => {
                let mut data = BytesMut::new();
                payload.encode(&mut data);
                let code = common
                    .data_code
                    .as_deref()
                    .or(payload.data_code())
                    .unwrap_or("    ")
                    .to_string();
                let data_length = (ADMIN_COMMON_LEN + data.len() - 5) as i64;
                common.encode_with(&mut body, &code, data_length);
                body.extend_from_slice(&data);
            }
            EspBody::Raw(b) => body.extend_from_slice(b),
        }
        body.extend_from_slice(&self.trailing);

        let message_type = self
            .common
            .message_type
            .clone()
            .unwrap_or_else(|| self.body.default_message_type().to_string());
        let message_length = (ESP_COMMON_LEN + body.len() - 5) as i64;
        let data_area_length = body.len() as i64;

        let mut frame = BytesMut::with_capacity(ESP_COMMON_LEN + body.len());
        self.common
            .encode_header(&mut frame, &message_type, message_length, data_area_length);
        frame.extend_from_slice(&body);
        frame
    }

    /// Parses a complete frame.
    ///
    /// # Errors
    /// Returns a [`CodecError`] on truncated or malformed bytes. Unbound
    /// message types and data codes decode to `Raw` payloads rather than
    /// erroring.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = FieldReader::new(bytes);
        let common = EspCommon::decode(&mut r)?;
        let message_type = common.message_type.clone().unwrap_or_default();

        let body = match message_type.as_str() {
            "01" => blank_body(&mut r, EspBody::LoginRequest)?,
            "11" => blank_body(&mut r, EspBody::LoginResponse)?,
            "02" => blank_body(&mut r, EspBody::PreLogoutRequest)?,
            "12" => blank_body(&mut r, EspBody::PreLogoutResponse)?,
            "03" | "13" => EspBody::LogoutRequest(LogoutRequest::decode(&mut r)?),
            "04" | "14" => blank_body(&mut r, EspBody::LogoutResponse)?,
            "05" | "15" => blank_body(&mut r, EspBody::Heartbeat)?,
            "06" | "16" => EspBody::ResendRequest(ResendRequest::decode(&mut r)?),
            "07" | "17" => EspBody::Skip(Skip::decode(&mut r)?),
            "08" | "18" => EspBody::Reject(Reject::decode(&mut r)?),
            "40" | "41" | "42" => {
                let kind = match message_type.as_str() {
                    "40" => OrderKind::Order,
                    "41" => OrderKind::Query,
                    _ => OrderKind::DropCopy,
                };
                let layer = OrderCommon::decode(&mut r)?;
                let code = layer.data_code.clone().unwrap_or_default();
                let payload = OrderPayload::decode(&code, &mut r)?;
                EspBody::Order {
                    kind,
                    common: layer,
                    payload,
                }
            }
            "50" | "51" | "52" => {
                let kind = match message_type.as_str() {
                    "50" => NoticeKind::Order,
                    "51" => NoticeKind::Query,
                    _ => NoticeKind::DropCopy,
                };
                let layer = NoticeCommon::decode(&mut r)?;
                let code = layer.data_code.clone().unwrap_or_default();
                let payload = NoticePayload::decode(&code, &mut r)?;
                EspBody::Notice {
                    kind,
                    common: layer,
                    payload,
                }
            }
            "80" | "90" | "81" | "91" | "82" | "92" => {
                let kind = match message_type.as_str() {
                    "80" => AdminKind::OrderUp,
                    "90" => AdminKind::OrderDown,
                    "81" => AdminKind::QueryUp,
                    "91" => AdminKind::QueryDown,
                    "82" => AdminKind::DropCopyUp,
                    _ => AdminKind::DropCopyDown,
                };
                let layer = AdminCommon::decode(&mut r)?;
                let code = layer.data_code.clone().unwrap_or_default();
                // Only the order/notice admin directions carry bound
                // payloads; query and drop-copy data areas stay raw.
                let payload = match kind {
                    AdminKind::OrderUp => AdminPayload::decode_up(&code, &mut r)?,
                    AdminKind::OrderDown => AdminPayload::decode_down(&code, &mut r)?,
                    _ => {
                        let rest = Bytes::copy_from_slice(r.remaining());
                        r.skip(rest.len())?;
                        AdminPayload::Raw(rest)
                    }
                };
                EspBody::Admin {
                    kind,
                    common: layer,
                    payload,
                }
            }
            _ => {
                let rest = Bytes::copy_from_slice(r.remaining());
                r.skip(rest.len())?;
                EspBody::Raw(rest)
            }
        };

        let trailing = Bytes::copy_from_slice(r.remaining());
        Ok(Self {
            common,
            body,
            trailing,
        })
    }

    /// True for heartbeat frames.
    #[must_use]
    pub const fn is_heartbeat(&self) -> bool {
        matches!(self.body, EspBody::Heartbeat)
    }

    /// True for login response frames.
    #[must_use]
    pub const fn is_login_response(&self) -> bool {
        matches!(self.body, EspBody::LoginResponse)
    }

    /// True for pre-logout response frames.
    #[must_use]
    pub const fn is_pre_logout_response(&self) -> bool {
        matches!(self.body, EspBody::PreLogoutResponse)
    }

    /// True for logout response frames.
    #[must_use]
    pub const fn is_logout_response(&self) -> bool {
        matches!(self.body, EspBody::LogoutResponse)
    }

    /// True when the frame carries a market-admin payload.
    #[must_use]
    pub const fn is_market_admin(&self) -> bool {
        matches!(
            self.body,
            EspBody::Admin {
                payload: AdminPayload::MarketAdmin(_),
                ..
            }
        )
    }

    /// True when the frame carries an operation start response.
    #[must_use]
    pub const fn is_op_start_response(&self) -> bool {
        matches!(
            self.body,
            EspBody::Admin {
                payload: AdminPayload::OpStartResponse(_),
                ..
            }
        )
    }

    /// True when the frame carries an operation start error response.
    #[must_use]
    pub const fn is_op_start_error(&self) -> bool {
        matches!(
            self.body,
            EspBody::Admin {
                payload: AdminPayload::OpStartErrorResponse(_),
                ..
            }
        )
    }

    /// The order middle layer and payload, if present.
    #[must_use]
    pub const fn order(&self) -> Option<(&OrderCommon, &OrderPayload)> {
        match &self.body {
            EspBody::Order {
                common, payload, ..
            } => Some((common, payload)),
            _ => None,
        }
    }

    /// The notice middle layer and payload for operation notices
    /// (message type 50), if present.
    #[must_use]
    pub fn notice_o(&self) -> Option<(&NoticeCommon, &NoticePayload)> {
        match &self.body {
            EspBody::Notice {
                kind: NoticeKind::Order,
                common,
                payload,
            } => Some((common, payload)),
            _ => None,
        }
    }

    /// The admin middle layer and payload, if present.
    #[must_use]
    pub const fn admin(&self) -> Option<(&AdminCommon, &AdminPayload)> {
        match &self.body {
            EspBody::Admin {
                common, payload, ..
            } => Some((common, payload)),
            _ => None,
        }
    }

    /// The new-order payload, if present.
    #[must_use]
    pub const fn new_order(&self) -> Option<&NewOrder> {
        match &self.body {
            EspBody::Order {
                payload: OrderPayload::New(order),
                ..
            } => Some(order),
            _ => None,
        }
    }

    /// Short human-readable label used in errors and logs.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.body {
            EspBody::LoginRequest => "LoginRequest".to_string(),
            EspBody::LoginResponse => "LoginResponse".to_string(),
            EspBody::PreLogoutRequest => "PreLogoutRequest".to_string(),
            EspBody::PreLogoutResponse => "PreLogoutResponse".to_string(),
            EspBody::LogoutRequest(_) => "LogoutRequest".to_string(),
            EspBody::LogoutResponse => "LogoutResponse".to_string(),
            EspBody::Heartbeat => "Heartbeat".to_string(),
            EspBody::ResendRequest(_) => "ResendRequest".to_string(),
            EspBody::Skip(_) => "Skip".to_string(),
            EspBody::Reject(_) => "Reject".to_string(),
            EspBody::Order { payload, .. } => format!(
                "Order[{}]",
                payload.data_code().unwrap_or("raw")
            ),
            EspBody::Notice { payload, .. } => format!("Notice[{}]", payload.name()),
            EspBody::Admin { payload, .. } => format!(
                "Admin[{}]",
                payload.data_code().unwrap_or("raw")
            ),
            EspBody::Raw(_) => "Raw".to_string(),
        }
    }
}

fn blank_body(r: &mut FieldReader<'_>, body: EspBody) -> Result<EspBody, CodecError> {
    r.skip(BLANK_DATA_LEN)?;
    Ok(body)
}
