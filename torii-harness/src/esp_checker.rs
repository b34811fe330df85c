/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! ESP protocol checker.
//!
//! Binds the abstract lifecycle transitions to ESP wire messages: each
//! send goes through an [`EspSession`], each confirmation awaits the
//! matching notice and validates it field by field against expected values
//! (explicit patch fields falling back to current order state).
//!
//! Two expected-processing policies exist: the default correlates
//! `InternalProcessing` through `clOrdID`; the raw policy uses
//! `destClOrdID`, leaving `clOrdID` for the session-composed
//! `VirtualServerNo` + zero-padded `OrderEntrySeqNo` id.

use crate::checker::{Checker, OrderBook, OrderId};
use crate::order::{Order, OrderPatch};
use crate::sim::ExchangeSim;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::time::Duration;
use torii_core::error::{Result, SessionError, ValidationError};
use torii_core::types::{Price, Side};
use torii_esp::client::{EspClient, DEFAULT_RECEIVE_TIMEOUT};
use torii_esp::codes;
use torii_esp::message::{EspMessage, NoticePayload, OrderPayload};
use torii_esp::payloads::{CancelOrder, ModificationOrder, NewOrder};

/// Session surface the ESP checker drives. Implemented by
/// [`EspClient`] and by scripted sessions in tests.
pub trait EspSession {
    /// Sends a message; returns it as prepared for the wire.
    ///
    /// # Errors
    /// Transport or session failure.
    fn send(&mut self, msg: EspMessage) -> Result<EspMessage>;

    /// Receives the next unconsumed frame.
    ///
    /// # Errors
    /// Timeout or transport failure.
    fn receive(&mut self, timeout: Duration) -> Result<EspMessage>;

    /// The session's virtual server number.
    fn virtual_server_no(&self) -> String;
}

impl EspSession for EspClient {
    fn send(&mut self, msg: EspMessage) -> Result<EspMessage> {
        self.send_msg(msg)
    }

    fn receive(&mut self, timeout: Duration) -> Result<EspMessage> {
        self.receive_msg(timeout)
    }

    fn virtual_server_no(&self) -> String {
        EspClient::virtual_server_no(self).to_string()
    }
}

/// Which order attribute carries the expected `InternalProcessing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessingKey {
    /// Correlate through `clOrdID` (default policy).
    #[default]
    ClOrdId,
    /// Correlate through `destClOrdID` (raw policy).
    DestClOrdId,
}

/// Checker binding the order lifecycle to the ESP protocol.
pub struct EspChecker<S: EspSession> {
    book: OrderBook,
    session: S,
    sim: Box<dyn ExchangeSim>,
    key: ProcessingKey,
    timeout: Duration,
}

impl<S: EspSession> EspChecker<S> {
    /// Creates a checker over a session and an exchange simulator.
    #[must_use]
    pub fn new(session: S, exchange_sim: Box<dyn ExchangeSim>) -> Self {
        Self {
            book: OrderBook::new(),
            session,
            sim: exchange_sim,
            key: ProcessingKey::default(),
            timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    /// Alias constructor for callers passing the simulator as `mxsim`.
    #[must_use]
    pub fn with_mxsim(session: S, mxsim: Box<dyn ExchangeSim>) -> Self {
        Self::new(session, mxsim)
    }

    /// Selects the expected-processing policy.
    #[must_use]
    pub const fn with_processing_key(mut self, key: ProcessingKey) -> Self {
        self.key = key;
        self
    }

    /// Overrides the per-receive timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Borrows the underlying session.
    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }

    fn expected_internal(&self, patch: &OrderPatch, order: Option<&Order>) -> Option<String> {
        match self.key {
            ProcessingKey::ClOrdId => patch
                .cl_ord_id
                .clone()
                .or_else(|| order.and_then(|o| o.cl_ord_id().map(str::to_string))),
            ProcessingKey::DestClOrdId => patch
                .dest_cl_ord_id
                .clone()
                .or_else(|| order.and_then(|o| o.dest_cl_ord_id.clone())),
        }
    }

    /// Records the recovered internal-processing id and the session-composed
    /// default client order id into the patch after a send.
    fn recover_ids(&self, patch: &mut OrderPatch, internal: Option<String>, entry_seq: i64) {
        let composite = format!("{}{:08}", self.session.virtual_server_no(), entry_seq);
        match self.key {
            ProcessingKey::ClOrdId => {
                if patch.cl_ord_id.is_none() {
                    patch.cl_ord_id = internal;
                }
                if patch.dest_cl_ord_id.is_none() {
                    patch.dest_cl_ord_id = Some(composite);
                }
            }
            ProcessingKey::DestClOrdId => {
                if patch.dest_cl_ord_id.is_none() {
                    patch.dest_cl_ord_id = internal;
                }
                if patch.cl_ord_id.is_none() {
                    patch.cl_ord_id = Some(composite);
                }
            }
        }
    }

    fn receive_notice(&mut self, expected: &str) -> Result<(EspMessage, NoticePayload)> {
        let msg = self.session.receive(self.timeout)?;
        let Some((_, payload)) = msg.notice_o() else {
            return Err(SessionError::UnexpectedMessage {
                expected: expected.to_string(),
                received: msg.label(),
            }
            .into());
        };
        let payload = payload.clone();
        Ok((msg, payload))
    }

    fn issue_code(patch: &OrderPatch, order: &Order) -> Option<String> {
        patch
            .security
            .as_ref()
            .or(order.security.as_ref())
            .map(|s| s.symbol.clone())
    }
}

/// Maps the harness side to the ESP side character.
fn esp_side(side: Side) -> char {
    match side {
        Side::Buy => codes::SIDE_BUY,
        _ => codes::SIDE_SELL,
    }
}

/// Short-sell variants map to the short-sell flag, not the side.
fn esp_short_sell_flag(side: Side) -> char {
    match side {
        Side::SellShort => codes::SHORT_SELL_WITH_PRICE_REG,
        Side::SellShortExempt => codes::SHORT_SELL_WITHOUT_PRICE_REG,
        _ => '0',
    }
}

fn render<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "<absent>".to_string(), ToString::to_string)
}

fn expect_eq<T: PartialEq + Display>(
    field: &str,
    expected: Option<T>,
    actual: Option<T>,
) -> Result<()> {
    if let Some(expected) = expected {
        if actual.as_ref() != Some(&expected) {
            return Err(
                ValidationError::new(field, expected.to_string(), render(&actual)).into(),
            );
        }
    }
    Ok(())
}

fn opt_char(c: char) -> Option<char> {
    if c == ' ' { None } else { Some(c) }
}

impl<S: EspSession> Checker for EspChecker<S> {
    fn book(&self) -> &OrderBook {
        &self.book
    }

    fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    fn new_order(&mut self, patch: OrderPatch) -> Result<OrderId> {
        let mut patch = patch;
        let id = self.book.add(Order::new());
        if !patch.dk {
            let wire = NewOrder {
                internal_processing: self.expected_internal(&patch, None),
                issue_code: patch.security.as_ref().map(|s| s.symbol.clone()),
                side: patch.side.map_or(codes::SIDE_BUY, esp_side),
                short_sell_flag: patch.side.map_or('0', esp_short_sell_flag),
                order_price: patch.order_price,
                order_quantity: patch.order_qty,
                ..NewOrder::default()
            };
            let sent = self
                .session
                .send(EspMessage::order_entry(OrderPayload::New(wire)))?;
            let internal = sent
                .new_order()
                .and_then(|o| o.internal_processing.clone());
            let entry_seq = sent
                .order()
                .and_then(|(layer, _)| layer.order_entry_seq_no)
                .unwrap_or(0);
            self.recover_ids(&mut patch, internal, entry_seq);
        }
        self.book.order_mut(id).apply_new_order(&patch);
        Ok(id)
    }

    fn ordering(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_ordering(&patch);
        Ok(())
    }

    fn ordered(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let mut patch = patch;
        let (msg, payload) = self.receive_notice("NewOrderAcceptanceNotice")?;
        let NoticePayload::NewOrderAcceptance(notice) = payload else {
            return Err(SessionError::UnexpectedMessage {
                expected: "NewOrderAcceptanceNotice".to_string(),
                received: msg.label(),
            }
            .into());
        };

        if patch.order_id2.is_none() {
            patch.order_id2 = notice.order_acceptance_no.clone();
        }
        self.book.order_mut(id).apply_ordered(&patch);

        let order = self.book.order(id);
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        expect_eq(
            "OrderAcceptanceNo",
            patch.order_id2.clone(),
            notice.order_acceptance_no.clone(),
        )?;
        expect_eq(
            "IssueCode",
            Self::issue_code(&patch, order),
            notice.issue_code.clone(),
        )?;
        expect_eq(
            "Side",
            patch.side.or(order.side).map(esp_side),
            opt_char(notice.side),
        )?;
        expect_eq(
            "OrderQuantity",
            patch.order_qty.or(order.order_qty()),
            notice.order_quantity,
        )?;
        expect_eq(
            "OrderPrice",
            patch.order_price.or(order.order_price()),
            notice.order_price,
        )?;
        Ok(())
    }

    fn reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let (msg, payload) = self.receive_notice("NewOrderRegistrationError")?;
        let notice = match payload {
            NoticePayload::NewOrderAcceptanceError(n)
            | NoticePayload::NewOrderRegistrationError(n) => n,
            _ => {
                return Err(SessionError::UnexpectedMessage {
                    expected: "NewOrderRegistrationError".to_string(),
                    received: msg.label(),
                }
                .into())
            }
        };

        self.book.order_mut(id).apply_reject(&patch);
        let order = self.book.order(id);
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        expect_eq(
            "IssueCode",
            Self::issue_code(&patch, order),
            notice.issue_code.clone(),
        )?;
        expect_eq(
            "OrderQuantity",
            patch.order_qty.or(order.order_qty()),
            notice.order_quantity,
        )?;
        Ok(())
    }

    fn modify(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let order = self.book.order(id);
        let internal = self.expected_internal(&patch, Some(order));
        let issue = Self::issue_code(&patch, order);

        let new_price = patch.order_price.or_else(|| {
            patch.d_order_price.and_then(|delta| match order.order_price() {
                Some(Price::Limit(current)) => Some(Price::Limit(current + delta)),
                _ => None,
            })
        });
        let reduction = if let Some(target) = patch.order_qty {
            order.order_qty().map(|current| (current - target).max(0))
        } else {
            patch.d_order_qty.map(|delta| (-delta).max(0))
        };

        let wire = ModificationOrder {
            issue_code: issue,
            internal_processing: internal,
            order_price: new_price,
            reduction_quantity: reduction,
            ..ModificationOrder::default()
        };
        self.session.send(EspMessage::order_entry(
            OrderPayload::ModificationByInternal(wire),
        ))?;

        self.book.order_mut(id).apply_modify(&patch);
        Ok(())
    }

    fn modifying(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_modifying(&patch);
        Ok(())
    }

    fn modified(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let (msg, payload) = self.receive_notice("ModificationOrderAcceptanceNotice")?;
        let NoticePayload::ModificationAcceptance(notice) = payload else {
            return Err(SessionError::UnexpectedMessage {
                expected: "ModificationOrderAcceptanceNotice".to_string(),
                received: msg.label(),
            }
            .into());
        };

        self.book.order_mut(id).apply_modified(&patch);
        let order = self.book.order(id);
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        expect_eq(
            "OrderAcceptanceNo",
            patch.order_id2.clone().or_else(|| order.order_id2.clone()),
            notice.order_acceptance_no.clone(),
        )?;
        expect_eq(
            "IssueCode",
            Self::issue_code(&patch, order),
            notice.issue_code.clone(),
        )?;
        if notice.order_price.is_some() {
            expect_eq("OrderPrice", order.order_price(), notice.order_price)?;
        }
        Ok(())
    }

    fn mod_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let (msg, payload) = self.receive_notice("ModificationOrderAcceptanceError")?;
        let notice = match payload {
            NoticePayload::ModificationAcceptanceError(n)
            | NoticePayload::ModificationRegistrationError(n) => n,
            _ => {
                return Err(SessionError::UnexpectedMessage {
                    expected: "ModificationOrderAcceptanceError".to_string(),
                    received: msg.label(),
                }
                .into())
            }
        };

        let order = self.book.order(id);
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        self.book.order_mut(id).apply_mod_reject(&patch);
        Ok(())
    }

    fn cancel(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let order = self.book.order(id);
        let wire = CancelOrder {
            issue_code: Self::issue_code(&patch, order),
            internal_processing: self.expected_internal(&patch, Some(order)),
            ..CancelOrder::default()
        };
        self.session
            .send(EspMessage::order_entry(OrderPayload::CancelByInternal(wire)))?;
        self.book.order_mut(id).apply_cancel(&patch);
        Ok(())
    }

    fn canceling(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_canceling(&patch);
        Ok(())
    }

    fn canceled(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let (msg, payload) = self.receive_notice("CancelOrderResultNotice")?;
        let notice = match payload {
            NoticePayload::CancelResult(n) => n,
            _ => {
                return Err(SessionError::UnexpectedMessage {
                    expected: "CancelOrderResultNotice".to_string(),
                    received: msg.label(),
                }
                .into())
            }
        };

        self.book.order_mut(id).apply_canceled(&patch);
        let order = self.book.order(id);
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        expect_eq(
            "OrderAcceptanceNo",
            patch.order_id2.clone().or_else(|| order.order_id2.clone()),
            notice.order_acceptance_no.clone(),
        )?;
        expect_eq(
            "IssueCode",
            Self::issue_code(&patch, order),
            notice.issue_code.clone(),
        )?;
        Ok(())
    }

    fn cxl_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let (msg, payload) = self.receive_notice("CancelOrderAcceptanceError")?;
        let notice = match payload {
            NoticePayload::CancelAcceptanceError(n)
            | NoticePayload::CancelRegistrationError(n) => n,
            _ => {
                return Err(SessionError::UnexpectedMessage {
                    expected: "CancelOrderAcceptanceError".to_string(),
                    received: msg.label(),
                }
                .into())
            }
        };

        let order = self.book.order(id);
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        self.book.order_mut(id).apply_cxl_reject(&patch);
        Ok(())
    }

    fn expire(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_expire(&patch);
        Ok(())
    }

    fn dfd(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_dfd(&patch);
        Ok(())
    }

    fn fill(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let mut patch = patch;
        let order_id2 = patch
            .order_id2
            .clone()
            .or_else(|| self.book.order(id).order_id2.clone())
            .ok_or_else(|| {
                SessionError::Configuration("fill requires an exchange order id".to_string())
            })?;
        let exec_qty = patch.exec_qty.ok_or_else(|| {
            SessionError::Configuration("fill requires an execution quantity".to_string())
        })?;
        let exec_price = patch.exec_price.unwrap_or(Decimal::ZERO);
        self.sim.fill(&order_id2, exec_qty, exec_price)?;

        let (msg, payload) = self.receive_notice("ExecutionCompletionNotice")?;
        let NoticePayload::ExecutionCompletion(notice) = payload else {
            return Err(SessionError::UnexpectedMessage {
                expected: "ExecutionCompletionNotice".to_string(),
                received: msg.label(),
            }
            .into());
        };

        if patch.exec_price.is_none() {
            patch.exec_price = notice.execution_price.and_then(|p| p.as_decimal());
        }
        self.book.order_mut(id).apply_fill(&patch);

        let order = self.book.order(id);
        expect_eq(
            "IssueCode",
            Self::issue_code(&patch, order),
            notice.issue_code.clone(),
        )?;
        expect_eq(
            "InternalProcessing",
            self.expected_internal(&patch, Some(order)),
            notice.internal_processing.clone(),
        )?;
        expect_eq(
            "OrderAcceptanceNo",
            Some(order_id2),
            notice.order_acceptance_no.clone(),
        )?;
        expect_eq(
            "ExecutionPrice",
            patch.exec_price.map(Price::Limit),
            notice.execution_price,
        )?;
        expect_eq(
            "ExecutedQuantity",
            Some(exec_qty),
            notice.executed_quantity,
        )?;
        Ok(())
    }

    fn bust(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_bust(&patch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderStatus, Security};
    use crate::sim::NullExchangeSim;
    use std::collections::VecDeque;
    use torii_esp::layers::NoticeCommon;
    use torii_esp::message::{EspBody, NoticeKind};
    use torii_esp::payloads::{
        CancelOrderAcceptanceNotice, CancelOrderResultNotice, ExecutionCompletionNotice,
        ModificationOrderAcceptanceNotice, NewOrderAcceptanceNotice,
    };

    /// In-memory session standing in for a connected client, mirroring its
    /// defaulting of order-entry sequence numbers and internal ids.
    #[derive(Default)]
    struct ScriptedSession {
        sent: Vec<EspMessage>,
        inbox: VecDeque<EspMessage>,
        order_entry_seq: i64,
        internal_counter: u64,
    }

    impl ScriptedSession {
        fn push_notice(&mut self, payload: NoticePayload) {
            let msg = EspMessage::notice(NoticeKind::Order, NoticeCommon::default(), payload);
            self.inbox.push_back(msg);
        }
    }

    impl EspSession for ScriptedSession {
        fn send(&mut self, mut msg: EspMessage) -> Result<EspMessage> {
            if let EspBody::Order {
                common, payload, ..
            } = &mut msg.body
            {
                if common.order_entry_seq_no.is_none() {
                    self.order_entry_seq += 1;
                    common.order_entry_seq_no = Some(self.order_entry_seq);
                }
                if let OrderPayload::New(order) = payload {
                    if order.internal_processing.is_none() {
                        self.internal_counter += 1;
                        order.internal_processing =
                            Some(format!("VIRTUA{:014}", self.internal_counter));
                    }
                }
            }
            self.sent.push(msg.clone());
            Ok(msg)
        }

        fn receive(&mut self, timeout: Duration) -> Result<EspMessage> {
            self.inbox
                .pop_front()
                .ok_or(torii_core::error::ToriiError::Timeout {
                    waited_ms: timeout.as_millis() as u64,
                })
        }

        fn virtual_server_no(&self) -> String {
            "VS0001".to_string()
        }
    }

    fn checker() -> EspChecker<ScriptedSession> {
        EspChecker::new(ScriptedSession::default(), Box::new(NullExchangeSim))
    }

    fn acceptance(internal: &str, acc_no: &str, qty: i64, price: &str) -> NoticePayload {
        NoticePayload::NewOrderAcceptance(NewOrderAcceptanceNotice {
            issue_code: Some("6758".to_string()),
            side: codes::SIDE_SELL,
            order_price: Some(price.parse().unwrap()),
            order_quantity: Some(qty),
            internal_processing: Some(internal.to_string()),
            order_acceptance_no: Some(acc_no.to_string()),
            ..NewOrderAcceptanceNotice::default()
        })
    }

    fn new_sell_order(checker: &mut EspChecker<ScriptedSession>, qty: i64, price: &str) -> OrderId {
        checker
            .new_order(
                OrderPatch::new()
                    .security(Security::new("6758"))
                    .side(Side::Sell)
                    .order_qty(qty)
                    .order_price(price.parse().unwrap()),
            )
            .unwrap()
    }

    #[test]
    fn test_new_order_sends_and_recovers_ids() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.5");

        let order = checker.book().order(id);
        assert_eq!(order.cl_ord_id(), Some("VIRTUA00000000000001"));
        assert_eq!(order.dest_cl_ord_id.as_deref(), Some("VS000100000001"));

        let sent = &checker.session().sent[0];
        let wire = sent.new_order().unwrap();
        assert_eq!(wire.issue_code.as_deref(), Some("6758"));
        assert_eq!(wire.side, codes::SIDE_SELL);
        assert_eq!(wire.order_quantity, Some(100));
    }

    #[test]
    fn test_scenario_new_then_cancel() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.5");
        checker
            .session()
            .push_notice(acceptance("VIRTUA00000000000001", "10000001", 100, "1500.5"));
        checker.ordered(id, OrderPatch::new()).unwrap();
        checker.verify().unwrap();
        assert_eq!(checker.book().order(id).order_id2.as_deref(), Some("10000001"));

        checker.cancel(id, OrderPatch::new()).unwrap();
        let cancel_sent = checker.session().sent.last().unwrap().clone();
        let (layer, payload) = cancel_sent.order().unwrap();
        assert_eq!(layer.data_code.as_deref(), None);
        let OrderPayload::CancelByInternal(wire) = payload else {
            panic!("expected cancel by internal");
        };
        assert_eq!(
            wire.internal_processing.as_deref(),
            Some("VIRTUA00000000000001")
        );

        checker
            .session()
            .push_notice(NoticePayload::CancelResult(CancelOrderResultNotice {
                issue_code: Some("6758".to_string()),
                order_acceptance_no: Some("10000001".to_string()),
                internal_processing: Some("VIRTUA00000000000001".to_string()),
                ..CancelOrderResultNotice::default()
            }));
        checker.canceled(id, OrderPatch::new()).unwrap();
        checker.verify().unwrap();

        let order = checker.book().order(id);
        assert_eq!(order.order_status, OrderStatus::Closed);
        assert_eq!(order.open_qty(), Some(0));
    }

    #[test]
    fn test_scenario_two_modifies_then_cancel() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.0");
        checker
            .session()
            .push_notice(acceptance("VIRTUA00000000000001", "10000001", 100, "1500.0"));
        checker.ordered(id, OrderPatch::new()).unwrap();

        // First modify: price up one.
        checker
            .modify(id, OrderPatch::new().order_price("1501.0".parse().unwrap()))
            .unwrap();
        checker
            .session()
            .push_notice(NoticePayload::ModificationAcceptance(
                ModificationOrderAcceptanceNotice {
                    issue_code: Some("6758".to_string()),
                    order_acceptance_no: Some("10000001".to_string()),
                    internal_processing: Some("VIRTUA00000000000001".to_string()),
                    order_price: Some("1501.0".parse().unwrap()),
                    ..ModificationOrderAcceptanceNotice::default()
                },
            ));
        checker.modified(id, OrderPatch::new()).unwrap();

        // Second modify: one share down.
        checker.modify(id, OrderPatch::new().d_order_qty(-1)).unwrap();
        let mod_sent = checker.session().sent.last().unwrap().clone();
        let (_, payload) = mod_sent.order().unwrap();
        let OrderPayload::ModificationByInternal(wire) = payload else {
            panic!("expected modification by internal");
        };
        assert_eq!(wire.reduction_quantity, Some(1));
        checker
            .session()
            .push_notice(NoticePayload::ModificationAcceptance(
                ModificationOrderAcceptanceNotice {
                    issue_code: Some("6758".to_string()),
                    order_acceptance_no: Some("10000001".to_string()),
                    internal_processing: Some("VIRTUA00000000000001".to_string()),
                    reduction_quantity: Some(1),
                    ..ModificationOrderAcceptanceNotice::default()
                },
            ));
        checker.modified(id, OrderPatch::new()).unwrap();

        // Cancel.
        checker.cancel(id, OrderPatch::new()).unwrap();
        checker
            .session()
            .push_notice(NoticePayload::CancelResult(CancelOrderResultNotice {
                issue_code: Some("6758".to_string()),
                order_acceptance_no: Some("10000001".to_string()),
                internal_processing: Some("VIRTUA00000000000001".to_string()),
                ..CancelOrderResultNotice::default()
            }));
        checker.canceled(id, OrderPatch::new()).unwrap();

        let order = checker.book().order(id);
        assert_eq!(order.order_status, OrderStatus::Closed);
        assert_eq!(order.order_price(), Some("1501.0".parse().unwrap()));
        assert_eq!(order.order_qty(), Some(99));
    }

    #[test]
    fn test_scenario_partial_fill_then_cancel() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.0");
        checker
            .session()
            .push_notice(acceptance("VIRTUA00000000000001", "10000001", 100, "1500.0"));
        checker.ordered(id, OrderPatch::new()).unwrap();

        checker
            .session()
            .push_notice(NoticePayload::ExecutionCompletion(
                ExecutionCompletionNotice {
                    issue_code: Some("6758".to_string()),
                    execution_price: Some("1501.0".parse().unwrap()),
                    executed_quantity: Some(50),
                    internal_processing: Some("VIRTUA00000000000001".to_string()),
                    order_acceptance_no: Some("10000001".to_string()),
                    ..ExecutionCompletionNotice::default()
                },
            ));
        checker
            .fill(
                id,
                OrderPatch::new()
                    .exec_qty(50)
                    .exec_price("1501.0".parse().unwrap()),
            )
            .unwrap();

        {
            let order = checker.book().order(id);
            assert_eq!(order.exec_qty, Some(50));
            assert_eq!(order.open_qty(), Some(50));
            assert_eq!(order.order_status, OrderStatus::Open);
        }

        checker.cancel(id, OrderPatch::new()).unwrap();
        checker
            .session()
            .push_notice(NoticePayload::CancelResult(CancelOrderResultNotice {
                issue_code: Some("6758".to_string()),
                order_acceptance_no: Some("10000001".to_string()),
                internal_processing: Some("VIRTUA00000000000001".to_string()),
                partially_executed_quantity: Some(50),
                ..CancelOrderResultNotice::default()
            }));
        checker.canceled(id, OrderPatch::new()).unwrap();

        let order = checker.book().order(id);
        assert_eq!(order.order_status, OrderStatus::Closed);
        assert_eq!(order.open_qty(), Some(0));
        assert_eq!(order.exec_qty, Some(50));
    }

    #[test]
    fn test_scenario_reject_on_new() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.0");
        checker
            .session()
            .push_notice(NoticePayload::NewOrderRegistrationError(
                NewOrderAcceptanceNotice {
                    issue_code: Some("6758".to_string()),
                    order_quantity: Some(100),
                    internal_processing: Some("VIRTUA00000000000001".to_string()),
                    ..NewOrderAcceptanceNotice::default()
                },
            ));
        checker.reject(id, OrderPatch::new()).unwrap();
        assert_eq!(checker.book().order(id).order_status, OrderStatus::Closed);
    }

    #[test]
    fn test_scenario_mod_and_cancel_reject() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.0");
        checker
            .session()
            .push_notice(acceptance("VIRTUA00000000000001", "10000001", 100, "1500.0"));
        checker.ordered(id, OrderPatch::new()).unwrap();

        checker.modify(id, OrderPatch::new().d_order_qty(-1)).unwrap();
        checker
            .session()
            .push_notice(NoticePayload::ModificationAcceptanceError(
                ModificationOrderAcceptanceNotice {
                    internal_processing: Some("VIRTUA00000000000001".to_string()),
                    ..ModificationOrderAcceptanceNotice::default()
                },
            ));
        checker.mod_reject(id, OrderPatch::new()).unwrap();
        {
            let order = checker.book().order(id);
            assert_eq!(order.order_qty(), Some(100));
            assert_eq!(order.order_status, OrderStatus::Open);
        }

        checker.cancel(id, OrderPatch::new()).unwrap();
        checker
            .session()
            .push_notice(NoticePayload::CancelAcceptanceError(
                CancelOrderAcceptanceNotice {
                    internal_processing: Some("VIRTUA00000000000001".to_string()),
                    ..CancelOrderAcceptanceNotice::default()
                },
            ));
        checker.cxl_reject(id, OrderPatch::new()).unwrap();
        assert_eq!(checker.book().order(id).order_status, OrderStatus::Open);
    }

    #[test]
    fn test_validation_failure_reports_field() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "1500.0");
        // Acceptance echoes a different quantity.
        checker
            .session()
            .push_notice(acceptance("VIRTUA00000000000001", "10000001", 99, "1500.0"));
        let err = checker.ordered(id, OrderPatch::new()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("OrderQuantity"), "unexpected error: {text}");
        assert!(text.contains("100"));
        assert!(text.contains("99"));
    }

    #[test]
    fn test_raw_processing_key_uses_dest_cl_ord_id() {
        let mut checker =
            EspChecker::new(ScriptedSession::default(), Box::new(NullExchangeSim))
                .with_processing_key(ProcessingKey::DestClOrdId);
        let id = checker
            .new_order(
                OrderPatch::new()
                    .security(Security::new("6758"))
                    .side(Side::Sell)
                    .order_qty(10)
                    .dest_cl_ord_id("RAWID000000000000001"),
            )
            .unwrap();
        let order = checker.book().order(id);
        assert_eq!(order.dest_cl_ord_id.as_deref(), Some("RAWID000000000000001"));
        // The composed session id lands on clOrdID in the raw policy.
        assert_eq!(order.cl_ord_id(), Some("VS000100000001"));

        let sent = checker.session().sent.last().unwrap();
        assert_eq!(
            sent.new_order().unwrap().internal_processing.as_deref(),
            Some("RAWID000000000000001")
        );
    }
}
