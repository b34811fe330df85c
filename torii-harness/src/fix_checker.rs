/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! FIX protocol checker.
//!
//! Binds the abstract lifecycle transitions to FIX 4.4 application
//! messages: NewOrderSingle out, ExecutionReports in, cancel/replace and
//! their rejects. Every received report is validated tag by tag against
//! expected values (explicit patch fields falling back to current order
//! state).

use crate::checker::{Checker, OrderBook, OrderId};
use crate::order::{Order, OrderPatch};
use crate::sim::ExchangeSim;
use std::time::Duration;
use torii_core::error::{Result, SessionError, ToriiError, ValidationError};
use torii_core::types::{Price, Side};
use torii_fix::client::{FixClient, DEFAULT_RECEIVE_TIMEOUT};
use torii_fix::message::FixMessage;
use torii_fix::tags::{msg_type, tag};

/// Session surface the FIX checker drives. Implemented by
/// [`FixClient`] and by scripted sessions in tests.
pub trait FixSession {
    /// Sends a message; returns it as sealed for the wire.
    ///
    /// # Errors
    /// Transport or session failure.
    fn send(&mut self, msg: FixMessage) -> Result<FixMessage>;

    /// Receives the next unconsumed frame.
    ///
    /// # Errors
    /// Timeout or transport failure.
    fn receive(&mut self, timeout: Duration) -> Result<FixMessage>;
}

impl FixSession for FixClient {
    fn send(&mut self, msg: FixMessage) -> Result<FixMessage> {
        self.send_message(msg)
    }

    fn receive(&mut self, timeout: Duration) -> Result<FixMessage> {
        self.receive_message(timeout)
    }
}

/// OrdStatus (39) values the checker asserts.
mod ord_status {
    pub const NEW: &str = "0";
    pub const PARTIALLY_FILLED: &str = "1";
    pub const FILLED: &str = "2";
    pub const CANCELED: &str = "4";
    pub const REJECTED: &str = "8";
}

/// ExecType (150) values the checker asserts.
mod exec_type {
    pub const NEW: &str = "0";
    pub const PARTIAL_FILL: &str = "1";
    pub const FILL: &str = "2";
    pub const CANCELED: &str = "4";
    pub const REPLACE: &str = "5";
    pub const REJECT: &str = "8";
}

/// Maps the harness side to the FIX side code (tag 54).
fn fix_side(side: Side) -> &'static str {
    match side {
        Side::Buy => "1",
        Side::Sell => "2",
        Side::SellShort => "5",
        Side::SellShortExempt => "6",
    }
}

/// Checker binding the order lifecycle to FIX 4.4.
pub struct FixChecker<S: FixSession> {
    book: OrderBook,
    session: S,
    sim: Box<dyn ExchangeSim>,
    expected_seq: u64,
    timeout: Duration,
}

impl<S: FixSession> FixChecker<S> {
    /// Creates a checker over a session and an exchange simulator.
    #[must_use]
    pub fn new(session: S, exchange_sim: Box<dyn ExchangeSim>) -> Self {
        Self {
            book: OrderBook::new(),
            session,
            sim: exchange_sim,
            expected_seq: 1,
            timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    /// Alias constructor for callers passing the simulator as `mxsim`.
    #[must_use]
    pub fn with_mxsim(session: S, mxsim: Box<dyn ExchangeSim>) -> Self {
        Self::new(session, mxsim)
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

    fn next_cl_ord_id(&self) -> String {
        format!("ORD{}", self.expected_seq)
    }

    fn receive_execution_report(&mut self) -> Result<FixMessage> {
        let msg = self.session.receive(self.timeout)?;
        if msg.msg_type() != Some(msg_type::EXECUTION_REPORT) {
            return Err(SessionError::UnexpectedMessage {
                expected: "ExecutionReport".to_string(),
                received: msg.msg_type().unwrap_or("?").to_string(),
            }
            .into());
        }
        Ok(msg)
    }

    fn receive_cancel_reject(&mut self) -> Result<FixMessage> {
        let msg = self.session.receive(self.timeout)?;
        if msg.msg_type() != Some(msg_type::ORDER_CANCEL_REJECT) {
            return Err(SessionError::UnexpectedMessage {
                expected: "OrderCancelReject".to_string(),
                received: msg.msg_type().unwrap_or("?").to_string(),
            }
            .into());
        }
        Ok(msg)
    }

    fn symbol(patch: &OrderPatch, order: &Order) -> Option<String> {
        patch.symbol.clone().or_else(|| {
            patch
                .security
                .as_ref()
                .or(order.security.as_ref())
                .map(|s| s.symbol.clone())
        })
    }

    fn price_string(price: Option<Price>) -> Option<String> {
        match price {
            Some(Price::Limit(value)) => Some(value.to_string()),
            _ => None,
        }
    }
}

fn validate_tag(msg: &FixMessage, tag_no: u32, expected: Option<String>) -> Result<()> {
    if let Some(expected) = expected {
        let actual = msg.get(tag_no);
        if actual != Some(expected.as_str()) {
            return Err(ValidationError::new(
                format!("Tag {tag_no}"),
                expected,
                actual.unwrap_or("<absent>").to_string(),
            )
            .into());
        }
    }
    Ok(())
}

impl<S: FixSession> Checker for FixChecker<S> {
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
            let cl_ord_id = patch
                .cl_ord_id
                .clone()
                .unwrap_or_else(|| self.next_cl_ord_id());
            let mut msg = FixMessage::with_type(msg_type::NEW_ORDER_SINGLE);
            msg.set(tag::CL_ORD_ID, cl_ord_id.clone());
            if let Some(symbol) = Self::symbol(&patch, self.book.order(id)) {
                msg.set(tag::SYMBOL, symbol);
            }
            if let Some(side) = patch.side {
                msg.set(tag::SIDE, fix_side(side));
            }
            if let Some(qty) = patch.order_qty {
                msg.set(tag::ORDER_QTY, qty.to_string());
            }
            if let Some(price) = Self::price_string(patch.order_price) {
                msg.set(tag::PRICE, price);
            }
            self.session.send(msg)?;
            self.expected_seq += 1;
            patch.cl_ord_id = Some(cl_ord_id);
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
        let msg = self.receive_execution_report()?;
        if patch.order_id2.is_none() {
            patch.order_id2 = msg.get(tag::ORDER_ID).map(str::to_string);
        }
        self.book.order_mut(id).apply_ordered(&patch);

        let order = self.book.order(id);
        validate_tag(
            &msg,
            tag::CL_ORD_ID,
            patch
                .cl_ord_id
                .clone()
                .or_else(|| order.cl_ord_id().map(str::to_string)),
        )?;
        validate_tag(&msg, tag::ORDER_ID, patch.order_id2.clone())?;
        validate_tag(&msg, tag::SYMBOL, Self::symbol(&patch, order))?;
        validate_tag(
            &msg,
            tag::SIDE,
            patch.side.or(order.side).map(|s| fix_side(s).to_string()),
        )?;
        validate_tag(
            &msg,
            tag::ORDER_QTY,
            patch
                .order_qty
                .or(order.order_qty())
                .map(|q| q.to_string()),
        )?;
        validate_tag(
            &msg,
            tag::PRICE,
            Self::price_string(patch.order_price.or(order.order_price())),
        )?;
        validate_tag(&msg, tag::ORD_STATUS, Some(ord_status::NEW.to_string()))?;
        validate_tag(&msg, tag::EXEC_TYPE, Some(exec_type::NEW.to_string()))?;
        Ok(())
    }

    fn reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let msg = self.receive_execution_report()?;
        self.book.order_mut(id).apply_reject(&patch);

        let order = self.book.order(id);
        validate_tag(
            &msg,
            tag::CL_ORD_ID,
            patch
                .cl_ord_id
                .clone()
                .or_else(|| order.cl_ord_id().map(str::to_string)),
        )?;
        validate_tag(&msg, tag::SYMBOL, Self::symbol(&patch, order))?;
        validate_tag(
            &msg,
            tag::ORD_STATUS,
            Some(ord_status::REJECTED.to_string()),
        )?;
        validate_tag(&msg, tag::EXEC_TYPE, Some(exec_type::REJECT.to_string()))?;
        Ok(())
    }

    fn modify(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let mut patch = patch;
        let new_cl_ord_id = patch
            .cl_ord_id
            .clone()
            .unwrap_or_else(|| self.next_cl_ord_id());
        let order = self.book.order(id);
        let orig_cl_ord_id = order.cl_ord_id().map(str::to_string);

        let target_qty = patch
            .order_qty
            .or_else(|| {
                patch
                    .d_order_qty
                    .and_then(|d| order.order_qty().map(|q| q + d))
            })
            .or(order.order_qty());
        let target_price = patch
            .order_price
            .or_else(|| {
                patch.d_order_price.and_then(|d| match order.order_price() {
                    Some(Price::Limit(current)) => Some(Price::Limit(current + d)),
                    other => other,
                })
            })
            .or(order.order_price());

        let mut msg = FixMessage::with_type(msg_type::ORDER_CANCEL_REPLACE_REQUEST);
        if let Some(orig) = &orig_cl_ord_id {
            msg.set(tag::ORIG_CL_ORD_ID, orig.clone());
        }
        msg.set(tag::CL_ORD_ID, new_cl_ord_id.clone());
        if let Some(symbol) = Self::symbol(&patch, order) {
            msg.set(tag::SYMBOL, symbol);
        }
        if let Some(side) = patch.side.or(order.side) {
            msg.set(tag::SIDE, fix_side(side));
        }
        if let Some(qty) = target_qty {
            msg.set(tag::ORDER_QTY, qty.to_string());
        }
        if let Some(price) = Self::price_string(target_price) {
            msg.set(tag::PRICE, price);
        }
        self.session.send(msg)?;
        self.expected_seq += 1;

        patch.cl_ord_id = Some(new_cl_ord_id);
        self.book.order_mut(id).apply_modify(&patch);
        Ok(())
    }

    fn modifying(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_modifying(&patch);
        Ok(())
    }

    fn modified(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let msg = self.receive_execution_report()?;
        self.book.order_mut(id).apply_modified(&patch);

        let order = self.book.order(id);
        validate_tag(
            &msg,
            tag::CL_ORD_ID,
            patch
                .cl_ord_id
                .clone()
                .or_else(|| order.cl_ord_id().map(str::to_string)),
        )?;
        validate_tag(
            &msg,
            tag::ORDER_QTY,
            patch
                .order_qty
                .or(order.order_qty())
                .map(|q| q.to_string()),
        )?;
        validate_tag(&msg, tag::EXEC_TYPE, Some(exec_type::REPLACE.to_string()))?;
        Ok(())
    }

    fn mod_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let msg = self.receive_cancel_reject()?;
        // 434=2: the reject answers a cancel/replace request.
        validate_tag(&msg, tag::CXL_REJ_RESPONSE_TO, Some("2".to_string()))?;
        self.book.order_mut(id).apply_mod_reject(&patch);
        Ok(())
    }

    fn cancel(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let mut patch = patch;
        let new_cl_ord_id = patch
            .cl_ord_id
            .clone()
            .unwrap_or_else(|| self.next_cl_ord_id());
        let order = self.book.order(id);

        let mut msg = FixMessage::with_type(msg_type::ORDER_CANCEL_REQUEST);
        if let Some(orig) = order.cl_ord_id() {
            msg.set(tag::ORIG_CL_ORD_ID, orig);
        }
        msg.set(tag::CL_ORD_ID, new_cl_ord_id.clone());
        if let Some(symbol) = Self::symbol(&patch, order) {
            msg.set(tag::SYMBOL, symbol);
        }
        if let Some(side) = patch.side.or(order.side) {
            msg.set(tag::SIDE, fix_side(side));
        }
        if let Some(qty) = order.order_qty() {
            msg.set(tag::ORDER_QTY, qty.to_string());
        }
        self.session.send(msg)?;
        self.expected_seq += 1;

        patch.cl_ord_id = Some(new_cl_ord_id);
        self.book.order_mut(id).apply_cancel(&patch);
        Ok(())
    }

    fn canceling(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_canceling(&patch);
        Ok(())
    }

    fn canceled(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let msg = self.receive_execution_report()?;
        self.book.order_mut(id).apply_canceled(&patch);

        let order = self.book.order(id);
        validate_tag(
            &msg,
            tag::CL_ORD_ID,
            patch
                .cl_ord_id
                .clone()
                .or_else(|| order.cl_ord_id().map(str::to_string)),
        )?;
        validate_tag(
            &msg,
            tag::ORD_STATUS,
            Some(ord_status::CANCELED.to_string()),
        )?;
        validate_tag(&msg, tag::EXEC_TYPE, Some(exec_type::CANCELED.to_string()))?;
        Ok(())
    }

    fn cxl_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let msg = self.receive_cancel_reject()?;
        // 434=1: the reject answers a cancel request.
        validate_tag(&msg, tag::CXL_REJ_RESPONSE_TO, Some("1".to_string()))?;
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
        let order_id2 = patch
            .order_id2
            .clone()
            .or_else(|| self.book.order(id).order_id2.clone())
            .ok_or_else(|| {
                ToriiError::from(SessionError::Configuration(
                    "fill requires an exchange order id".to_string(),
                ))
            })?;
        let exec_qty = patch.exec_qty.ok_or_else(|| {
            ToriiError::from(SessionError::Configuration(
                "fill requires an execution quantity".to_string(),
            ))
        })?;
        let exec_price = patch.exec_price.ok_or_else(|| {
            ToriiError::from(SessionError::Configuration(
                "fill requires an execution price".to_string(),
            ))
        })?;
        self.sim.fill(&order_id2, exec_qty, exec_price)?;

        let msg = self.receive_execution_report()?;
        self.book.order_mut(id).apply_fill(&patch);

        let order = self.book.order(id);
        let closed = order.open_qty() == Some(0);
        validate_tag(
            &msg,
            tag::CL_ORD_ID,
            patch
                .cl_ord_id
                .clone()
                .or_else(|| order.cl_ord_id().map(str::to_string)),
        )?;
        validate_tag(&msg, tag::ORDER_ID, Some(order_id2))?;
        validate_tag(&msg, tag::SYMBOL, Self::symbol(&patch, order))?;
        validate_tag(
            &msg,
            tag::SIDE,
            patch.side.or(order.side).map(|s| fix_side(s).to_string()),
        )?;
        validate_tag(
            &msg,
            tag::ORDER_QTY,
            order.order_qty().map(|q| q.to_string()),
        )?;
        validate_tag(&msg, tag::LAST_QTY, Some(exec_qty.to_string()))?;
        validate_tag(&msg, tag::LAST_PX, Some(exec_price.to_string()))?;
        validate_tag(
            &msg,
            tag::ORD_STATUS,
            Some(
                if closed {
                    ord_status::FILLED
                } else {
                    ord_status::PARTIALLY_FILLED
                }
                .to_string(),
            ),
        )?;
        validate_tag(
            &msg,
            tag::EXEC_TYPE,
            Some(
                if closed {
                    exec_type::FILL
                } else {
                    exec_type::PARTIAL_FILL
                }
                .to_string(),
            ),
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

    /// In-memory session with a scripted inbox.
    #[derive(Default)]
    struct ScriptedSession {
        sent: Vec<FixMessage>,
        inbox: VecDeque<FixMessage>,
    }

    impl ScriptedSession {
        fn push(&mut self, msg: FixMessage) {
            self.inbox.push_back(msg);
        }
    }

    impl FixSession for ScriptedSession {
        fn send(&mut self, msg: FixMessage) -> Result<FixMessage> {
            self.sent.push(msg.clone());
            Ok(msg)
        }

        fn receive(&mut self, timeout: Duration) -> Result<FixMessage> {
            self.inbox.pop_front().ok_or(ToriiError::Timeout {
                waited_ms: timeout.as_millis() as u64,
            })
        }
    }

    fn checker() -> FixChecker<ScriptedSession> {
        FixChecker::new(ScriptedSession::default(), Box::new(NullExchangeSim))
    }

    fn execution_report(fields: &[(u32, &str)]) -> FixMessage {
        let mut msg = FixMessage::with_type(msg_type::EXECUTION_REPORT);
        for (t, v) in fields {
            msg.set(*t, *v);
        }
        msg
    }

    fn new_sell_order(checker: &mut FixChecker<ScriptedSession>, qty: i64, price: &str) -> OrderId {
        checker
            .new_order(
                OrderPatch::new()
                    .security(Security::new("BABA"))
                    .side(Side::Sell)
                    .order_qty(qty)
                    .order_price(price.parse().unwrap()),
            )
            .unwrap()
    }

    #[test]
    fn test_new_order_builds_tag_map() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");

        let sent = &checker.session().sent[0];
        assert_eq!(sent.msg_type(), Some(msg_type::NEW_ORDER_SINGLE));
        assert_eq!(sent.get(tag::CL_ORD_ID), Some("ORD1"));
        assert_eq!(sent.get(tag::SYMBOL), Some("BABA"));
        assert_eq!(sent.get(tag::SIDE), Some("2"));
        assert_eq!(sent.get(tag::ORDER_QTY), Some("100"));
        assert_eq!(sent.get(tag::PRICE), Some("10.0"));
        assert_eq!(checker.book().order(id).cl_ord_id(), Some("ORD1"));
    }

    #[test]
    fn test_market_order_drops_price_tag() {
        let mut checker = checker();
        checker
            .new_order(
                OrderPatch::new()
                    .security(Security::new("BABA"))
                    .side(Side::Buy)
                    .order_qty(10)
                    .order_price(Price::Market),
            )
            .unwrap();
        let sent = &checker.session().sent[0];
        assert_eq!(sent.get(tag::SIDE), Some("1"));
        assert!(sent.get(tag::PRICE).is_none());
    }

    #[test]
    fn test_short_sell_sides() {
        let mut checker = checker();
        checker
            .new_order(OrderPatch::new().side(Side::SellShort).order_qty(1))
            .unwrap();
        checker
            .new_order(OrderPatch::new().side(Side::SellShortExempt).order_qty(1))
            .unwrap();
        assert_eq!(checker.session().sent[0].get(tag::SIDE), Some("5"));
        assert_eq!(checker.session().sent[1].get(tag::SIDE), Some("6"));
    }

    #[test]
    fn test_ordered_validates_and_records_order_id() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "100"),
            (tag::PRICE, "10.0"),
            (tag::ORD_STATUS, "0"),
            (tag::EXEC_TYPE, "0"),
        ]));
        checker.ordered(id, OrderPatch::new()).unwrap();
        checker.verify().unwrap();

        let order = checker.book().order(id);
        assert_eq!(order.order_status, OrderStatus::Open);
        assert_eq!(order.order_id2.as_deref(), Some("OID-1"));
    }

    #[test]
    fn test_ordered_flags_field_mismatch() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "1"), // wrong side
            (tag::ORDER_QTY, "100"),
            (tag::PRICE, "10.0"),
            (tag::ORD_STATUS, "0"),
            (tag::EXEC_TYPE, "0"),
        ]));
        let err = checker.ordered(id, OrderPatch::new()).unwrap_err();
        assert!(err.to_string().contains("Tag 54"), "got: {err}");
    }

    #[test]
    fn test_scenario_reject_on_new() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::SYMBOL, "BABA"),
            (tag::ORD_STATUS, "8"),
            (tag::EXEC_TYPE, "8"),
        ]));
        checker.reject(id, OrderPatch::new()).unwrap();
        assert_eq!(checker.book().order(id).order_status, OrderStatus::Closed);
    }

    #[test]
    fn test_fill_partial_then_complete() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 10, "5.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "10"),
            (tag::PRICE, "5.0"),
            (tag::ORD_STATUS, "0"),
            (tag::EXEC_TYPE, "0"),
        ]));
        checker.ordered(id, OrderPatch::new()).unwrap();

        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "10"),
            (tag::LAST_QTY, "6"),
            (tag::LAST_PX, "5.1"),
            (tag::ORD_STATUS, "1"),
            (tag::EXEC_TYPE, "1"),
        ]));
        checker
            .fill(
                id,
                OrderPatch::new().exec_qty(6).exec_price("5.1".parse().unwrap()),
            )
            .unwrap();
        {
            let order = checker.book().order(id);
            assert_eq!(order.exec_qty, Some(6));
            assert_eq!(order.open_qty(), Some(4));
            assert_eq!(order.order_status, OrderStatus::Open);
        }

        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "10"),
            (tag::LAST_QTY, "4"),
            (tag::LAST_PX, "5.2"),
            (tag::ORD_STATUS, "2"),
            (tag::EXEC_TYPE, "2"),
        ]));
        checker
            .fill(
                id,
                OrderPatch::new().exec_qty(4).exec_price("5.2".parse().unwrap()),
            )
            .unwrap();
        let order = checker.book().order(id);
        assert_eq!(order.exec_qty, Some(10));
        assert_eq!(order.open_qty(), Some(0));
        assert_eq!(order.order_status, OrderStatus::Closed);
    }

    #[test]
    fn test_modify_sends_cancel_replace() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "100"),
            (tag::PRICE, "10.0"),
            (tag::ORD_STATUS, "0"),
            (tag::EXEC_TYPE, "0"),
        ]));
        checker.ordered(id, OrderPatch::new()).unwrap();

        checker
            .modify(id, OrderPatch::new().order_price("11.0".parse().unwrap()))
            .unwrap();
        let replace = checker.session().sent.last().unwrap().clone();
        assert_eq!(
            replace.msg_type(),
            Some(msg_type::ORDER_CANCEL_REPLACE_REQUEST)
        );
        assert_eq!(replace.get(tag::ORIG_CL_ORD_ID), Some("ORD1"));
        assert_eq!(replace.get(tag::CL_ORD_ID), Some("ORD2"));
        assert_eq!(replace.get(tag::PRICE), Some("11.0"));

        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD2"),
            (tag::ORDER_QTY, "100"),
            (tag::EXEC_TYPE, "5"),
        ]));
        checker.modified(id, OrderPatch::new()).unwrap();
        let order = checker.book().order(id);
        assert_eq!(order.order_price(), Some("11.0".parse().unwrap()));
        assert_eq!(order.cl_ord_id(), Some("ORD2"));
    }

    #[test]
    fn test_scenario_mod_and_cancel_reject() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "100"),
            (tag::PRICE, "10.0"),
            (tag::ORD_STATUS, "0"),
            (tag::EXEC_TYPE, "0"),
        ]));
        checker.ordered(id, OrderPatch::new()).unwrap();

        checker.modify(id, OrderPatch::new().d_order_qty(-1)).unwrap();
        let mut reject = FixMessage::with_type(msg_type::ORDER_CANCEL_REJECT);
        reject.set(tag::CXL_REJ_RESPONSE_TO, "2");
        checker.session().push(reject);
        checker.mod_reject(id, OrderPatch::new()).unwrap();
        {
            let order = checker.book().order(id);
            assert_eq!(order.order_qty(), Some(100));
            assert_eq!(order.cl_ord_id(), Some("ORD1"));
            assert_eq!(order.order_status, OrderStatus::Open);
        }

        checker.cancel(id, OrderPatch::new()).unwrap();
        let mut reject = FixMessage::with_type(msg_type::ORDER_CANCEL_REJECT);
        reject.set(tag::CXL_REJ_RESPONSE_TO, "1");
        checker.session().push(reject);
        checker.cxl_reject(id, OrderPatch::new()).unwrap();
        assert_eq!(checker.book().order(id).order_status, OrderStatus::Open);
    }

    #[test]
    fn test_canceled_closes_order() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD1"),
            (tag::ORDER_ID, "OID-1"),
            (tag::SYMBOL, "BABA"),
            (tag::SIDE, "2"),
            (tag::ORDER_QTY, "100"),
            (tag::PRICE, "10.0"),
            (tag::ORD_STATUS, "0"),
            (tag::EXEC_TYPE, "0"),
        ]));
        checker.ordered(id, OrderPatch::new()).unwrap();

        checker.cancel(id, OrderPatch::new()).unwrap();
        checker.session().push(execution_report(&[
            (tag::CL_ORD_ID, "ORD2"),
            (tag::ORD_STATUS, "4"),
            (tag::EXEC_TYPE, "4"),
        ]));
        checker.canceled(id, OrderPatch::new()).unwrap();
        assert_eq!(checker.book().order(id).order_status, OrderStatus::Closed);
    }

    #[test]
    fn test_unexpected_message_type_is_protocol_error() {
        let mut checker = checker();
        let id = new_sell_order(&mut checker, 100, "10.0");
        checker.session().push(FixMessage::with_type(msg_type::HEARTBEAT));
        let err = checker.ordered(id, OrderPatch::new()).unwrap_err();
        assert!(matches!(
            err,
            ToriiError::Session(SessionError::UnexpectedMessage { .. })
        ));
    }
}
