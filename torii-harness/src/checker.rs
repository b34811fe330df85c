/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Verification harness core.
//!
//! A [`Checker`] owns the orders under test and exposes one method per
//! lifecycle transition. Protocol-specific implementations send or await
//! the corresponding wire message and validate every response field;
//! [`GenericChecker`] applies the state change only and backs unit tests.
//!
//! `verify` is the reset/flush synchronization point between test steps.

use crate::order::{Order, OrderPatch};
use rust_decimal::Decimal;
use std::collections::HashMap;
use torii_core::error::Result;
use torii_core::types::Side;
use tracing::info;

/// Handle to an order inside a checker's book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(usize);

/// The set of orders a checker drives, with lazily built per-attribute
/// lookup indexes.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
    indexes: HashMap<&'static str, HashMap<String, OrderId>>,
}

impl OrderBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an order and returns its handle.
    pub fn add(&mut self, order: Order) -> OrderId {
        self.indexes.clear();
        let id = OrderId(self.orders.len());
        self.orders.push(order);
        id
    }

    /// Borrows an order.
    #[must_use]
    pub fn order(&self, id: OrderId) -> &Order {
        &self.orders[id.0]
    }

    /// Mutably borrows an order.
    pub fn order_mut(&mut self, id: OrderId) -> &mut Order {
        &mut self.orders[id.0]
    }

    /// Number of orders in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True when the book holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterates the orders in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Finds an order by an id attribute, building the hash index for that
    /// attribute on first use. Accepts both snake_case and camelCase
    /// attribute names.
    pub fn find_order_by(&mut self, attribute: &str, value: &str) -> Option<OrderId> {
        let canonical = crate::order::canonical_key(attribute);
        let key: &'static str = match canonical {
            "cl_ord_id" => "cl_ord_id",
            "dest_cl_ord_id" => "dest_cl_ord_id",
            "order_id2" => "order_id2",
            "client_id" => "client_id",
            "account_id" => "account_id",
            _ => return None,
        };
        let index = self.indexes.entry(key).or_insert_with(|| {
            let mut map = HashMap::new();
            for (pos, order) in self.orders.iter().enumerate() {
                if let Some(v) = attr_value(order, key) {
                    map.insert(v, OrderId(pos));
                }
            }
            map
        });
        index.get(value).copied()
    }
}

fn attr_value(order: &Order, key: &str) -> Option<String> {
    match key {
        "cl_ord_id" => order.cl_ord_id().map(str::to_string),
        "dest_cl_ord_id" => order.dest_cl_ord_id.clone(),
        "order_id2" => order.order_id2.clone(),
        "client_id" => order.client_id.clone(),
        "account_id" => order.account_id.clone(),
        _ => None,
    }
}

/// Parameters for a repeated-tick fill: each tick executes `exec_qty`
/// (stepped by `d_exec_qty`) and walks the price by `d_exec_price` in the
/// direction favourable to the order's side.
#[derive(Debug, Clone)]
pub struct RepeatTicks {
    pub ticks: u32,
    pub exec_qty: i64,
    pub d_exec_qty: i64,
    pub exec_price: Decimal,
    pub d_exec_price: Decimal,
}

/// One lifecycle method per order-state transition.
///
/// Protocol implementations emit or await the corresponding wire message,
/// validate the response against expected values (explicit patch fields
/// falling back to current order state), and apply the state change.
pub trait Checker {
    /// The orders this checker owns.
    fn book(&self) -> &OrderBook;

    /// Mutable access to the orders this checker owns.
    fn book_mut(&mut self) -> &mut OrderBook;

    /// Creates an order and, unless `dk`, emits the new-order message.
    fn new_order(&mut self, patch: OrderPatch) -> Result<OrderId>;

    /// Order entry is pending.
    fn ordering(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// Order was confirmed by the exchange.
    fn ordered(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// Order was rejected by the exchange.
    fn reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A modification was sent.
    fn modify(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A modification is pending.
    fn modifying(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A modification was confirmed.
    fn modified(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A modification was rejected.
    fn mod_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A cancellation was sent.
    fn cancel(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A cancellation is pending.
    fn canceling(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A cancellation was confirmed.
    fn canceled(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// A cancellation was rejected.
    fn cxl_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// The order expired.
    fn expire(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// Done for day.
    fn dfd(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// The order was (possibly partially) filled.
    fn fill(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// An execution was busted.
    fn bust(&mut self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// Flush/reset synchronization point between test steps.
    ///
    /// # Errors
    /// Implementations may surface deferred validation failures here.
    fn verify(&mut self) -> Result<()> {
        self.reset()
    }

    /// Resets transient checker state.
    ///
    /// # Errors
    /// Implementation specific.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Finds an order by id attribute through the book's lazy indexes.
    fn find_order_by(&mut self, attribute: &str, value: &str) -> Option<OrderId> {
        self.book_mut().find_order_by(attribute, value)
    }

    /// Drives a sequence of fills walking the price tick by tick; buys walk
    /// down towards the final price, sells walk up.
    ///
    /// # Errors
    /// Propagates the first failing fill.
    fn fill_repeat_ticks(&mut self, id: OrderId, repeat: RepeatTicks) -> Result<()> {
        let side = self.book().order(id).side;
        let ticks = i64::from(repeat.ticks.max(1));
        let (mut price, d_price) = match side {
            Some(Side::Buy) => (
                repeat.exec_price - repeat.d_exec_price * Decimal::from(ticks - 1),
                repeat.d_exec_price,
            ),
            _ => (
                repeat.exec_price + repeat.d_exec_price * Decimal::from(ticks - 1),
                -repeat.d_exec_price,
            ),
        };
        for i in 0..ticks {
            let patch = OrderPatch::new()
                .exec_qty(repeat.exec_qty + i * repeat.d_exec_qty)
                .exec_price(price);
            self.fill(id, patch)?;
            price += d_price;
        }
        Ok(())
    }
}

/// A checker that applies state transitions without any wire traffic.
#[derive(Debug, Default)]
pub struct GenericChecker {
    book: OrderBook,
}

impl GenericChecker {
    /// Creates an empty generic checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for GenericChecker {
    fn book(&self) -> &OrderBook {
        &self.book
    }

    fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    fn new_order(&mut self, patch: OrderPatch) -> Result<OrderId> {
        let id = self.book.add(Order::new());
        self.book.order_mut(id).apply_new_order(&patch);
        Ok(id)
    }

    fn ordering(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_ordering(&patch);
        Ok(())
    }

    fn ordered(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_ordered(&patch);
        Ok(())
    }

    fn reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_reject(&patch);
        Ok(())
    }

    fn modify(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_modify(&patch);
        Ok(())
    }

    fn modifying(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_modifying(&patch);
        Ok(())
    }

    fn modified(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_modified(&patch);
        Ok(())
    }

    fn mod_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_mod_reject(&patch);
        Ok(())
    }

    fn cancel(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_cancel(&patch);
        Ok(())
    }

    fn canceling(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_canceling(&patch);
        Ok(())
    }

    fn canceled(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_canceled(&patch);
        Ok(())
    }

    fn cxl_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
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
        self.book.order_mut(id).apply_fill(&patch);
        Ok(())
    }

    fn bust(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.book.order_mut(id).apply_bust(&patch);
        Ok(())
    }
}

/// A checker decorator that logs every lifecycle callback before
/// delegating.
#[derive(Debug)]
pub struct LoggingChecker<C: Checker> {
    inner: C,
}

impl<C: Checker> LoggingChecker<C> {
    /// Wraps an existing checker.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Unwraps the inner checker.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn log(&self, event: &str, id: OrderId, patch: &OrderPatch) {
        info!(event, order = %self.inner.book().order(id), ?patch);
    }
}

impl<C: Checker> Checker for LoggingChecker<C> {
    fn book(&self) -> &OrderBook {
        self.inner.book()
    }

    fn book_mut(&mut self) -> &mut OrderBook {
        self.inner.book_mut()
    }

    fn new_order(&mut self, patch: OrderPatch) -> Result<OrderId> {
        info!(event = "new_order", ?patch);
        self.inner.new_order(patch)
    }

    fn ordering(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("ordering", id, &patch);
        self.inner.ordering(id, patch)
    }

    fn ordered(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("ordered", id, &patch);
        self.inner.ordered(id, patch)
    }

    fn reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("reject", id, &patch);
        self.inner.reject(id, patch)
    }

    fn modify(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("modify", id, &patch);
        self.inner.modify(id, patch)
    }

    fn modifying(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("modifying", id, &patch);
        self.inner.modifying(id, patch)
    }

    fn modified(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("modified", id, &patch);
        self.inner.modified(id, patch)
    }

    fn mod_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("mod_reject", id, &patch);
        self.inner.mod_reject(id, patch)
    }

    fn cancel(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("cancel", id, &patch);
        self.inner.cancel(id, patch)
    }

    fn canceling(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("canceling", id, &patch);
        self.inner.canceling(id, patch)
    }

    fn canceled(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("canceled", id, &patch);
        self.inner.canceled(id, patch)
    }

    fn cxl_reject(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("cxl_reject", id, &patch);
        self.inner.cxl_reject(id, patch)
    }

    fn expire(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("expire", id, &patch);
        self.inner.expire(id, patch)
    }

    fn dfd(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("dfd", id, &patch);
        self.inner.dfd(id, patch)
    }

    fn fill(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("fill", id, &patch);
        self.inner.fill(id, patch)
    }

    fn bust(&mut self, id: OrderId, patch: OrderPatch) -> Result<()> {
        self.log("bust", id, &patch);
        self.inner.bust(id, patch)
    }

    fn verify(&mut self) -> Result<()> {
        self.inner.verify()
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }
}
