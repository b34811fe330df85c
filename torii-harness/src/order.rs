/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Order lifecycle state machine.
//!
//! An [`Order`] tracks one order through its life. The modifiable
//! attributes (`order_qty`, `order_price`, `cl_ord_id`, `time_in_force`)
//! live in a modification-history stack: the newest entry is the current
//! effective value, the oldest is the version the exchange has not yet
//! acknowledged. `push_modify` duplicates the top for a pending
//! modification; popping with `restore` rolls a rejected modification back
//! while preserving any later modifications relative to the reverted
//! baseline.
//!
//! Transitions take an [`OrderPatch`]; patches can also be populated
//! dynamically through [`OrderPatch::set`], which resolves camelCase
//! aliases (`orderQty`, `dOrderPrice`, ...) through one fixed table.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::fmt;
use torii_core::error::{Result, SessionError};
use torii_core::types::{Price, Side};

/// A tradeable instrument, identified by its symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Security {
    pub symbol: String,
}

impl Security {
    /// Creates a security from a symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderStatus {
    /// Created but not yet acknowledged by the exchange.
    #[default]
    New,
    /// Acknowledged and working.
    Open,
    /// Fully filled, canceled, rejected, or expired.
    Closed,
}

/// One entry of the modification history.
#[derive(Debug, Clone, Default)]
struct ModSlot {
    order_qty: Option<i64>,
    order_price: Option<Price>,
    cl_ord_id: Option<String>,
    time_in_force: Option<String>,
}

/// A single order with its modification history.
#[derive(Debug, Clone)]
pub struct Order {
    pub security: Option<Security>,
    pub side: Option<Side>,
    pub exec_qty: Option<i64>,
    pub dest_cl_ord_id: Option<String>,
    pub order_id2: Option<String>,
    pub client_id: Option<String>,
    pub account_id: Option<String>,
    pub order_status: OrderStatus,
    pub dk: bool,
    history: VecDeque<ModSlot>,
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl Order {
    /// Creates an empty order in the `New` state.
    #[must_use]
    pub fn new() -> Self {
        let mut history = VecDeque::new();
        history.push_back(ModSlot::default());
        Self {
            security: None,
            side: None,
            exec_qty: Some(0),
            dest_cl_ord_id: None,
            order_id2: None,
            client_id: None,
            account_id: None,
            order_status: OrderStatus::New,
            dk: false,
            history,
        }
    }

    fn top(&self) -> &ModSlot {
        // The history always holds at least one entry.
        &self.history[self.history.len() - 1]
    }

    fn top_mut(&mut self) -> &mut ModSlot {
        let last = self.history.len() - 1;
        &mut self.history[last]
    }

    /// Current effective order quantity.
    #[must_use]
    pub fn order_qty(&self) -> Option<i64> {
        self.top().order_qty
    }

    /// Current effective order price.
    #[must_use]
    pub fn order_price(&self) -> Option<Price> {
        self.top().order_price
    }

    /// Current effective client order id.
    #[must_use]
    pub fn cl_ord_id(&self) -> Option<&str> {
        self.top().cl_ord_id.as_deref()
    }

    /// Current effective time in force.
    #[must_use]
    pub fn time_in_force(&self) -> Option<&str> {
        self.top().time_in_force.as_deref()
    }

    /// Quantity of the previous history entry (top minus one).
    #[must_use]
    pub fn prev_order_qty(&self) -> Option<i64> {
        self.prev().and_then(|s| s.order_qty)
    }

    /// Price of the previous history entry.
    #[must_use]
    pub fn prev_order_price(&self) -> Option<Price> {
        self.prev().and_then(|s| s.order_price)
    }

    /// Client order id of the previous history entry.
    #[must_use]
    pub fn prev_cl_ord_id(&self) -> Option<&str> {
        self.prev().and_then(|s| s.cl_ord_id.as_deref())
    }

    /// Quantity of the oldest unacknowledged history entry.
    #[must_use]
    pub fn old_order_qty(&self) -> Option<i64> {
        self.history.front().and_then(|s| s.order_qty)
    }

    /// Price of the oldest unacknowledged history entry.
    #[must_use]
    pub fn old_order_price(&self) -> Option<Price> {
        self.history.front().and_then(|s| s.order_price)
    }

    /// Client order id of the oldest unacknowledged history entry.
    #[must_use]
    pub fn old_cl_ord_id(&self) -> Option<&str> {
        self.history.front().and_then(|s| s.cl_ord_id.as_deref())
    }

    fn prev(&self) -> Option<&ModSlot> {
        let len = self.history.len();
        if len < 2 {
            None
        } else {
            self.history.get(len - 2)
        }
    }

    /// Number of pending (unacknowledged) modifications.
    #[must_use]
    pub fn pending_modifications(&self) -> usize {
        self.history.len() - 1
    }

    /// Unfilled remainder: `max(0, order_qty - exec_qty)` while not closed,
    /// zero once closed, `None` if either quantity is unknown.
    #[must_use]
    pub fn open_qty(&self) -> Option<i64> {
        if self.order_status == OrderStatus::Closed {
            return Some(0);
        }
        match (self.order_qty(), self.exec_qty) {
            (Some(qty), Some(exec)) => Some((qty - exec).max(0)),
            _ => None,
        }
    }

    /// Duplicates the top history entry for a pending modification.
    pub fn push_modify(&mut self) {
        let copy = self.top().clone();
        self.history.push_back(copy);
    }

    /// Drops the oldest history entry.
    ///
    /// With `restore` false the oldest version was accepted and the queue
    /// moves one step forward. With `restore` true the pending modification
    /// was rejected: numeric attributes that changed are shifted back by
    /// their delta across every remaining entry, other attributes are
    /// restored at the front.
    pub fn pop_modify(&mut self, restore: bool) {
        if self.history.len() < 2 {
            return;
        }
        let Some(old) = self.history.pop_front() else {
            return;
        };
        if !restore {
            return;
        }

        // order_qty: numeric adjustment through the whole history.
        let front_qty = self.history.front().and_then(|s| s.order_qty);
        if let (Some(old_qty), Some(new_qty)) = (old.order_qty, front_qty) {
            let diff = new_qty - old_qty;
            for slot in &mut self.history {
                if let Some(qty) = slot.order_qty.as_mut() {
                    *qty -= diff;
                }
            }
        } else if let Some(front) = self.history.front_mut() {
            front.order_qty = old.order_qty;
        }

        // order_price: numeric adjustment only between two limit prices;
        // market prices restore directly.
        let front_price = self.history.front().and_then(|s| s.order_price);
        match (old.order_price, front_price) {
            (Some(Price::Limit(old_price)), Some(Price::Limit(new_price))) => {
                let diff = new_price - old_price;
                for slot in &mut self.history {
                    if let Some(Price::Limit(price)) = slot.order_price.as_mut() {
                        *price -= diff;
                    }
                }
            }
            (old_price, _) => {
                if let Some(front) = self.history.front_mut() {
                    front.order_price = old_price;
                }
            }
        }

        if let Some(front) = self.history.front_mut() {
            front.cl_ord_id = old.cl_ord_id;
            front.time_in_force = old.time_in_force;
        }
    }

    /// Populates the order from the initial patch.
    pub fn apply_new_order(&mut self, patch: &OrderPatch) {
        self.dk = patch.dk;
        self.security = patch.security.clone();
        self.side = patch.side;
        self.exec_qty = if self.dk { None } else { Some(0) };
        self.dest_cl_ord_id = patch.dest_cl_ord_id.clone();
        self.order_id2 = patch.order_id2.clone();
        self.client_id = patch.client_id.clone();
        self.account_id = patch.account_id.clone();
        let top = self.top_mut();
        top.order_qty = patch.order_qty;
        top.order_price = patch.order_price;
        top.cl_ord_id = patch.cl_ord_id.clone();
        top.time_in_force = patch.time_in_force.clone();
    }

    /// Patches provided fields without a status change.
    pub fn apply_ordering(&mut self, patch: &OrderPatch) {
        if let Some(qty) = patch.order_qty {
            self.top_mut().order_qty = Some(qty);
        }
        if let Some(price) = patch.order_price {
            self.top_mut().order_price = Some(price);
        }
        if let Some(id) = &patch.cl_ord_id {
            self.top_mut().cl_ord_id = Some(id.clone());
        }
        if let Some(tif) = &patch.time_in_force {
            self.top_mut().time_in_force = Some(tif.clone());
        }
        if let Some(id) = &patch.dest_cl_ord_id {
            self.dest_cl_ord_id = Some(id.clone());
        }
        if let Some(id) = &patch.order_id2 {
            self.order_id2 = Some(id.clone());
        }
        self.patch_party_ids(patch);
    }

    /// Confirms the order: `New` becomes `Open`, then patches.
    pub fn apply_ordered(&mut self, patch: &OrderPatch) {
        self.order_status = OrderStatus::Open;
        self.apply_ordering(patch);
    }

    /// Rejects a new order: the order closes.
    pub fn apply_reject(&mut self, _patch: &OrderPatch) {
        self.order_status = OrderStatus::Closed;
    }

    /// Starts a modification: push history, then apply absolute or delta
    /// changes to the modifiable attributes.
    pub fn apply_modify(&mut self, patch: &OrderPatch) {
        let open_qty = self.open_qty();
        self.push_modify();

        if let Some(qty) = patch.order_qty {
            self.top_mut().order_qty = Some(qty.max(0));
        } else if let Some(delta) = patch.d_order_qty {
            if let Some(current) = self.order_qty() {
                let floor = -(open_qty.unwrap_or(0));
                self.top_mut().order_qty = Some(current + delta.max(floor));
            }
        }

        if let Some(price) = patch.order_price {
            self.top_mut().order_price = Some(price);
        } else if let Some(delta) = patch.d_order_price {
            if let Some(Price::Limit(current)) = self.order_price() {
                self.top_mut().order_price = Some(Price::Limit(current + delta));
            }
        }

        if let Some(id) = &patch.cl_ord_id {
            self.top_mut().cl_ord_id = Some(id.clone());
        }
        if let Some(tif) = &patch.time_in_force {
            self.top_mut().time_in_force = Some(tif.clone());
        }
        if let Some(id) = &patch.dest_cl_ord_id {
            self.dest_cl_ord_id = Some(id.clone());
        }
        self.patch_party_ids(patch);
    }

    /// Patches fields of a pending modification.
    pub fn apply_modifying(&mut self, patch: &OrderPatch) {
        self.apply_ordering(patch);
    }

    /// Confirms the oldest pending modification.
    pub fn apply_modified(&mut self, patch: &OrderPatch) {
        self.pop_modify(false);
        self.apply_ordering(patch);
        if matches!(self.open_qty(), Some(qty) if qty <= 0) {
            self.order_status = OrderStatus::Closed;
        }
    }

    /// Rejects the oldest pending modification.
    pub fn apply_mod_reject(&mut self, _patch: &OrderPatch) {
        self.pop_modify(true);
    }

    /// Starts a cancellation; id fields may be overwritten.
    pub fn apply_cancel(&mut self, patch: &OrderPatch) {
        self.push_modify();
        if let Some(id) = &patch.cl_ord_id {
            self.top_mut().cl_ord_id = Some(id.clone());
        }
        if let Some(id) = &patch.dest_cl_ord_id {
            self.dest_cl_ord_id = Some(id.clone());
        }
        self.patch_party_ids(patch);
    }

    /// Patches fields of a pending cancellation.
    pub fn apply_canceling(&mut self, patch: &OrderPatch) {
        self.apply_ordering(patch);
    }

    /// Confirms the cancellation: the order closes.
    pub fn apply_canceled(&mut self, patch: &OrderPatch) {
        self.pop_modify(false);
        self.apply_ordering(patch);
        self.order_status = OrderStatus::Closed;
    }

    /// Rejects the pending cancellation.
    pub fn apply_cxl_reject(&mut self, _patch: &OrderPatch) {
        self.pop_modify(true);
    }

    /// Expires the order.
    pub fn apply_expire(&mut self, patch: &OrderPatch) {
        self.order_status = OrderStatus::Closed;
        self.patch_party_ids(patch);
    }

    /// Done-for-day: the order closes.
    pub fn apply_dfd(&mut self, patch: &OrderPatch) {
        self.order_status = OrderStatus::Closed;
        self.patch_party_ids(patch);
    }

    /// Applies an execution. A fill racing a modification pulls the order
    /// quantity up to the executed quantity; a complete fill closes the
    /// order.
    pub fn apply_fill(&mut self, patch: &OrderPatch) {
        let exec = patch.exec_qty.unwrap_or(0);
        let total = self.exec_qty.unwrap_or(0) + exec;
        self.exec_qty = Some(total);
        if matches!(self.order_qty(), Some(qty) if qty < total) {
            self.top_mut().order_qty = Some(total);
        }
        if matches!(self.open_qty(), Some(qty) if qty <= 0) {
            self.order_status = OrderStatus::Closed;
        }
        self.patch_party_ids(patch);
    }

    /// Reverses an execution; a reopened remainder reopens the order.
    pub fn apply_bust(&mut self, patch: &OrderPatch) {
        let exec = patch.exec_qty.unwrap_or(0);
        self.exec_qty = Some(self.exec_qty.unwrap_or(0) - exec);
        if self.order_status == OrderStatus::Closed {
            // open_qty reports zero while closed; evaluate the remainder
            // directly to decide whether the bust reopens the order.
            let reopened = match (self.order_qty(), self.exec_qty) {
                (Some(qty), Some(total)) => qty - total > 0,
                _ => false,
            };
            if reopened {
                self.order_status = OrderStatus::Open;
            }
        }
        self.patch_party_ids(patch);
    }

    fn patch_party_ids(&mut self, patch: &OrderPatch) {
        if let Some(id) = &patch.client_id {
            self.client_id = Some(id.clone());
        }
        if let Some(id) = &patch.account_id {
            self.account_id = Some(id.clone());
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.order_status {
            OrderStatus::New => "new",
            OrderStatus::Open => "open",
            OrderStatus::Closed => "closed",
        };
        let side = match self.side {
            Some(Side::Buy) => "buy",
            Some(_) => "sell",
            None => "?",
        };
        let symbol = self
            .security
            .as_ref()
            .map_or("?", |s| s.symbol.as_str());
        write!(f, "<{status} {side} {:?} {symbol}", self.order_qty())?;
        match self.order_price() {
            Some(price) => write!(f, " at {price}")?,
            None => write!(f, " market")?,
        }
        if let Some(id) = self.cl_ord_id() {
            write!(f, " clOrdID={id}")?;
        }
        if let Some(id) = &self.order_id2 {
            write!(f, " orderID2={id}")?;
        }
        write!(f, ">")
    }
}

/// A dynamically-typed patch value, used by [`OrderPatch::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Str(String),
    Int(i64),
    Price(Price),
    Decimal(Decimal),
    Bool(bool),
}

impl PatchValue {
    fn as_i64(&self, key: &str) -> Result<i64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Str(s) => s.parse().map_err(|_| bad_value(key, s)),
            _ => Err(bad_value(key, &format!("{self:?}"))),
        }
    }

    fn as_decimal(&self, key: &str) -> Result<Decimal> {
        match self {
            Self::Decimal(v) => Ok(*v),
            Self::Int(v) => Ok(Decimal::from(*v)),
            Self::Str(s) => s.parse().map_err(|_| bad_value(key, s)),
            _ => Err(bad_value(key, &format!("{self:?}"))),
        }
    }

    fn as_price(&self, key: &str) -> Result<Price> {
        match self {
            Self::Price(p) => Ok(*p),
            Self::Decimal(v) => Ok(Price::Limit(*v)),
            Self::Int(v) => Ok(Price::Limit(Decimal::from(*v))),
            Self::Str(s) => s.parse().map_err(|_| bad_value(key, s)),
            Self::Bool(_) => Err(bad_value(key, "bool")),
        }
    }

    fn as_string(&self, key: &str) -> Result<String> {
        match self {
            Self::Str(s) => Ok(s.clone()),
            Self::Int(v) => Ok(v.to_string()),
            _ => Err(bad_value(key, &format!("{self:?}"))),
        }
    }

    fn as_bool(&self, key: &str) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(bad_value(key, &format!("{self:?}"))),
        }
    }
}

fn bad_value(key: &str, value: &str) -> torii_core::error::ToriiError {
    SessionError::Configuration(format!("invalid value {value:?} for order attribute {key}"))
        .into()
}

/// Fixed camelCase/snake_case alias table. This is the only place aliases
/// are resolved; every patch entry point goes through it.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("orderQty", "order_qty"),
    ("execQty", "exec_qty"),
    ("orderPrice", "order_price"),
    ("clOrdID", "cl_ord_id"),
    ("destClOrdID", "dest_cl_ord_id"),
    ("orderID2", "order_id2"),
    ("timeInForce", "time_in_force"),
    ("clientID", "client_id"),
    ("accountID", "account_id"),
    ("dOrderQty", "d_order_qty"),
    ("dOrderPrice", "d_order_price"),
    ("execPrice", "exec_price"),
];

/// Resolves a camelCase alias to its canonical snake_case key.
#[must_use]
pub fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(camel, _)| *camel == key)
        .map_or(key, |(_, snake)| snake)
}

/// Arguments to one lifecycle transition. Unset fields fall back to the
/// order's current state inside the checkers.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub security: Option<Security>,
    pub side: Option<Side>,
    pub order_qty: Option<i64>,
    pub d_order_qty: Option<i64>,
    pub order_price: Option<Price>,
    pub d_order_price: Option<Decimal>,
    pub exec_qty: Option<i64>,
    pub exec_price: Option<Decimal>,
    pub cl_ord_id: Option<String>,
    pub dest_cl_ord_id: Option<String>,
    pub order_id2: Option<String>,
    pub time_in_force: Option<String>,
    pub client_id: Option<String>,
    pub account_id: Option<String>,
    pub symbol: Option<String>,
    pub dk: bool,
}

impl OrderPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn security(mut self, security: Security) -> Self {
        self.security = Some(security);
        self
    }

    #[must_use]
    pub const fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub const fn order_qty(mut self, qty: i64) -> Self {
        self.order_qty = Some(qty);
        self
    }

    #[must_use]
    pub const fn d_order_qty(mut self, delta: i64) -> Self {
        self.d_order_qty = Some(delta);
        self
    }

    #[must_use]
    pub const fn order_price(mut self, price: Price) -> Self {
        self.order_price = Some(price);
        self
    }

    #[must_use]
    pub const fn d_order_price(mut self, delta: Decimal) -> Self {
        self.d_order_price = Some(delta);
        self
    }

    #[must_use]
    pub const fn exec_qty(mut self, qty: i64) -> Self {
        self.exec_qty = Some(qty);
        self
    }

    #[must_use]
    pub const fn exec_price(mut self, price: Decimal) -> Self {
        self.exec_price = Some(price);
        self
    }

    #[must_use]
    pub fn cl_ord_id(mut self, id: impl Into<String>) -> Self {
        self.cl_ord_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn dest_cl_ord_id(mut self, id: impl Into<String>) -> Self {
        self.dest_cl_ord_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn order_id2(mut self, id: impl Into<String>) -> Self {
        self.order_id2 = Some(id.into());
        self
    }

    #[must_use]
    pub fn time_in_force(mut self, tif: impl Into<String>) -> Self {
        self.time_in_force = Some(tif.into());
        self
    }

    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub const fn dk(mut self, dk: bool) -> Self {
        self.dk = dk;
        self
    }

    /// Sets an attribute by name, accepting both snake_case and camelCase
    /// keys through the fixed alias table.
    ///
    /// # Errors
    /// Returns a configuration error for unknown keys or uncoercible
    /// values.
    pub fn set(&mut self, key: &str, value: PatchValue) -> Result<()> {
        match canonical_key(key) {
            "security" | "symbol" => {
                let symbol = value.as_string(key)?;
                self.symbol = Some(symbol.clone());
                self.security = Some(Security::new(symbol));
            }
            "side" => {
                let side = value.as_string(key)?;
                self.side = Some(
                    side.parse()
                        .map_err(|e: String| SessionError::Configuration(e))?,
                );
            }
            "order_qty" => self.order_qty = Some(value.as_i64(key)?),
            "d_order_qty" => self.d_order_qty = Some(value.as_i64(key)?),
            "order_price" => self.order_price = Some(value.as_price(key)?),
            "d_order_price" => self.d_order_price = Some(value.as_decimal(key)?),
            "exec_qty" => self.exec_qty = Some(value.as_i64(key)?),
            "exec_price" => self.exec_price = Some(value.as_decimal(key)?),
            "cl_ord_id" => self.cl_ord_id = Some(value.as_string(key)?),
            "dest_cl_ord_id" => self.dest_cl_ord_id = Some(value.as_string(key)?),
            "order_id2" => self.order_id2 = Some(value.as_string(key)?),
            "time_in_force" => self.time_in_force = Some(value.as_string(key)?),
            "client_id" => self.client_id = Some(value.as_string(key)?),
            "account_id" => self.account_id = Some(value.as_string(key)?),
            "dk" => self.dk = value.as_bool(key)?,
            other => {
                return Err(SessionError::Configuration(format!(
                    "unknown order attribute {other:?}"
                ))
                .into())
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_order(qty: i64, price: &str) -> Order {
        let mut order = Order::new();
        order.apply_new_order(
            &OrderPatch::new()
                .security(Security::new("BABA"))
                .side(Side::Sell)
                .order_qty(qty)
                .order_price(price.parse().unwrap()),
        );
        order.apply_ordered(&OrderPatch::new());
        order
    }

    #[test]
    fn test_new_order_defaults() {
        let mut order = Order::new();
        order.apply_new_order(
            &OrderPatch::new()
                .security(Security::new("BABA"))
                .side(Side::Buy)
                .order_qty(100)
                .order_price("101.25".parse().unwrap())
                .cl_ord_id("ABC")
                .time_in_force("DAY"),
        );
        assert_eq!(order.order_qty(), Some(100));
        assert_eq!(order.order_price(), Some("101.25".parse().unwrap()));
        assert_eq!(order.cl_ord_id(), Some("ABC"));
        assert_eq!(order.time_in_force(), Some("DAY"));
        assert_eq!(order.order_status, OrderStatus::New);
        assert_eq!(order.exec_qty, Some(0));
    }

    #[test]
    fn test_status_progression() {
        let mut order = open_order(100, "10.0");
        assert_eq!(order.order_status, OrderStatus::Open);
        assert_eq!(order.open_qty(), Some(100));

        order.apply_cancel(&OrderPatch::new());
        order.apply_canceled(&OrderPatch::new());
        assert_eq!(order.order_status, OrderStatus::Closed);
        assert_eq!(order.open_qty(), Some(0));
    }

    #[test]
    fn test_fill_closes_and_races() {
        let mut order = open_order(10, "5.0");
        order.apply_fill(&OrderPatch::new().exec_qty(6));
        assert_eq!(order.exec_qty, Some(6));
        assert_eq!(order.open_qty(), Some(4));
        assert_eq!(order.order_status, OrderStatus::Open);

        order.apply_fill(&OrderPatch::new().exec_qty(4));
        assert_eq!(order.open_qty(), Some(0));
        assert_eq!(order.order_status, OrderStatus::Closed);

        // Overfill during a modify race pulls order_qty up.
        let mut order = open_order(10, "5.0");
        order.apply_fill(&OrderPatch::new().exec_qty(12));
        assert_eq!(order.order_qty(), Some(12));
        assert_eq!(order.order_status, OrderStatus::Closed);
    }

    #[test]
    fn test_bust_reopens() {
        let mut order = open_order(10, "5.0");
        order.apply_fill(&OrderPatch::new().exec_qty(10));
        assert_eq!(order.order_status, OrderStatus::Closed);

        order.apply_bust(&OrderPatch::new().exec_qty(4));
        assert_eq!(order.exec_qty, Some(6));
        assert_eq!(order.order_status, OrderStatus::Open);
        assert_eq!(order.open_qty(), Some(4));
    }

    #[test]
    fn test_modify_absolute_and_delta() {
        let mut order = open_order(100, "10.0");
        order.apply_modify(&OrderPatch::new().d_order_qty(-10));
        order.apply_modified(&OrderPatch::new());
        assert_eq!(order.order_qty(), Some(90));

        order.apply_modify(&OrderPatch::new().d_order_price("0.5".parse().unwrap()));
        order.apply_modified(&OrderPatch::new());
        assert_eq!(order.order_price(), Some("10.5".parse().unwrap()));

        order.apply_modify(&OrderPatch::new().order_qty(50));
        order.apply_modified(&OrderPatch::new());
        assert_eq!(order.order_qty(), Some(50));
    }

    #[test]
    fn test_delta_qty_bounded_by_open_qty() {
        let mut order = open_order(10, "5.0");
        order.apply_fill(&OrderPatch::new().exec_qty(6));
        // open = 4; reducing by 100 bottoms out at -open.
        order.apply_modify(&OrderPatch::new().d_order_qty(-100));
        order.apply_modified(&OrderPatch::new());
        assert_eq!(order.order_qty(), Some(6));
        assert_eq!(order.open_qty(), Some(0));
        assert_eq!(order.order_status, OrderStatus::Closed);
    }

    #[test]
    fn test_mod_reject_restores() {
        let mut order = open_order(100, "10.0");
        order.apply_modify(
            &OrderPatch::new()
                .order_qty(90)
                .order_price("11.0".parse().unwrap())
                .cl_ord_id("NEWID"),
        );
        assert_eq!(order.order_qty(), Some(90));
        assert_eq!(order.pending_modifications(), 1);

        order.apply_mod_reject(&OrderPatch::new());
        assert_eq!(order.order_qty(), Some(100));
        assert_eq!(order.order_price(), Some("10.0".parse().unwrap()));
        assert_eq!(order.cl_ord_id(), None);
        assert_eq!(order.pending_modifications(), 0);
    }

    #[test]
    fn test_mod_reject_preserves_later_modifications() {
        let mut order = open_order(100, "10.0");
        // First modification: -10. Second, still pending: -5 more.
        order.apply_modify(&OrderPatch::new().d_order_qty(-10));
        order.apply_modify(&OrderPatch::new().d_order_qty(-5));
        assert_eq!(order.order_qty(), Some(85));

        // The exchange rejects the first modification: its delta is undone
        // while the second stays applied relative to the restored baseline.
        order.apply_mod_reject(&OrderPatch::new());
        assert_eq!(order.old_order_qty(), Some(100));
        assert_eq!(order.order_qty(), Some(95));
        assert_eq!(order.pending_modifications(), 1);
    }

    #[test]
    fn test_cxl_reject_keeps_open() {
        let mut order = open_order(100, "10.0");
        order.apply_cancel(&OrderPatch::new());
        order.apply_cxl_reject(&OrderPatch::new());
        assert_eq!(order.order_status, OrderStatus::Open);
        assert_eq!(order.order_qty(), Some(100));
    }

    #[test]
    fn test_open_qty_never_negative() {
        let mut order = open_order(10, "5.0");
        order.exec_qty = Some(25);
        assert_eq!(order.open_qty(), Some(0));
    }

    #[test]
    fn test_patch_camel_case_aliases() {
        let mut patch = OrderPatch::new();
        patch.set("orderQty", PatchValue::Int(100)).unwrap();
        patch
            .set("orderPrice", PatchValue::Str("101.25".to_string()))
            .unwrap();
        patch
            .set("clOrdID", PatchValue::Str("ABC".to_string()))
            .unwrap();
        patch.set("dOrderQty", PatchValue::Int(-5)).unwrap();
        patch
            .set("execPrice", PatchValue::Str("9.5".to_string()))
            .unwrap();
        patch.set("side", PatchValue::Str("B".to_string())).unwrap();

        assert_eq!(patch.order_qty, Some(100));
        assert_eq!(patch.order_price, Some("101.25".parse().unwrap()));
        assert_eq!(patch.cl_ord_id.as_deref(), Some("ABC"));
        assert_eq!(patch.d_order_qty, Some(-5));
        assert_eq!(patch.exec_price, Some("9.5".parse().unwrap()));
        assert_eq!(patch.side, Some(Side::Buy));
    }

    #[test]
    fn test_patch_snake_case_and_market() {
        let mut patch = OrderPatch::new();
        patch.set("order_qty", PatchValue::Int(1)).unwrap();
        patch
            .set("order_price", PatchValue::Str("market".to_string()))
            .unwrap();
        assert_eq!(patch.order_price, Some(Price::Market));

        assert!(patch.set("bogus", PatchValue::Int(1)).is_err());
    }

    #[test]
    fn test_dk_order_has_no_exec_qty() {
        let mut order = Order::new();
        order.apply_new_order(&OrderPatch::new().order_qty(10).dk(true));
        assert_eq!(order.exec_qty, None);
        assert_eq!(order.open_qty(), None);
    }
}
