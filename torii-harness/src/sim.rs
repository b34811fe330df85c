/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Exchange simulator interface.
//!
//! The simulator itself is an external collaborator; the checkers only
//! need the fill trigger.

use rust_decimal::Decimal;
use torii_core::error::Result;

/// External exchange simulator, driven by the checkers to produce
/// executions against resting orders.
pub trait ExchangeSim: Send {
    /// Requests an execution of `exec_qty` at `exec_price` against the
    /// order identified by the exchange-assigned id.
    ///
    /// # Errors
    /// Implementation specific; a failure aborts the fill step.
    fn fill(&mut self, order_id: &str, exec_qty: i64, exec_price: Decimal) -> Result<()>;
}

/// No-op simulator for tests where the counterparty is scripted.
#[derive(Debug, Default)]
pub struct NullExchangeSim;

impl ExchangeSim for NullExchangeSim {
    fn fill(&mut self, _order_id: &str, _exec_qty: i64, _exec_price: Decimal) -> Result<()> {
        Ok(())
    }
}
