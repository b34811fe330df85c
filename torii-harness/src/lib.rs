/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii Harness
//!
//! Order lifecycle state machine and protocol verification harness.
//!
//! This crate provides:
//! - **[`order::Order`]**: order record with a modification-history stack
//!   and the status transitions of the lifecycle
//! - **[`checker::Checker`]**: one method per lifecycle event, with
//!   [`checker::GenericChecker`] (state only) and
//!   [`checker::LoggingChecker`] (tracing decorator)
//! - **Protocol checkers**: [`esp_checker::EspChecker`] and
//!   [`fix_checker::FixChecker`] binding transitions to wire messages with
//!   field-by-field response validation
//! - **[`sim::ExchangeSim`]**: the external exchange-simulator interface

pub mod checker;
pub mod esp_checker;
pub mod fix_checker;
pub mod order;
pub mod sim;

pub use checker::{Checker, GenericChecker, LoggingChecker, OrderBook, OrderId, RepeatTicks};
pub use esp_checker::{EspChecker, EspSession, ProcessingKey};
pub use fix_checker::{FixChecker, FixSession};
pub use order::{Order, OrderPatch, OrderStatus, PatchValue, Security};
pub use sim::{ExchangeSim, NullExchangeSim};
