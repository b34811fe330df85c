/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii
//!
//! Exchange order-entry protocol toolkit: a fixed-width ESP session
//! protocol and FIX 4.4 tag-value, with a shared order-lifecycle
//! verification harness and a FIX stress driver.
//!
//! This umbrella crate re-exports the workspace:
//! - [`core`]: errors and shared value types
//! - [`codec`]: fixed-width ASCII field codecs
//! - [`esp`]: ESP message schema and session client
//! - [`fix`]: FIX message model, framing, and session client
//! - [`harness`]: order state machine and protocol checkers
//! - [`stress`]: multi-connection FIX load generator

pub use torii_codec as codec;
pub use torii_core as core;
pub use torii_esp as esp;
pub use torii_fix as fix;
pub use torii_harness as harness;
pub use torii_stress as stress;

pub use torii_core::error::{Result, ToriiError};
pub use torii_core::types::{Price, Side};
pub use torii_esp::{EspClient, EspConfig, EspMessage};
pub use torii_fix::{FixClient, FixConfig, FixMessage};
pub use torii_harness::{Checker, EspChecker, FixChecker, Order, OrderPatch, Security};
pub use torii_stress::{StressConfig, StressReport};
