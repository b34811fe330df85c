/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii Stress
//!
//! Multi-connection FIX load generator.
//!
//! This crate provides:
//! - **[`config::StressConfig`]**: the option surface accepted from the
//!   outer CLI collaborator
//! - **[`driver::run`]**: connect/logon/send/disconnect workers with
//!   optional ack-latency sampling
//! - **[`report::StressReport`]**: per-worker stats plus p50/p90/p99
//!   roll-ups across workers

pub mod config;
pub mod driver;
pub mod report;

pub use config::StressConfig;
pub use driver::run;
pub use report::{LatencyStats, StressReport, WorkerStats};
