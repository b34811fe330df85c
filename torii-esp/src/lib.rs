/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii ESP
//!
//! Fixed-width ESP order-entry protocol for the torii toolkit.
//!
//! This crate provides:
//! - **Layer headers**: [`layers::EspCommon`] session framing plus the
//!   order/notice/admin middle layers
//! - **Payloads**: every payload layout from the gateway binding table
//!   ([`payloads`])
//! - **Frame model**: [`message::EspMessage`] with reversible build/parse
//!   and `MessageType`/`DataCode` dispatch
//! - **Session client**: [`client::EspClient`] with sender/receiver worker
//!   threads, sequence accounting, heartbeats, and handshakes

pub mod client;
pub mod codes;
pub mod layers;
pub mod message;
pub mod payloads;

pub use client::{EspClient, EspConfig, DEFAULT_RECEIVE_TIMEOUT};
pub use layers::{AdminCommon, EspCommon, NoticeCommon, OrderCommon};
pub use message::{
    AdminKind, AdminPayload, EspBody, EspMessage, NoticeKind, NoticePayload, OrderKind,
    OrderPayload,
};
