/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii FIX
//!
//! FIX 4.4 tag-value protocol for the torii toolkit.
//!
//! This crate provides:
//! - **Message model**: [`message::FixMessage`] with positional `8`/`9`/`10`
//!   handling and numeric tag ordering
//! - **Checksum**: trailer checksum arithmetic ([`checksum`])
//! - **Stream framing**: [`codec::FrameBuffer`] splitting raw bytes on the
//!   `10=…<SOH>` trailer
//! - **Session client**: [`client::FixClient`] with sender/receiver worker
//!   threads, sequence numbers, heartbeats, and logon/logout handshakes

pub mod checksum;
pub mod client;
pub mod codec;
pub mod message;
pub mod tags;

pub use client::{FixClient, FixConfig, DEFAULT_RECEIVE_TIMEOUT};
pub use codec::FrameBuffer;
pub use message::{FixMessage, DEFAULT_BEGIN_STRING, SOH};
pub use tags::{msg_type, tag};
