/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! # Torii Core
//!
//! Core types, traits, and error definitions for the torii order-entry
//! protocol toolkit.
//!
//! This crate provides:
//! - **Error types**: Unified error hierarchy with [`error::ToriiError`]
//! - **Value types**: [`types::Price`], [`types::Side`]

pub mod error;
pub mod types;

pub use error::{CodecError, Result, SessionError, ToriiError, ValidationError};
pub use types::{Price, Side};
