/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Core value types shared by both wire protocols and the harness.
//!
//! This module provides:
//! - [`Price`]: a limit price or the in-band "market" value
//! - [`Side`]: order side as used by the harness (protocol checkers map it
//!   to their wire encodings)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of an ESP internal-processing correlation id in bytes.
pub const INTERNAL_PROCESSING_LEN: usize = 20;

/// An order price.
///
/// Fixed-width price fields carry either a decimal-scaled limit price or the
/// literal in-band "market" value; absence of the field is represented by
/// `Option<Price>` at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Price {
    /// Market order, encoded as the in-band sentinel on the wire.
    Market,
    /// Limit price with exact decimal semantics.
    Limit(Decimal),
}

impl Price {
    /// Creates a limit price.
    #[inline]
    #[must_use]
    pub fn limit(value: impl Into<Decimal>) -> Self {
        Self::Limit(value.into())
    }

    /// Returns the decimal value for a limit price, `None` for market.
    #[inline]
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Limit(d) => Some(*d),
            Self::Market => None,
        }
    }

    /// Returns true if this is the market sentinel.
    #[inline]
    #[must_use]
    pub const fn is_market(&self) -> bool {
        matches!(self, Self::Market)
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self::Limit(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Limit(d) => write!(f, "{}", d),
        }
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "market" {
            Ok(Self::Market)
        } else {
            s.parse::<Decimal>().map(Self::Limit)
        }
    }
}

/// Order side as used by the harness.
///
/// The short-sell variants exist for FIX (54=5/6); the ESP checker folds
/// them into a sell with the short-sell flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
    /// Sell short.
    SellShort,
    /// Sell short exempt.
    SellShortExempt,
}

impl Side {
    /// Returns the harness string form (`"B"`, `"S"`, `"SS"`, `"SSE"`).
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "B",
            Self::Sell => "S",
            Self::SellShort => "SS",
            Self::SellShortExempt => "SSE",
        }
    }

    /// Returns true for any of the sell variants.
    #[inline]
    #[must_use]
    pub const fn is_sell(&self) -> bool {
        !matches!(self, Self::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Self::Buy),
            "S" => Ok(Self::Sell),
            "SS" => Ok(Self::SellShort),
            "SSE" => Ok(Self::SellShortExempt),
            other => Err(format!("unknown side {other:?}")),
        }
    }
}
