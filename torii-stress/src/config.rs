/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Stress driver configuration.
//!
//! Mirrors the option surface of the outer CLI collaborator; argument
//! parsing and CSV writing stay outside the core. `connections` accepts
//! the aliases `threads` and `concurrency` when deserialized.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use torii_core::error::{Result, SessionError};

/// Load-generation parameters for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// FIX server host.
    pub host: String,
    /// FIX server port.
    pub port: u16,
    /// SenderCompID (49).
    #[serde(alias = "sender")]
    pub sender_comp_id: String,
    /// TargetCompID (56).
    #[serde(alias = "target")]
    pub target_comp_id: String,
    /// HeartBtInt (108) in seconds.
    pub heartbeat: u64,
    /// Number of concurrent sessions.
    #[serde(alias = "threads", alias = "concurrency")]
    pub connections: usize,
    /// NewOrderSingle count per session.
    pub messages_per_conn: usize,
    /// Target send rate per session in messages per second; zero means
    /// unbounded.
    pub rate: f64,
    /// Symbol (55).
    pub symbol: String,
    /// Side (54): `1` buy, `2` sell.
    pub side: String,
    /// OrderQty (38).
    pub qty: i64,
    /// Optional Price (44).
    pub price: Option<Decimal>,
    /// Sample ack latency by awaiting the matching ExecutionReport.
    pub measure_latency: bool,
    /// Per-message wait for the ExecutionReport, in seconds.
    pub ack_timeout: f64,
    /// Sample latency for one in N messages.
    pub latency_sample_every: usize,
    /// Logging level requested by the outer CLI; the driver does not
    /// install a subscriber.
    pub log_level: Option<String>,
    /// CSV output path requested by the outer CLI; writing is the
    /// caller's concern.
    pub csv: Option<String>,
    /// Free-form tag copied into the report for traceability.
    pub tag: Option<String>,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9878,
            sender_comp_id: "STRESS".to_string(),
            target_comp_id: "OMS".to_string(),
            heartbeat: 30,
            connections: 4,
            messages_per_conn: 100,
            rate: 50.0,
            symbol: "AAPL".to_string(),
            side: "1".to_string(),
            qty: 100,
            price: None,
            measure_latency: false,
            ack_timeout: 5.0,
            latency_sample_every: 1,
            log_level: None,
            csv: None,
            tag: None,
        }
    }
}

impl StressConfig {
    /// Creates a configuration with the connection endpoints set and
    /// everything else at its default.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            ..Self::default()
        }
    }

    /// Checks the configuration; a fatal configuration error is the only
    /// non-zero exit of the outer driver.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] for invalid values.
    pub fn validate(&self) -> Result<()> {
        if self.side != "1" && self.side != "2" {
            return Err(SessionError::Configuration(format!(
                "side must be 1 (buy) or 2 (sell), got {:?}",
                self.side
            ))
            .into());
        }
        if self.connections == 0 {
            return Err(
                SessionError::Configuration("connections must be at least 1".to_string()).into(),
            );
        }
        if self.rate < 0.0 {
            return Err(
                SessionError::Configuration("rate must not be negative".to_string()).into(),
            );
        }
        if self.ack_timeout <= 0.0 {
            return Err(
                SessionError::Configuration("ack_timeout must be positive".to_string()).into(),
            );
        }
        Ok(())
    }

    /// Sampling interval normalized to at least one.
    #[must_use]
    pub fn sample_every(&self) -> usize {
        self.latency_sample_every.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StressConfig::default();
        assert_eq!(config.connections, 4);
        assert_eq!(config.messages_per_conn, 100);
        assert_eq!(config.side, "1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_side() {
        let mut config = StressConfig::default();
        config.side = "B".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let mut config = StressConfig::default();
        config.connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_every_floor() {
        let mut config = StressConfig::default();
        config.latency_sample_every = 0;
        assert_eq!(config.sample_every(), 1);
    }
}
