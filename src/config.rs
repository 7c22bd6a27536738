//! Ledger configuration, read from RON:
//!
//! ```ron
//! (
//!     security_pin: "2003",
//!     elevated_actions: Some([MarkPaid, MarkUnpaid, AddAthlete, DeleteAthlete, EditPrice]),
//!     default_athlete_price: Some(50.0),
//!     data_file: Some("data/club.json"),
//!     log_level: Some("info"),
//! )
//! ```

use std::path::{Path, PathBuf};

use fractic_server_error::ServerError;
use serde_derive::Deserialize;

use crate::{
    aggregation::AuthorizationPolicy,
    entities::{ElevatedAction, DEFAULT_ELEVATED_ACTIONS},
    errors::{InvalidPrice, InvalidRon, MissingRequiredField, ReadError},
};

pub const DEFAULT_ATHLETE_PRICE: f64 = 50.0;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct ClubLedgerConfig {
    /// Secondary code required for elevated actions.
    pub security_pin: String,
    #[serde(default)]
    pub elevated_actions: Option<Vec<ElevatedAction>>,
    #[serde(default)]
    pub default_athlete_price: Option<f64>,
    /// JSON document store location, required by `ClubLedgerUtil::open`.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl ClubLedgerConfig {
    pub fn new(security_pin: impl Into<String>) -> Self {
        Self {
            security_pin: security_pin.into(),
            elevated_actions: None,
            default_athlete_price: None,
            data_file: None,
            log_level: None,
        }
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ServerError> {
        let config: ClubLedgerConfig =
            ron::from_str(s).map_err(|e| InvalidRon::with_debug("ClubLedgerConfig", &e))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let s = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?;
        Self::from_ron_str(&s)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.security_pin.trim().is_empty() {
            return Err(MissingRequiredField::new("security_pin"));
        }
        let price = self.default_athlete_price();
        if !price.is_finite() || price < 0.0 {
            return Err(InvalidPrice::new(price));
        }
        Ok(())
    }

    pub fn default_athlete_price(&self) -> f64 {
        self.default_athlete_price.unwrap_or(DEFAULT_ATHLETE_PRICE)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn elevated_actions(&self) -> Vec<ElevatedAction> {
        self.elevated_actions
            .clone()
            .unwrap_or_else(|| DEFAULT_ELEVATED_ACTIONS.to_vec())
    }

    pub fn authorization_policy(&self) -> AuthorizationPolicy {
        AuthorizationPolicy::new(self.security_pin.clone(), self.elevated_actions())
    }
}
