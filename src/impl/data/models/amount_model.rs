use std::str::FromStr;

use fractic_server_error::ServerError;
use serde_json::Value;

use crate::errors::InvalidAmount;

#[derive(Debug)]
pub(crate) struct AmountModel(pub f64);
impl FromStr for AmountModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidAmount::new(s))?;
        if !amount.is_finite() {
            return Err(InvalidAmount::new(s));
        }
        Ok(AmountModel(amount))
    }
}

impl AmountModel {
    /// Strict reading for command input: numbers and numeric strings only.
    pub(crate) fn from_json(value: &Value) -> Result<Self, ServerError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(AmountModel)
                .ok_or_else(|| InvalidAmount::new(&n.to_string())),
            Value::String(s) => AmountModel::from_str(s),
            other => Err(InvalidAmount::new(&other.to_string())),
        }
    }

    /// Lenient reading for stored documents. `null` means "not set": a
    /// stored `"amount": null` falls back to the athlete's price, not to
    /// zero. Anything else that is unreadable counts as zero.
    pub(crate) fn lenient(value: &Value) -> Option<f64> {
        match value {
            Value::Null => None,
            v => Some(AmountModel::from_json(v).map_or(0.0, |a| a.0)),
        }
    }
}

impl Into<f64> for AmountModel {
    fn into(self) -> f64 {
        self.0
    }
}
