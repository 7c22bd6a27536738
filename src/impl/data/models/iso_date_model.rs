use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fractic_server_error::ServerError;

use crate::errors::InvalidDate;

/// Accepts RFC 3339 timestamps (as written by JavaScript's `toISOString`)
/// and plain `YYYY-MM-DD` dates (taken as midnight UTC).
#[derive(Debug)]
pub(crate) struct ISODateModel(pub DateTime<Utc>);
impl FromStr for ISODateModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(d) = DateTime::parse_from_rfc3339(s) {
            return Ok(ISODateModel(d.with_timezone(&Utc)));
        }
        let d = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| InvalidDate::with_debug(s, &e))?;
        Ok(ISODateModel(d.and_hms_opt(0, 0, 0).ok_or_else(|| InvalidDate::new(s))?.and_utc()))
    }
}
impl ISODateModel {
    pub(crate) fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Into<DateTime<Utc>> for ISODateModel {
    fn into(self) -> DateTime<Utc> {
        self.0
    }
}
