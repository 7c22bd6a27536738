use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike as _, Utc};
use fractic_server_error::ServerError;

use crate::errors::InvalidRecordType;

use super::payment::MonthIndex;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RecordCategory {
    #[default]
    General,
    /// Expense drawn from the 80% subscription fund rather than from the
    /// general fund.
    Subscription,
    Other(String),
}

/// Manual income/expense entry. Immutable once stored; the only way to change
/// one is to delete it.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub id: RecordId,
    pub record_type: RecordType,
    pub amount: f64,
    pub reason: String,
    /// Accounting month the record belongs to.
    pub date: DateTime<Utc>,
    /// Real-world time the record was entered, if known.
    pub transaction_date: Option<DateTime<Utc>>,
    pub category: RecordCategory,
}

#[derive(Debug, Clone)]
pub struct NewRecord {
    /// Assigned from the current time when absent.
    pub id: Option<RecordId>,
    pub record_type: RecordType,
    pub amount: f64,
    pub reason: String,
    pub date: DateTime<Utc>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub category: Option<RecordCategory>,
}

// --

impl FinancialRecord {
    pub fn falls_in(&self, year: i32, month: MonthIndex) -> bool {
        self.date.year() == year && self.date.month0() == month.index()
    }

    pub fn is_income(&self) -> bool {
        self.record_type == RecordType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.record_type == RecordType::Expense
    }
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Income => "income",
            RecordType::Expense => "expense",
        }
    }
}

impl FromStr for RecordType {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(RecordType::Income),
            "expense" => Ok(RecordType::Expense),
            other => Err(InvalidRecordType::new(other)),
        }
    }
}

impl RecordCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RecordCategory::General => "general",
            RecordCategory::Subscription => "subscription",
            RecordCategory::Other(s) => s,
        }
    }
}

impl From<&str> for RecordCategory {
    fn from(s: &str) -> Self {
        match s.trim() {
            "" | "general" => RecordCategory::General,
            "subscription" => RecordCategory::Subscription,
            other => RecordCategory::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}
