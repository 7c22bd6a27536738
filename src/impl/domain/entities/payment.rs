use std::{collections::BTreeMap, fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, Utc};
use fractic_server_error::ServerError;
use regex::Regex;

use crate::errors::{InvalidMonthIndex, InvalidPaymentKey};

use super::section::AthleteId;

static PAYMENT_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d{1,6})_(\d{1,2})_(.+)$").expect("hardcoded regex should be valid")
});

/// Zero-based calendar month (0 = January, 11 = December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthIndex(u8);

/// Ledger key `"{year}_{monthIndex}_{athleteId}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentKey {
    pub year: i32,
    pub month: MonthIndex,
    pub athlete_id: AthleteId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentMeta {
    pub athlete_name: Option<String>,
    pub parent_name: Option<String>,
    pub department: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// Normalized payment state. Legacy `true` entries become `Paid` without an
/// amount, so reads fall back to the athlete's current price.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentState {
    Unpaid,
    Paid {
        amount: Option<f64>,
        meta: PaymentMeta,
    },
}

/// Values captured at the moment a payment is marked paid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentSnapshot {
    pub athlete_name: String,
    pub parent_name: String,
    pub department: String,
    /// Authoritative amount for the month. When the caller leaves it out, the
    /// command layer fills in the athlete's current price.
    pub amount: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SetPaymentRequest {
    pub year: i32,
    pub month: MonthIndex,
    pub athlete_id: AthleteId,
    pub paid: bool,
    pub snapshot: Option<PaymentSnapshot>,
}

/// Sparse (year, month, athlete) -> payment mapping. A missing key means
/// "unpaid, no record".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentLedger {
    entries: BTreeMap<PaymentKey, PaymentState>,
}

// --

impl MonthIndex {
    pub fn new(month: u32) -> Result<Self, ServerError> {
        if month < 12 {
            Ok(MonthIndex(month as u8))
        } else {
            Err(InvalidMonthIndex::new(month as i64))
        }
    }

    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// One-based month number, as used by calendars.
    pub fn number(self) -> u32 {
        self.0 as u32 + 1
    }

    pub fn all() -> impl Iterator<Item = MonthIndex> {
        (0..12u8).map(MonthIndex)
    }
}

impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PaymentKey {
    pub fn new(year: i32, month: MonthIndex, athlete_id: AthleteId) -> Self {
        Self {
            year,
            month,
            athlete_id,
        }
    }
}

impl fmt::Display for PaymentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.year, self.month, self.athlete_id)
    }
}

impl FromStr for PaymentKey {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = PAYMENT_KEY_PATTERN
            .captures(s)
            .ok_or_else(|| InvalidPaymentKey::new(s))?;
        let year = caps[1]
            .parse::<i32>()
            .map_err(|e| InvalidPaymentKey::with_debug(s, &e))?;
        let month = caps[2]
            .parse::<u32>()
            .map_err(|e| InvalidPaymentKey::with_debug(s, &e))
            .and_then(MonthIndex::new)?;
        Ok(PaymentKey::new(year, month, AthleteId(caps[3].to_string())))
    }
}

impl PaymentState {
    /// State resulting from a "mark paid" / "mark unpaid" command.
    pub fn from_command(paid: bool, snapshot: PaymentSnapshot, paid_at: DateTime<Utc>) -> Self {
        if !paid {
            return PaymentState::Unpaid;
        }
        PaymentState::Paid {
            amount: snapshot.amount,
            meta: PaymentMeta {
                athlete_name: Some(snapshot.athlete_name),
                parent_name: Some(snapshot.parent_name),
                department: Some(snapshot.department),
                payment_date: Some(paid_at),
            },
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentState::Paid { .. })
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            PaymentState::Paid { amount, .. } => *amount,
            PaymentState::Unpaid => None,
        }
    }
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single mutation entry point: upserts on paid, deletes on unpaid.
    pub fn set_payment(
        &mut self,
        key: PaymentKey,
        paid: bool,
        snapshot: PaymentSnapshot,
        paid_at: DateTime<Utc>,
    ) {
        match PaymentState::from_command(paid, snapshot, paid_at) {
            PaymentState::Unpaid => {
                self.entries.remove(&key);
            }
            state => {
                self.entries.insert(key, state);
            }
        }
    }

    pub fn is_paid(&self, year: i32, month: MonthIndex, athlete_id: &AthleteId) -> bool {
        self.lookup(year, month, athlete_id)
            .is_some_and(PaymentState::is_paid)
    }

    /// Snapshotted amount when present, otherwise `fallback_price`.
    pub fn get_amount(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
        fallback_price: f64,
    ) -> f64 {
        self.lookup(year, month, athlete_id)
            .and_then(PaymentState::amount)
            .unwrap_or(fallback_price)
    }

    pub fn get(&self, key: &PaymentKey) -> Option<&PaymentState> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &PaymentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PaymentKey, &PaymentState)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries keyed under the given year.
    pub fn for_year(&self, year: i32) -> PaymentLedger {
        self.entries
            .iter()
            .filter(|(k, _)| k.year == year)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Unions an advisory client-side cache into this ledger. Keys only the
    /// cache knows about are added; existing entries always win.
    pub fn merge_advisory(&mut self, cached: PaymentLedger) {
        for (key, state) in cached.entries {
            self.entries.entry(key).or_insert(state);
        }
    }

    pub(crate) fn insert(&mut self, key: PaymentKey, state: PaymentState) {
        self.entries.insert(key, state);
    }

    fn lookup(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Option<&PaymentState> {
        self.entries
            .get(&PaymentKey::new(year, month, athlete_id.clone()))
    }
}

impl FromIterator<(PaymentKey, PaymentState)> for PaymentLedger {
    fn from_iter<T: IntoIterator<Item = (PaymentKey, PaymentState)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn jan() -> MonthIndex {
        MonthIndex::new(0).unwrap()
    }

    fn snapshot(amount: Option<f64>) -> PaymentSnapshot {
        PaymentSnapshot {
            athlete_name: "Athlete".into(),
            parent_name: "Parent".into(),
            department: "Junior".into(),
            amount,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn key_round_trips_through_its_string_form() {
        let key = PaymentKey::new(2026, MonthIndex::new(11).unwrap(), "u12_b1".into());
        assert_eq!(key.to_string(), "2026_11_u12_b1");
        assert_eq!("2026_11_u12_b1".parse::<PaymentKey>().unwrap(), key);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!("2026_12_j1".parse::<PaymentKey>().is_err());
        assert!("2026_j1".parse::<PaymentKey>().is_err());
        assert!("abc_1_j1".parse::<PaymentKey>().is_err());
        assert!("2026_1_".parse::<PaymentKey>().is_err());
    }

    #[test]
    fn month_index_is_bounded() {
        assert!(MonthIndex::new(12).is_err());
        assert_eq!(MonthIndex::new(11).unwrap().number(), 12);
        assert_eq!(MonthIndex::all().count(), 12);
    }

    #[test]
    fn snapshot_amount_stays_authoritative() {
        let mut ledger = PaymentLedger::new();
        let id = AthleteId::from("j1");
        ledger.set_payment(
            PaymentKey::new(2026, jan(), id.clone()),
            true,
            snapshot(Some(40.0)),
            now(),
        );
        assert!(ledger.is_paid(2026, jan(), &id));
        assert_eq!(ledger.get_amount(2026, jan(), &id, 60.0), 40.0);
    }

    #[test]
    fn legacy_entry_falls_back_to_price() {
        let id = AthleteId::from("j1");
        let ledger: PaymentLedger = [(
            PaymentKey::new(2026, jan(), id.clone()),
            PaymentState::Paid {
                amount: None,
                meta: PaymentMeta::default(),
            },
        )]
        .into_iter()
        .collect();
        assert!(ledger.is_paid(2026, jan(), &id));
        assert_eq!(ledger.get_amount(2026, jan(), &id, 55.0), 55.0);
    }

    #[test]
    fn marking_unpaid_removes_the_key() {
        let mut ledger = PaymentLedger::new();
        let key = PaymentKey::new(2026, jan(), "j1".into());
        ledger.set_payment(key.clone(), true, snapshot(Some(50.0)), now());
        ledger.set_payment(key.clone(), false, snapshot(None), now());
        assert!(!ledger.contains_key(&key));
        assert!(!ledger.is_paid(2026, jan(), &"j1".into()));
    }

    #[test]
    fn stored_unpaid_state_is_not_paid() {
        let key = PaymentKey::new(2026, jan(), "j1".into());
        let ledger: PaymentLedger = [(key, PaymentState::Unpaid)].into_iter().collect();
        assert!(!ledger.is_paid(2026, jan(), &"j1".into()));
    }

    #[test]
    fn advisory_merge_keeps_server_entries() {
        let key_a = PaymentKey::new(2026, jan(), "a".into());
        let key_b = PaymentKey::new(2026, jan(), "b".into());
        let mut server = PaymentLedger::new();
        server.set_payment(key_a.clone(), true, snapshot(Some(50.0)), now());

        let mut cached = PaymentLedger::new();
        cached.set_payment(key_a.clone(), true, snapshot(Some(10.0)), now());
        cached.set_payment(key_b.clone(), true, snapshot(None), now());

        server.merge_advisory(cached);
        assert_eq!(server.len(), 2);
        assert_eq!(server.get(&key_a).and_then(PaymentState::amount), Some(50.0));
        assert!(server.contains_key(&key_b));
    }
}
