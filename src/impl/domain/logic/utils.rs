use chrono::{DateTime, TimeZone as _, Utc};
use fractic_server_error::{CriticalError, ServerError};

use crate::entities::MonthIndex;

/// Non-finite values (NaN, infinities) count as zero in every total.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Time-based identifier (epoch milliseconds), bumped until it does not
/// collide with an existing one.
pub(crate) fn time_based_id<F>(now: DateTime<Utc>, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !is_taken(&id) {
            return id;
        }
        candidate += 1;
    }
}

/// Accounting date used for records entered against a month: the 1st at
/// noon, so the record stays in that month under any timezone shift.
pub fn accounting_date(year: i32, month: MonthIndex) -> Result<DateTime<Utc>, ServerError> {
    Utc.with_ymd_and_hms(year, month.number(), 1, 12, 0, 0)
        .single()
        .ok_or_else(|| {
            CriticalError::with_debug(
                "accounting date calculation unexpectedly resulted in invalid date",
                &format!("year: {}, month: {}", year, month.number()),
            )
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Datelike as _, Timelike as _};

    use super::*;

    #[test]
    fn ids_skip_taken_values() {
        let now = Utc.timestamp_millis_opt(1_767_225_600_000).unwrap();
        let taken: HashSet<String> = ["1767225600000", "1767225600001"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(time_based_id(now, |id| taken.contains(id)), "1767225600002");
        assert_eq!(time_based_id(now, |_| false), "1767225600000");
    }

    #[test]
    fn accounting_date_is_first_of_month_at_noon() {
        let d = accounting_date(2026, MonthIndex::new(1).unwrap()).unwrap();
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2026, 2, 1, 12));
    }

    #[test]
    fn non_finite_values_become_zero() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(12.5), 12.5);
    }
}
