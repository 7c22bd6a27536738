use chrono::Datelike as _;

use crate::entities::{FinancialRecord, MonthIndex, RecordCategory};

use super::utils::finite_or_zero;

/// Records whose accounting date falls in the given month, optionally
/// leaving out one category (e.g. "subscription" to isolate the general
/// fund).
pub fn records_for_month<'a>(
    records: &'a [FinancialRecord],
    year: i32,
    month: MonthIndex,
    exclude_category: Option<&RecordCategory>,
) -> Vec<&'a FinancialRecord> {
    records
        .iter()
        .filter(|r| r.falls_in(year, month))
        .filter(|r| exclude_category.map_or(true, |c| &r.category != c))
        .collect()
}

/// Records dated in the given year, newest first.
pub fn records_for_year(records: &[FinancialRecord], year: i32) -> Vec<FinancialRecord> {
    let mut v: Vec<FinancialRecord> = records
        .iter()
        .filter(|r| r.date.year() == year)
        .cloned()
        .collect();
    v.sort_by(|a, b| b.date.cmp(&a.date));
    v
}

pub(crate) fn sum_amounts<'a>(records: impl IntoIterator<Item = &'a FinancialRecord>) -> f64 {
    records
        .into_iter()
        .map(|r| finite_or_zero(r.amount))
        .sum()
}
