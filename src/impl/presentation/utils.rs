use num_format::{Locale, ToFormattedString as _};

use crate::entities::MonthIndex;

const CURRENCY_SYMBOL: &str = "€";

const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Format a euro amount with two decimal places and thousands separators.
///
/// For consistency, uses en locale ('.' as decimal mark, i.e. 1,000.00)
/// regardless of user's locale. Non-finite amounts print as zero.
pub(crate) fn format_amount(amount: f64) -> String {
    let cents = if amount.is_finite() {
        (amount * 100.0).round() as i64
    } else {
        0
    };
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{}{}.{:02} {}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100,
        CURRENCY_SYMBOL
    )
}

pub(crate) fn month_label(month: MonthIndex) -> &'static str {
    MONTH_LABELS[month.index() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(0.0), "0.00 €");
        assert_eq!(format_amount(1234.5), "1,234.50 €");
        assert_eq!(format_amount(-20.0), "-20.00 €");
        assert_eq!(format_amount(-0.004), "0.00 €");
        assert_eq!(format_amount(1_000_000.125), "1,000,000.13 €");
        assert_eq!(format_amount(f64::NAN), "0.00 €");
    }

    #[test]
    fn labels_months() {
        assert_eq!(month_label(MonthIndex::new(0).unwrap()), "January");
        assert_eq!(month_label(MonthIndex::new(11).unwrap()), "December");
    }
}
