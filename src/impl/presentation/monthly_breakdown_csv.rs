use csv::Writer;
use fractic_server_error::{CriticalError, ServerError};

use crate::{entities::AnnualReport, errors::CsvWriteError};

use super::{annual_report_printer::AnnualReportPrinter, utils::month_label};

const HEADER: [&str; 12] = [
    "Month",
    "Expected",
    "Collected",
    "Remaining",
    "Club_Share",
    "Manual_Income",
    "General_Expenses",
    "General_Profit",
    "Subscription_Balance",
    "Paid_Count",
    "Eligible_Count",
    "Paid_Percentage",
];

/// One CSV row per month of an annual report, followed by a totals row.
pub(crate) struct MonthlyBreakdownCsv;

impl MonthlyBreakdownCsv {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn write(&self, report: &AnnualReport) -> Result<String, ServerError> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(HEADER)
            .map_err(|e| CsvWriteError::with_debug(&e))?;

        for m in &report.months {
            let mut row = vec![month_label(m.month).to_string()];
            row.extend(
                AnnualReportPrinter::month_row(m)
                    .iter()
                    .map(|v| format!("{:.2}", v)),
            );
            row.push(m.stats.paid_count.to_string());
            row.push(m.stats.eligible_count.to_string());
            row.push(m.stats.paid_percentage().to_string());
            wtr.write_record(&row)
                .map_err(|e| CsvWriteError::with_debug(&e))?;
        }

        let t = &report.totals;
        let mut totals = vec!["Total".to_string()];
        totals.extend(
            [
                t.expected,
                t.collected,
                t.remaining,
                t.club_share,
                t.manual_income,
                t.general_expenses,
                t.general_profit,
                t.subscription_balance,
            ]
            .iter()
            .map(|v| format!("{:.2}", v)),
        );
        totals.extend(["".to_string(), "".to_string(), "".to_string()]);
        wtr.write_record(&totals)
            .map_err(|e| CsvWriteError::with_debug(&e))?;

        let bytes = wtr
            .into_inner()
            .map_err(|e| CsvWriteError::with_debug(e.error()))?;
        String::from_utf8(bytes)
            .map_err(|e| CriticalError::with_debug("CSV output is not valid UTF-8", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregation::AggregationEngine, entities::PaymentLedger};

    #[test]
    fn writes_header_months_and_totals() {
        let ledger = PaymentLedger::new();
        let report = AggregationEngine::new(&[], &ledger, &[]).annual_report(2026);
        let csv = MonthlyBreakdownCsv::new().write(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 14);
        assert!(lines[0].starts_with("Month,Expected,Collected"));
        assert!(lines[1].starts_with("January,0.00,0.00"));
        assert!(lines[13].starts_with("Total,"));
    }
}
