use crate::entities::{
    AnnualReport, FinancialRecord, MonthlyReport, RecordType, SectionPerformance,
};

use super::utils::{format_amount, month_label};

const COLUMNS: [&str; 8] = [
    "Expected",
    "Collected",
    "Remaining",
    "Club 20%",
    "Income",
    "Expenses",
    "Profit",
    "Fund 80%",
];

const SECTION_COLUMNS: [&str; 5] = ["Expected", "Collected", "Rate", "Club 20%", "Fund 80%"];

pub(crate) struct AnnualReportPrinter;

impl AnnualReportPrinter {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn print_report(
        &self,
        report: &AnnualReport,
        sections: &[SectionPerformance],
        records: &[FinancialRecord],
    ) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "; --- Annual report {} -------------------------------------------------------\n\n",
            report.year
        ));
        self.print_months(&mut output, report);
        output.push_str("\n\n");

        output.push_str(
            "; --- Sections -----------------------------------------------------------------\n\n",
        );
        self.print_sections(&mut output, sections);
        output.push_str("\n\n");

        output.push_str(
            "; --- Records ------------------------------------------------------------------\n\n",
        );
        self.print_records(&mut output, records);

        output
    }

    fn print_months(&self, output: &mut String, report: &AnnualReport) {
        output.push_str(&format!("{:10}", "Month"));
        for c in COLUMNS {
            output.push_str(&format!(" {:>14}", c));
        }
        output.push('\n');
        for m in &report.months {
            output.push_str(&format!("{:10}", month_label(m.month)));
            for v in Self::month_row(m) {
                output.push_str(&format!(" {:>14}", format_amount(v)));
            }
            output.push('\n');
        }
        let t = &report.totals;
        output.push_str(&format!("{:10}", "Total"));
        for v in [
            t.expected,
            t.collected,
            t.remaining,
            t.club_share,
            t.manual_income,
            t.general_expenses,
            t.general_profit,
            t.subscription_balance,
        ] {
            output.push_str(&format!(" {:>14}", format_amount(v)));
        }
        output.push('\n');
    }

    fn print_sections(&self, output: &mut String, sections: &[SectionPerformance]) {
        if sections.is_empty() {
            output.push_str("; (no sections)\n");
            return;
        }
        output.push_str(&format!("{:20}", "Section"));
        for c in SECTION_COLUMNS {
            output.push_str(&format!(" {:>14}", c));
        }
        output.push('\n');
        for s in sections {
            output.push_str(&format!(
                "{:20} {:>14} {:>14} {:>13.1}% {:>14} {:>14}\n",
                s.title,
                format_amount(s.expected),
                format_amount(s.collected),
                s.percentage,
                format_amount(s.club_share),
                format_amount(s.subscription_fund),
            ));
        }
    }

    pub(crate) fn month_row(m: &MonthlyReport) -> [f64; 8] {
        [
            m.stats.expected,
            m.stats.collected,
            m.stats.remaining,
            m.split.club_share,
            m.general_fund.manual_income,
            m.general_fund.general_expenses,
            m.general_fund.profit,
            m.subscription_fund.balance,
        ]
    }

    fn print_records(&self, output: &mut String, records: &[FinancialRecord]) {
        if records.is_empty() {
            output.push_str("; (no records)\n");
            return;
        }
        let sorted_records = {
            let mut v: Vec<&FinancialRecord> = records.iter().collect();
            v.sort_by_key(|r| r.date);
            v
        };
        for r in sorted_records {
            let signed = match r.record_type {
                RecordType::Income => r.amount,
                RecordType::Expense => -r.amount,
            };
            output.push_str(&format!(
                "{} ({}) [{}] {:>16}\n",
                r.date.format("%Y-%m-%d"),
                r.id,
                r.category.as_str(),
                format_amount(signed),
            ));
            let prefix = "    ;";
            for line in textwrap::wrap(&r.reason, 74) {
                output.push_str(&format!("{} {}\n", prefix, line));
            }
        }
    }
}
