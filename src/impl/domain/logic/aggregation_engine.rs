use std::collections::HashSet;

use crate::entities::{
    AggregatedState, AnnualReport, AnnualTotals, Athlete, FinancialRecord, GeneralFundSummary,
    MonthIndex, MonthlyReport, MonthlyStats, PaymentKey, PaymentLedger, RecordCategory, Section,
    SectionPerformance, SectionShare, ShareSplit, SubscriptionFundSummary,
};

use super::{
    record_filters::{records_for_month, sum_amounts},
    utils::finite_or_zero,
};

/// Pure computation of financial statistics over the roster, the payment
/// ledger and the record log. Holds borrowed inputs only; every call
/// recomputes from scratch, so calls may be repeated in any order.
pub struct AggregationEngine<'a> {
    sections: &'a [Section],
    ledger: &'a PaymentLedger,
    records: &'a [FinancialRecord],
}

impl<'a> AggregationEngine<'a> {
    pub fn new(
        sections: &'a [Section],
        ledger: &'a PaymentLedger,
        records: &'a [FinancialRecord],
    ) -> Self {
        Self {
            sections,
            ledger,
            records,
        }
    }

    pub fn from_state(state: &'a AggregatedState) -> Self {
        Self::new(&state.sections, &state.ledger, &state.records)
    }

    /// Club-wide expected/collected/remaining for one month.
    pub fn monthly_stats(&self, year: i32, month: MonthIndex) -> MonthlyStats {
        self.stats_over(self.roster_athletes(), year, month)
    }

    /// Same figures restricted to one section's athletes.
    pub fn section_monthly_stats(
        &self,
        section: &Section,
        year: i32,
        month: MonthIndex,
    ) -> MonthlyStats {
        self.stats_over(section.players.iter(), year, month)
    }

    /// 80/20 split of one section's collections for a month.
    pub fn section_share(&self, section: &Section, year: i32, month: MonthIndex) -> ShareSplit {
        ShareSplit::of(self.section_monthly_stats(section, year, month).collected)
    }

    /// Per-section stats and split for a month, in roster order.
    pub fn section_breakdown(&self, year: i32, month: MonthIndex) -> Vec<SectionShare> {
        self.sections
            .iter()
            .map(|section| {
                let stats = self.section_monthly_stats(section, year, month);
                SectionShare {
                    section_id: section.id.clone(),
                    title: section.title.clone(),
                    stats,
                    split: ShareSplit::of(stats.collected),
                }
            })
            .collect()
    }

    /// `(collected × 0.2) + manual income − general expenses`.
    pub fn general_fund(&self, year: i32, month: MonthIndex) -> GeneralFundSummary {
        let split = ShareSplit::of(self.monthly_stats(year, month).collected);
        self.general_fund_with(split, year, month)
    }

    /// `(collected × 0.8) − subscription-category expenses`.
    pub fn subscription_fund(&self, year: i32, month: MonthIndex) -> SubscriptionFundSummary {
        let split = ShareSplit::of(self.monthly_stats(year, month).collected);
        self.subscription_fund_with(split, year, month)
    }

    pub fn monthly_report(&self, year: i32, month: MonthIndex) -> MonthlyReport {
        let stats = self.monthly_stats(year, month);
        let split = ShareSplit::of(stats.collected);
        MonthlyReport {
            year,
            month,
            stats,
            split,
            general_fund: self.general_fund_with(split, year, month),
            subscription_fund: self.subscription_fund_with(split, year, month),
        }
    }

    /// Twelve independent monthly reports and their sums. Balances do not
    /// carry forward between months.
    pub fn annual_report(&self, year: i32) -> AnnualReport {
        let months: Vec<MonthlyReport> = MonthIndex::all()
            .map(|m| self.monthly_report(year, m))
            .collect();
        let totals = months
            .iter()
            .fold(AnnualTotals::default(), AnnualTotals::accumulate);
        AnnualReport {
            year,
            months,
            totals,
        }
    }

    /// Per-section collection rate over the year, best first. Ties keep
    /// roster order.
    pub fn section_performance(&self, year: i32) -> Vec<SectionPerformance> {
        let mut v: Vec<SectionPerformance> = self
            .sections
            .iter()
            .map(|section| {
                let (expected, collected) = MonthIndex::all()
                    .map(|m| self.section_monthly_stats(section, year, m))
                    .fold((0.0, 0.0), |(e, c), s| (e + s.expected, c + s.collected));
                let split = ShareSplit::of(collected);
                SectionPerformance {
                    section_id: section.id.clone(),
                    title: section.title.clone(),
                    expected,
                    collected,
                    percentage: if expected > 0.0 {
                        collected / expected * 100.0
                    } else {
                        0.0
                    },
                    club_share: split.club_share,
                    subscription_fund: split.subscription_fund,
                }
            })
            .collect();
        v.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        v
    }

    pub fn top_section(&self, year: i32) -> Option<SectionPerformance> {
        self.section_performance(year).into_iter().next()
    }

    /// Ledger keys whose athlete is no longer on the roster. These are
    /// ignored by every computation but left in place.
    pub fn orphaned_payments(&self) -> Vec<&'a PaymentKey> {
        let known: HashSet<_> = self.roster_athletes().map(|a| &a.id).collect();
        let ledger: &'a PaymentLedger = self.ledger;
        ledger
            .iter()
            .filter(|(k, _)| !known.contains(&k.athlete_id))
            .map(|(k, _)| k)
            .collect()
    }

    // --

    /// Every athlete on the roster, each id once (first occurrence wins).
    /// Ledger keys carry no section, so a repeated id would otherwise be
    /// counted twice.
    fn roster_athletes(&self) -> impl Iterator<Item = &'a Athlete> {
        let sections: &'a [Section] = self.sections;
        let mut seen = HashSet::new();
        sections
            .iter()
            .flat_map(|s| s.players.iter())
            .filter(move |a| seen.insert(&a.id))
    }

    fn stats_over<'b>(
        &self,
        athletes: impl Iterator<Item = &'b Athlete>,
        year: i32,
        month: MonthIndex,
    ) -> MonthlyStats {
        let mut stats = athletes.fold(MonthlyStats::default(), |mut stats, athlete| {
            let price = finite_or_zero(athlete.price);
            if price <= 0.0 {
                return stats;
            }
            stats.expected += price;
            stats.eligible_count += 1;
            if self.ledger.is_paid(year, month, &athlete.id) {
                stats.collected +=
                    finite_or_zero(self.ledger.get_amount(year, month, &athlete.id, price));
                stats.paid_count += 1;
            }
            stats
        });
        stats.remaining = stats.expected - stats.collected;
        stats
    }

    fn general_fund_with(
        &self,
        split: ShareSplit,
        year: i32,
        month: MonthIndex,
    ) -> GeneralFundSummary {
        let month_records = records_for_month(self.records, year, month, None);
        let manual_income = sum_amounts(month_records.iter().copied().filter(|r| r.is_income()));
        let general_expenses = sum_amounts(
            month_records
                .iter()
                .copied()
                .filter(|r| r.is_expense() && r.category != RecordCategory::Subscription),
        );
        GeneralFundSummary {
            club_share: split.club_share,
            manual_income,
            general_expenses,
            profit: split.club_share + manual_income - general_expenses,
        }
    }

    fn subscription_fund_with(
        &self,
        split: ShareSplit,
        year: i32,
        month: MonthIndex,
    ) -> SubscriptionFundSummary {
        let subscription_expenses = sum_amounts(
            records_for_month(self.records, year, month, None)
                .into_iter()
                .filter(|r| r.is_expense() && r.category == RecordCategory::Subscription),
        );
        SubscriptionFundSummary {
            collected_share: split.subscription_fund,
            subscription_expenses,
            balance: split.subscription_fund - subscription_expenses,
        }
    }
}
