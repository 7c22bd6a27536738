use super::{payment::MonthIndex, section::SectionId};

/// Portion of collected subscriptions retained in the subscription fund. The
/// remainder (20%) is the club's share and feeds the general fund.
pub const SUBSCRIPTION_FUND_SHARE: f64 = 0.8;

/// Tolerance used when comparing computed amounts.
pub const AMOUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyStats {
    /// Sum of current prices over active athletes.
    pub expected: f64,
    /// Sum of paid amounts (snapshot amount, else current price).
    pub collected: f64,
    pub remaining: f64,
    pub paid_count: usize,
    pub eligible_count: usize,
}

/// 80/20 split of collected subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShareSplit {
    pub subscription_fund: f64,
    pub club_share: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeneralFundSummary {
    pub club_share: f64,
    pub manual_income: f64,
    /// Expenses outside the "subscription" category.
    pub general_expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubscriptionFundSummary {
    pub collected_share: f64,
    pub subscription_expenses: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: MonthIndex,
    pub stats: MonthlyStats,
    pub split: ShareSplit,
    pub general_fund: GeneralFundSummary,
    pub subscription_fund: SubscriptionFundSummary,
}

/// Sums of the twelve independently computed months. Nothing carries over
/// from one month to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnnualTotals {
    pub expected: f64,
    pub collected: f64,
    pub remaining: f64,
    pub club_share: f64,
    pub subscription_fund_share: f64,
    pub manual_income: f64,
    pub general_expenses: f64,
    pub general_profit: f64,
    pub subscription_expenses: f64,
    pub subscription_balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualReport {
    pub year: i32,
    pub months: Vec<MonthlyReport>,
    pub totals: AnnualTotals,
}

/// One section's figures for a single month.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionShare {
    pub section_id: SectionId,
    pub title: String,
    pub stats: MonthlyStats,
    pub split: ShareSplit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionPerformance {
    pub section_id: SectionId,
    pub title: String,
    pub expected: f64,
    pub collected: f64,
    /// Collected over expected, in percent (0 when nothing is expected).
    pub percentage: f64,
    /// The year's 20% club share of this section's collections.
    pub club_share: f64,
    pub subscription_fund: f64,
}

// --

impl MonthlyStats {
    pub fn paid_percentage(&self) -> u32 {
        whole_percent(self.collected, self.expected)
    }

    pub fn remaining_percentage(&self) -> u32 {
        whole_percent(self.remaining, self.expected)
    }

    pub fn expected_fund_share(&self) -> f64 {
        self.expected * SUBSCRIPTION_FUND_SHARE
    }

    pub fn remaining_fund_share(&self) -> f64 {
        self.remaining * SUBSCRIPTION_FUND_SHARE
    }

    /// Collected never exceeds expected under normal operation.
    pub fn is_reconciled(&self) -> bool {
        self.collected <= self.expected + AMOUNT_EPSILON
    }
}

impl ShareSplit {
    /// The club share is taken as the remainder so both parts always add up
    /// to `collected`.
    pub fn of(collected: f64) -> Self {
        let subscription_fund = collected * SUBSCRIPTION_FUND_SHARE;
        Self {
            subscription_fund,
            club_share: collected - subscription_fund,
        }
    }
}

impl GeneralFundSummary {
    pub fn total_income(&self) -> f64 {
        self.club_share + self.manual_income
    }
}

impl AnnualTotals {
    pub(crate) fn accumulate(mut self, m: &MonthlyReport) -> Self {
        self.expected += m.stats.expected;
        self.collected += m.stats.collected;
        self.remaining += m.stats.remaining;
        self.club_share += m.split.club_share;
        self.subscription_fund_share += m.split.subscription_fund;
        self.manual_income += m.general_fund.manual_income;
        self.general_expenses += m.general_fund.general_expenses;
        self.general_profit += m.general_fund.profit;
        self.subscription_expenses += m.subscription_fund.subscription_expenses;
        self.subscription_balance += m.subscription_fund.balance;
        self
    }
}

fn whole_percent(part: f64, whole: f64) -> u32 {
    if whole > 0.0 {
        ((part / whole) * 100.0).round().max(0.0) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_parts_add_up_to_collected() {
        for collected in [0.0, 35.0, 50.0, 123.45, 1999.99] {
            let split = ShareSplit::of(collected);
            let total = split.subscription_fund + split.club_share;
            assert!((total - collected).abs() < AMOUNT_EPSILON);
        }
        let split = ShareSplit::of(50.0);
        assert_eq!(split.subscription_fund, 40.0);
        assert_eq!(split.club_share, 10.0);
    }

    #[test]
    fn percentages_round_and_handle_empty_months() {
        let stats = MonthlyStats {
            expected: 150.0,
            collected: 50.0,
            remaining: 100.0,
            paid_count: 1,
            eligible_count: 3,
        };
        assert_eq!(stats.paid_percentage(), 33);
        assert_eq!(stats.remaining_percentage(), 67);
        assert!((stats.expected_fund_share() - 120.0).abs() < AMOUNT_EPSILON);
        assert_eq!(MonthlyStats::default().paid_percentage(), 0);
    }
}
