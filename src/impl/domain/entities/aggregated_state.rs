use super::{financial_record::FinancialRecord, payment::PaymentLedger, section::Section};

/// Full snapshot handed to clients that aggregate on their side.
#[derive(Debug, Clone)]
pub struct AggregatedState {
    pub year: i32,
    pub sections: Vec<Section>,
    /// Ledger entries keyed under `year`.
    pub ledger: PaymentLedger,
    /// Records dated in `year`, newest first.
    pub records: Vec<FinancialRecord>,
}
