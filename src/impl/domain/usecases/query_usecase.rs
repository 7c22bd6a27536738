use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use tracing::{debug, warn};

use crate::{
    data::{
        datasources::document_store::DocumentStore,
        repositories::{
            payments_repository_impl::PaymentsRepositoryImpl,
            records_repository_impl::RecordsRepositoryImpl,
            roster_repository_impl::RosterRepositoryImpl,
        },
    },
    domain::{
        logic::{
            aggregation_engine::AggregationEngine,
            record_filters::{records_for_month, records_for_year},
        },
        repositories::{
            payments_repository::PaymentsRepository, records_repository::RecordsRepository,
            roster_repository::RosterRepository,
        },
    },
    entities::{
        locate_athlete, AggregatedState, AnnualReport, AthleteId, FinancialRecord, MonthIndex,
        MonthlyReport, MonthlyStats, PaymentKey, PaymentLedger, RecordCategory, Section,
        SectionId, SectionPerformance, SectionShare,
    },
    errors::SectionNotFound,
};

/// Read side. Everything is recomputed from storage on each call.
#[async_trait]
pub trait QueryUsecase: Send + Sync {
    /// Sections, the year's ledger entries and the year's records.
    async fn aggregated_state(&self, year: i32) -> Result<AggregatedState, ServerError>;

    /// Like `aggregated_state`, with a client-side ledger cache unioned in.
    /// Stored entries win; nothing is persisted.
    async fn aggregated_state_merged(
        &self,
        year: i32,
        cached: PaymentLedger,
    ) -> Result<AggregatedState, ServerError>;

    async fn is_paid(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Result<bool, ServerError>;

    /// Snapshotted amount, else the athlete's current price (0 for athletes
    /// no longer on the roster).
    async fn payment_amount(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Result<f64, ServerError>;

    async fn records_for_month(
        &self,
        year: i32,
        month: MonthIndex,
        exclude_category: Option<RecordCategory>,
    ) -> Result<Vec<FinancialRecord>, ServerError>;

    async fn monthly_report(
        &self,
        year: i32,
        month: MonthIndex,
    ) -> Result<MonthlyReport, ServerError>;

    async fn annual_report(&self, year: i32) -> Result<AnnualReport, ServerError>;

    async fn section_monthly_stats(
        &self,
        section_id: &SectionId,
        year: i32,
        month: MonthIndex,
    ) -> Result<MonthlyStats, ServerError>;

    /// Stats and club/fund split of every section for one month.
    async fn section_breakdown(
        &self,
        year: i32,
        month: MonthIndex,
    ) -> Result<Vec<SectionShare>, ServerError>;

    async fn section_performance(&self, year: i32) -> Result<Vec<SectionPerformance>, ServerError>;

    async fn top_section(&self, year: i32) -> Result<Option<SectionPerformance>, ServerError>;

    /// Ledger keys whose athlete is gone from the roster.
    async fn orphaned_payments(&self) -> Result<Vec<PaymentKey>, ServerError>;
}

pub(crate) struct QueryUsecaseImpl<R1, R2, R3>
where
    R1: RosterRepository,
    R2: PaymentsRepository,
    R3: RecordsRepository,
{
    roster_repository: R1,
    payments_repository: R2,
    records_repository: R3,
}

impl<S: DocumentStore>
    QueryUsecaseImpl<RosterRepositoryImpl<S>, PaymentsRepositoryImpl<S>, RecordsRepositoryImpl<S>>
{
    pub(crate) fn new(store: Arc<S>, default_price: f64) -> Self {
        Self {
            roster_repository: RosterRepositoryImpl::new(store.clone(), default_price),
            payments_repository: PaymentsRepositoryImpl::new(store.clone()),
            records_repository: RecordsRepositoryImpl::new(store),
        }
    }
}

struct Snapshot {
    sections: Vec<Section>,
    ledger: PaymentLedger,
    records: Vec<FinancialRecord>,
}

impl Snapshot {
    fn engine(&self) -> AggregationEngine<'_> {
        AggregationEngine::new(&self.sections, &self.ledger, &self.records)
    }
}

impl<R1, R2, R3> QueryUsecaseImpl<R1, R2, R3>
where
    R1: RosterRepository,
    R2: PaymentsRepository,
    R3: RecordsRepository,
{
    async fn load(&self) -> Result<Snapshot, ServerError> {
        Ok(Snapshot {
            sections: self.roster_repository.sections().await?,
            ledger: self.payments_repository.ledger().await?,
            records: self.records_repository.records().await?,
        })
    }
}

#[async_trait]
impl<R1, R2, R3> QueryUsecase for QueryUsecaseImpl<R1, R2, R3>
where
    R1: RosterRepository,
    R2: PaymentsRepository,
    R3: RecordsRepository,
{
    async fn aggregated_state(&self, year: i32) -> Result<AggregatedState, ServerError> {
        let snapshot = self.load().await?;
        Ok(AggregatedState {
            year,
            ledger: snapshot.ledger.for_year(year),
            records: records_for_year(&snapshot.records, year),
            sections: snapshot.sections,
        })
    }

    async fn aggregated_state_merged(
        &self,
        year: i32,
        cached: PaymentLedger,
    ) -> Result<AggregatedState, ServerError> {
        let mut state = self.aggregated_state(year).await?;
        let before = state.ledger.len();
        state.ledger.merge_advisory(cached.for_year(year));
        debug!(
            year,
            added = state.ledger.len() - before,
            "Merged client ledger cache."
        );
        Ok(state)
    }

    async fn is_paid(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Result<bool, ServerError> {
        let key = PaymentKey::new(year, month, athlete_id.clone());
        Ok(self
            .payments_repository
            .payment(&key)
            .await?
            .is_some_and(|p| p.is_paid()))
    }

    async fn payment_amount(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Result<f64, ServerError> {
        let sections = self.roster_repository.sections().await?;
        let fallback = locate_athlete(&sections, athlete_id).map_or(0.0, |(_, a)| a.price);
        let key = PaymentKey::new(year, month, athlete_id.clone());
        Ok(self
            .payments_repository
            .payment(&key)
            .await?
            .and_then(|p| p.amount())
            .unwrap_or(fallback))
    }

    async fn records_for_month(
        &self,
        year: i32,
        month: MonthIndex,
        exclude_category: Option<RecordCategory>,
    ) -> Result<Vec<FinancialRecord>, ServerError> {
        let records = self.records_repository.records().await?;
        Ok(records_for_month(&records, year, month, exclude_category.as_ref())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn monthly_report(
        &self,
        year: i32,
        month: MonthIndex,
    ) -> Result<MonthlyReport, ServerError> {
        let snapshot = self.load().await?;
        let report = snapshot.engine().monthly_report(year, month);
        if !report.stats.is_reconciled() {
            warn!(
                year,
                month = month.number(),
                expected = report.stats.expected,
                collected = report.stats.collected,
                "Collected exceeds expected; snapshot amounts are above current prices."
            );
        }
        Ok(report)
    }

    async fn annual_report(&self, year: i32) -> Result<AnnualReport, ServerError> {
        let snapshot = self.load().await?;
        let engine = snapshot.engine();
        let orphans = engine.orphaned_payments().len();
        if orphans > 0 {
            debug!(year, orphans, "Ledger holds payments for athletes no longer on the roster.");
        }
        Ok(engine.annual_report(year))
    }

    async fn section_monthly_stats(
        &self,
        section_id: &SectionId,
        year: i32,
        month: MonthIndex,
    ) -> Result<MonthlyStats, ServerError> {
        let snapshot = self.load().await?;
        let section = snapshot
            .sections
            .iter()
            .find(|s| &s.id == section_id)
            .ok_or_else(|| SectionNotFound::new(&section_id.0))?;
        Ok(snapshot
            .engine()
            .section_monthly_stats(section, year, month))
    }

    async fn section_breakdown(
        &self,
        year: i32,
        month: MonthIndex,
    ) -> Result<Vec<SectionShare>, ServerError> {
        Ok(self.load().await?.engine().section_breakdown(year, month))
    }

    async fn section_performance(&self, year: i32) -> Result<Vec<SectionPerformance>, ServerError> {
        Ok(self.load().await?.engine().section_performance(year))
    }

    async fn top_section(&self, year: i32) -> Result<Option<SectionPerformance>, ServerError> {
        Ok(self.load().await?.engine().top_section(year))
    }

    async fn orphaned_payments(&self) -> Result<Vec<PaymentKey>, ServerError> {
        let snapshot = self.load().await?;
        Ok(snapshot
            .engine()
            .orphaned_payments()
            .into_iter()
            .cloned()
            .collect())
    }
}
