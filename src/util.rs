use std::sync::Arc;

use fractic_server_error::ServerError;
use tracing::info;

use crate::{
    config::ClubLedgerConfig,
    data::{
        models::record_model::RecordModel,
        repositories::{
            payments_repository_impl::PaymentsRepositoryImpl,
            records_repository_impl::RecordsRepositoryImpl,
            roster_repository_impl::RosterRepositoryImpl,
        },
    },
    domain::usecases::{
        command_usecase::{CommandUsecase as _, CommandUsecaseImpl},
        query_usecase::{QueryUsecase as _, QueryUsecaseImpl},
    },
    entities::{
        AggregatedState, AnnualReport, Athlete, AthleteDraft, AthleteId, AthleteUpdate,
        FinancialRecord, MonthIndex, MonthlyReport, MonthlyStats, NewRecord, PaymentKey,
        PaymentLedger, PaymentState, RecordCategory, RecordId, Section, SectionId,
        SectionPerformance, SectionShare, SetPaymentRequest,
    },
    errors::{InvalidJson, MissingRequiredField},
    logging::init_logging,
    presentation::{
        annual_report_printer::AnnualReportPrinter, monthly_breakdown_csv::MonthlyBreakdownCsv,
    },
    stores::{DocumentStore, InMemoryDocumentStore, JsonFileDocumentStore},
};

pub type Report = String;

/// Entry point of the library: every command and query of the club ledger
/// over one document store.
pub struct ClubLedgerUtil<S: DocumentStore> {
    command_usecase: CommandUsecaseImpl<
        RosterRepositoryImpl<S>,
        PaymentsRepositoryImpl<S>,
        RecordsRepositoryImpl<S>,
    >,
    query_usecase: QueryUsecaseImpl<
        RosterRepositoryImpl<S>,
        PaymentsRepositoryImpl<S>,
        RecordsRepositoryImpl<S>,
    >,
    printer: AnnualReportPrinter,
    csv: MonthlyBreakdownCsv,
    store: Arc<S>,
}

impl ClubLedgerUtil<JsonFileDocumentStore> {
    /// Opens the JSON data file named in the config and installs logging at
    /// the configured level.
    pub async fn open(config: &ClubLedgerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        init_logging(config.log_level());
        let path = config
            .data_file
            .as_ref()
            .ok_or_else(|| MissingRequiredField::new("data_file"))?;
        let store = JsonFileDocumentStore::open(path).await?;
        Self::new(Arc::new(store), config)
    }
}

impl ClubLedgerUtil<InMemoryDocumentStore> {
    pub fn in_memory(config: &ClubLedgerConfig) -> Result<Self, ServerError> {
        Self::new(Arc::new(InMemoryDocumentStore::new()), config)
    }
}

impl<S: DocumentStore> ClubLedgerUtil<S> {
    pub fn new(store: Arc<S>, config: &ClubLedgerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let default_price = config.default_athlete_price();
        info!(
            default_price,
            elevated_actions = ?config.elevated_actions(),
            "Club ledger ready."
        );
        Ok(Self {
            command_usecase: CommandUsecaseImpl::new(
                store.clone(),
                config.authorization_policy(),
                default_price,
            ),
            query_usecase: QueryUsecaseImpl::new(store.clone(), default_price),
            printer: AnnualReportPrinter::new(),
            csv: MonthlyBreakdownCsv::new(),
            store,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // Commands.
    // ---

    pub async fn set_payment(
        &self,
        request: SetPaymentRequest,
        pin: Option<&str>,
    ) -> Result<PaymentState, ServerError> {
        self.command_usecase.set_payment(request, pin).await
    }

    pub async fn add_record(&self, record: NewRecord) -> Result<FinancialRecord, ServerError> {
        self.command_usecase.add_record(record).await
    }

    /// Adds a record from a JSON body such as
    /// `{"type":"expense","amount":20,"reason":"ball","date":"2026-01-01","category":"subscription"}`.
    pub async fn add_record_json(&self, json: &str) -> Result<FinancialRecord, ServerError> {
        let model: RecordModel = serde_json::from_str(json)
            .map_err(|e| InvalidJson::with_debug("financial record", &e))?;
        self.add_record(model.into_new_record()?).await
    }

    pub async fn delete_record(&self, id: &RecordId) -> Result<bool, ServerError> {
        self.command_usecase.delete_record(id).await
    }

    pub async fn add_athlete(
        &self,
        section_id: &SectionId,
        draft: AthleteDraft,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError> {
        self.command_usecase.add_athlete(section_id, draft, pin).await
    }

    pub async fn delete_athlete(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        pin: Option<&str>,
    ) -> Result<bool, ServerError> {
        self.command_usecase
            .delete_athlete(section_id, athlete_id, pin)
            .await
    }

    pub async fn update_athlete(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        update: AthleteUpdate,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError> {
        self.command_usecase
            .update_athlete(section_id, athlete_id, update, pin)
            .await
    }

    pub async fn edit_price(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        price: f64,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError> {
        self.command_usecase
            .edit_price(section_id, athlete_id, price, pin)
            .await
    }

    pub async fn upsert_section(
        &self,
        section: Section,
        pin: Option<&str>,
    ) -> Result<Section, ServerError> {
        self.command_usecase.upsert_section(section, pin).await
    }

    // Queries.
    // ---

    pub async fn aggregated_state(&self, year: i32) -> Result<AggregatedState, ServerError> {
        self.query_usecase.aggregated_state(year).await
    }

    pub async fn aggregated_state_merged(
        &self,
        year: i32,
        cached: PaymentLedger,
    ) -> Result<AggregatedState, ServerError> {
        self.query_usecase
            .aggregated_state_merged(year, cached)
            .await
    }

    pub async fn is_paid(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Result<bool, ServerError> {
        self.query_usecase.is_paid(year, month, athlete_id).await
    }

    pub async fn payment_amount(
        &self,
        year: i32,
        month: MonthIndex,
        athlete_id: &AthleteId,
    ) -> Result<f64, ServerError> {
        self.query_usecase
            .payment_amount(year, month, athlete_id)
            .await
    }

    pub async fn records_for_month(
        &self,
        year: i32,
        month: MonthIndex,
        exclude_category: Option<RecordCategory>,
    ) -> Result<Vec<FinancialRecord>, ServerError> {
        self.query_usecase
            .records_for_month(year, month, exclude_category)
            .await
    }

    pub async fn monthly_report(
        &self,
        year: i32,
        month: MonthIndex,
    ) -> Result<MonthlyReport, ServerError> {
        self.query_usecase.monthly_report(year, month).await
    }

    pub async fn annual_report(&self, year: i32) -> Result<AnnualReport, ServerError> {
        self.query_usecase.annual_report(year).await
    }

    pub async fn section_monthly_stats(
        &self,
        section_id: &SectionId,
        year: i32,
        month: MonthIndex,
    ) -> Result<MonthlyStats, ServerError> {
        self.query_usecase
            .section_monthly_stats(section_id, year, month)
            .await
    }

    pub async fn section_breakdown(
        &self,
        year: i32,
        month: MonthIndex,
    ) -> Result<Vec<SectionShare>, ServerError> {
        self.query_usecase.section_breakdown(year, month).await
    }

    pub async fn section_performance(
        &self,
        year: i32,
    ) -> Result<Vec<SectionPerformance>, ServerError> {
        self.query_usecase.section_performance(year).await
    }

    pub async fn top_section(&self, year: i32) -> Result<Option<SectionPerformance>, ServerError> {
        self.query_usecase.top_section(year).await
    }

    pub async fn orphaned_payments(&self) -> Result<Vec<PaymentKey>, ServerError> {
        self.query_usecase.orphaned_payments().await
    }

    // Reports.
    // ---

    pub async fn annual_report_text(&self, year: i32) -> Result<Report, ServerError> {
        let report = self.annual_report(year).await?;
        let sections = self.section_performance(year).await?;
        let state = self.aggregated_state(year).await?;
        Ok(self
            .printer
            .print_report(&report, &sections, &state.records))
    }

    pub async fn monthly_breakdown_csv(&self, year: i32) -> Result<Report, ServerError> {
        let report = self.annual_report(year).await?;
        self.csv.write(&report)
    }
}
