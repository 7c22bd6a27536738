use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use fractic_server_error::ServerError;
use tracing::{debug, info};

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
            authorization_policy::{actions_for_section_replacement, AuthorizationPolicy},
            utils::time_based_id,
        },
        repositories::{
            payments_repository::PaymentsRepository, records_repository::RecordsRepository,
            roster_repository::RosterRepository,
        },
    },
    entities::{
        locate_athlete, Athlete, AthleteDraft, AthleteId, AthleteUpdate, ElevatedAction,
        FinancialRecord, NewRecord, PaymentKey, PaymentSnapshot, PaymentState, RecordId, Section,
        SectionId, SetPaymentRequest,
    },
    errors::{
        AthleteNotFound, DuplicateAthleteId, DuplicateRecordId, InvalidAmount, InvalidPrice,
        MissingRequiredField, SectionNotFound,
    },
};

/// Every mutation of the roster, the payment ledger and the record log.
/// Commands that can require the secondary PIN take it as `pin`; it is
/// checked before anything is read or written.
#[async_trait]
pub trait CommandUsecase: Send + Sync {
    /// Marks a month paid (upserting the snapshot) or unpaid (deleting the
    /// entry). Returns the resulting state.
    async fn set_payment(
        &self,
        request: SetPaymentRequest,
        pin: Option<&str>,
    ) -> Result<PaymentState, ServerError>;

    /// Appends a record and returns it with its assigned id.
    async fn add_record(&self, record: NewRecord) -> Result<FinancialRecord, ServerError>;

    /// Returns whether a record was removed; an unknown id is not an error.
    async fn delete_record(&self, id: &RecordId) -> Result<bool, ServerError>;

    async fn add_athlete(
        &self,
        section_id: &SectionId,
        draft: AthleteDraft,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError>;

    /// Removes the athlete from its section. Ledger entries are kept.
    async fn delete_athlete(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        pin: Option<&str>,
    ) -> Result<bool, ServerError>;

    async fn update_athlete(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        update: AthleteUpdate,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError>;

    /// Changes the athlete's current price. Already snapshotted months keep
    /// their amounts.
    async fn edit_price(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        price: f64,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError>;

    /// Creates or replaces a whole section.
    async fn upsert_section(
        &self,
        section: Section,
        pin: Option<&str>,
    ) -> Result<Section, ServerError>;
}

pub(crate) struct CommandUsecaseImpl<R1, R2, R3>
where
    R1: RosterRepository,
    R2: PaymentsRepository,
    R3: RecordsRepository,
{
    roster_repository: R1,
    payments_repository: R2,
    records_repository: R3,
    policy: AuthorizationPolicy,
    default_price: f64,
}

impl<S: DocumentStore>
    CommandUsecaseImpl<RosterRepositoryImpl<S>, PaymentsRepositoryImpl<S>, RecordsRepositoryImpl<S>>
{
    pub(crate) fn new(store: Arc<S>, policy: AuthorizationPolicy, default_price: f64) -> Self {
        Self {
            roster_repository: RosterRepositoryImpl::new(store.clone(), default_price),
            payments_repository: PaymentsRepositoryImpl::new(store.clone()),
            records_repository: RecordsRepositoryImpl::new(store),
            policy,
            default_price,
        }
    }
}

impl<R1, R2, R3> CommandUsecaseImpl<R1, R2, R3>
where
    R1: RosterRepository,
    R2: PaymentsRepository,
    R3: RecordsRepository,
{
    async fn existing_section(&self, id: &SectionId) -> Result<Section, ServerError> {
        self.roster_repository
            .section(id)
            .await?
            .ok_or_else(|| SectionNotFound::new(&id.0))
    }

    /// Snapshot built from the roster when the caller did not send one.
    async fn snapshot_from_roster(
        &self,
        athlete_id: &AthleteId,
    ) -> Result<PaymentSnapshot, ServerError> {
        let sections = self.roster_repository.sections().await?;
        let (section, athlete) = locate_athlete(&sections, athlete_id)
            .ok_or_else(|| AthleteNotFound::new(&athlete_id.0))?;
        Ok(PaymentSnapshot {
            athlete_name: athlete.name.clone(),
            parent_name: athlete.parent.clone(),
            department: section.title.clone(),
            amount: Some(athlete.price),
        })
    }

    async fn current_price(&self, athlete_id: &AthleteId) -> Result<Option<f64>, ServerError> {
        let sections = self.roster_repository.sections().await?;
        Ok(locate_athlete(&sections, athlete_id).map(|(_, a)| a.price))
    }
}

fn validate_price(price: f64) -> Result<f64, ServerError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(InvalidPrice::new(price))
    }
}

fn validate_amount(amount: f64) -> Result<f64, ServerError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(InvalidAmount::new(&amount.to_string()))
    }
}

fn required(field: &str, value: &str) -> Result<(), ServerError> {
    if value.trim().is_empty() {
        Err(MissingRequiredField::new(field))
    } else {
        Ok(())
    }
}

#[async_trait]
impl<R1, R2, R3> CommandUsecase for CommandUsecaseImpl<R1, R2, R3>
where
    R1: RosterRepository,
    R2: PaymentsRepository,
    R3: RecordsRepository,
{
    async fn set_payment(
        &self,
        request: SetPaymentRequest,
        pin: Option<&str>,
    ) -> Result<PaymentState, ServerError> {
        let action = if request.paid {
            ElevatedAction::MarkPaid
        } else {
            ElevatedAction::MarkUnpaid
        };
        self.policy.authorize(action, pin)?;

        let key = PaymentKey::new(request.year, request.month, request.athlete_id);
        if !request.paid {
            self.payments_repository
                .store(&key, &PaymentState::Unpaid)
                .await?;
            info!(key = %key, "Payment marked unpaid.");
            return Ok(PaymentState::Unpaid);
        }

        let snapshot = match request.snapshot {
            Some(mut snapshot) => {
                snapshot.amount = match snapshot.amount {
                    Some(amount) => Some(validate_amount(amount)?),
                    None => self.current_price(&key.athlete_id).await?,
                };
                snapshot
            }
            None => self.snapshot_from_roster(&key.athlete_id).await?,
        };
        let state = PaymentState::from_command(true, snapshot, Utc::now());
        self.payments_repository.store(&key, &state).await?;
        info!(key = %key, amount = ?state.amount(), "Payment marked paid.");
        Ok(state)
    }

    async fn add_record(&self, record: NewRecord) -> Result<FinancialRecord, ServerError> {
        required("reason", &record.reason)?;
        let amount = validate_amount(record.amount)?;

        let id = match record.id {
            Some(id) => {
                if self.records_repository.contains(&id).await? {
                    return Err(DuplicateRecordId::new(&id.0));
                }
                id
            }
            None => {
                let taken: HashSet<String> = self
                    .records_repository
                    .records()
                    .await?
                    .into_iter()
                    .map(|r| r.id.0)
                    .collect();
                RecordId(time_based_id(Utc::now(), |id| taken.contains(id)))
            }
        };
        let stored = FinancialRecord {
            id,
            record_type: record.record_type,
            amount,
            reason: record.reason,
            date: record.date,
            transaction_date: record.transaction_date,
            category: record.category.unwrap_or_default(),
        };
        self.records_repository.insert(&stored).await?;
        info!(
            id = %stored.id,
            record_type = stored.record_type.as_str(),
            amount = stored.amount,
            category = stored.category.as_str(),
            "Financial record added."
        );
        Ok(stored)
    }

    async fn delete_record(&self, id: &RecordId) -> Result<bool, ServerError> {
        let removed = self.records_repository.remove(id).await?;
        if removed {
            info!(id = %id, "Financial record deleted.");
        } else {
            debug!(id = %id, "Financial record to delete not found.");
        }
        Ok(removed)
    }

    async fn add_athlete(
        &self,
        section_id: &SectionId,
        draft: AthleteDraft,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError> {
        self.policy.authorize(ElevatedAction::AddAthlete, pin)?;
        required("name", &draft.name)?;
        let price = validate_price(draft.price.unwrap_or(self.default_price))?;

        let mut section = self.existing_section(section_id).await?;
        let taken: HashSet<String> = self
            .roster_repository
            .sections()
            .await?
            .into_iter()
            .flat_map(|s| s.players.into_iter().map(|a| a.id.0))
            .collect();
        let athlete = Athlete {
            id: AthleteId(time_based_id(Utc::now(), |id| taken.contains(id))),
            name: draft.name,
            parent: draft.parent,
            phone: draft.phone,
            price,
        };
        section.players.push(athlete.clone());
        self.roster_repository.save_section(&section).await?;
        info!(section = %section_id, athlete = %athlete.id, price, "Athlete added.");
        Ok(athlete)
    }

    async fn delete_athlete(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        pin: Option<&str>,
    ) -> Result<bool, ServerError> {
        self.policy.authorize(ElevatedAction::DeleteAthlete, pin)?;
        let mut section = self.existing_section(section_id).await?;
        let before = section.players.len();
        section.players.retain(|a| &a.id != athlete_id);
        if section.players.len() == before {
            debug!(section = %section_id, athlete = %athlete_id, "Athlete to delete not found.");
            return Ok(false);
        }
        self.roster_repository.save_section(&section).await?;
        info!(section = %section_id, athlete = %athlete_id, "Athlete deleted.");
        Ok(true)
    }

    async fn update_athlete(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        update: AthleteUpdate,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError> {
        let new_price = update.effective_price();
        if new_price.is_some() {
            self.policy.authorize(ElevatedAction::EditPrice, pin)?;
        }
        let new_price = new_price.map(validate_price).transpose()?;

        let mut section = self.existing_section(section_id).await?;
        let athlete = section
            .athlete_mut(athlete_id)
            .ok_or_else(|| AthleteNotFound::new(&athlete_id.0))?;
        if let Some(name) = update.name {
            required("name", &name)?;
            athlete.name = name;
        }
        if let Some(parent) = update.parent {
            athlete.parent = parent;
        }
        if let Some(phone) = update.phone {
            athlete.phone = phone;
        }
        let old_price = athlete.price;
        if let Some(price) = new_price {
            athlete.price = price;
        }
        let updated = athlete.clone();
        self.roster_repository.save_section(&section).await?;
        info!(
            section = %section_id,
            athlete = %athlete_id,
            old_price,
            new_price = updated.price,
            "Athlete updated."
        );
        Ok(updated)
    }

    async fn edit_price(
        &self,
        section_id: &SectionId,
        athlete_id: &AthleteId,
        price: f64,
        pin: Option<&str>,
    ) -> Result<Athlete, ServerError> {
        let update = AthleteUpdate {
            price: Some(price),
            ..Default::default()
        };
        self.update_athlete(section_id, athlete_id, update, pin).await
    }

    async fn upsert_section(
        &self,
        section: Section,
        pin: Option<&str>,
    ) -> Result<Section, ServerError> {
        required("id", &section.id.0)?;
        let mut seen = HashSet::new();
        for athlete in &section.players {
            required("athlete id", &athlete.id.0)?;
            validate_price(athlete.price)?;
            if !seen.insert(&athlete.id) {
                return Err(DuplicateAthleteId::new(&athlete.id.0));
            }
        }

        let existing = self.roster_repository.section(&section.id).await?;
        let actions = actions_for_section_replacement(existing.as_ref(), &section);
        self.policy.authorize_all(actions, pin)?;

        self.roster_repository.save_section(&section).await?;
        info!(
            section = %section.id,
            players = section.players.len(),
            created = existing.is_none(),
            "Section saved."
        );
        Ok(section)
    }
}
