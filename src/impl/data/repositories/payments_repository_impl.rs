use std::{str::FromStr as _, sync::Arc};

use async_trait::async_trait;
use fractic_server_error::ServerError;
use tracing::warn;

use crate::{
    data::{
        datasources::document_store::{Collection, DocumentStore},
        models::payment_model::PaymentModel,
    },
    domain::repositories::payments_repository::PaymentsRepository,
    entities::{PaymentKey, PaymentLedger, PaymentState},
    errors::StoreSerializationError,
};

pub(crate) struct PaymentsRepositoryImpl<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> PaymentsRepositoryImpl<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: DocumentStore> PaymentsRepository for PaymentsRepositoryImpl<S> {
    async fn ledger(&self) -> Result<PaymentLedger, ServerError> {
        let mut ledger = PaymentLedger::new();
        for (raw_key, doc) in self.store.all(Collection::Payments).await? {
            // Malformed keys stay in storage; they are only left out of reads.
            let Ok(key) = PaymentKey::from_str(&raw_key) else {
                warn!(key = %raw_key, "Skipping payment with malformed key.");
                continue;
            };
            match serde_json::from_value::<PaymentModel>(doc) {
                Ok(model) => ledger.insert(key, model.into_state()),
                Err(e) => {
                    warn!(key = %raw_key, error = %e, "Skipping unreadable payment document.")
                }
            }
        }
        Ok(ledger)
    }

    async fn payment(&self, key: &PaymentKey) -> Result<Option<PaymentState>, ServerError> {
        Ok(self
            .store
            .get(Collection::Payments, &key.to_string())
            .await?
            .and_then(|doc| serde_json::from_value::<PaymentModel>(doc).ok())
            .map(PaymentModel::into_state))
    }

    async fn store(&self, key: &PaymentKey, state: &PaymentState) -> Result<(), ServerError> {
        let raw_key = key.to_string();
        if !state.is_paid() {
            self.store.remove(Collection::Payments, &raw_key).await?;
            return Ok(());
        }
        let doc = serde_json::to_value(PaymentModel::from_state(key, state))
            .map_err(|e| StoreSerializationError::with_debug("payment", &e))?;
        self.store.put(Collection::Payments, &raw_key, doc).await
    }
}
