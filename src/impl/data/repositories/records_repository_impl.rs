use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use tracing::warn;

use crate::{
    data::{
        datasources::document_store::{Collection, DocumentStore},
        models::record_model::RecordModel,
    },
    domain::repositories::records_repository::RecordsRepository,
    entities::{FinancialRecord, RecordId},
    errors::StoreSerializationError,
};

pub(crate) struct RecordsRepositoryImpl<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> RecordsRepositoryImpl<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: DocumentStore> RecordsRepository for RecordsRepositoryImpl<S> {
    async fn records(&self) -> Result<Vec<FinancialRecord>, ServerError> {
        Ok(self
            .store
            .all(Collection::Records)
            .await?
            .into_iter()
            .filter_map(|(key, doc)| {
                let record = serde_json::from_value::<RecordModel>(doc)
                    .ok()
                    .and_then(RecordModel::into_entity_lenient);
                if record.is_none() {
                    warn!(key = %key, "Skipping unreadable financial record.");
                }
                record
            })
            .collect())
    }

    async fn contains(&self, id: &RecordId) -> Result<bool, ServerError> {
        Ok(self.store.get(Collection::Records, &id.0).await?.is_some())
    }

    async fn insert(&self, record: &FinancialRecord) -> Result<(), ServerError> {
        let doc = serde_json::to_value(RecordModel::from_entity(record))
            .map_err(|e| StoreSerializationError::with_debug("financial record", &e))?;
        self.store.put(Collection::Records, &record.id.0, doc).await
    }

    async fn remove(&self, id: &RecordId) -> Result<bool, ServerError> {
        self.store.remove(Collection::Records, &id.0).await
    }
}
