use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use tracing::warn;

use crate::{
    data::{
        datasources::document_store::{Collection, DocumentStore},
        models::section_model::SectionModel,
    },
    domain::repositories::roster_repository::RosterRepository,
    entities::{Section, SectionId},
    errors::StoreSerializationError,
};

pub(crate) struct RosterRepositoryImpl<S: DocumentStore> {
    store: Arc<S>,
    default_price: f64,
}

impl<S: DocumentStore> RosterRepositoryImpl<S> {
    pub(crate) fn new(store: Arc<S>, default_price: f64) -> Self {
        Self {
            store,
            default_price,
        }
    }
}

#[async_trait]
impl<S: DocumentStore> RosterRepository for RosterRepositoryImpl<S> {
    async fn sections(&self) -> Result<Vec<Section>, ServerError> {
        Ok(self
            .store
            .all(Collection::Sections)
            .await?
            .into_iter()
            .filter_map(|(key, doc)| match serde_json::from_value::<SectionModel>(doc) {
                Ok(model) => Some(model.into_entity(self.default_price)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping unreadable section document.");
                    None
                }
            })
            .collect())
    }

    async fn section(&self, id: &SectionId) -> Result<Option<Section>, ServerError> {
        let Some(doc) = self.store.get(Collection::Sections, &id.0).await? else {
            return Ok(None);
        };
        match serde_json::from_value::<SectionModel>(doc) {
            Ok(model) => Ok(Some(model.into_entity(self.default_price))),
            Err(e) => {
                warn!(key = %id, error = %e, "Unreadable section document.");
                Ok(None)
            }
        }
    }

    async fn save_section(&self, section: &Section) -> Result<(), ServerError> {
        let doc = serde_json::to_value(SectionModel::from_entity(section))
            .map_err(|e| StoreSerializationError::with_debug("section", &e))?;
        self.store.put(Collection::Sections, &section.id.0, doc).await
    }
}
