use async_trait::async_trait;
use fractic_server_error::ServerError;
use serde_json::Value;
use tokio::sync::RwLock;

use super::document_store::{Collection, DocumentStore};

/// Insertion-ordered documents of all three collections. Shared by the
/// in-memory and the file-backed stores.
#[derive(Debug, Default, Clone)]
pub(crate) struct Collections {
    pub(crate) sections: Vec<(String, Value)>,
    pub(crate) payments: Vec<(String, Value)>,
    pub(crate) records: Vec<(String, Value)>,
}

impl Collections {
    pub(crate) fn of(&self, collection: Collection) -> &Vec<(String, Value)> {
        match collection {
            Collection::Sections => &self.sections,
            Collection::Payments => &self.payments,
            Collection::Records => &self.records,
        }
    }

    fn of_mut(&mut self, collection: Collection) -> &mut Vec<(String, Value)> {
        match collection {
            Collection::Sections => &mut self.sections,
            Collection::Payments => &mut self.payments,
            Collection::Records => &mut self.records,
        }
    }

    pub(crate) fn get(&self, collection: Collection, key: &str) -> Option<&Value> {
        self.of(collection)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub(crate) fn put(&mut self, collection: Collection, key: &str, document: Value) {
        let docs = self.of_mut(collection);
        match docs.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = document,
            None => docs.push((key.to_string(), document)),
        }
    }

    pub(crate) fn remove(&mut self, collection: Collection, key: &str) -> bool {
        let docs = self.of_mut(collection);
        let before = docs.len();
        docs.retain(|(k, _)| k != key);
        docs.len() != before
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn all(&self, collection: Collection) -> Result<Vec<(String, Value)>, ServerError> {
        Ok(self.collections.read().await.of(collection).clone())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, ServerError> {
        Ok(self.collections.read().await.get(collection, key).cloned())
    }

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        document: Value,
    ) -> Result<(), ServerError> {
        self.collections.write().await.put(collection, key, document);
        Ok(())
    }

    async fn remove(&self, collection: Collection, key: &str) -> Result<bool, ServerError> {
        Ok(self.collections.write().await.remove(collection, key))
    }
}
