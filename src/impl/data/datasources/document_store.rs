use async_trait::async_trait;
use fractic_server_error::ServerError;
use serde_json::Value;

/// The three independent collections the ledger persists. No foreign keys are
/// enforced between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Sections,
    Payments,
    Records,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Sections => "sections",
            Collection::Payments => "payments",
            Collection::Records => "records",
        }
    }
}

/// Keyed JSON document storage. Writes to a single key are last-write-wins;
/// implementations provide per-call atomicity only.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, in insertion order.
    async fn all(&self, collection: Collection) -> Result<Vec<(String, Value)>, ServerError>;

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, ServerError>;

    /// Inserts or replaces the document stored under `key`.
    async fn put(&self, collection: Collection, key: &str, document: Value)
        -> Result<(), ServerError>;

    /// Returns whether a document was removed.
    async fn remove(&self, collection: Collection, key: &str) -> Result<bool, ServerError>;
}
