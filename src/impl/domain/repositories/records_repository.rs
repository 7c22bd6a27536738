use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::entities::{FinancialRecord, RecordId};

#[async_trait]
pub trait RecordsRepository: Send + Sync {
    async fn records(&self) -> Result<Vec<FinancialRecord>, ServerError>;

    async fn contains(&self, id: &RecordId) -> Result<bool, ServerError>;

    async fn insert(&self, record: &FinancialRecord) -> Result<(), ServerError>;

    /// Returns whether a record was removed.
    async fn remove(&self, id: &RecordId) -> Result<bool, ServerError>;
}
