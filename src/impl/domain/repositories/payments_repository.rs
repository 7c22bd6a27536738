use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::entities::{PaymentKey, PaymentLedger, PaymentState};

#[async_trait]
pub trait PaymentsRepository: Send + Sync {
    async fn ledger(&self) -> Result<PaymentLedger, ServerError>;

    async fn payment(&self, key: &PaymentKey) -> Result<Option<PaymentState>, ServerError>;

    /// Persists `state` under `key`. `Unpaid` deletes the entry instead of
    /// storing a false marker.
    async fn store(&self, key: &PaymentKey, state: &PaymentState) -> Result<(), ServerError>;
}
