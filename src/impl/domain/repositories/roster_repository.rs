use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::entities::{Section, SectionId};

#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// All sections in storage order. Unreadable documents are skipped.
    async fn sections(&self) -> Result<Vec<Section>, ServerError>;

    async fn section(&self, id: &SectionId) -> Result<Option<Section>, ServerError>;

    /// Creates or replaces the whole section, athletes included.
    async fn save_section(&self, section: &Section) -> Result<(), ServerError>;
}
