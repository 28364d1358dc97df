use anyhow::{Error, Result};
use async_trait::async_trait;

use crate::models::{record::NotificationRecord, request::NotificationType};

/// Durable table of notification records. The only shared mutable state
/// in the pipeline; every mutation is keyed by record id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &NotificationRecord) -> Result<(), Error>;

    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>, Error>;

    async fn update(&self, record: &NotificationRecord) -> Result<(), Error>;

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<NotificationRecord>, Error>;

    async fn list_by_type(
        &self,
        notification_type: NotificationType,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<NotificationRecord>, Error>;
}
