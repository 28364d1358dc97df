use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    clients::store::RecordStore,
    models::{record::NotificationRecord, request::NotificationType},
};

/// Record store backed by a process-local map. Used by the test suite and
/// for broker-less local runs; the durable deployment uses Postgres.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, NotificationRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn page(
        mut records: Vec<NotificationRecord>,
        offset: u64,
        limit: u64,
    ) -> Vec<NotificationRecord> {
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &NotificationRecord) -> Result<(), Error> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.id) {
            return Err(anyhow!("Duplicate notification id: {}", record.id));
        }

        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>, Error> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update(&self, record: &NotificationRecord) -> Result<(), Error> {
        let mut records = self.records.write().await;

        if !records.contains_key(&record.id) {
            return Err(anyhow!("No notification record with id {}", record.id));
        }

        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<NotificationRecord>, Error> {
        let records = self.records.read().await.values().cloned().collect();
        Ok(Self::page(records, offset, limit))
    }

    async fn list_by_type(
        &self,
        notification_type: NotificationType,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<NotificationRecord>, Error> {
        let records = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.notification_type == notification_type)
            .cloned()
            .collect();

        Ok(Self::page(records, offset, limit))
    }
}
