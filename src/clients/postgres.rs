use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{error, info};

use crate::{
    clients::store::RecordStore,
    models::{record::NotificationRecord, request::NotificationType},
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS notification_records (
    id TEXT PRIMARY KEY,
    recipient TEXT NOT NULL,
    subject TEXT NOT NULL DEFAULT '',
    message TEXT NOT NULL,
    notification_type TEXT NOT NULL,
    priority TEXT NOT NULL,
    status TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL,
    sent_at TIMESTAMPTZ,
    last_attempt TIMESTAMPTZ,
    error_message TEXT,
    metadata JSONB
);
CREATE INDEX IF NOT EXISTS notification_records_type_idx
    ON notification_records (notification_type, created_at);
"#;

const RECORD_COLUMNS: &str = "id, recipient, subject, message, notification_type, priority, \
     status, attempts, created_at, sent_at, last_attempt, error_message, metadata";

pub struct PgRecordStore {
    client: Client,
}

impl PgRecordStore {
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        info!("Connecting to PostgreSQL database");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection terminated");
            }
        });

        client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| anyhow!("Failed to initialize database schema: {}", e))?;

        info!("PostgreSQL connection established");

        Ok(Self { client })
    }

    fn row_to_record(row: &Row) -> Result<NotificationRecord, Error> {
        let notification_type: String = row.get("notification_type");
        let priority: String = row.get("priority");
        let status: String = row.get("status");
        let metadata: Option<serde_json::Value> = row.get("metadata");

        Ok(NotificationRecord {
            id: row.get("id"),
            recipient: row.get("recipient"),
            subject: row.get("subject"),
            message: row.get("message"),
            notification_type: notification_type.parse()?,
            priority: priority.parse()?,
            status: status.parse()?,
            attempts: row.get("attempts"),
            created_at: row.get("created_at"),
            sent_at: row.get("sent_at"),
            last_attempt: row.get("last_attempt"),
            error_message: row.get("error_message"),
            metadata: metadata
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| anyhow!("Invalid metadata stored for record: {}", e))?,
        })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &NotificationRecord) -> Result<(), Error> {
        let notification_type = record.notification_type.to_string();
        let priority = record.priority.to_string();
        let status = record.status.to_string();
        let metadata = record
            .metadata
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        self.client
            .execute(
                "INSERT INTO notification_records \
                 (id, recipient, subject, message, notification_type, priority, status, \
                  attempts, created_at, sent_at, last_attempt, error_message, metadata) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
                &[
                    &record.id,
                    &record.recipient,
                    &record.subject,
                    &record.message,
                    &notification_type,
                    &priority,
                    &status,
                    &record.attempts,
                    &record.created_at,
                    &record.sent_at,
                    &record.last_attempt,
                    &record.error_message,
                    &metadata,
                ],
            )
            .await
            .map_err(|e| anyhow!("Failed to insert notification record: {}", e))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>, Error> {
        let query = format!(
            "SELECT {} FROM notification_records WHERE id = $1",
            RECORD_COLUMNS
        );

        let row = self
            .client
            .query_opt(query.as_str(), &[&id])
            .await
            .map_err(|e| anyhow!("Failed to read notification record: {}", e))?;

        row.map(|row| Self::row_to_record(&row)).transpose()
    }

    async fn update(&self, record: &NotificationRecord) -> Result<(), Error> {
        let status = record.status.to_string();

        let updated = self
            .client
            .execute(
                "UPDATE notification_records \
                 SET status = $2, attempts = $3, sent_at = $4, last_attempt = $5, \
                     error_message = $6 \
                 WHERE id = $1",
                &[
                    &record.id,
                    &status,
                    &record.attempts,
                    &record.sent_at,
                    &record.last_attempt,
                    &record.error_message,
                ],
            )
            .await
            .map_err(|e| anyhow!("Failed to update notification record: {}", e))?;

        if updated == 0 {
            return Err(anyhow!("No notification record with id {}", record.id));
        }

        Ok(())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<NotificationRecord>, Error> {
        let query = format!(
            "SELECT {} FROM notification_records \
             ORDER BY created_at, id OFFSET $1 LIMIT $2",
            RECORD_COLUMNS
        );

        // Postgres takes i64 here; clamp rather than wrap client input.
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = self
            .client
            .query(query.as_str(), &[&offset, &limit])
            .await
            .map_err(|e| anyhow!("Failed to list notification records: {}", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn list_by_type(
        &self,
        notification_type: NotificationType,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<NotificationRecord>, Error> {
        let type_str = notification_type.to_string();

        let query = format!(
            "SELECT {} FROM notification_records WHERE notification_type = $1 \
             ORDER BY created_at, id OFFSET $2 LIMIT $3",
            RECORD_COLUMNS
        );

        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = self
            .client
            .query(query.as_str(), &[&type_str, &offset, &limit])
            .await
            .map_err(|e| anyhow!("Failed to list notification records by type: {}", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
