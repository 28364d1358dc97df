use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{record::NotificationRecord, status::NotificationStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub status: NotificationStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub attempts: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
}

impl NotificationResponse {
    pub fn queued(id: String) -> Self {
        Self {
            id,
            status: NotificationStatus::Queued,
            message: "Notification queued for delivery".to_string(),
            timestamp: Utc::now(),
            attempts: 0,
            last_attempt: None,
        }
    }

    pub fn failed(id: String, message: impl Into<String>) -> Self {
        Self {
            id,
            status: NotificationStatus::Failed,
            message: message.into(),
            timestamp: Utc::now(),
            attempts: 0,
            last_attempt: None,
        }
    }

    pub fn from_record(record: &NotificationRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: record.status,
            message: format!("Notification status: {}", record.status),
            timestamp: record.sent_at.unwrap_or(record.created_at),
            attempts: record.attempts,
            last_attempt: record.last_attempt,
        }
    }
}
