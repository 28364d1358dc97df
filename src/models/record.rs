use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    request::{NotificationRequest, NotificationType, PriorityLevel},
    status::NotificationStatus,
};

/// Durable record tracking one notification's lifecycle. Created once by
/// the gateway, mutated only by delivery workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub recipient: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: PriorityLevel,
    pub status: NotificationStatus,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl NotificationRecord {
    pub fn from_request(request: &NotificationRequest) -> Self {
        Self {
            id: request.id.clone(),
            recipient: request.recipient.clone(),
            subject: request.subject.clone(),
            message: request.message.clone(),
            notification_type: request.notification_type,
            priority: request.priority,
            status: NotificationStatus::Queued,
            attempts: 0,
            created_at: Utc::now(),
            sent_at: None,
            last_attempt: None,
            error_message: None,
            metadata: request.metadata.clone(),
        }
    }

    /// Registers one delivery attempt. Attempts only ever increase.
    pub fn begin_attempt(&mut self) {
        self.attempts += 1;
        self.last_attempt = Some(Utc::now());
    }

    pub fn mark_sent(&mut self) -> Result<(), Error> {
        self.set_status(NotificationStatus::Sent)?;
        self.sent_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_retrying(&mut self, reason: impl Into<String>) -> Result<(), Error> {
        self.set_status(NotificationStatus::Queued)?;
        self.error_message = Some(reason.into());
        Ok(())
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), Error> {
        self.set_status(NotificationStatus::Failed)?;
        self.error_message = Some(reason.into());
        Ok(())
    }

    fn set_status(&mut self, next: NotificationStatus) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(anyhow!(
                "Illegal status transition for notification {}: {} -> {}",
                self.id,
                self.status,
                next
            ));
        }

        self.status = next;
        Ok(())
    }
}
