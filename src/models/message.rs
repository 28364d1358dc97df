use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::request::NotificationRequest;

/// Transient envelope carried on the broker. Workers still re-fetch the
/// record for attempts and status; the request snapshot spares them a
/// second lookup for the payload itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub notification_id: String,
    pub request: NotificationRequest,
    pub attempt_count: i32,
    pub created_time: DateTime<Utc>,

    /// Reserved for scheduled backoff; no consumer reads it yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_attempt_time: Option<DateTime<Utc>>,
}

impl QueueMessage {
    pub fn new(request: NotificationRequest) -> Self {
        Self {
            notification_id: request.id.clone(),
            request,
            attempt_count: 0,
            created_time: Utc::now(),
            next_attempt_time: None,
        }
    }
}
