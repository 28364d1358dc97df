use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(default = "generate_id")]
    pub id: String,

    #[serde(default)]
    pub recipient: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub message: String,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    #[serde(default)]
    pub priority: PriorityLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded file content, passed through opaquely to transports.
    pub data: String,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Email,
    Sms,
    Push,
    Slack,
    Discord,
    Webhook,
}

impl NotificationType {
    pub const ALL: [NotificationType; 6] = [
        NotificationType::Email,
        NotificationType::Sms,
        NotificationType::Push,
        NotificationType::Slack,
        NotificationType::Discord,
        NotificationType::Webhook,
    ];

    /// Total type-to-queue mapping. The enum is closed, so an unmapped
    /// type cannot reach the router.
    pub fn queue_name(self) -> &'static str {
        match self {
            NotificationType::Email => "email_notifications",
            NotificationType::Sms => "sms_notifications",
            NotificationType::Push => "push_notifications",
            NotificationType::Slack => "slack_notifications",
            NotificationType::Discord => "discord_notifications",
            NotificationType::Webhook => "webhook_notifications",
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NotificationType::Email => write!(f, "email"),
            NotificationType::Sms => write!(f, "sms"),
            NotificationType::Push => write!(f, "push"),
            NotificationType::Slack => write!(f, "slack"),
            NotificationType::Discord => write!(f, "discord"),
            NotificationType::Webhook => write!(f, "webhook"),
        }
    }
}

impl FromStr for NotificationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(NotificationType::Email),
            "sms" => Ok(NotificationType::Sms),
            "push" => Ok(NotificationType::Push),
            "slack" => Ok(NotificationType::Slack),
            "discord" => Ok(NotificationType::Discord),
            "webhook" => Ok(NotificationType::Webhook),
            _ => Err(anyhow!("Invalid notification type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Display for PriorityLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PriorityLevel::Low => write!(f, "low"),
            PriorityLevel::Normal => write!(f, "normal"),
            PriorityLevel::High => write!(f, "high"),
            PriorityLevel::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for PriorityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(PriorityLevel::Low),
            "normal" => Ok(PriorityLevel::Normal),
            "high" => Ok(PriorityLevel::High),
            "critical" => Ok(PriorityLevel::Critical),
            _ => Err(anyhow!("Invalid priority level: {}", s)),
        }
    }
}
