use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Queued,
    Processing,
    Sent,
    Failed,
    Delivered,
    Expired,
}

impl NotificationStatus {
    /// Legal edges of the delivery state machine. A status may always
    /// re-assert itself (a queued record being requeued stays queued).
    pub fn can_transition_to(self, next: NotificationStatus) -> bool {
        use NotificationStatus::*;

        if self == next {
            return true;
        }

        matches!(
            (self, next),
            (Queued, Processing)
                | (Queued, Sent)
                | (Queued, Failed)
                | (Queued, Expired)
                | (Processing, Sent)
                | (Processing, Failed)
                | (Processing, Expired)
                | (Failed, Queued)
                | (Sent, Delivered)
        )
    }
}

impl Display for NotificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NotificationStatus::Queued => write!(f, "queued"),
            NotificationStatus::Processing => write!(f, "processing"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Failed => write!(f, "failed"),
            NotificationStatus::Delivered => write!(f, "delivered"),
            NotificationStatus::Expired => write!(f, "expired"),
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queued" => Ok(NotificationStatus::Queued),
            "processing" => Ok(NotificationStatus::Processing),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            "delivered" => Ok(NotificationStatus::Delivered),
            "expired" => Ok(NotificationStatus::Expired),
            _ => Err(anyhow!("Invalid notification status: {}", s)),
        }
    }
}
