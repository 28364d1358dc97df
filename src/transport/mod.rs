use async_trait::async_trait;

use crate::models::request::NotificationRequest;

pub mod email;
pub mod push;
pub mod sms;

/// One-shot handoff to an external provider. Returns true on confirmed
/// handoff; provider errors never cross this boundary.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> bool;
}
