use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use notification_pipeline::{
    clients::broker::Publisher,
    models::request::{NotificationRequest, NotificationType, PriorityLevel},
    transport::ChannelTransport,
};
use tokio::sync::Mutex;

/// Records every publish instead of talking to a broker.
#[derive(Default)]
pub struct RecordingPublisher {
    pub messages: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), Error> {
        self.messages
            .lock()
            .await
            .push((queue.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// Publisher that always fails, for exercising the dual-write gap.
pub struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _queue: &str, _payload: &[u8]) -> Result<(), Error> {
        Err(anyhow!("Broker unavailable"))
    }
}

/// Transport scripted with per-attempt outcomes; once the script runs
/// out, every further attempt returns the fallback.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<bool>>,
    fallback: bool,
    pub calls: AtomicU32,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<bool>, fallback: bool) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback,
            calls: AtomicU32::new(0),
        }
    }

    pub fn always(outcome: bool) -> Self {
        Self::new(Vec::new(), outcome)
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelTransport for ScriptedTransport {
    async fn send(&self, _request: &NotificationRequest) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

pub fn make_request(notification_type: NotificationType) -> NotificationRequest {
    NotificationRequest {
        id: uuid::Uuid::new_v4().to_string(),
        recipient: "a@b.com".to_string(),
        subject: "Test subject".to_string(),
        message: "hi".to_string(),
        notification_type,
        priority: PriorityLevel::Normal,
        metadata: None,
        attachments: None,
    }
}
