use std::sync::Arc;

use anyhow::{Error, Result};
use futures_util::StreamExt;
use tracing::{error, info, warn};

use crate::{
    clients::{broker::Broker, store::RecordStore},
    models::{message::QueueMessage, request::NotificationType},
    transport::ChannelTransport,
};

/// Bounded retry budget per notification. Redelivery timing belongs to
/// the broker; the pipeline adds no backoff of its own.
pub const MAX_ATTEMPTS: i32 = 3;

/// What to do with the queue message once the record update is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Remove the message from the queue permanently.
    Ack,
    /// Reject and requeue so the broker redelivers it.
    Requeue,
    /// Reject without requeue.
    Drop,
}

/// Shared per-channel delivery engine: consumes the channel queue, hands
/// the payload to the channel transport, and walks the record through the
/// retry state machine.
pub struct DeliveryWorker {
    channel: NotificationType,
    store: Arc<dyn RecordStore>,
    transport: Arc<dyn ChannelTransport>,
}

impl DeliveryWorker {
    pub fn new(
        channel: NotificationType,
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn ChannelTransport>,
    ) -> Self {
        Self {
            channel,
            store,
            transport,
        }
    }

    /// Drives one queue delivery through the state machine. The record
    /// update is persisted before the returned disposition is applied to
    /// the broker, so a crash in between causes a redelivery against an
    /// already-updated record rather than a lost update.
    pub async fn handle_delivery(&self, payload: &[u8]) -> Disposition {
        let message: QueueMessage = match serde_json::from_slice(payload) {
            Ok(message) => message,
            Err(e) => {
                error!(channel = %self.channel, error = %e, "Invalid message received");
                return Disposition::Drop;
            }
        };

        let mut record = match self.store.get(&message.notification_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                // Gateway/worker desync; fatal to the message, not the process.
                error!(
                    id = %message.notification_id,
                    "Notification record not found"
                );
                return Disposition::Drop;
            }
            Err(e) => {
                error!(
                    id = %message.notification_id,
                    error = %e,
                    "Record store read failed"
                );
                return Disposition::Requeue;
            }
        };

        record.begin_attempt();

        info!(
            id = %record.id,
            channel = %self.channel,
            attempt = record.attempts,
            max_attempts = MAX_ATTEMPTS,
            "Processing notification"
        );

        let outcome = if self.transport.send(&message.request).await {
            record.mark_sent().map(|_| {
                info!(id = %record.id, channel = %self.channel, "Notification sent");
                Disposition::Ack
            })
        } else if record.attempts >= MAX_ATTEMPTS {
            record
                .mark_failed(format!("Failed to send {} notification", self.channel))
                .map(|_| {
                    error!(
                        id = %record.id,
                        channel = %self.channel,
                        "Maximum attempts reached, giving up"
                    );
                    Disposition::Drop
                })
        } else {
            record
                .mark_retrying(format!("Failed to send {} notification", self.channel))
                .map(|_| {
                    warn!(
                        id = %record.id,
                        channel = %self.channel,
                        attempt = record.attempts,
                        "Delivery failed, requeueing"
                    );
                    Disposition::Requeue
                })
        };

        let disposition = match outcome {
            Ok(disposition) => disposition,
            Err(e) => {
                error!(id = %record.id, error = %e, "Status transition rejected");

                // The status stays as it was, but this delivery still
                // happened; keep the attempt counters honest.
                if let Err(e) = self.store.update(&record).await {
                    error!(id = %record.id, error = %e, "Failed to persist attempt counters");
                }

                return Disposition::Drop;
            }
        };

        if let Err(e) = self.store.update(&record).await {
            // The durable record was not touched; let redelivery retry
            // the whole attempt.
            error!(id = %record.id, error = %e, "Failed to persist record update");
            return Disposition::Requeue;
        }

        disposition
    }

    pub async fn run(&self, broker: &Broker) -> Result<(), Error> {
        let queue = self.channel.queue_name();
        broker.declare_queue(queue).await?;

        let consumer_tag = format!("{}_worker", self.channel);
        let mut consumer = broker.consume(queue, &consumer_tag).await?;

        info!(queue, channel = %self.channel, "Delivery worker is listening");

        while let Some(delivery) = consumer.next().await {
            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(e) => {
                    error!(error = %e, "Consumer stream error");
                    continue;
                }
            };

            let result = match self.handle_delivery(&delivery.data).await {
                Disposition::Ack => broker.ack(delivery.delivery_tag).await,
                Disposition::Requeue => broker.reject(delivery.delivery_tag, true).await,
                Disposition::Drop => broker.reject(delivery.delivery_tag, false).await,
            };

            if let Err(e) = result {
                error!(error = %e, "Broker acknowledgement failed");
            }
        }

        Ok(())
    }
}
