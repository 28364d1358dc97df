use anyhow::{Error, Result};
use futures_util::StreamExt;
use tracing::{error, info, warn};

use crate::{
    clients::broker::{Broker, INBOUND_QUEUE, Publisher},
    models::{message::QueueMessage, request::NotificationType},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Republish the payload verbatim to this channel queue.
    Forward { queue: &'static str },
    /// Remove the message from the inbound queue without forwarding.
    Drop { reason: String },
}

/// Maps an inbound payload to its channel queue. Purely type-to-queue;
/// no content or priority branching. Payloads that do not parse as a
/// queue message (including unknown type strings) are dropped.
pub fn route_payload(payload: &[u8]) -> RoutingDecision {
    match serde_json::from_slice::<QueueMessage>(payload) {
        Ok(message) => RoutingDecision::Forward {
            queue: message.request.notification_type.queue_name(),
        },
        Err(e) => RoutingDecision::Drop {
            reason: format!("Malformed queue payload: {}", e),
        },
    }
}

/// Declares the full topology: the inbound queue plus every channel
/// queue, so routing never targets a queue that does not exist.
pub async fn declare_topology(broker: &Broker) -> Result<(), Error> {
    broker.declare_queue(INBOUND_QUEUE).await?;

    for notification_type in NotificationType::ALL {
        broker.declare_queue(notification_type.queue_name()).await?;
    }

    Ok(())
}

pub async fn run(broker: &Broker) -> Result<(), Error> {
    declare_topology(broker).await?;

    let mut consumer = broker.consume(INBOUND_QUEUE, "router").await?;

    info!("Router is listening for notifications");

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(error = %e, "Consumer stream error");
                continue;
            }
        };

        match route_payload(&delivery.data) {
            RoutingDecision::Forward { queue } => {
                // Ack only after the republish has gone through; a failed
                // publish leaves the message for broker redelivery.
                match broker.publish(queue, &delivery.data).await {
                    Ok(()) => {
                        info!(queue, "Notification routed");
                        if let Err(e) = broker.ack(delivery.delivery_tag).await {
                            error!(error = %e, "Failed to acknowledge routed message");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, queue, "Republish failed, leaving message for redelivery");
                        if let Err(e) = broker.reject(delivery.delivery_tag, true).await {
                            error!(error = %e, "Failed to requeue inbound message");
                        }
                    }
                }
            }
            RoutingDecision::Drop { reason } => {
                warn!(%reason, "Dropping unroutable message");
                if let Err(e) = broker.reject(delivery.delivery_tag, false).await {
                    error!(error = %e, "Failed to drop unroutable message");
                }
            }
        }
    }

    Ok(())
}
