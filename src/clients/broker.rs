use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
        BasicRejectOptions, QueueDeclareOptions,
    },
    types::FieldTable,
};
use tokio::time::{Duration, sleep};
use tracing::{info, warn};

use crate::config::Config;

/// Queue fed by the gateway and drained by the router.
pub const INBOUND_QUEUE: &str = "notifications";

/// One unacknowledged message per consumer. A slow or crashing consumer
/// must not hold messages invisible to its peers.
const PREFETCH_COUNT: u16 = 1;

/// Anything that can place a payload on a named queue. The gateway and
/// router depend on this seam rather than on the broker directly.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), Error>;
}

/// Process-scoped RabbitMQ connection and channel, opened at startup and
/// handed by reference to whichever component drives it.
pub struct Broker {
    connection: Connection,
    channel: Channel,
}

impl Broker {
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let connection = Self::connect_with_retry(config).await?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| anyhow!("RabbitMQ channel creation failed: {}", e))?;

        channel
            .basic_qos(PREFETCH_COUNT, BasicQosOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to set up QoS: {}", e))?;

        Ok(Self { connection, channel })
    }

    async fn connect_with_retry(config: &Config) -> Result<Connection, Error> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            info!(
                attempt,
                max_attempts = config.broker_connect_attempts,
                "Connecting to RabbitMQ"
            );

            match Connection::connect(&config.rabbitmq_url, ConnectionProperties::default()).await
            {
                Ok(connection) => {
                    info!("RabbitMQ connection established");
                    return Ok(connection);
                }
                Err(e) if attempt < config.broker_connect_attempts => {
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = config.broker_connect_delay_ms,
                        "RabbitMQ connection failed, retrying"
                    );
                    sleep(Duration::from_millis(config.broker_connect_delay_ms)).await;
                }
                Err(e) => {
                    return Err(anyhow!(
                        "Failed to connect to RabbitMQ after {} attempts: {}",
                        attempt,
                        e
                    ));
                }
            }
        }
    }

    /// Durable, non-exclusive, non-auto-deleting. Safe to call again with
    /// the same name.
    pub async fn declare_queue(&self, queue: &str) -> Result<(), Error> {
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue {}: {}", queue, e))?;

        info!(queue, "Queue declared");

        Ok(())
    }

    pub async fn consume(&self, queue: &str, consumer_tag: &str) -> Result<Consumer, Error> {
        let consumer = self
            .channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to create consumer for {}: {}", queue, e))?;

        info!(queue, consumer_tag, "Consumer created");

        Ok(consumer)
    }

    pub async fn ack(&self, delivery_tag: u64) -> Result<(), Error> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to acknowledge message: {}", e))?;

        Ok(())
    }

    pub async fn reject(&self, delivery_tag: u64, requeue: bool) -> Result<(), Error> {
        self.channel
            .basic_reject(delivery_tag, BasicRejectOptions { requeue })
            .await
            .map_err(|e| anyhow!("Failed to reject message: {}", e))?;

        Ok(())
    }

    pub async fn close(self) -> Result<(), Error> {
        self.connection
            .close(200, "shutting down")
            .await
            .map_err(|e| anyhow!("Failed to close RabbitMQ connection: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl Publisher for Broker {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), Error> {
        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| anyhow!("Failed to publish message to {}: {}", queue, e))?;

        Ok(())
    }
}
