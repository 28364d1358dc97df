use std::sync::Arc;

use anyhow::{Error, Result};
use notification_pipeline::{
    clients::{broker::Broker, postgres::PgRecordStore},
    config::Config,
    models::request::NotificationType,
    telemetry,
    transport::push::PushTransport,
    worker::DeliveryWorker,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init("push_worker");

    let config = Config::load()?;

    let broker = Broker::connect(&config).await?;
    let store = Arc::new(PgRecordStore::connect(&config.database_url).await?);
    let transport = Arc::new(PushTransport::from_config(&config));

    let worker = DeliveryWorker::new(NotificationType::Push, store, transport);

    let result = tokio::select! {
        result = worker.run(&broker) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    broker.close().await?;

    result
}
