use std::sync::Arc;

use anyhow::{Error, Result};
use notification_pipeline::{
    clients::{
        broker::{Broker, INBOUND_QUEUE},
        postgres::PgRecordStore,
    },
    config::Config,
    gateway::{self, AppState, Gateway},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init("gateway");

    let config = Config::load()?;

    let broker = Broker::connect(&config).await?;
    broker.declare_queue(INBOUND_QUEUE).await?;

    let store = PgRecordStore::connect(&config.database_url).await?;

    let state = Arc::new(AppState {
        gateway: Gateway::new(Arc::new(store), Arc::new(broker)),
    });

    gateway::serve(state, config.gateway_port).await
}
