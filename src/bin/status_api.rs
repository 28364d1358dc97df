use std::sync::Arc;

use anyhow::{Error, Result};
use notification_pipeline::{
    clients::postgres::PgRecordStore,
    config::Config,
    status_api::{self, AppState},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init("status_api");

    let config = Config::load()?;

    let store = Arc::new(PgRecordStore::connect(&config.database_url).await?);

    status_api::serve(Arc::new(AppState { store }), config.status_api_port).await
}
