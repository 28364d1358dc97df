use anyhow::{Error, Result};
use notification_pipeline::{clients::broker::Broker, config::Config, router, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init("router");

    let config = Config::load()?;

    let broker = Broker::connect(&config).await?;

    let result = tokio::select! {
        result = router::run(&broker) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    broker.close().await?;

    result
}
