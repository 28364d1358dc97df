use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::{config::Config, models::request::NotificationRequest, transport::ChannelTransport};

pub struct SmsTransport {
    http_client: Client,
    provider_url: String,
    api_key: String,
}

impl SmsTransport {
    pub fn new(provider_url: String, api_key: String) -> Self {
        Self {
            http_client: Client::new(),
            provider_url,
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sms_provider_url.clone(), config.sms_api_key.clone())
    }
}

#[async_trait]
impl ChannelTransport for SmsTransport {
    async fn send(&self, request: &NotificationRequest) -> bool {
        let payload = serde_json::json!({
            "to": request.recipient,
            "message": request.message,
        });

        let response = self
            .http_client
            .post(&self.provider_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(
                    id = %request.id,
                    recipient = %request.recipient,
                    "SMS handed off to provider"
                );
                true
            }
            Ok(response) => {
                error!(
                    id = %request.id,
                    status = %response.status(),
                    "SMS provider rejected the message"
                );
                false
            }
            Err(e) => {
                error!(id = %request.id, error = %e, "SMS provider request failed");
                false
            }
        }
    }
}
