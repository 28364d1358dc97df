use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{error, info};

use crate::{config::Config, models::request::NotificationRequest, transport::ChannelTransport};

pub struct EmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailTransport {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
            config.smtp_host.as_str(),
        )
        .port(config.smtp_port);

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        let from = config
            .email_from
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid sender address {}: {}", config.email_from, e))?;

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn build_message(&self, request: &NotificationRequest) -> Result<Message, Error> {
        let to = request
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid recipient address: {}", e))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(request.subject.clone());

        let message = match &request.attachments {
            Some(attachments) if !attachments.is_empty() => {
                let mut multipart =
                    MultiPart::mixed().singlepart(SinglePart::plain(request.message.clone()));

                for attachment in attachments {
                    let data = BASE64
                        .decode(&attachment.data)
                        .map_err(|e| anyhow!("Invalid base64 attachment data: {}", e))?;
                    let content_type = ContentType::parse(&attachment.content_type)
                        .map_err(|e| anyhow!("Invalid attachment content type: {}", e))?;

                    multipart = multipart.singlepart(
                        Attachment::new(attachment.file_name.clone()).body(data, content_type),
                    );
                }

                builder.multipart(multipart)?
            }
            _ => builder.body(request.message.clone())?,
        };

        Ok(message)
    }
}

#[async_trait]
impl ChannelTransport for EmailTransport {
    async fn send(&self, request: &NotificationRequest) -> bool {
        let message = match self.build_message(request) {
            Ok(message) => message,
            Err(e) => {
                error!(id = %request.id, error = %e, "Could not build email message");
                return false;
            }
        };

        match self.mailer.send(message).await {
            Ok(_) => {
                info!(
                    id = %request.id,
                    recipient = %request.recipient,
                    "Email handed off to SMTP server"
                );
                true
            }
            Err(e) => {
                error!(
                    id = %request.id,
                    recipient = %request.recipient,
                    error = %e,
                    "Email send failed"
                );
                false
            }
        }
    }
}
