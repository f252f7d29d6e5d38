pub mod templates;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::models::LeadRecord;

/// Sends the operator a copy of every accepted lead.
pub struct LeadMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    notify: String,
}

impl LeadMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            notify: config.notify.clone(),
        })
    }

    pub async fn send_lead_notification(
        &self,
        record: &LeadRecord,
        source: &str,
    ) -> Result<(), String> {
        let subject = templates::render_lead_subject(record, source);
        let body = templates::render_lead_notification(record, source);

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(self
                .notify
                .parse()
                .map_err(|e| format!("Invalid notify address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}
