use std::future::Future;

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::lead::ContactMessage;

/// Outgoing email delivery.
///
/// This trait abstracts over the SMTP relay so the issuance and contact
/// services can be exercised against a recording double.
pub trait Mailer: Send + Sync {
    /// Sends the trial email containing the redemption link for `token`.
    fn send_trial_link(
        &self,
        to: &str,
        token: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Relays a contact-form submission to the configured recipient.
    fn send_contact_relay(
        &self,
        msg: &ContactMessage,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// SMTP-backed `Mailer` using lettre's async Tokio transport.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    contact_recipient: Mailbox,
    link_base_url: String,
    validity_hours: i64,
}

fn parse_mailbox(addr: &str) -> Result<Mailbox> {
    addr.parse::<Mailbox>()
        .map_err(|e| AppError::Mail(format!("Invalid mailbox '{}': {}", addr, e)))
}

impl SmtpMailer {
    /// Creates a new `SmtpMailer` from the application configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from: parse_mailbox(&config.mail_from)?,
            contact_recipient: parse_mailbox(&config.contact_recipient)?,
            link_base_url: config.link_base_url.clone(),
            validity_hours: config.link_validity_hours,
        })
    }

    /// Checks that the SMTP relay accepts a connection. Used by diagnostics.
    pub async fn test_connection(&self) -> Result<bool> {
        Ok(self.transport.test_connection().await?)
    }

    /// Builds the redemption URL for a token.
    pub fn download_link(&self, token: &str) -> String {
        format!("{}?token={}", self.link_base_url, token)
    }

    fn trial_body_plain(&self, link: &str) -> String {
        format!(
            "Thanks for requesting a free trial!\n\n\
             Download it here: {}\n\n\
             The link is valid for {} hours. If it expires, just request a new one.",
            link, self.validity_hours
        )
    }

    fn trial_body_html(&self, link: &str) -> String {
        format!(
            r#"<html>
  <body style="font-family: sans-serif; color: #222;">
    <h2>Your free trial is ready</h2>
    <p>Thanks for requesting a free trial! Click below to download it.</p>
    <p>
      <a href="{link}"
         style="background: #2b6cb0; color: #fff; padding: 12px 24px; border-radius: 4px; text-decoration: none;">
        Download now
      </a>
    </p>
    <p>Or copy this link into your browser: <a href="{link}">{link}</a></p>
    <p style="color: #666; font-size: 13px;">
      The link is valid for {hours} hours. If it expires, just request a new one.
    </p>
  </body>
</html>"#,
            link = link,
            hours = self.validity_hours
        )
    }
}

impl Mailer for SmtpMailer {
    async fn send_trial_link(&self, to: &str, token: &str) -> Result<()> {
        let link = self.download_link(token);

        let email = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject("Your free trial download link")
            .multipart(MultiPart::alternative_plain_html(
                self.trial_body_plain(&link),
                self.trial_body_html(&link),
            ))
            .map_err(|e| AppError::Mail(format!("Failed to build trial email: {}", e)))?;

        self.transport.send(email).await?;
        tracing::info!("✅ Trial email sent to {}", to);
        Ok(())
    }

    async fn send_contact_relay(&self, msg: &ContactMessage) -> Result<()> {
        let sender = if msg.name.is_empty() { "(no name)" } else { msg.name.as_str() };

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.contact_recipient.clone())
            .subject(format!("New contact form message from {}", sender));

        // Replies should reach the person who filled in the form.
        if let Ok(reply_to) = msg.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        let email = builder
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Name: {}\nEmail: {}\n\n{}",
                sender, msg.email, msg.message
            ))
            .map_err(|e| AppError::Mail(format!("Failed to build contact email: {}", e)))?;

        self.transport.send(email).await?;
        tracing::info!("✅ Contact form relayed for {}", msg.email);
        Ok(())
    }
}
