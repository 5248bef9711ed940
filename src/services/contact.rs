use crate::error::Result;
use crate::mail::Mailer;
use crate::models::lead::ContactMessage;

/// Relays a contact-form submission to the configured recipient.
///
/// Nothing is persisted; the email is the only side effect.
pub async fn relay(mailer: &impl Mailer, msg: ContactMessage) -> Result<()> {
    mailer.send_contact_relay(&msg).await?;
    tracing::info!("✅ Contact message relayed for {}", msg.email);
    Ok(())
}
