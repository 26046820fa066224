use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::submission::fields::ContactFields;

/// A composed contact notification, ready for dispatch.
#[derive(Debug, Clone)]
pub struct ContactMail {
    pub to: Mailbox,
    pub reply_to: Mailbox,
    pub subject: String,
    pub body: String,
}

/// Compose the plain-text notification for a validated submission.
/// The submitter goes into Reply-To, never From; the envelope sender
/// stays the transport's own address so relays don't flag the mail as
/// spoofed.
pub fn compose(
    site_name: &str,
    recipient: &str,
    contact: &ContactFields,
) -> Result<ContactMail, String> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|e| format!("Invalid recipient address: {e}"))?;
    let reply_to: Mailbox = contact
        .email
        .parse()
        .map_err(|e| format!("Invalid reply-to address: {e}"))?;

    let subject = format!(
        "[{}] Contact: {}",
        site_name,
        if contact.subject.is_empty() {
            "(No subject)"
        } else {
            &contact.subject
        }
    );

    let body = format!(
        "Name: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}",
        contact.name, contact.email, contact.subject, contact.message
    );

    Ok(ContactMail {
        to,
        reply_to,
        subject,
        body,
    })
}

/// Outbound mail seam. The service runs against the SMTP
/// implementation; tests substitute their own.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: ContactMail) -> Result<(), String>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| format!("Invalid from address: {e}"))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: ContactMail) -> Result<(), String> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to)
            .reply_to(mail.reply_to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}
