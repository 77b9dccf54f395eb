//! Outbound zone notifications.
//!
//! The lifecycle service fires a notification through the [`NotificationSink`]
//! seam right after a report is persisted. The SMTP implementation is the only
//! production sink; tests substitute recording doubles. Delivery is best
//! effort: the caller logs and absorbs every error raised here.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::MailConfig;

/// Message dispatched to the mailbox of the zone a new report landed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

pub trait NotificationSink: Send + Sync {
    fn send(&self, notification: ZoneNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("failed to build mail message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("mail transport failure: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Synchronous SMTP sink.
///
/// With delivery disabled (local development, CI) the message is logged
/// instead of sent, so the notification path stays exercised end to end.
pub struct SmtpNotificationSink {
    config: MailConfig,
}

impl SmtpNotificationSink {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, NotificationError> {
        let credentials = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );
        Ok(SmtpTransport::relay(&self.config.smtp_host)?
            .credentials(credentials)
            .port(self.config.smtp_port)
            .build())
    }
}

impl NotificationSink for SmtpNotificationSink {
    fn send(&self, notification: ZoneNotification) -> Result<(), NotificationError> {
        if !self.config.delivery_enabled {
            info!(
                recipient = %notification.recipient,
                subject = %notification.subject,
                "mail delivery disabled, logging zone notification instead"
            );
            return Ok(());
        }

        let from: Mailbox = self
            .config
            .from_address
            .parse()
            .map_err(|_| NotificationError::Address(self.config.from_address.clone()))?;
        let to: Mailbox = notification
            .recipient
            .parse()
            .map_err(|_| NotificationError::Address(notification.recipient.clone()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&notification.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body)?;

        self.transport()?.send(&message)?;
        Ok(())
    }
}
