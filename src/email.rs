//! Outgoing mail.
//!
//! Services talk to a [`Mailer`] trait object. [`SmtpMailer`] delivers through an SMTP relay
//! with `lettre`; [`LogMailer`] only logs, which is what runs when no relay is configured.

use futures::future::BoxFuture;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{info, warn};
use std::sync::Arc;

use crate::config::SmtpConfig;
use crate::error::AppError;

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";
pub const PASSWORD_RESET_SUBJECT: &str = "Reset your password";

/// Port on which the relay expects implicit TLS instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// A plain-text message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    pub fn verification(to: &str, code: &str, valid_minutes: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: VERIFICATION_SUBJECT.to_string(),
            body: format!(
                "Here's your verification code:\n{}\n\nThe code expires in {} minutes. \
                 Don't share it with anyone else.",
                code, valid_minutes
            ),
        }
    }

    pub fn password_reset(to: &str, code: &str, valid_minutes: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: PASSWORD_RESET_SUBJECT.to_string(),
            body: format!(
                "Use this code to reset your password:\n{}\n\nThe code expires in {} minutes. \
                 If you did not ask for a reset, you can ignore this email.",
                code, valid_minutes
            ),
        }
    }
}

pub trait Mailer: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), AppError>>;
}

/// Delivers mail through an SMTP relay using PLAIN credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| AppError::Configuration(format!("Failed to configure SMTP relay: {}", e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let sender = config.sender.parse::<Mailbox>().map_err(|e| {
            AppError::Configuration(format!("CS_EMAIL_ADDRESS is not a valid address: {}", e))
        })?;

        Ok(Self { transport, sender })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, AppError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;
        Ok(message)
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(async move {
            let message = self.build_message(&email)?;
            self.transport.send(message).await?;
            info!("Sent \"{}\" email to {}", email.subject, email.to);
            Ok(())
        })
    }
}

/// Writes mail to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(async move {
            info!(
                "SMTP is not configured; email to {} ({}):\n{}",
                email.to, email.subject, email.body
            );
            Ok(())
        })
    }
}

/// Picks the SMTP relay when `SMTP_HOST` is set, the log mailer otherwise.
pub fn mailer_from_config(config: &SmtpConfig) -> Result<Arc<dyn Mailer>, AppError> {
    if config.host.is_empty() {
        warn!("SMTP_HOST is empty, emails will only be logged");
        return Ok(Arc::new(LogMailer));
    }
    Ok(Arc::new(SmtpMailer::new(config)?))
}
