//! Outbound email.
//!
//! Delivery goes through Resend when `RESEND_API_KEY` and `RESEND_FROM` are
//! configured. Otherwise messages are written to the log, which is what local
//! development uses. Tests can capture messages in an in-memory outbox.

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use crate::config::ResendConfig;
use crate::pages::email::{PASSWORD_RESET_SUBJECT, render_password_reset_email};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// A message captured by [`EmailSender::Outbox`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub enum EmailSender {
    Resend { client: Resend, from: String },
    Log,
    #[cfg(test)]
    Outbox(std::sync::Arc<std::sync::Mutex<Vec<SentEmail>>>),
}

impl EmailSender {
    #[must_use]
    pub fn from_config(config: Option<&ResendConfig>) -> Self {
        match config {
            Some(cfg) => Self::Resend { client: Resend::new(&cfg.api_key), from: cfg.from.clone() },
            None => Self::Log,
        }
    }

    /// Send the password reset email containing `link`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Delivery`] if Resend rejects the message.
    pub async fn send_password_reset(&self, to_email: &str, link: &str) -> Result<(), EmailError> {
        let html = render_password_reset_email(to_email, link);
        self.send(to_email, PASSWORD_RESET_SUBJECT, &html).await
    }

    async fn send(&self, to_email: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        match self {
            Self::Resend { client, from } => {
                let email = CreateEmailBaseOptions::new(from.as_str(), [to_email], subject).with_html(html);
                client
                    .emails
                    .send(email)
                    .await
                    .map_err(|e| EmailError::Delivery(e.to_string()))?;
                tracing::info!(to = to_email, subject, "email sent");
            }
            Self::Log => {
                tracing::info!(to = to_email, subject, body_len = html.len(), "email delivery not configured; logging instead");
                tracing::debug!(to = to_email, %html, "email body");
            }
            #[cfg(test)]
            Self::Outbox(outbox) => {
                outbox
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push(SentEmail { to: to_email.to_owned(), subject: subject.to_owned(), html: html.to_owned() });
            }
        }
        Ok(())
    }
}
