/// Outgoing email
///
/// Account flows need two messages: the confirmation link after
/// registration and the password-reset link. Both are sent through a
/// [`Mailer`], so handlers never know which provider is behind it, and
/// both are dispatched from a background task so a slow or failing
/// provider cannot stall the HTTP response.
///
/// [`HttpMailer`] posts to a JSON mail API; [`NoopMailer`] stands in
/// when no provider is configured and simply logs that delivery was
/// skipped.
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    /// The HTTP request to the provider failed
    #[error("Mail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Mail provider rejected the message: HTTP {0}")]
    Rejected(u16),
}

/// Sends account emails
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the post-registration confirmation link
    async fn send_registration_email(&self, name: &str, email: &str, token: &str)
        -> Result<(), MailError>;

    /// Sends the password-reset link
    async fn send_password_reset_email(
        &self,
        name: &str,
        email: &str,
        token: &str,
    ) -> Result<(), MailError>;
}

/// A message as the mail provider's API expects it
#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: String,
    subject: &'a str,
    text: String,
    html: String,
}

/// Mailer backed by an HTTP mail provider
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_token: String,
    from_address: String,
    frontend_url: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig, frontend_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            from_address: config.from_address.clone(),
            frontend_url,
        }
    }

    fn confirmation_link(&self, token: &str) -> String {
        format!("{}/confirm/{}", self.frontend_url, token)
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}/forgot-password/{}", self.frontend_url, token)
    }

    async fn deliver(&self, message: OutgoingMessage<'_>) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_registration_email(
        &self,
        name: &str,
        email: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.confirmation_link(token);

        self.deliver(OutgoingMessage {
            from: &self.from_address,
            to: format!("{} <{}>", name, email),
            subject: "Confirm your Workroom account",
            text: format!(
                "Hi {},\n\nYour Workroom account is almost ready. \
                 Confirm it here: {}\n\nIf you did not create this account, \
                 you can ignore this message.",
                name, link
            ),
            html: format!(
                "<p>Hi {},</p><p>Your Workroom account is almost ready. \
                 <a href=\"{}\">Confirm your account</a> to start using it.</p>\
                 <p>If you did not create this account, you can ignore this \
                 message.</p>",
                name, link
            ),
        })
        .await
    }

    async fn send_password_reset_email(
        &self,
        name: &str,
        email: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.reset_link(token);

        self.deliver(OutgoingMessage {
            from: &self.from_address,
            to: format!("{} <{}>", name, email),
            subject: "Reset your Workroom password",
            text: format!(
                "Hi {},\n\nYou asked to reset your password. \
                 Set a new one here: {}\n\nIf this was not you, \
                 you can ignore this message.",
                name, link
            ),
            html: format!(
                "<p>Hi {},</p><p>You asked to reset your password. \
                 <a href=\"{}\">Set a new password</a> to get back in.</p>\
                 <p>If this was not you, you can ignore this message.</p>",
                name, link
            ),
        })
        .await
    }
}

/// Mailer that drops everything, used when no provider is configured
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_registration_email(
        &self,
        _name: &str,
        email: &str,
        _token: &str,
    ) -> Result<(), MailError> {
        tracing::info!(to = %email, "Mail delivery disabled; skipping confirmation email");
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        _name: &str,
        email: &str,
        _token: &str,
    ) -> Result<(), MailError> {
        tracing::info!(to = %email, "Mail delivery disabled; skipping password reset email");
        Ok(())
    }
}
