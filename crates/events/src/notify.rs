//! Completion notifications.
//!
//! The orchestrator hands a user id and the user's preferred notification
//! time to a [`NotificationSink`] once a record completes. Delivery is
//! fire-and-forget: failures are returned for logging, never retried or
//! queued. The preferred time is passed through; no sink schedules on it.

use async_trait::async_trait;
use genstudio_db::repositories::UserRepo;
use genstudio_db::DbPool;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The user is not registered, so there is no address to deliver to.
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("User lookup failed: {0}")]
    Database(#[from] sqlx::Error),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Destination for "your content is ready" notices.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        user_id: &str,
        notification_time: Option<&str>,
    ) -> Result<(), NotifyError>;
}

/// Writes the notice to the log. Default sink when SMTP is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(
        &self,
        user_id: &str,
        notification_time: Option<&str>,
    ) -> Result<(), NotifyError> {
        tracing::info!(user_id, notification_time, "Notification sent to user {user_id}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@genstudio.local";

/// Configuration for the SMTP email sink.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and the log sink should be used.
    ///
    /// | Variable         | Required | Default                     |
    /// |------------------|----------|-----------------------------|
    /// | `SMTP_HOST`      | yes      | unset                       |
    /// | `SMTP_PORT`      | no       | `587`                       |
    /// | `SMTP_FROM`      | no       | `noreply@genstudio.local`   |
    /// | `SMTP_USER`      | no       | unset                       |
    /// | `SMTP_PASSWORD`  | no       | unset                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailNotifier
// ---------------------------------------------------------------------------

/// Emails the registered address of the user via SMTP.
pub struct EmailNotifier {
    pool: DbPool,
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(pool: DbPool, config: EmailConfig) -> Self {
        Self { pool, config }
    }
}

/// Plain-text body of the completion mail.
fn completion_body(user_id: &str, notification_time: Option<&str>) -> String {
    let mut body = format!(
        "Hello {user_id},\n\nYour generated content is ready. \
         Fetch it from /content/{user_id}.\n"
    );
    if let Some(time) = notification_time {
        body.push_str(&format!("\nPreferred notification time on file: {time}\n"));
    }
    body
}

#[async_trait]
impl NotificationSink for EmailNotifier {
    async fn notify(
        &self,
        user_id: &str,
        notification_time: Option<&str>,
    ) -> Result<(), NotifyError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| NotifyError::UnknownUser(user_id.to_string()))?;

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(user.email.parse()?)
            .subject("Your generated content is ready")
            .header(ContentType::TEXT_PLAIN)
            .body(completion_body(user_id, notification_time))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(user_id, to = %user.email, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
