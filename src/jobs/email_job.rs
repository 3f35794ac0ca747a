//! Email background job.
//!
//! Transactional emails (login alerts, booking updates) are queued as
//! [`EmailJob`]s and delivered by the `jobs work` process through the
//! `SMTP_HOST` relay with lettre. Without a relay configured the worker
//! logs each message instead.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::env;

use crate::config::{DEFAULT_SMTP_FROM, DEFAULT_SMTP_PORT};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub body: String,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn login_alert(to: &str, name: &str, at: DateTime<Utc>) -> Self {
        Self::new(
            to,
            "New sign-in to your StayHub account",
            format!(
                "Hi {},\n\nYour account was signed in to on {}.\n\
                 If this wasn't you, change your password right away.",
                name,
                at.format("%Y-%m-%d %H:%M UTC")
            ),
        )
    }

    pub fn booking_requested(
        to: &str,
        host_name: &str,
        listing_title: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Self {
        Self::new(
            to,
            format!("New booking request for {}", listing_title),
            format!(
                "Hi {},\n\nYou have a new booking request for \"{}\" from {} to {}.\n\
                 Review it from your hosting dashboard.",
                host_name, listing_title, check_in, check_out
            ),
        )
    }

    pub fn booking_update(to: &str, name: &str, listing_title: &str, status: &str) -> Self {
        Self::new(
            to,
            format!("Your booking for {} was {}", listing_title, status),
            format!(
                "Hi {},\n\nYour booking for \"{}\" is now {}.",
                name, listing_title, status
            ),
        )
    }
}

/// Queue for outgoing email.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn dispatch(&self, job: EmailJob) -> AppResult<()>;
}

/// Queue an email, logging instead of failing the caller's request.
pub async fn dispatch_quietly(dispatcher: &dyn EmailDispatcher, job: EmailJob) {
    let to = job.to.clone();
    if let Err(e) = dispatcher.dispatch(job).await {
        tracing::warn!(to = %to, error = %e, "Failed to queue email");
    }
}

/// Email configuration from environment.
struct EmailConfig {
    smtp_host: Option<String>,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
    smtp_from: String,
}

impl EmailConfig {
    fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: env::var("SMTP_USER").ok().filter(|u| !u.is_empty()),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_from: env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_SMTP_FROM.to_string()),
        }
    }

    /// STARTTLS relay transport, authenticated when a user is configured
    fn transport(&self, host: &str) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(smtp_error)?
            .port(self.smtp_port);

        if let Some(user) = &self.smtp_user {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                self.smtp_pass.clone().unwrap_or_default(),
            ));
        }
        Ok(builder.build())
    }
}

fn smtp_error(e: lettre::transport::smtp::Error) -> AppError {
    AppError::internal(format!("SMTP error: {}", e))
}

/// Build the plain-text message for a job.
fn build_message(from: &str, job: &EmailJob) -> AppResult<Message> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| AppError::internal(format!("Invalid sender address: {}", e)))?;
    let to: Mailbox = job
        .to
        .trim()
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid recipient address: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(job.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(job.body.clone())
        .map_err(|e| AppError::internal(format!("Failed to build email: {}", e)))
}

/// Email job handler - processes email sending jobs
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    let config = EmailConfig::from_env();
    let from = &config.smtp_from;

    if job.to.trim().is_empty() {
        return Err(AppError::validation("Email job has no recipient"));
    }
    let message = build_message(from, &job)?;

    tracing::info!(
        to = %job.to,
        from = %from,
        subject = %job.subject,
        "Processing email job"
    );

    let Some(host) = &config.smtp_host else {
        // Development mode: log the email instead of sending
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            from,
            job.to,
            job.subject,
            job.body
        );
        return Ok(());
    };

    let response = config
        .transport(host)?
        .send(message)
        .await
        .map_err(smtp_error)?;

    tracing::info!(
        relay = %host,
        to = %job.to,
        code = %response.code(),
        "Email delivered to SMTP relay"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_request_mentions_dates() {
        let job = EmailJob::booking_requested(
            "host@example.com",
            "Ana",
            "Sea View Loft",
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(),
        );
        assert_eq!(job.to, "host@example.com");
        assert!(job.subject.contains("Sea View Loft"));
        assert!(job.body.contains("2026-07-01"));
        assert!(job.body.contains("2026-07-05"));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_swallowed() {
        let mut dispatcher = MockEmailDispatcher::new();
        dispatcher
            .expect_dispatch()
            .times(1)
            .returning(|_| Err(AppError::internal("queue down")));

        dispatch_quietly(&dispatcher, EmailJob::new("a@b.c", "s", "b")).await;
    }

    #[test]
    fn test_message_carries_subject_and_body() {
        let job = EmailJob::booking_update("guest@example.com", "Ana", "Sea View Loft", "confirmed");
        let message = build_message("StayHub <noreply@stayhub.local>", &job).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: guest@example.com"));
        assert!(raw.contains("Subject: Your booking for Sea View Loft was confirmed"));
        assert!(raw.contains("is now confirmed"));
    }

    #[test]
    fn test_message_rejects_malformed_recipient() {
        let job = EmailJob::new("not an address", "s", "b");
        let result = build_message("noreply@stayhub.local", &job);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_transport_builds_with_credentials() {
        let config = EmailConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_port: 2525,
            smtp_user: Some("mailer".to_string()),
            smtp_pass: Some("secret".to_string()),
            smtp_from: DEFAULT_SMTP_FROM.to_string(),
        };
        assert!(config.transport("smtp.example.com").is_ok());
    }

    #[tokio::test]
    async fn test_handler_rejects_missing_recipient() {
        let result = email_job_handler(EmailJob::new(" ", "s", "b")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
