//! HTTP submission client for the Formpix contact form.
//!
//! Sends an enquiry with its accepted attachments as `multipart/form-data` to
//! the site's send endpoint, or the bare form fields url-encoded to a
//! spreadsheet webhook. The CLI uses this client directly.

pub mod api;
pub mod form;

use anyhow::{Context, Result};
use formpix_core::IntakeError;
use reqwest::Client;
use std::time::Duration;

pub use api::SubmissionOutcome;
pub use form::{ContactForm, Service};

pub const DEFAULT_SEND_URL: &str = "http://localhost:3000/api/send";
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the form's submission endpoints.
#[derive(Clone, Debug)]
pub struct SubmissionClient {
    client: Client,
    send_url: String,
    webhook_url: Option<String>,
}

impl SubmissionClient {
    pub fn new(
        send_url: impl Into<String>,
        webhook_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            send_url: send_url.into().trim_end_matches('/').to_string(),
            webhook_url: webhook_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        })
    }

    /// Create client from environment: FORMPIX_SEND_URL, FORMPIX_WEBHOOK_URL
    /// (optional), FORMPIX_SUBMIT_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let send_url =
            std::env::var("FORMPIX_SEND_URL").unwrap_or_else(|_| DEFAULT_SEND_URL.to_string());
        let webhook_url = std::env::var("FORMPIX_WEBHOOK_URL").ok();
        let timeout_secs = std::env::var("FORMPIX_SUBMIT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SUBMIT_TIMEOUT_SECS);

        Self::new(send_url, webhook_url, Duration::from_secs(timeout_secs))
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Timeouts are reported separately; everything else is a generic failure.
pub(crate) fn transport_error(e: reqwest::Error) -> IntakeError {
    if e.is_timeout() {
        IntakeError::SubmissionTimeout
    } else {
        IntakeError::Submission(e.to_string())
    }
}
