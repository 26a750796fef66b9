//! Submission methods for the Formpix client.

use crate::{transport_error, ContactForm, SubmissionClient};
use formpix_core::{CompressedFile, FileId, IntakeError};
use formpix_processing::IntakeSession;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// What happened to a submission that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The endpoint accepted the enquiry.
    Sent,
    /// Honeypot was filled in; nothing was sent.
    Suppressed,
}

/// Spreadsheet webhook reply, e.g. `{"result": "success"}`.
#[derive(Debug, Deserialize)]
struct WebhookResponse {
    result: String,
    #[serde(default)]
    error: Option<String>,
}

/// Error body of the send endpoint, e.g. `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct SendErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl SubmissionClient {
    /// POST the form and its files as `multipart/form-data` to the send endpoint.
    /// Every form field is a text part; each file is a `files` part.
    pub async fn send_enquiry(
        &self,
        form: &ContactForm,
        files: &[CompressedFile],
    ) -> Result<SubmissionOutcome, IntakeError> {
        if form.is_bot() {
            tracing::debug!("Honeypot filled in, enquiry suppressed");
            return Ok(SubmissionOutcome::Suppressed);
        }
        form.validate_fields()?;

        let mut payload = Form::new();
        for (key, value) in form.enquiry_fields() {
            payload = payload.text(key, value);
        }
        for file in files {
            let part = Part::stream_with_length(file.bytes.clone(), file.byte_size())
                .file_name(file.name.clone())
                .mime_str(&file.media_type)
                .map_err(|e| {
                    IntakeError::Internal(format!(
                        "Invalid media type {:?} for {}: {}",
                        file.media_type, file.name, e
                    ))
                })?;
            payload = payload.part("files", part);
        }

        let response = self
            .client()
            .post(self.send_url())
            .multipart(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SendErrorResponse>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("Send endpoint returned status {}", status));
            tracing::warn!(status = %status, error = %message, "Enquiry rejected");
            return Err(IntakeError::Rejected(message));
        }

        let total: u64 = files.iter().map(|f| f.byte_size()).sum();
        tracing::info!(files = files.len(), total_bytes = total, "Enquiry sent");
        Ok(SubmissionOutcome::Sent)
    }

    /// POST the form fields url-encoded to the spreadsheet webhook. Succeeds
    /// only when the reply is `{"result": "success"}`.
    pub async fn send_to_webhook(&self, form: &ContactForm) -> Result<SubmissionOutcome, IntakeError> {
        if form.is_bot() {
            tracing::debug!("Honeypot filled in, webhook submission suppressed");
            return Ok(SubmissionOutcome::Suppressed);
        }
        form.validate_fields()?;

        let url = self.webhook_url().ok_or_else(|| {
            IntakeError::InvalidConfig("No webhook URL configured (set FORMPIX_WEBHOOK_URL)".to_string())
        })?;

        let response = self
            .client()
            .post(url)
            .form(&form.webhook_fields())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Webhook request failed");
            return Err(IntakeError::Submission(format!(
                "Webhook returned status {}",
                status
            )));
        }

        let body = response.text().await.map_err(transport_error)?;
        let reply: WebhookResponse = serde_json::from_str(&body)?;
        if reply.result != "success" {
            let message = reply
                .error
                .unwrap_or_else(|| format!("Webhook reported result {:?}", reply.result));
            tracing::warn!(error = %message, "Webhook rejected submission");
            return Err(IntakeError::Rejected(message));
        }

        tracing::info!("Webhook submission recorded");
        Ok(SubmissionOutcome::Sent)
    }

    /// Send the session's accepted files with the form. Once the endpoint
    /// accepts the enquiry, exactly the files that were sent leave the
    /// session; anything accepted while the request was in flight stays.
    pub async fn submit_session(
        &self,
        form: &ContactForm,
        session: &IntakeSession,
    ) -> Result<SubmissionOutcome, IntakeError> {
        let files = session.accepted_files().await;
        let outcome = self.send_enquiry(form, &files).await?;

        if outcome == SubmissionOutcome::Sent {
            let sent: Vec<FileId> = files.iter().map(|f| f.id).collect();
            session.remove_files(&sent).await;
        }
        Ok(outcome)
    }
}
