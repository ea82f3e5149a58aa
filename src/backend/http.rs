//! HTTP backend for the meeting-minutes server.
//!
//! Speaks the endpoints the web front end uses:
//! - `POST /api/chat` (JSON in, JSON out)
//! - `POST /process` (multipart transcript form, answers with a redirect)
//! - `GET /export/<id>` (PDF download, redirects back on failure)
//! - `POST /delete_meeting/<id>` (answers with a redirect)
//!
//! Redirects are never followed. The server signals the outcome of form posts
//! through the `Location` header, so we read it instead of chasing it.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;

use super::provider::{BackendError, ChatBackend};
use super::types::{ChatRequest, ChatResponse, UploadReceipt};
use crate::core::upload::{TranscriptSource, ValidatedTranscript};

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BackendError::Config(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submits a transcript and returns the id of the meeting created from it.
    pub async fn upload_transcript(
        &self,
        upload: &ValidatedTranscript,
    ) -> Result<UploadReceipt, BackendError> {
        let mut form = Form::new().text("meeting_title", upload.title.clone());
        form = match &upload.source {
            TranscriptSource::Text(text) => form.text("transcript_text", text.clone()),
            TranscriptSource::File { file_name, bytes } => form.part(
                "transcript_file",
                Part::bytes(bytes.clone()).file_name(file_name.clone()),
            ),
        };

        info!(
            "Uploading transcript '{}' ({})",
            upload.title,
            upload.source.describe()
        );

        let response = self
            .client
            .post(self.url("/process"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Upload response status: {}", status);

        if !status.is_redirection() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Upload failed: {} - {}", status.as_u16(), message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let location = location_header(&response)?;
        match meeting_id_from_location(&location) {
            Some(meeting_id) => {
                info!("Transcript stored as meeting {}", meeting_id);
                Ok(UploadReceipt { meeting_id })
            }
            None => {
                warn!("Upload redirected to {}, treating as rejection", location);
                Err(BackendError::Rejected(
                    "transcript too short, invalid, or could not be processed".to_string(),
                ))
            }
        }
    }

    /// Deletes a stored meeting.
    pub async fn delete_meeting(&self, meeting_id: &str) -> Result<(), BackendError> {
        info!("Deleting meeting {}", meeting_id);

        let response = self
            .client
            .post(self.url(&format!("/delete_meeting/{meeting_id}")))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Delete response status: {}", status);

        if status.is_success() {
            return Ok(());
        }
        if status.is_redirection() {
            let location = location_header(&response)?;
            if is_landing_page(&location) {
                info!("Meeting {} deleted", meeting_id);
                return Ok(());
            }
            warn!("Delete redirected to {}, treating as rejection", location);
            return Err(BackendError::Rejected(format!(
                "meeting {meeting_id} was not deleted (server redirected to {location})"
            )));
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Delete failed: {} - {}", status.as_u16(), message);
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Downloads the minutes of a meeting as PDF bytes.
    pub async fn export_pdf(&self, meeting_id: &str) -> Result<Vec<u8>, BackendError> {
        info!("Exporting meeting {} as PDF", meeting_id);

        let response = self
            .client
            .get(self.url(&format!("/export/{meeting_id}")))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Export response status: {}", status);

        if status.is_redirection() {
            let location = location_header(&response).unwrap_or_default();
            warn!("Export redirected to {}, treating as rejection", location);
            return Err(BackendError::Rejected(format!(
                "could not export meeting {meeting_id}"
            )));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Export failed: {} - {}", status.as_u16(), message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        debug!("Export body: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn ask(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        info!(
            "Chat request: meeting={:?}, question_len={}",
            request.meeting_id,
            request.question.len()
        );

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        debug!("Chat response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BackendError::Api { status, message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        debug!("Chat response body: {} bytes", body.len());

        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

fn location_header(response: &reqwest::Response) -> Result<String, BackendError> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| BackendError::Parse("redirect without Location header".to_string()))
}

/// Extracts `<id>` from a `.../results/<id>` redirect target.
fn meeting_id_from_location(location: &str) -> Option<String> {
    let (_, rest) = location.rsplit_once("/results/")?;
    let id: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!id.is_empty()).then_some(id)
}

/// Whether a redirect lands on a page the server shows after a successful
/// delete: the upload form or the meeting history.
fn is_landing_page(location: &str) -> bool {
    let path = match location.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => location,
    };
    let path = path.split(['?', '#']).next().unwrap_or(path);
    matches!(path.trim_end_matches('/'), "" | "/upload" | "/history")
}
