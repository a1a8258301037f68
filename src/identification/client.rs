//! Identification client.
//!
//! [`Identifier`] is the seam the scan loop calls once per analysed frame.
//! [`HttpIdentificationClient`] implements it against the remote scan
//! service: a multipart upload of the JPEG frame with the user's locale as a
//! query parameter.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::RETRY_AFTER;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::time::Duration;

use super::types::Identification;
use crate::capture::types::Frame;
use crate::configuration::types::ServiceSettings;
use crate::error_handling::types::IdentifyError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_LIMIT: usize = 256;

#[async_trait]
pub trait Identifier: Send + Sync {
    /// Submits `frame` for recognition. The frame is consumed: it is not
    /// retained once submitted.
    async fn identify(&self, frame: Frame, locale: &str) -> Result<Identification, IdentifyError>;
}

pub struct HttpIdentificationClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpIdentificationClient {
    pub fn new(settings: &ServiceSettings) -> Result<Self, IdentifyError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| IdentifyError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            auth_token: settings.auth_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn truncate(mut body: String, limit: usize) -> String {
    if body.len() > limit {
        let mut cut = limit;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl Identifier for HttpIdentificationClient {
    async fn identify(&self, frame: Frame, locale: &str) -> Result<Identification, IdentifyError> {
        debug!(
            "Submitting {}x{} frame ({} bytes) to {}",
            frame.width,
            frame.height,
            frame.bytes.len(),
            self.endpoint
        );

        let part = Part::bytes(frame.bytes)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| IdentifyError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let mut request = self
            .http
            .post(&self.endpoint)
            .query(&[("language", locale)])
            .multipart(form);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IdentifyError::Transport(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            warn!("Identification service rate limited the scan");
            return Err(IdentifyError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentifyError::Http {
                status: status.as_u16(),
                body: truncate(body, ERROR_BODY_LIMIT),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IdentifyError::Transport(e.to_string()))?;
        serde_json::from_slice::<Identification>(&body)
            .map_err(|e| IdentifyError::Malformed(e.to_string()))
    }
}
