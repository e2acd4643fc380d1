//! HTTP client for the handwriting OCR service.

use lingo_core::ink::BoxFuture;
use lingo_core::{ConversionError, TextConverter};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, EndpointConfig};

/// OCR errors.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        OcrError::Network(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Posts base64 PNG drawings to `{ocr}/api/ocr/convert`.
#[derive(Debug, Clone)]
pub struct OcrClient {
    client: Client,
    convert_url: String,
}

impl OcrClient {
    pub fn new(config: &ClientConfig) -> Result<Self, OcrError> {
        let client = Client::builder().timeout(config.http_timeout()).build()?;
        Ok(Self::with_client(client, &config.endpoints.ocr))
    }

    pub fn with_client(client: Client, ocr_base: &str) -> Self {
        Self {
            client,
            convert_url: EndpointConfig::url(ocr_base, "/api/ocr/convert"),
        }
    }

    /// Recognize the text in a base64 PNG. An empty recognition is an empty
    /// string, not an error.
    pub async fn convert(&self, png_base64: &str) -> Result<String, OcrError> {
        tracing::debug!(url = %self.convert_url, bytes = png_base64.len(), "sending drawing to OCR");

        let response = self
            .client
            .post(&self.convert_url)
            .json(&ConvertRequest { image: png_base64 })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OcrError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: ConvertResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Parse(e.to_string()))?;
        Ok(body.text.unwrap_or_default())
    }
}

impl TextConverter for OcrClient {
    fn convert(&self, png_base64: String) -> BoxFuture<Result<String, ConversionError>> {
        let client = self.clone();
        Box::pin(async move {
            OcrClient::convert(&client, &png_base64)
                .await
                .map_err(|e| ConversionError(e.to_string()))
        })
    }
}

/// Reduce OCR output to the single letter a letter drill expects.
pub fn first_letter(text: &str) -> Option<char> {
    text.trim().chars().next()
}
