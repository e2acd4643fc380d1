//! Client configuration: remote service endpoints and HTTP settings.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Base URLs of the remote collaborators, one per service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Lesson generation and OCR evaluation.
    pub lessons: String,
    pub ocr: String,
    pub listening: String,
    pub auth: String,
    /// Adaptive quiz questions and answer submission.
    pub quiz: String,
    pub reading: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            lessons: "http://localhost:5000".to_string(),
            ocr: "http://localhost:5000".to_string(),
            listening: "http://localhost:5001".to_string(),
            auth: "http://localhost:5002".to_string(),
            quiz: "http://localhost:5003".to_string(),
            reading: "http://localhost:5004".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Join a path onto a base URL.
    pub fn url(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Everything page controllers need to reach the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoints: EndpointConfig,
    pub http_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            http_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = EndpointConfig::default();
        let endpoint = |name: &'static str, default: String| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) => {
                    Url::parse(&value).map_err(|_| ConfigError::InvalidUrl {
                        name,
                        value: value.clone(),
                    })?;
                    Ok(value)
                }
                None => Ok(default),
            }
        };

        let endpoints = EndpointConfig {
            lessons: endpoint("LINGO_LESSONS_URL", defaults.lessons)?,
            ocr: endpoint("LINGO_OCR_URL", defaults.ocr)?,
            listening: endpoint("LINGO_LISTENING_URL", defaults.listening)?,
            auth: endpoint("LINGO_AUTH_URL", defaults.auth)?,
            quiz: endpoint("LINGO_QUIZ_URL", defaults.quiz)?,
            reading: endpoint("LINGO_READING_URL", defaults.reading)?,
        };

        let http_timeout_secs = match lookup("LINGO_HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "LINGO_HTTP_TIMEOUT_SECS",
                    value,
                })?,
            None => ClientConfig::default().http_timeout_secs,
        };

        Ok(Self {
            endpoints,
            http_timeout_secs,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides_from_env() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LINGO_OCR_URL", "https://ocr.example.com"),
            ("LINGO_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.endpoints.ocr, "https://ocr.example.com");
        assert_eq!(config.endpoints.quiz, "http://localhost:5003");
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ClientConfig::from_lookup(lookup(&[("LINGO_AUTH_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "LINGO_AUTH_URL", .. }));

        let err =
            ClientConfig::from_lookup(lookup(&[("LINGO_HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for LINGO_HTTP_TIMEOUT_SECS: soon");
    }

    #[test]
    fn url_join() {
        assert_eq!(
            EndpointConfig::url("http://localhost:5000/", "/api/ocr/convert"),
            "http://localhost:5000/api/ocr/convert"
        );
    }
}
