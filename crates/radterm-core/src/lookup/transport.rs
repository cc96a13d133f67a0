use std::time::Duration;

use crate::settings::LookupSettings;

/// What the lookup client needs from an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Retry-After` header value.
    pub retry_after: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

/// One `search-by-words` round trip. Non-2xx statuses are responses, not errors.
pub trait Transport: Send + Sync {
    fn search(&self, words: &str, lang: &str) -> Result<HttpResponse, TransportError>;
}

/// DeCS v2 over `ureq`.
pub struct UreqTransport {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl UreqTransport {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: format!("{}/search-by-words", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(s: &LookupSettings) -> Self {
        Self::new(&s.base_url, s.resolved_api_key(), s.timeout())
    }
}

impl Transport for UreqTransport {
    fn search(&self, words: &str, lang: &str) -> Result<HttpResponse, TransportError> {
        let mut response = self
            .agent
            .get(&self.endpoint)
            .query("words", words)
            .query("lang", lang)
            .query("format", "json")
            .header("apikey", &self.api_key)
            .call()
            .map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;
        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}

fn map_ureq_error(e: ureq::Error) -> TransportError {
    match e {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        other => TransportError::Network(other.to_string()),
    }
}
