use std::time::Duration;

use serde_json::Value;

use crate::error::{ForgeError, Result};

/// Raw status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP seam used by the Ollama client.
///
/// Implementations map transport-level failures to `ForgeError::Unreachable`
/// and return every received response, whatever its status.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse>;
}

/// `reqwest` blocking client.
///
/// Must not be created or dropped inside an async context; build it on the
/// worker thread that uses it.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// `None` waits indefinitely; the blocking client's 30 s default is overridden.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpTransport { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send()?;
        Self::read(response)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        let response = self.client.post(url).json(body).send()?;
        Self::read(response)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        (**self).post_json(url, body)
    }
}

impl From<HttpResponse> for ForgeError {
    fn from(response: HttpResponse) -> Self {
        let excerpt: String = response.body.chars().take(200).collect();
        if excerpt.is_empty() {
            ForgeError::Unreachable(format!("HTTP {}", response.status))
        } else {
            ForgeError::Unreachable(format!("HTTP {}: {}", response.status, excerpt))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = HttpResponse { status: 204, body: String::new() };
        let redirect = HttpResponse { status: 301, body: String::new() };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_status_error_keeps_body_excerpt() {
        let err: ForgeError = HttpResponse {
            status: 500,
            body: "model not loaded".to_string(),
        }
        .into();
        assert_eq!(err, ForgeError::unreachable("HTTP 500: model not loaded"));

        let err: ForgeError = HttpResponse { status: 404, body: String::new() }.into();
        assert_eq!(err, ForgeError::unreachable("HTTP 404"));
    }

    #[test]
    fn test_connection_refused_is_unreachable() {
        let transport = HttpTransport::new(Some(Duration::from_secs(2))).unwrap();
        let result = transport.get("http://127.0.0.1:1/api/tags");
        assert!(matches!(result, Err(ForgeError::Unreachable(_))));
    }
}
