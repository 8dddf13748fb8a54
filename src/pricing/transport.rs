//! HTTP transport abstraction and the fetch policy built on top of it.
//!
//! A [`Fetcher`] owns a primary transport and an optional fallback. It makes
//! at most one TLS-downgrade retry on the primary, then at most one attempt on
//! the fallback, and reduces every failure to `None`.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

/// One GET attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    /// Deadline for the whole attempt.
    pub timeout: Duration,
    pub verify_tls: bool,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>, timeout: Duration, verify_tls: bool) -> Self {
        Self {
            url: url.into(),
            timeout,
            verify_tls,
        }
    }

    fn without_verification(&self) -> Self {
        Self {
            verify_tls: false,
            ..self.clone()
        }
    }
}

/// A complete HTTP response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a transport produced no response.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("request timed out")]
    Timeout,
    #[error("TLS failure: {0}")]
    Tls(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("unreadable response body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Request(String),
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError>;

    /// Whether this transport can run in the current environment.
    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}

/// Applies the retry and fallback policy over a pair of transports.
#[derive(Clone)]
pub struct Fetcher {
    primary: Arc<dyn HttpTransport>,
    fallback: Option<Arc<dyn HttpTransport>>,
    verify_tls: bool,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(primary: Arc<dyn HttpTransport>, verify_tls: bool, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: None,
            verify_tls,
            timeout,
        }
    }

    /// Sets the transport used when the primary returns no response at all.
    pub fn with_fallback(mut self, fallback: Arc<dyn HttpTransport>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// GET `url` and return the body of a 2xx response.
    pub async fn get(&self, url: &str) -> Option<String> {
        let request = TransportRequest::new(url, self.timeout, self.verify_tls);

        match self.get_primary(&request).await {
            Ok(response) if response.is_success() => Some(response.body),
            Ok(response) => {
                debug!(url, status = response.status, "non-success response");
                None
            }
            Err(err) => {
                debug!(url, transport = self.primary.name(), error = %err, "primary transport failed");
                self.get_fallback(&request).await
            }
        }
    }

    async fn get_primary(
        &self,
        request: &TransportRequest,
    ) -> Result<HttpResponse, TransportError> {
        match self.primary.get(request).await {
            Err(TransportError::Tls(reason)) if request.verify_tls => {
                debug!(url = %request.url, %reason, "TLS failure, retrying without verification");
                self.primary.get(&request.without_verification()).await
            }
            other => other,
        }
    }

    async fn get_fallback(&self, request: &TransportRequest) -> Option<String> {
        let fallback = self.fallback.as_ref()?;
        if !fallback.is_available().await {
            debug!(transport = fallback.name(), "fallback transport unavailable");
            return None;
        }

        match fallback.get(&request.without_verification()).await {
            Ok(response) if response.is_success() => Some(response.body),
            Ok(response) => {
                debug!(url = %request.url, status = response.status, "fallback non-success response");
                None
            }
            Err(err) => {
                debug!(url = %request.url, transport = fallback.name(), error = %err, "fallback transport failed");
                None
            }
        }
    }
}
