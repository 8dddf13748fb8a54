//! In-process HTTP transport backed by reqwest.

use std::error::Error as StdError;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::pricing::transport::{HttpResponse, HttpTransport, TransportError, TransportRequest};

pub const USER_AGENT: &str = concat!("pricetag/", env!("CARGO_PKG_VERSION"));

/// Fragments that mark an error's causes as a TLS problem.
const TLS_MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake"];

/// reqwest-based transport.
///
/// Holds one client per verification mode. Each is built on first use and
/// kept for the life of the transport, so the system trust store is loaded
/// at most once.
pub struct ReqwestTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
    verifying: OnceCell<Result<Client, String>>,
    insecure: OnceCell<Result<Client, String>>,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
            verifying: OnceCell::new(),
            insecure: OnceCell::new(),
        }
    }

    /// Build a client off the executor: loading native roots reads
    /// certificate files with blocking I/O.
    async fn build_client(&self, verify_tls: bool) -> Result<Client, String> {
        let connect_timeout = self.connect_timeout;
        let read_timeout = self.read_timeout;
        tokio::task::spawn_blocking(move || {
            Client::builder()
                .connect_timeout(connect_timeout)
                .read_timeout(read_timeout)
                .user_agent(USER_AGENT)
                .danger_accept_invalid_certs(!verify_tls)
                .build()
                .map_err(|e| error_chain(&e))
        })
        .await
        .map_err(|e| format!("client build task failed: {e}"))?
    }

    async fn client(&self, verify_tls: bool) -> Result<&Client, TransportError> {
        let cell = if verify_tls {
            &self.verifying
        } else {
            &self.insecure
        };
        cell.get_or_init(|| self.build_client(verify_tls))
            .await
            .as_ref()
            .map_err(|reason| TransportError::Unavailable(reason.clone()))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(5))
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError> {
        let client = self.client(request.verify_tls).await?;

        let response = client
            .get(&request.url)
            .header(ACCEPT, "application/json")
            .timeout(request.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse::new(status, body))
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    // The top-level message embeds the URL, which says nothing about the cause.
    let err = err.without_url();
    let chain = error_chain(&err);
    if err.is_timeout() {
        TransportError::Timeout
    } else if is_tls_failure(&err) {
        // Handshake failures surface as connect errors, so check these first.
        TransportError::Tls(chain)
    } else if err.is_connect() {
        TransportError::Connect(chain)
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(chain)
    } else if err.is_builder() {
        TransportError::Unavailable(chain)
    } else {
        TransportError::Request(chain)
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    parts.extend(causes(err));
    parts.join(": ")
}

/// Messages of every error below `err` in its source chain.
fn causes(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut messages = Vec::new();
    let mut source = err.source();
    while let Some(inner) = source {
        messages.push(inner.to_string());
        source = inner.source();
    }
    messages
}

fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
    causes(err).iter().any(|cause| mentions_tls(cause))
}

fn mentions_tls(message: &str) -> bool {
    let message = message.to_lowercase();
    TLS_MARKERS.iter().any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    /// Minimal error with an optional cause, for exercising chain inspection.
    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        cause: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
        }
    }

    fn layered(messages: &[&'static str]) -> Layer {
        let mut iter = messages.iter().rev();
        let mut err = Layer {
            message: iter.next().copied().unwrap_or_default(),
            cause: None,
        };
        for &message in iter {
            err = Layer {
                message,
                cause: Some(Box::new(err)),
            };
        }
        err
    }

    #[test]
    fn test_tls_markers() {
        assert!(mentions_tls("invalid peer certificate: UnknownIssuer"));
        assert!(mentions_tls("received fatal alert: HandshakeFailure"));
        assert!(!mentions_tls("tcp connect error: Connection refused (os error 111)"));
    }

    #[test]
    fn test_tls_detection_ignores_top_level_message() {
        let refused = layered(&[
            "error sending request for url (https://ssl.example/tls/certificate)",
            "client error (Connect)",
            "tcp connect error",
            "Connection refused (os error 111)",
        ]);
        assert!(!is_tls_failure(&refused));

        let bad_chain = layered(&[
            "error sending request",
            "client error (Connect)",
            "invalid peer certificate: UnknownIssuer",
        ]);
        assert!(is_tls_failure(&bad_chain));
    }

    #[tokio::test]
    async fn test_clients_are_built_once() {
        let transport = ReqwestTransport::default();
        let first = transport.client(false).await.map(|c| c as *const Client);
        let second = transport.client(false).await.map(|c| c as *const Client);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_verifying_client_builds_from_native_roots() {
        let transport = ReqwestTransport::default();
        assert!(transport.client(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_classified() {
        let transport = ReqwestTransport::new(Duration::from_millis(500), Duration::from_millis(500));
        // Port 9 (discard) on loopback is closed in test environments.
        let request = TransportRequest::new("http://127.0.0.1:9/", Duration::from_secs(2), false);
        let err = transport.get(&request).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Connect(_) | TransportError::Timeout),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_refused_connection_with_tls_words_in_url_is_not_tls() {
        let transport = ReqwestTransport::new(Duration::from_millis(500), Duration::from_millis(500));
        let request = TransportRequest::new(
            "http://127.0.0.1:9/ssl/tls/certificate/dbXRates/USD",
            Duration::from_secs(2),
            true,
        );
        let err = transport.get(&request).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Connect(_) | TransportError::Timeout),
            "unexpected error: {err:?}"
        );
    }
}
