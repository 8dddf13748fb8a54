#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pricetag::pricing::{HttpResponse, HttpTransport, TransportError, TransportRequest};
use pricetag::{PriceSuffixService, PricingConfig};
use wiremock::MockServer;

/// Config pointing both providers at a mock server, with no curl fallback.
pub fn mock_config(server: &MockServer) -> PricingConfig {
    PricingConfig {
        curl_fallback: false,
        coingecko_base_url: server.uri(),
        goldprice_base_url: server.uri(),
        ..PricingConfig::default()
    }
}

pub fn mock_service(server: &MockServer) -> PriceSuffixService {
    PriceSuffixService::new(&mock_config(server))
}

pub fn curl_available() -> bool {
    std::process::Command::new("curl")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Fails every verified request with a TLS error and serves `body` otherwise.
pub struct BrokenChainTransport {
    body: String,
    calls: Mutex<Vec<bool>>,
}

impl BrokenChainTransport {
    pub fn new(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: body.into(),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `verify_tls` flag of every request seen, in order.
    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for BrokenChainTransport {
    async fn get(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(request.verify_tls);
        if request.verify_tls {
            Err(TransportError::Tls("invalid peer certificate: UnknownIssuer".to_string()))
        } else {
            Ok(HttpResponse::new(200, self.body.clone()))
        }
    }

    fn name(&self) -> &str {
        "broken-chain"
    }
}

/// Always fails with the given error and counts attempts.
pub struct FailingTransport {
    error: TransportError,
    available: bool,
    attempts: AtomicUsize,
}

impl FailingTransport {
    pub fn new(error: TransportError) -> Arc<Self> {
        Arc::new(Self {
            error,
            available: true,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            error: TransportError::Unavailable("disabled".to_string()),
            available: false,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn get(&self, _request: &TransportRequest) -> Result<HttpResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "failing"
    }
}
