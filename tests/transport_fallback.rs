mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pricetag::pricing::{
    CurlTransport, Fetcher, HttpTransport, ReqwestTransport, TransportError, TransportRequest,
};
use pricetag::{PriceSuffixService, PricingConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{curl_available, BrokenChainTransport, FailingTransport};

const BTC_BODY: &str = r#"{"bitcoin":{"usd":65000.4}}"#;

#[tokio::test]
async fn tls_failure_retries_once_without_verification() -> Result<()> {
    let transport = BrokenChainTransport::new(BTC_BODY);
    let config = PricingConfig {
        verify_tls: true,
        ..PricingConfig::default()
    };
    let service = PriceSuffixService::with_transport(&config, transport.clone());

    let suffix = service.suffix_for("btc", None).await;

    assert_eq!(suffix.as_deref(), Some("(BTC: $65,000.40)"));
    assert_eq!(transport.calls(), vec![true, false]);

    Ok(())
}

#[tokio::test]
async fn verification_off_goes_straight_to_insecure_request() -> Result<()> {
    let transport = BrokenChainTransport::new(BTC_BODY);
    let service = PriceSuffixService::with_transport(&PricingConfig::default(), transport.clone());

    let suffix = service.suffix_for("btc", None).await;

    assert_eq!(suffix.as_deref(), Some("(BTC: $65,000.40)"));
    assert_eq!(transport.calls(), vec![false]);

    Ok(())
}

#[tokio::test]
async fn connection_failure_is_not_retried() -> Result<()> {
    let transport = FailingTransport::new(TransportError::Connect("refused".to_string()));
    let config = PricingConfig {
        verify_tls: true,
        ..PricingConfig::default()
    };
    let service = PriceSuffixService::with_transport(&config, transport.clone());

    assert!(service.suffix_for("btc", None).await.is_none());
    assert_eq!(transport.attempts(), 1);

    Ok(())
}

#[tokio::test]
async fn unavailable_fallback_is_skipped() -> Result<()> {
    let primary = FailingTransport::new(TransportError::Timeout);
    let fallback = FailingTransport::unavailable();
    let fetcher = Fetcher::new(primary.clone(), false, Duration::from_secs(1))
        .with_fallback(fallback.clone());

    assert!(fetcher.get("https://prices.test/").await.is_none());
    assert_eq!(primary.attempts(), 1);
    assert_eq!(fallback.attempts(), 0);

    Ok(())
}

#[tokio::test]
async fn reqwest_transport_reads_mock_server() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dbXRates/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"items":[{"xauPrice":2350.125}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(
        Arc::new(ReqwestTransport::default()),
        true,
        Duration::from_secs(5),
    );
    let body = fetcher.get(&format!("{}/dbXRates/USD", server.uri())).await;

    assert_eq!(body.as_deref(), Some(r#"{"items":[{"xauPrice":2350.125}]}"#));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let accept = requests[0]
        .headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(accept, "application/json");

    Ok(())
}

#[tokio::test]
async fn reqwest_transport_times_out() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(
        Arc::new(ReqwestTransport::default()),
        false,
        Duration::from_millis(200),
    );
    assert!(fetcher.get(&server.uri()).await.is_none());

    Ok(())
}

#[tokio::test]
async fn curl_fallback_serves_body_when_primary_fails() -> Result<()> {
    if !curl_available() {
        return Ok(());
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BTC_BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let primary = FailingTransport::new(TransportError::Unavailable("no TLS backend".to_string()));
    let config = PricingConfig {
        coingecko_base_url: server.uri(),
        ..PricingConfig::default()
    };
    let fetcher = Fetcher::new(primary.clone(), config.verify_tls, config.request_timeout())
        .with_fallback(Arc::new(CurlTransport::new()));
    let service = PriceSuffixService::with_fetcher(&config, fetcher);

    let suffix = service.suffix_for("btc", None).await;

    assert_eq!(suffix.as_deref(), Some("(BTC: $65,000.40)"));
    assert_eq!(primary.attempts(), 1);

    Ok(())
}

#[tokio::test]
async fn curl_fallback_http_error_is_none() -> Result<()> {
    if !curl_available() {
        return Ok(());
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(
        FailingTransport::new(TransportError::Timeout),
        false,
        Duration::from_secs(5),
    )
    .with_fallback(Arc::new(CurlTransport::new()));

    assert!(fetcher.get(&server.uri()).await.is_none());

    Ok(())
}

#[tokio::test]
async fn curl_reports_http_error_status() -> Result<()> {
    if !curl_available() {
        return Ok(());
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let request = TransportRequest::new(server.uri(), Duration::from_secs(5), false);
    let err = CurlTransport::new().get(&request).await.unwrap_err();
    assert_eq!(err, TransportError::Status(503));

    Ok(())
}
