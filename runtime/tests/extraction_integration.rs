//! End-to-end extraction against a local mock HTTP server.
//!
//! The page and the search endpoint are served by wiremock; WHOIS is replaced
//! by an in-process resolver. Nothing here touches the real network.

use assert_json_diff::assert_json_include;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use urlsense::acquisition::http_client::HttpFetcher;
use urlsense::acquisition::search::HttpSearchClient;
use urlsense::acquisition::whois::RegistrationResolver;
use urlsense::acquisition::{Acquirer, RegistrationRecord};
use urlsense::detectors::Signal;
use urlsense::features::*;
use urlsense::{
    AcquisitionError, DetectorFault, ExtractionError, Extractor, ExtractorConfig, ProbeError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PAGE: &str = r##"<html>
<head>
  <title>Sign in</title>
  <link rel="icon" href="https://cdn.elsewhere.net/favicon.ico">
  <script src="https://cdn.elsewhere.net/track.js"></script>
</head>
<body oncontextmenu="return false">
  <form action="https://collector.elsewhere.net/post" method="post">
    <input name="user"><input name="pass" type="password">
  </form>
  <a href="#">Forgot password?</a>
  <a href="javascript:void(0)">Help</a>
  <iframe src="https://ads.elsewhere.net/frame"></iframe>
  <script>window.open('https://elsewhere.net/promo'); var to = 'drop@collector.ru';</script>
</body>
</html>"##;

const RESULTS_PAGE: &str = r#"<html><body>
  <a class="result__a" href="https://a.example/">one</a>
  <a class="result__a" href="https://b.example/">two</a>
</body></html>"#;

/// Resolver answering from a fixed record.
struct FixedWhois(Option<RegistrationRecord>);

#[async_trait]
impl RegistrationResolver for FixedWhois {
    async fn resolve(&self, _domain: &str) -> Result<RegistrationRecord, ProbeError> {
        self.0
            .clone()
            .ok_or_else(|| ProbeError::Network("whois refused".to_string()))
    }
}

fn long_registration() -> RegistrationRecord {
    RegistrationRecord {
        domain_name: Some("example.com".to_string()),
        creation_date: NaiveDate::from_ymd_opt(2012, 5, 1),
        expiration_date: NaiveDate::from_ymd_opt(2030, 5, 1),
    }
}

fn config_for(server: &MockServer) -> ExtractorConfig {
    ExtractorConfig {
        fetch_timeout_ms: 5_000,
        search_timeout_ms: 5_000,
        search_endpoint: format!("{}/search", server.uri()),
        ..ExtractorConfig::default()
    }
}

fn extractor(server: &MockServer, whois: Option<RegistrationRecord>) -> Extractor {
    let config = config_for(server);
    let acquirer = Acquirer::new(
        config.clone(),
        Arc::new(HttpFetcher::new(&config).unwrap()),
        Arc::new(FixedWhois(whois)),
        Arc::new(HttpSearchClient::new(&config).unwrap()),
    );
    Extractor::new(acquirer)
}

async fn serve_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn serve_results(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_phishing_page_against_mock_server() {
    let server = MockServer::start().await;
    serve_page(&server, "/login", LOGIN_PAGE).await;
    serve_results(&server, 200, RESULTS_PAGE).await;

    let url = format!("{}/login", server.uri());
    let report = extractor(&server, Some(long_registration()))
        .report(&url)
        .await
        .unwrap();
    let v = report.vector();

    assert_eq!(v.len(), FEATURE_DIM);
    assert!(v.values().iter().all(|x| (-1..=1).contains(x)));

    // http://127.0.0.1:<port>/login
    assert_eq!(v[FEAT_USING_IP], Signal::Phishing);
    assert_eq!(v[FEAT_HTTPS], Signal::Phishing);
    assert_eq!(v[FEAT_NON_STD_PORT], Signal::Phishing);

    assert_eq!(v[FEAT_FAVICON], Signal::Phishing);
    assert_eq!(v[FEAT_ANCHOR_URL], Signal::Phishing);
    assert_eq!(v[FEAT_LINKS_IN_SCRIPT_TAGS], Signal::Phishing);
    assert_eq!(v[FEAT_SERVER_FORM_HANDLER], Signal::Legitimate);
    assert_eq!(v[FEAT_INFO_EMAIL], Signal::Phishing);
    assert_eq!(v[FEAT_DISABLE_RIGHT_CLICK], Signal::Phishing);
    assert_eq!(v[FEAT_USING_POPUP_WINDOW], Signal::Phishing);
    assert_eq!(v[FEAT_IFRAME_REDIRECTION], Signal::Phishing);
    assert_eq!(v[FEAT_LINKS_POINTING_TO_PAGE], Signal::Legitimate);

    assert_eq!(v[FEAT_WEBSITE_FORWARDING], Signal::Legitimate);
    assert_eq!(v[FEAT_PAGE_RANK], Signal::Legitimate);
    assert_eq!(v[FEAT_GOOGLE_INDEX], Signal::Legitimate);

    // Literal IP hosts never reach the resolver.
    for index in [
        FEAT_DOMAIN_REG_LEN,
        FEAT_AGE_OF_DOMAIN,
        FEAT_DNS_RECORDING,
        FEAT_WEBSITE_TRAFFIC,
    ] {
        assert_eq!(v[index], Signal::Phishing);
        assert!(matches!(
            report.fault(index),
            Some(DetectorFault::Probe(ProbeError::Unavailable(_)))
        ));
    }
    assert_eq!(report.faults().len(), 4);
}

#[tokio::test]
async fn test_redirecting_page_sets_forwarding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    serve_page(&server, "/new", "<html><body><a href='/'>home</a></body></html>").await;
    serve_results(&server, 200, RESULTS_PAGE).await;

    let url = format!("{}/old", server.uri());
    let vector = extractor(&server, None).extract(&url).await.unwrap();
    assert_eq!(vector[FEAT_WEBSITE_FORWARDING], Signal::Phishing);
    assert_eq!(vector[FEAT_LINKS_POINTING_TO_PAGE], Signal::Legitimate);
}

#[tokio::test]
async fn test_rate_limited_search_degrades_reputation_only() {
    let server = MockServer::start().await;
    serve_page(&server, "/", "<html><body><form></form></body></html>").await;
    serve_results(&server, 429, "slow down").await;

    let url = format!("{}/", server.uri());
    let report = extractor(&server, None).report(&url).await.unwrap();
    assert_eq!(
        report.fault(FEAT_PAGE_RANK),
        Some(&DetectorFault::Probe(ProbeError::RateLimited))
    );
    assert_eq!(
        report.fault(FEAT_GOOGLE_INDEX),
        Some(&DetectorFault::Probe(ProbeError::RateLimited))
    );
    assert_eq!(report.vector()[FEAT_SERVER_FORM_HANDLER], Signal::Legitimate);
    assert!(report.fault(FEAT_WEBSITE_FORWARDING).is_none());
}

#[tokio::test]
async fn test_search_query_carries_the_url() {
    let server = MockServer::start().await;
    let url = format!("{}/", server.uri());
    serve_page(&server, "/", "<html></html>").await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let vector = extractor(&server, None).extract(&url).await.unwrap();
    assert_eq!(vector[FEAT_PAGE_RANK], Signal::Legitimate);
}

#[tokio::test]
async fn test_json_report_shape() {
    let server = MockServer::start().await;
    serve_page(&server, "/", "<html><body></body></html>").await;
    serve_results(&server, 200, "<html></html>").await;

    let url = format!("{}/", server.uri());
    let report = extractor(&server, None).report(&url).await.unwrap();
    let actual = serde_json::to_value(&report).unwrap();

    assert_json_include!(
        actual: actual,
        expected: json!({
            "url": url,
            "features": {
                "UsingIp": -1,
                "HTTPS": -1,
                "AnchorURL": -1,
                "ServerFormHandler": -1,
                "WebsiteForwarding": 1,
                "PageRank": -1,
                "GoogleIndex": -1,
                "StatsReport": 1
            },
            "faults": {
                "DomainRegLen": "probe unavailable: literal IP host"
            }
        })
    );
    assert_eq!(actual["vector"].as_array().unwrap().len(), FEATURE_DIM);
}

#[tokio::test]
async fn test_connection_refused_is_fatal() {
    let server = MockServer::start().await;
    let err = extractor(&server, None)
        .extract("http://127.0.0.1:1/")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::Acquisition(AcquisitionError::Fetch { .. })
    ));
}

#[test]
fn test_unsupported_scheme_never_fetches() {
    let config = ExtractorConfig {
        search_enabled: false,
        ..ExtractorConfig::default()
    };
    let extractor = Extractor::from_config(config).unwrap();
    let err = tokio_test::block_on(extractor.extract("ftp://example.com/file")).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::Acquisition(AcquisitionError::UnsupportedScheme(_))
    ));
}
