//! Source readers: JSON over HTTP with a single fallback, and saved HTML pages.
//!
//! # Fallback Policy
//!
//! The fallback endpoint is requested only when the primary could not be
//! reached or answered with a non-success status. A primary that answers 200
//! is final, even if its body later turns out to be empty or undecodable.

use crate::error::ChartError;
use crate::models::SourceVariant;
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Desktop browser identification; the chart APIs reject unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP reader for the JSON chart APIs.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Build a client with browser headers, an optional `Referer`, and an
    /// overall per-request timeout.
    pub fn new(referer: Option<&str>, timeout: Duration) -> Result<Self, ChartError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(referer) = referer {
            if let Ok(value) = HeaderValue::from_str(referer) {
                headers.insert(REFERER, value);
            } else {
                warn!(%referer, "Ignoring referer that is not a valid header value");
            }
        }

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|source| ChartError::Transport {
                url: String::from("<client>"),
                source,
            })?;
        Ok(Self { client })
    }

    /// GET `url` and decode the body as JSON.
    #[instrument(level = "info", skip(self))]
    pub async fn get_json(&self, url: &str) -> Result<Value, ChartError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ChartError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ChartError::Transport {
            url: url.to_string(),
            source,
        })?;
        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched response"
        );
        debug!(preview = %truncate_for_log(&body, 500), "Response body");

        serde_json::from_str(&body).map_err(|source| ChartError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET `primary`; on a transport or status failure, GET `fallback` once.
    ///
    /// Returns the decoded body and which endpoint produced it. When the
    /// fallback is used and also fails, its error is returned.
    #[instrument(level = "info", skip(self))]
    pub async fn get_json_with_fallback(
        &self,
        primary: &str,
        fallback: &str,
    ) -> Result<(Value, SourceVariant), ChartError> {
        match self.get_json(primary).await {
            Ok(value) => Ok((value, SourceVariant::Primary)),
            Err(e) if e.triggers_fallback() => {
                warn!(error = %e, %fallback, "Primary source failed; trying fallback");
                match self.get_json(fallback).await {
                    Ok(value) => Ok((value, SourceVariant::Fallback)),
                    Err(e2) => {
                        error!(error = %e2, "Fallback source failed");
                        Err(e2)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// Read a saved HTML page from disk.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_html(path: &Path) -> Result<String, ChartError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ChartError::MissingFile(path.to_path_buf()));
    }
    let html = tokio::fs::read_to_string(path).await?;
    info!(bytes = html.len(), "Read HTML file");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source() -> HttpSource {
        HttpSource::new(Some("https://charts.example/"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top"))
            .and(header_exists("user-agent"))
            .and(header("accept", "application/json"))
            .and(header("referer", "https://charts.example/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let value = source().get_json(&format!("{}/top", server.uri())).await.unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_get_json_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source().get_json(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ChartError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fallback_not_used_when_primary_succeeds_with_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/primary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "x"}])))
            .expect(0)
            .mount(&server)
            .await;

        let (value, variant) = source()
            .get_json_with_fallback(
                &format!("{}/primary", server.uri()),
                &format!("{}/fallback", server.uri()),
            )
            .await
            .unwrap();
        assert_eq!(value, json!([]));
        assert_eq!(variant, SourceVariant::Primary);
    }

    #[tokio::test]
    async fn test_fallback_used_on_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/primary"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"podcasts": []})))
            .expect(1)
            .mount(&server)
            .await;

        let (value, variant) = source()
            .get_json_with_fallback(
                &format!("{}/primary", server.uri()),
                &format!("{}/fallback", server.uri()),
            )
            .await
            .unwrap();
        assert_eq!(value, json!({"podcasts": []}));
        assert_eq!(variant, SourceVariant::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_used_on_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"feed": {}})))
            .expect(1)
            .mount(&server)
            .await;

        // Nothing listens on port 9 of localhost.
        let (_, variant) = source()
            .get_json_with_fallback(
                "http://127.0.0.1:9/primary",
                &format!("{}/fallback", server.uri()),
            )
            .await
            .unwrap();
        assert_eq!(variant, SourceVariant::Fallback);
    }

    #[tokio::test]
    async fn test_decode_error_does_not_trigger_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/primary"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let err = source()
            .get_json_with_fallback(
                &format!("{}/primary", server.uri()),
                &format!("{}/fallback", server.uri()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_both_sources_failing_returns_fallback_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/primary"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fallback"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source()
            .get_json_with_fallback(
                &format!("{}/primary", server.uri()),
                &format!("{}/fallback", server.uri()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_read_html_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.html");
        let err = read_html(&missing).await.unwrap_err();
        assert!(matches!(err, ChartError::MissingFile(p) if p == missing));
    }

    #[tokio::test]
    async fn test_read_html_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<div class=\"jss589\">x</div>").unwrap();
        let html = read_html(&page).await.unwrap();
        assert!(html.contains("jss589"));
    }
}
