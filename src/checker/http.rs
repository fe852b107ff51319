// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Retries with GET when HEAD doesn't come back as valid, because some
//   servers reject or mishandle HEAD while serving GET just fine
// - Follows redirects up to a limit and judges the final status
// - Treats 403 Forbidden as valid: plenty of sites block bots but serve
//   the page to people
// - Runs checks concurrently with a cap on requests in flight
// - Returns results in the same order as the input, even though requests
//   finish in any order
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Streams: For processing many items concurrently
// - Enums + match: To map every outcome to exactly one classification
// =============================================================================

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use reqwest::{Client, StatusCode};
use std::fmt;

use super::link_set::LinkSet;
use super::normalize::CanonicalUrl;
use crate::config::{CheckerConfig, NetworkErrorPolicy};

/// Outcome of probing one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The server answered with a success, redirect or 403 status
    Valid,
    /// The server answered with an error status, or the URL can't be requested
    Invalid,
    /// The server could not be reached (only with NetworkErrorPolicy::Unknown)
    Unknown,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::Valid => "valid",
            Classification::Invalid => "invalid",
            Classification::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

// The result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// The URL that was checked
    pub url: CanonicalUrl,
    pub classification: Classification,
    /// Optional message with more details ("HTTP 404", "Request timed out")
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.classification == Classification::Valid
    }
}

/// Maps a final HTTP status to a classification.
///
/// 2xx and 3xx are valid, 403 is valid, everything else is invalid.
pub fn classify_status(status: StatusCode) -> Classification {
    if status.is_success() || status.is_redirection() || status == StatusCode::FORBIDDEN {
        Classification::Valid
    } else {
        Classification::Invalid
    }
}

// Probes links with one shared HTTP client
//
// The client holds the connection pool, so reusing it across probes means
// links on the same host share connections.
pub struct Checker {
    client: Client,
    config: CheckerConfig,
}

impl Checker {
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    // Checks every link in the set concurrently
    //
    // Returns one result per link, in the same order as the set.
    //
    // buffer_unordered hands results back as they complete, so each probe
    // carries its index and writes into its own slot. Nothing is shared
    // between probes except the client and the read-only input.
    pub async fn check(&self, urls: &LinkSet) -> Vec<ValidationResult> {
        let mut slots: Vec<Option<ValidationResult>> = vec![None; urls.len()];

        let mut probes = stream::iter(urls.iter().enumerate())
            .map(|(index, url)| async move { (index, self.check_single_link(url).await) })
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some((index, result)) = probes.next().await {
            tracing::debug!(url = %result.url, classification = %result.classification, "checked");
            slots[index] = Some(result);
        }

        // Every index was yielded exactly once by the stream above
        slots.into_iter().flatten().collect()
    }

    // Checks a single link: HEAD first, then GET if HEAD wasn't valid
    async fn check_single_link(&self, url: &CanonicalUrl) -> ValidationResult {
        match self.client.head(url.as_str()).send().await {
            Ok(response) if classify_status(response.status()) == Classification::Valid => {
                self.analyze_status(url, response.status())
            }
            Ok(response) => {
                let head_status = response.status();
                tracing::debug!(%url, status = %head_status, "HEAD not valid, retrying with GET");
                self.check_with_get(url, head_status).await
            }
            Err(e) => self.categorize_error(url, e),
        }
    }

    // If GET fails outright, the status HEAD already got is still a real
    // answer from the server, so it decides the result
    async fn check_with_get(
        &self,
        url: &CanonicalUrl,
        head_status: StatusCode,
    ) -> ValidationResult {
        // send() returns once the headers arrive; dropping the response
        // without reading it means we never download the body
        match self.client.get(url.as_str()).send().await {
            Ok(response) => self.analyze_status(url, response.status()),
            Err(e) => {
                tracing::debug!(%url, error = %e, "GET failed, keeping HEAD status");
                self.analyze_status(url, head_status)
            }
        }
    }

    fn analyze_status(&self, url: &CanonicalUrl, status: StatusCode) -> ValidationResult {
        ValidationResult {
            url: url.clone(),
            classification: classify_status(status),
            message: Some(format!("HTTP {}", status.as_u16())),
        }
    }

    // Categorizes different error types from reqwest
    //
    // - Builder errors (malformed URL, mailto:, ...) and redirect errors
    //   (too many hops, loops) say something definite about the link itself,
    //   so they are always invalid
    // - Everything else is the network getting in the way and follows the
    //   configured NetworkErrorPolicy
    fn categorize_error(&self, url: &CanonicalUrl, error: reqwest::Error) -> ValidationResult {
        let network_failure = match self.config.network_errors {
            NetworkErrorPolicy::Invalid => Classification::Invalid,
            NetworkErrorPolicy::Unknown => Classification::Unknown,
        };

        let (classification, message) = if error.is_builder() {
            (Classification::Invalid, "Not a requestable URL".to_string())
        } else if error.is_redirect() {
            (Classification::Invalid, "Too many redirects".to_string())
        } else if error.is_timeout() {
            (network_failure, "Request timed out".to_string())
        } else if error.is_connect() {
            // Connection errors include DNS failures and refused connections
            let error_string = format!("{:?}", error).to_lowercase();
            if error_string.contains("dns") || error_string.contains("resolve") {
                (network_failure, "Could not resolve hostname".to_string())
            } else {
                (network_failure, "Connection failed".to_string())
            }
        } else {
            (network_failure, error.to_string())
        };

        ValidationResult {
            url: url.clone(),
            classification,
            message: Some(message),
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why HEAD and then GET?
//    - HEAD asks for headers only, which is cheaper for both sides
//    - Some servers answer HEAD with 405 Method Not Allowed, or even 404,
//      while GET works. Retrying with GET before calling a link broken
//      avoids false alarms
//
// 2. Why slots instead of collect()?
//    - buffer_unordered(N) runs up to N futures at once and yields them in
//      completion order
//    - Writing into slots[index] puts every result back where its URL was
//
// 3. What happens on Ctrl-C?
//    - main.rs drops the future returned by check()
//    - Dropping the stream drops every in-flight request, so nothing else
//      is printed
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::normalize::normalize;
    use std::time::Duration;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn link_set(urls: &[String]) -> LinkSet {
        LinkSet::from_raw(urls.iter().cloned().map(Some))
    }

    fn checker() -> Checker {
        Checker::new(CheckerConfig::default()).unwrap()
    }

    async fn mock_status(server: &MockServer, at: &str, status: u16) {
        Mock::given(path(at))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    async fn check_one(checker: &Checker, url: String) -> ValidationResult {
        let mut results = checker.check(&link_set(&[url])).await;
        assert_eq!(results.len(), 1);
        results.remove(0)
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), Classification::Valid);
        assert_eq!(classify_status(StatusCode::NO_CONTENT), Classification::Valid);
        assert_eq!(classify_status(StatusCode::MOVED_PERMANENTLY), Classification::Valid);
        assert_eq!(classify_status(StatusCode::NOT_MODIFIED), Classification::Valid);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), Classification::Valid);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), Classification::Invalid);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), Classification::Invalid);
        assert_eq!(classify_status(StatusCode::GONE), Classification::Invalid);
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), Classification::Invalid);
        assert_eq!(classify_status(StatusCode::SERVICE_UNAVAILABLE), Classification::Invalid);
    }

    #[test]
    fn test_validation_result_is_valid() {
        let url = normalize(Some("https://example.com")).unwrap();
        let ok = ValidationResult {
            url: url.clone(),
            classification: Classification::Valid,
            message: None,
        };
        assert!(ok.is_valid());

        let broken = ValidationResult {
            url,
            classification: Classification::Invalid,
            message: None,
        };
        assert!(!broken.is_valid());
    }

    #[tokio::test]
    async fn test_forbidden_is_valid_and_not_found_is_invalid() {
        let server = MockServer::start().await;
        mock_status(&server, "/forbidden", 403).await;
        mock_status(&server, "/missing", 404).await;

        let checker = checker();
        let forbidden = check_one(&checker, format!("{}/forbidden", server.uri())).await;
        let missing = check_one(&checker, format!("{}/missing", server.uri())).await;

        assert_eq!(forbidden.classification, Classification::Valid);
        assert_eq!(missing.classification, Classification::Invalid);
        assert_eq!(missing.message.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_server_error_is_invalid() {
        let server = MockServer::start().await;
        mock_status(&server, "/boom", 503).await;

        let result = check_one(&checker(), format!("{}/boom", server.uri())).await;
        assert_eq!(result.classification, Classification::Invalid);
    }

    #[tokio::test]
    async fn test_falls_back_to_get_when_head_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let result = check_one(&checker(), format!("{}/no-head", server.uri())).await;
        assert_eq!(result.classification, Classification::Valid);
        assert_eq!(result.message.as_deref(), Some("HTTP 200"));
    }

    #[tokio::test]
    async fn test_valid_head_skips_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = check_one(&checker(), format!("{}/page", server.uri())).await;
        assert_eq!(result.classification, Classification::Valid);
    }

    #[tokio::test]
    async fn test_follows_redirect_and_judges_final_status() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        mock_status(&server, "/new", 404).await;
        Mock::given(path("/moved"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/here"))
            .mount(&server)
            .await;
        mock_status(&server, "/here", 200).await;

        let checker = checker();
        let broken = check_one(&checker, format!("{}/old", server.uri())).await;
        let fine = check_one(&checker, format!("{}/moved", server.uri())).await;

        assert_eq!(broken.classification, Classification::Invalid);
        assert_eq!(fine.classification, Classification::Valid);
    }

    #[tokio::test]
    async fn test_redirect_loop_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
            .mount(&server)
            .await;

        let config = CheckerConfig {
            network_errors: NetworkErrorPolicy::Unknown,
            ..CheckerConfig::default()
        };
        let checker = Checker::new(config).unwrap();
        let result = check_one(&checker, format!("{}/loop", server.uri())).await;

        // Never Unknown, even with the Unknown policy
        assert_eq!(result.classification, Classification::Invalid);
    }

    #[tokio::test]
    async fn test_timeout_follows_network_error_policy() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;
        let url = format!("{}/slow", server.uri());

        let strict = Checker::new(CheckerConfig {
            timeout: Duration::from_millis(50),
            ..CheckerConfig::default()
        })
        .unwrap();
        let lenient = Checker::new(CheckerConfig {
            timeout: Duration::from_millis(50),
            network_errors: NetworkErrorPolicy::Unknown,
            ..CheckerConfig::default()
        })
        .unwrap();

        let strict_result = check_one(&strict, url.clone()).await;
        assert_eq!(strict_result.classification, Classification::Invalid);
        assert_eq!(strict_result.message.as_deref(), Some("Request timed out"));

        let lenient_result = check_one(&lenient, url).await;
        assert_eq!(lenient_result.classification, Classification::Unknown);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_never_valid() {
        let url = "http://does-not-exist.invalid/page".to_string();
        let config = CheckerConfig {
            timeout: Duration::from_secs(5),
            ..CheckerConfig::default()
        };

        let strict = Checker::new(config.clone()).unwrap();
        let result = check_one(&strict, url.clone()).await;
        assert_eq!(result.classification, Classification::Invalid);

        let lenient = Checker::new(CheckerConfig {
            network_errors: NetworkErrorPolicy::Unknown,
            ..config
        })
        .unwrap();
        let result = check_one(&lenient, url).await;
        assert_eq!(result.classification, Classification::Unknown);
    }

    #[tokio::test]
    async fn test_non_http_links_are_invalid() {
        let checker = Checker::new(CheckerConfig {
            network_errors: NetworkErrorPolicy::Unknown,
            ..CheckerConfig::default()
        })
        .unwrap();

        let results = checker
            .check(&link_set(&[
                "mailto:someone@example.com".to_string(),
                "not a url".to_string(),
            ]))
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.classification == Classification::Invalid));
    }

    #[tokio::test]
    async fn test_results_keep_input_order_under_mixed_latency() {
        let server = MockServer::start().await;
        let mut urls = Vec::new();

        for i in 0..100u64 {
            // Spread delays so later links often finish first
            let delay = Duration::from_millis((i * 37) % 60);
            let status = if i % 3 == 0 { 404 } else { 200 };
            Mock::given(path(format!("/link/{}", i)))
                .respond_with(ResponseTemplate::new(status).set_delay(delay))
                .mount(&server)
                .await;
            urls.push(format!("{}/link/{}", server.uri(), i));
        }

        let checker = Checker::new(CheckerConfig {
            concurrency: 16,
            ..CheckerConfig::default()
        })
        .unwrap();
        let results = checker.check(&link_set(&urls)).await;

        assert_eq!(results.len(), 100);
        for (i, (result, url)) in results.iter().zip(&urls).enumerate() {
            assert_eq!(result.url.as_str(), url);
            let expected = if i % 3 == 0 {
                Classification::Invalid
            } else {
                Classification::Valid
            };
            assert_eq!(result.classification, expected, "wrong classification for {}", url);
        }
    }

    #[tokio::test]
    async fn test_head_status_kept_when_get_fails() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let checker = Checker::new(CheckerConfig {
            timeout: Duration::from_millis(100),
            network_errors: NetworkErrorPolicy::Unknown,
            ..CheckerConfig::default()
        })
        .unwrap();
        let result = check_one(&checker, format!("{}/flaky", server.uri())).await;

        assert_eq!(result.classification, Classification::Invalid);
        assert_eq!(result.message.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_dropping_check_abandons_pending_requests() {
        let server = MockServer::start().await;
        Mock::given(path_regex("^/stuck/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;
        let urls: Vec<String> = (0..40)
            .map(|i| format!("{}/stuck/{}", server.uri(), i))
            .collect();
        let set = link_set(&urls);

        let checker = checker();
        let started = std::time::Instant::now();
        let outcome = tokio::time::timeout(Duration::from_millis(200), checker.check(&set)).await;

        assert!(outcome.is_err(), "check should still be waiting on the server");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_set_gives_no_results() {
        let results = checker().check(&LinkSet::new()).await;
        assert!(results.is_empty());
    }
}
