//! Stateless request builder and response parser for the news API.
//!
//! # Design
//! `NewsClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that
//! validates parameters and produces an `HttpRequest`, and a `parse_*` method
//! that consumes an `HttpResponse`. The endpoint methods (`top_headlines`,
//! `everything`, `sources`) join the two around a `Transport`.

use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, API_KEY_HEADER};
use crate::params::Parameters;
use crate::query::build_url;
use crate::schema::{self, Schema};
use crate::transport::Transport;
use crate::types::{ArticleResults, ErrorResponse, SourceResults};

const TOP_HEADLINES_PATH: &str = "/top-headlines?";
const EVERYTHING_PATH: &str = "/everything?";
const SOURCES_PATH: &str = "/sources?";

/// Synchronous, stateless client for the news API.
#[derive(Debug, Clone)]
pub struct NewsClient {
    config: ClientConfig,
}

impl NewsClient {
    pub fn new(api_key: &str) -> Self {
        Self::from_config(ClientConfig::new(api_key))
    }

    pub fn from_config(mut config: ClientConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { config }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_top_headlines(&self, params: &Parameters) -> Result<HttpRequest, ApiError> {
        self.build_request(TOP_HEADLINES_PATH, &schema::TOP_HEADLINES, params)
    }

    pub fn build_everything(&self, params: &Parameters) -> Result<HttpRequest, ApiError> {
        self.build_request(EVERYTHING_PATH, &schema::EVERYTHING, params)
    }

    pub fn build_sources(&self, params: &Parameters) -> Result<HttpRequest, ApiError> {
        self.build_request(SOURCES_PATH, &schema::SOURCES, params)
    }

    /// Decode a top-headlines or everything response.
    pub fn parse_articles(&self, response: HttpResponse) -> Result<ArticleResults, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_sources(&self, response: HttpResponse) -> Result<SourceResults, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Fetch one page of breaking headlines.
    pub fn top_headlines<T: Transport>(
        &self,
        transport: &T,
        params: &Parameters,
    ) -> Result<ArticleResults, ApiError> {
        let request = self.build_top_headlines(params)?;
        self.parse_articles(transport.execute(&request)?)
    }

    /// Search the full article archive, one page per call.
    pub fn everything<T: Transport>(
        &self,
        transport: &T,
        params: &Parameters,
    ) -> Result<ArticleResults, ApiError> {
        let request = self.build_everything(params)?;
        self.parse_articles(transport.execute(&request)?)
    }

    /// List the outlets the service indexes.
    pub fn sources<T: Transport>(
        &self,
        transport: &T,
        params: &Parameters,
    ) -> Result<SourceResults, ApiError> {
        let request = self.build_sources(params)?;
        self.parse_sources(transport.execute(&request)?)
    }

    fn build_request(
        &self,
        path: &str,
        schema: &Schema,
        params: &Parameters,
    ) -> Result<HttpRequest, ApiError> {
        let url = build_url(&format!("{}{path}", self.config.base_url), schema, params)?;
        if self.config.api_key.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        tracing::debug!(%url, "built news API request");
        Ok(HttpRequest {
            url,
            headers: vec![(API_KEY_HEADER.to_string(), self.config.api_key.clone())],
        })
    }
}

/// Map non-2xx responses to `RemoteApi` when the body is the service's error
/// document, and to `Transport` otherwise.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        tracing::debug!(status = response.status, bytes = response.body.len(), "news API response");
        return Ok(());
    }
    tracing::warn!(status = response.status, "news API request failed");
    match serde_json::from_str::<ErrorResponse>(&response.body) {
        Ok(err) => Err(ApiError::RemoteApi {
            status: response.status,
            code: err.code,
            message: err.message,
        }),
        Err(_) => Err(ApiError::Transport(format!(
            "HTTP {}: {}",
            response.status, response.body
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn client() -> NewsClient {
        NewsClient::new("test-key").with_base_url("http://localhost:3000/v2")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    /// Replays one canned response and records the request it saw.
    struct CannedTransport {
        reply: HttpResponse,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                reply: response(status, body),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn build_top_headlines_produces_correct_request() {
        let params = Parameters::new().with("country", "gb").with("pageSize", 5);
        let req = client().build_top_headlines(&params).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/v2/top-headlines?country=gb&pageSize=5"
        );
        assert_eq!(
            req.headers,
            vec![("X-Api-Key".to_string(), "test-key".to_string())]
        );
    }

    #[test]
    fn build_everything_produces_correct_request() {
        let params = Parameters::new()
            .with("q", "Random")
            .with("domains", ["bbc.co.uk", "techcrunch.com"])
            .with("language", "en");
        let req = client().build_everything(&params).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/v2/everything?domains=bbc.co.uk%2Ctechcrunch.com&language=en&q=Random"
        );
    }

    #[test]
    fn build_sources_produces_correct_request() {
        let params = Parameters::new().with("category", "technology");
        let req = client().build_sources(&params).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v2/sources?category=technology");
    }

    #[test]
    fn sources_endpoint_rejects_query() {
        let params = Parameters::new().with("q", "rust");
        let err = client().build_sources(&params).unwrap_err();
        assert!(matches!(err, ApiError::UnknownParameter(k) if k == "q"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let client = NewsClient::new("").with_base_url("http://localhost:3000/v2");
        let err = client.build_top_headlines(&Parameters::new()).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[test]
    fn missing_api_key_never_reaches_transport() {
        let client = NewsClient::new("");
        let transport = CannedTransport::new(200, r#"{"status":"ok","sources":[]}"#);
        let err = client.sources(&transport, &Parameters::new()).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
        assert!(transport.seen.borrow().is_empty());
    }

    #[test]
    fn invalid_parameters_never_reach_transport() {
        let transport = CannedTransport::new(200, r#"{"status":"ok","articles":[]}"#);
        let params = Parameters::new().with("country", "zz");
        let err = client().top_headlines(&transport, &params).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedValue { .. }));
        assert!(transport.seen.borrow().is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = NewsClient::new("k").with_base_url("http://localhost:3000/v2/");
        let req = client.build_sources(&Parameters::new()).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v2/sources?");
    }

    #[test]
    fn default_base_url_is_production() {
        let req = NewsClient::new("k").build_sources(&Parameters::new()).unwrap();
        assert_eq!(req.url, "https://newsapi.org/v2/sources?");
    }

    #[test]
    fn with_timeout_overrides_config() {
        let client = client().with_timeout(Duration::from_secs(2));
        assert_eq!(client.config().timeout, Duration::from_secs(2));
    }

    #[test]
    fn parse_articles_success() {
        let body = r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":"bbc-news","name":"BBC News"},"author":"BBC","title":"Test","description":null,"url":"https://bbc.co.uk/1","urlToImage":null,"publishedAt":"2024-01-01T00:00:00Z","content":null}]}"#;
        let results = client().parse_articles(response(200, body)).unwrap();
        assert_eq!(results.total_results, 1);
        assert_eq!(results.articles[0].title, "Test");
        assert_eq!(results.articles[0].source.id.as_deref(), Some("bbc-news"));
    }

    #[test]
    fn parse_sources_success() {
        let body = r#"{"status":"ok","sources":[{"id":"cnn","name":"CNN"}]}"#;
        let results = client().parse_sources(response(200, body)).unwrap();
        assert_eq!(results.sources.len(), 1);
        assert_eq!(results.sources[0].name, "CNN");
    }

    #[test]
    fn parse_remote_error_surfaces_message() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid or incorrect."}"#;
        let err = client().parse_articles(response(401, body)).unwrap_err();
        match err {
            ApiError::RemoteApi { status, code, message } => {
                assert_eq!(status, 401);
                assert_eq!(code, "apiKeyInvalid");
                assert_eq!(message, "Your API key is invalid or incorrect.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_undecodable_error_is_transport_failure() {
        let err = client().parse_sources(response(502, "Bad Gateway")).unwrap_err();
        assert!(matches!(err, ApiError::Transport(msg) if msg == "HTTP 502: Bad Gateway"));
    }

    #[test]
    fn parse_articles_bad_json_is_error() {
        let err = client().parse_articles(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn everything_round_trip_through_transport() {
        let transport = CannedTransport::new(200, r#"{"status":"ok","totalResults":0,"articles":[]}"#);
        let params = Parameters::new().with("q", "bitcoin").with("sortBy", "relevancy");
        let results = client().everything(&transport, &params).unwrap();
        assert_eq!(results.status, "ok");

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].url,
            "http://localhost:3000/v2/everything?q=bitcoin&sortBy=relevancy"
        );
        assert_eq!(seen[0].header(API_KEY_HEADER), Some("test-key"));
    }
}
