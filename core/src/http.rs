//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; a `Transport` (or the caller) executes the exchange
//! in between. Every request the news API accepts is a GET, so there is no
//! method field.

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// An HTTP GET request described as plain data.
///
/// Built by `NewsClient::build_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` after executing an `HttpRequest`, then passed to
/// `NewsClient::parse_*` methods for decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            url: "http://localhost/v2/sources?".to_string(),
            headers: vec![(API_KEY_HEADER.to_string(), "secret".to_string())],
        };
        assert_eq!(req.header("x-api-key"), Some("secret"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn success_covers_2xx_only() {
        let response = |status| HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(301).is_success());
        assert!(!response(401).is_success());
    }
}
