//! Synchronous client core for the news article search API.
//!
//! # Overview
//! Validates caller options against per-endpoint schemas, serializes them
//! into a deterministic query string, and decodes the service's JSON
//! replies. Network I/O sits behind the `Transport` trait so the core stays
//! deterministic and testable.
//!
//! # Design
//! - `Parameters` holds closed-kind `ParamValue`s; `Schema` checks names and
//!   kinds, then `query::build_url` applies the per-key rules.
//! - `NewsClient` is stateless beyond its `ClientConfig`. Each endpoint has a
//!   `build_*` (produces request) and a `parse_*` (consumes response) method,
//!   plus a convenience method that runs both around a `Transport`.
//! - Result DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod query;
pub mod schema;
pub mod transport;
pub mod types;

pub use client::NewsClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use params::{ParamKind, ParamValue, Parameters};
pub use schema::Schema;
pub use transport::{Transport, UreqTransport};
pub use types::{Article, ArticleResults, ErrorResponse, Source, SourceResults};
