//! Error types for the news API client.
//!
//! # Design
//! Every failure the client can produce lives in one `ApiError` enum. The
//! parameter variants (`UnknownParameter` through `UnhandledParameter`) are
//! raised while building a request and never reach the network. `RemoteApi`
//! carries the message the service put in its error body; any other failed
//! exchange lands in `Transport` with whatever detail is available.

use crate::params::ParamKind;

/// Errors returned by `NewsClient` build, parse and request methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The parameter name is not part of the endpoint's schema.
    #[error("invalid parameter {0}")]
    UnknownParameter(String),

    /// The parameter value has a different kind than the schema declares.
    #[error("invalid type for parameter {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ParamKind,
        actual: ParamKind,
    },

    /// The value is not in the fixed set of values accepted for this key.
    #[error("unsupported {key} value {value:?}")]
    UnsupportedValue { key: String, value: String },

    /// A list parameter was given zero entries.
    #[error("empty list of {0}")]
    EmptyList(String),

    /// A list parameter exceeds the service's cap.
    #[error("maximum of {max} {key}, got {count}")]
    TooManyValues { key: String, count: usize, max: usize },

    /// `q` was present but empty.
    #[error("expected query, got empty string")]
    EmptyQuery,

    /// The schema accepted the key but no serialization rule exists for it.
    #[error("unhandled parameter {0}")]
    UnhandledParameter(String),

    /// No API key was configured.
    #[error("expected API key, got nothing")]
    MissingCredential,

    /// The request could not be completed, or the service replied with a
    /// non-2xx status whose body was not a recognizable error document.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service replied with a non-2xx status and a decodable error body.
    #[error("{message}")]
    RemoteApi {
        status: u16,
        code: String,
        message: String,
    },

    /// A 2xx response body could not be deserialized into the result type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// True for errors detected locally before any request was sent.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            ApiError::UnknownParameter(_)
                | ApiError::TypeMismatch { .. }
                | ApiError::UnsupportedValue { .. }
                | ApiError::EmptyList(_)
                | ApiError::TooManyValues { .. }
                | ApiError::EmptyQuery
                | ApiError::UnhandledParameter(_)
                | ApiError::MissingCredential
        )
    }
}
