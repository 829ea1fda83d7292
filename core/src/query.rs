//! Query-string construction for the news API.
//!
//! # Design
//! Building is two passes. `Schema::verify` checks key names and value kinds
//! for the endpoint; the rules here then enforce per-key business limits
//! (legal country codes, the 20-source cap) and produce the encoded pairs.
//! Pairs are sorted by key before encoding so the same `Parameters` always
//! yields the same URL.

use url::form_urlencoded;

use crate::error::ApiError;
use crate::params::{ParamKind, ParamValue, Parameters};
use crate::schema::Schema;

pub const COUNTRY_CODES: &[&str] = &[
    "ae", "ar", "at", "au", "be", "bg", "br", "ca", "ch", "cn", "co", "cu", "cz", "de", "eg", "fr",
    "gb", "gr", "hk", "hu", "id", "ie", "il", "in", "it", "jp", "kr", "lt", "lv", "ma", "mx", "my",
    "ng", "nl", "no", "nz", "ph", "pl", "pt", "ro", "rs", "ru", "sa", "se", "sg", "si", "sk", "th",
    "tr", "tw", "ua", "us", "ve", "za",
];

pub const CATEGORIES: &[&str] = &[
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

pub const LANGUAGES: &[&str] = &[
    "ar", "de", "en", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "se", "ud", "zh",
];

pub const SORT_BY_OPTIONS: &[&str] = &["publishedAt", "relevancy", "popularity"];

/// Upper bound on `sources` entries accepted by the service.
pub const MAX_SOURCES: usize = 20;

/// Validate `params` against `schema` and append the encoded query to
/// `base_path`.
///
/// `base_path` is used verbatim, so endpoint paths carry their own `?`.
pub fn build_url(base_path: &str, schema: &Schema, params: &Parameters) -> Result<String, ApiError> {
    schema.verify(params)?;

    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        if let Some(text) = serialize_param(key, value)? {
            pairs.push((key, text));
        }
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, text) in &pairs {
        serializer.append_pair(key, text);
    }
    Ok(format!("{base_path}{}", serializer.finish()))
}

/// Apply the rule for `key` and return the unencoded query value, or `None`
/// when the pair is dropped.
pub fn serialize_param(key: &str, value: &ParamValue) -> Result<Option<String>, ApiError> {
    match key {
        "country" => one_of(key, value, COUNTRY_CODES).map(Some),
        "category" => one_of(key, value, CATEGORIES).map(Some),
        "language" => one_of(key, value, LANGUAGES).map(Some),
        "sortBy" => one_of(key, value, SORT_BY_OPTIONS).map(Some),
        "sources" => joined_list(key, value, Some(MAX_SOURCES)).map(Some),
        "domains" => joined_list(key, value, None).map(Some),
        "q" => match value {
            ParamValue::Text(q) if q.is_empty() => Err(ApiError::EmptyQuery),
            ParamValue::Text(q) => Ok(Some(q.clone())),
            other => Err(mismatch(key, ParamKind::Text, other)),
        },
        "pageSize" | "page" => match value {
            ParamValue::Integer(n) => Ok(Some(n.to_string())),
            other => {
                tracing::debug!(key, kind = %other.kind(), "dropping non-integer paging value");
                Ok(None)
            }
        },
        _ => Err(ApiError::UnhandledParameter(key.to_string())),
    }
}

fn one_of(key: &str, value: &ParamValue, allowed: &[&str]) -> Result<String, ApiError> {
    match value {
        ParamValue::Text(s) if allowed.contains(&s.as_str()) => Ok(s.clone()),
        other => Err(ApiError::UnsupportedValue {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

fn joined_list(key: &str, value: &ParamValue, max: Option<usize>) -> Result<String, ApiError> {
    let ParamValue::TextList(items) = value else {
        return Err(mismatch(key, ParamKind::TextList, value));
    };
    if items.is_empty() {
        return Err(ApiError::EmptyList(key.to_string()));
    }
    if let Some(max) = max {
        if items.len() > max {
            return Err(ApiError::TooManyValues {
                key: key.to_string(),
                count: items.len(),
                max,
            });
        }
    }
    Ok(items.join(","))
}

fn mismatch(key: &str, expected: ParamKind, actual: &ParamValue) -> ApiError {
    ApiError::TypeMismatch {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}
