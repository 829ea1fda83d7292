//! Response records for the news API.
//!
//! # Design
//! Field names follow the service's camelCase JSON. The service sends `null`
//! for missing authors, descriptions and source ids, so those fields are
//! `Option`. Every field defaults when absent so partial documents decode,
//! and required text fields read `null` as empty so one sparse article does
//! not fail the whole page.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outlet reference embedded in articles, and the full record returned by the
/// sources endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Source {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub source: Source,
    pub author: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    pub url_to_image: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub published_at: String,
    pub content: Option<String>,
}

/// One page of articles from top-headlines or everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleResults {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_results: i64,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceResults {
    pub status: String,
    pub sources: Vec<Source>,
}

/// Error document the service returns with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}
