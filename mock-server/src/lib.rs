use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Key the mock treats as revoked.
pub const INVALID_API_KEY: &str = "invalid";

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub language: String,
    pub country: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: SourceRef,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesBody {
    pub status: String,
    pub total_results: usize,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourcesBody {
    pub status: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub code: String,
    pub message: String,
}

/// Canned catalogue served by every route.
#[derive(Debug, Default)]
pub struct Catalog {
    pub sources: Vec<Source>,
    pub articles: Vec<Article>,
}

pub type Db = Arc<Catalog>;

pub fn app() -> Router {
    app_with(fixture())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(catalog);
    Router::new()
        .route("/v2/top-headlines", get(top_headlines))
        .route("/v2/everything", get(everything))
        .route("/v2/sources", get(sources))
        .route("/v2/broken/{kind}", get(broken))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Params = HashMap<String, String>;

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    tracing::debug!(status = status.as_u16(), code, "rejecting request");
    (
        status,
        Json(ErrorBody {
            status: "error".to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        None | Some("") => Err(error(
            StatusCode::UNAUTHORIZED,
            "apiKeyMissing",
            "Your API key is missing. Append this to the URL with the apiKey param, or use the x-api-key HTTP header.",
        )),
        Some(INVALID_API_KEY) => Err(error(
            StatusCode::UNAUTHORIZED,
            "apiKeyInvalid",
            "Your API key is invalid or incorrect. Check your key, or go to https://newsapi.org to create a free API key.",
        )),
        Some(_) => Ok(()),
    }
}

fn list(params: &Params, key: &str) -> Option<Vec<String>> {
    params
        .get(key)
        .map(|v| v.split(',').map(str::to_string).collect())
}

fn matches_query(article: &Article, q: &str) -> bool {
    let q = q.to_lowercase();
    article.title.to_lowercase().contains(&q)
        || article
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&q))
}

fn source_of<'a>(db: &'a Catalog, article: &Article) -> Option<&'a Source> {
    let id = article.source.id.as_deref()?;
    db.sources.iter().find(|s| s.id == id)
}

fn paginate(params: &Params, articles: Vec<Article>) -> Result<ArticlesBody, Response> {
    let page_size = match params.get("pageSize") {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            error(StatusCode::BAD_REQUEST, "parameterInvalid", "pageSize must be a number.")
        })?,
        None => DEFAULT_PAGE_SIZE,
    }
    .clamp(1, MAX_PAGE_SIZE);
    let page = match params.get("page") {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            error(StatusCode::BAD_REQUEST, "parameterInvalid", "page must be a number.")
        })?,
        None => 1,
    }
    .max(1);

    let total_results = articles.len();
    let articles = articles
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    Ok(ArticlesBody {
        status: "ok".to_string(),
        total_results,
        articles,
    })
}

async fn top_headlines(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let wanted_sources = list(&params, "sources");
    if wanted_sources.is_some() && (params.contains_key("country") || params.contains_key("category")) {
        return error(
            StatusCode::BAD_REQUEST,
            "parametersIncompatible",
            "You cannot mix the sources parameter with the country or category parameters.",
        );
    }

    let selected: Vec<Article> = db
        .articles
        .iter()
        .filter(|a| {
            let source = source_of(&db, a);
            let by_source = wanted_sources.as_ref().is_none_or(|ids| {
                a.source.id.as_ref().is_some_and(|id| ids.contains(id))
            });
            let by_country = params
                .get("country")
                .is_none_or(|c| source.is_some_and(|s| &s.country == c));
            let by_category = params
                .get("category")
                .is_none_or(|c| source.is_some_and(|s| &s.category == c));
            let by_query = params.get("q").is_none_or(|q| matches_query(a, q));
            by_source && by_country && by_category && by_query
        })
        .cloned()
        .collect();

    match paginate(&params, selected) {
        Ok(body) => Json(body).into_response(),
        Err(resp) => resp,
    }
}

async fn everything(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    if !["q", "sources", "domains"].iter().any(|k| params.contains_key(*k)) {
        return error(
            StatusCode::BAD_REQUEST,
            "parametersMissing",
            "Required parameters are missing, the scope of your search is too broad. Please set any of the following required parameters and try again: q, sources, domains.",
        );
    }
    let wanted_sources = list(&params, "sources");
    let wanted_domains = list(&params, "domains");

    let mut selected: Vec<Article> = db
        .articles
        .iter()
        .filter(|a| {
            let by_source = wanted_sources.as_ref().is_none_or(|ids| {
                a.source.id.as_ref().is_some_and(|id| ids.contains(id))
            });
            let by_domain = wanted_domains
                .as_ref()
                .is_none_or(|domains| domains.iter().any(|d| a.url.contains(d.as_str())));
            let by_language = params
                .get("language")
                .is_none_or(|l| source_of(&db, a).is_some_and(|s| &s.language == l));
            let by_query = params.get("q").is_none_or(|q| matches_query(a, q));
            by_source && by_domain && by_language && by_query
        })
        .cloned()
        .collect();

    if params.get("sortBy").map(String::as_str).unwrap_or("publishedAt") == "publishedAt" {
        selected.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }

    match paginate(&params, selected) {
        Ok(body) => Json(body).into_response(),
        Err(resp) => resp,
    }
}

async fn sources(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let sources = db
        .sources
        .iter()
        .filter(|s| {
            params.get("country").is_none_or(|c| &s.country == c)
                && params.get("category").is_none_or(|c| &s.category == c)
                && params.get("language").is_none_or(|l| &s.language == l)
        })
        .cloned()
        .collect();
    Json(SourcesBody {
        status: "ok".to_string(),
        sources,
    })
    .into_response()
}

/// Misbehaving upstream: `json` returns 200 with an undecodable body,
/// anything else a plain-text 500.
async fn broken(Path(kind): Path<String>) -> Response {
    match kind.as_str() {
        "json" => (StatusCode::OK, "{\"status\":\"ok\",\"articles\":").into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
    }
}

fn source(id: &str, name: &str, url: &str, category: &str, language: &str, country: &str) -> Source {
    Source {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} news coverage."),
        url: url.to_string(),
        category: category.to_string(),
        language: language.to_string(),
        country: country.to_string(),
    }
}

fn article(source: &Source, title: &str, description: &str, path: &str, published_at: &str) -> Article {
    Article {
        source: SourceRef {
            id: Some(source.id.clone()),
            name: source.name.clone(),
        },
        author: None,
        title: title.to_string(),
        description: Some(description.to_string()),
        url: format!("{}/{path}", source.url),
        url_to_image: None,
        published_at: published_at.to_string(),
        content: None,
    }
}

/// Small deterministic catalogue used by `app()`.
pub fn fixture() -> Catalog {
    let bbc = source("bbc-news", "BBC News", "https://www.bbc.co.uk", "general", "en", "gb");
    let techcrunch = source("techcrunch", "TechCrunch", "https://techcrunch.com", "technology", "en", "us");
    let spiegel = source("spiegel-online", "Spiegel Online", "https://www.spiegel.de", "general", "de", "de");
    let espn = source("espn", "ESPN", "https://www.espn.com", "sports", "en", "us");

    let articles = vec![
        article(&bbc, "Parliament debates budget", "MPs argue over spending plans.", "news/budget", "2024-03-01T09:00:00Z"),
        article(&bbc, "Rust adoption grows in UK firms", "Memory safety drives the shift.", "news/rust", "2024-03-02T10:00:00Z"),
        article(&techcrunch, "Startup raises Series A for Rust tooling", "Investors bet on compilers.", "2024/03/03/rust-tooling", "2024-03-03T11:00:00Z"),
        article(&techcrunch, "Bitcoin hits new high", "Crypto markets rally.", "2024/03/04/bitcoin", "2024-03-04T12:00:00Z"),
        article(&spiegel, "Bundestag stimmt ab", "Neue Regeln beschlossen.", "politik/abstimmung", "2024-03-05T13:00:00Z"),
        article(&espn, "Finals go to overtime", "A night to remember.", "nba/finals", "2024-03-06T14:00:00Z"),
    ];

    Catalog {
        sources: vec![bbc, techcrunch, spiegel, espn],
        articles,
    }
}
