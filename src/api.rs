// JSON client for the aggregation server's v2.0 API.
// Public API:
//   - SearchQuery: aggregated search parameters (query + tracker/category narrowing)
//   - Release, SearchResponse, IndexerSearchSummary: typed response structures
//   - fetch_indexers() -> Result<Vec<Indexer>, ApiError>
//   - search(&SearchQuery) -> Result<SearchResponse, ApiError>
//   - test_indexer(id) -> Result<(), ApiError>
//
// Endpoint samples:
// http://localhost:9117/api/v2.0/indexers?apikey=...&configured=all
// http://localhost:9117/api/v2.0/indexers/all/results?apikey=...&Query=iron+giant&Tracker[]=alpha

use lazy_static::lazy_static;
use serde::Deserialize;
use thiserror::Error;

use crate::app::config::ServerConfig;
use crate::state::Indexer;
use crate::util::resolve_url;

lazy_static! {
    pub static ref CLIENT: reqwest::Client = reqwest::Client::builder()
        .user_agent(concat!("trawl/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap();
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("{0}")]
    Server(String),
}

/// Parameters of an aggregated search. Empty tracker/category lists mean
/// "all configured".
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    pub trackers: Vec<String>,
    pub categories: Vec<u32>,
}

impl SearchQuery {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }
    pub fn with_trackers(mut self, trackers: Vec<String>) -> Self {
        self.trackers = trackers;
        self
    }
    pub fn with_categories(mut self, categories: Vec<u32>) -> Self {
        self.categories = categories;
        self
    }
}

/// One search hit as serialized by the server (PascalCase fields).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Release {
    #[serde(rename = "Guid", default)]
    pub guid: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Tracker", default)]
    pub tracker: String,
    #[serde(rename = "CategoryDesc", default)]
    pub category_desc: String,
    #[serde(rename = "PublishDate", default)]
    pub publish_date: String,
    #[serde(rename = "Size", default)]
    pub size: i64,
    #[serde(rename = "Seeders")]
    pub seeders: Option<i64>,
    #[serde(rename = "Peers")]
    pub peers: Option<i64>,
    #[serde(rename = "Link")]
    pub link: Option<String>,
    #[serde(rename = "MagnetUri")]
    pub magnet_uri: Option<String>,
    #[serde(rename = "Details")]
    pub details: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Imdb")]
    pub imdb: Option<i64>,
    #[serde(rename = "TMDb")]
    pub tmdb: Option<i64>,
    #[serde(rename = "TVDBId")]
    pub tvdb_id: Option<i64>,
    #[serde(rename = "TVMazeId")]
    pub tvmaze_id: Option<i64>,
    #[serde(rename = "TraktId")]
    pub trakt_id: Option<i64>,
    #[serde(rename = "DoubanId")]
    pub douban_id: Option<i64>,
    #[serde(rename = "DownloadVolumeFactor")]
    pub download_volume_factor: Option<f64>,
    #[serde(rename = "UploadVolumeFactor")]
    pub upload_volume_factor: Option<f64>,
}

/// Per-indexer outcome attached to a search response.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexerSearchSummary {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Results", default)]
    pub results: u32,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchResponse {
    #[serde(rename = "Results", default)]
    pub results: Vec<Release>,
    #[serde(rename = "Indexers", default)]
    pub indexers: Vec<IndexerSearchSummary>,
}

// Error payloads come back as {"error": "..."} with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn api_url(cfg: &ServerConfig, suffix: &str) -> String {
    resolve_url(
        &cfg.base_url,
        &format!("{}/api/v2.0/{}", cfg.base_path, suffix),
    )
}

fn error_from_response(status: u16, url: &str, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Server(parsed.error),
        Err(_) => ApiError::Status {
            status,
            url: url.to_string(),
        },
    }
}

/// Full indexer list, configured or not. Callers decorate and cache.
pub async fn fetch_indexers(cfg: &ServerConfig) -> Result<Vec<Indexer>, ApiError> {
    let url = api_url(cfg, "indexers");
    log::debug!("fetch_indexers: GET {url}");
    let resp = CLIENT
        .get(&url)
        .query(&[("apikey", cfg.api_key.as_str()), ("configured", "all")])
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(error_from_response(status.as_u16(), &url, &body));
    }
    Ok(resp.json().await?)
}

fn build_search_params(cfg: &ServerConfig, query: &SearchQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("apikey".to_string(), cfg.api_key.clone()),
        ("Query".to_string(), query.query.clone()),
    ];
    for tracker in &query.trackers {
        params.push(("Tracker[]".to_string(), tracker.clone()));
    }
    for cat in &query.categories {
        params.push(("Category[]".to_string(), cat.to_string()));
    }
    params
}

/// Aggregated search across the selected (or all) indexers.
pub async fn search(cfg: &ServerConfig, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
    let url = api_url(cfg, "indexers/all/results");
    log::debug!("search: GET {url} q={:?}", query.query);
    let resp = CLIENT
        .get(&url)
        .query(&build_search_params(cfg, query))
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(error_from_response(status.as_u16(), &url, &body));
    }
    Ok(resp.json().await?)
}

/// Run the server-side connectivity test for one indexer.
pub async fn test_indexer(cfg: &ServerConfig, id: &str) -> Result<(), ApiError> {
    let url = api_url(cfg, &format!("indexers/{id}/test"));
    log::debug!("test_indexer: POST {url}");
    let resp = CLIENT
        .post(&url)
        .query(&[("apikey", cfg.api_key.as_str())])
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(error_from_response(status.as_u16(), &url, &body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ServerConfig {
        ServerConfig {
            base_url: "http://localhost:9117".to_string(),
            base_path: String::new(),
            api_key: "secret".to_string(),
        }
    }

    #[test]
    fn api_urls_respect_base_path() {
        assert_eq!(
            api_url(&cfg(), "indexers"),
            "http://localhost:9117/api/v2.0/indexers"
        );
        let prefixed = ServerConfig {
            base_path: "/jackett".to_string(),
            ..cfg()
        };
        assert_eq!(
            api_url(&prefixed, "indexers/all/results"),
            "http://localhost:9117/jackett/api/v2.0/indexers/all/results"
        );
    }

    #[test]
    fn search_params_repeat_trackers_and_categories() {
        let query = SearchQuery::default()
            .with_query("iron giant")
            .with_trackers(vec!["alpha".into(), "beta".into()])
            .with_categories(vec![2000]);
        let params = build_search_params(&cfg(), &query);
        assert_eq!(params[0], ("apikey".to_string(), "secret".to_string()));
        assert_eq!(params[1], ("Query".to_string(), "iron giant".to_string()));
        let trackers: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k == "Tracker[]")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(trackers, vec!["alpha", "beta"]);
        assert!(params.contains(&("Category[]".to_string(), "2000".to_string())));
    }

    #[test]
    fn error_body_wins_over_bare_status() {
        let err = error_from_response(500, "http://x/api", r#"{"error": "boom"}"#);
        assert!(matches!(err, ApiError::Server(msg) if msg == "boom"));
        let err = error_from_response(404, "http://x/api", "not json");
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[test]
    fn release_parses_pascal_case_payload() {
        let json = r#"{
            "Guid": "magnet:abc",
            "Title": "Some.Show.S01E01",
            "Tracker": "Alpha",
            "TrackerId": "alpha",
            "CategoryDesc": "TV/HD",
            "PublishDate": "2024-05-01T10:00:00+00:00",
            "Size": 1073741824,
            "Seeders": 12,
            "Peers": 3,
            "Imdb": 944947,
            "DownloadVolumeFactor": 0.5,
            "UploadVolumeFactor": 1.0
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.title, "Some.Show.S01E01");
        assert_eq!(release.size, 1073741824);
        assert_eq!(release.imdb, Some(944947));
        assert_eq!(release.tmdb, None);
        assert_eq!(release.download_volume_factor, Some(0.5));
        assert!(release.magnet_uri.is_none());
    }
}
