//! Search provider clients.
//!
//! Both backends return a deduplicated, order-preserving hit list for one
//! keyword and paginate until the requested count is met or the provider
//! runs out of pages.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use linkwatch_common::{Config, LinkwatchError, SearchHit};

/// Neither provider serves result offsets past 100.
const MAX_OFFSET: usize = 100;

/// Max results one Google CSE request may return.
const CSE_PAGE_SIZE: usize = 10;

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, keyword: &str, num_results: usize) -> Result<Vec<SearchHit>>;
    fn name(&self) -> &str;
}

/// Pick the search backend from available credentials: SerpAPI when its key
/// is set, Google CSE when both its key and engine id are set. No usable
/// credentials is fatal; the run must abort before persisting anything.
pub fn searcher_from_config(config: &Config) -> Result<Box<dyn WebSearcher>, LinkwatchError> {
    if let Some(key) = &config.serpapi_key {
        return Ok(Box::new(SerpApiSearcher::new(key)));
    }
    if let (Some(key), Some(cx)) = (&config.google_api_key, &config.google_engine_id) {
        return Ok(Box::new(GoogleCseSearcher::new(key, cx, &config.google_lang)));
    }
    Err(LinkwatchError::Config(
        "No search credentials: set SERPAPI_KEY, or GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID"
            .to_string(),
    ))
}

/// Append a hit unless its url is empty or already collected for this
/// keyword. Returns true once `limit` hits are collected.
fn push_hit(hits: &mut Vec<SearchHit>, hit: SearchHit, limit: usize) -> bool {
    if !hit.url.is_empty() && !hits.iter().any(|h| h.url == hit.url) {
        hits.push(hit);
    }
    hits.len() >= limit
}

// --- SerpAPI (Google results) ---

pub struct SerpApiSearcher {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
    #[serde(default)]
    serpapi_pagination: Option<SerpApiPagination>,
}

#[derive(Debug, serde::Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    displayed_link: String,
}

#[derive(Debug, serde::Deserialize)]
struct SerpApiPagination {
    #[serde(default)]
    next_link: Option<String>,
}

impl SerpApiSearcher {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl WebSearcher for SerpApiSearcher {
    async fn search(&self, keyword: &str, num_results: usize) -> Result<Vec<SearchHit>> {
        if num_results == 0 {
            return Ok(Vec::new());
        }
        info!(keyword, num_results, searcher = "serpapi", "Searching");

        let mut hits: Vec<SearchHit> = Vec::new();
        let mut start = 0usize;
        // SerpAPI pages are 10-20 results regardless of how few we want.
        let page_size = num_results.clamp(10, 20);

        loop {
            let num = page_size.to_string();
            let offset = start.to_string();
            let resp = self
                .client
                .get("https://serpapi.com/search")
                .query(&[
                    ("engine", "google"),
                    ("q", keyword),
                    ("api_key", self.api_key.as_str()),
                    ("num", num.as_str()),
                    ("start", offset.as_str()),
                ])
                .send()
                .await
                .context("SerpAPI request failed")?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(
                    LinkwatchError::Provider(format!("SerpAPI error {status}: {body}")).into(),
                );
            }

            let data: SerpApiResponse = resp
                .json()
                .await
                .context("Failed to parse SerpAPI response")?;

            let has_next = data
                .serpapi_pagination
                .as_ref()
                .and_then(|p| p.next_link.as_ref())
                .is_some();

            let mut full = false;
            for r in data.organic_results {
                let hit = SearchHit {
                    url: r.link,
                    title: r.title,
                    snippet: r.snippet,
                    display_link: r.displayed_link,
                };
                if push_hit(&mut hits, hit, num_results) {
                    full = true;
                    break;
                }
            }
            if full {
                break;
            }

            start += page_size;
            if start >= MAX_OFFSET || !has_next {
                break;
            }
        }

        hits.truncate(num_results);
        info!(
            keyword,
            count = hits.len(),
            searcher = "serpapi",
            "Search complete"
        );
        Ok(hits)
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

// --- Google Custom Search JSON API ---

pub struct GoogleCseSearcher {
    api_key: String,
    engine_id: String,
    lang: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
    #[serde(default)]
    queries: Option<CseQueries>,
    #[serde(default, rename = "searchInformation")]
    search_information: Option<CseSearchInformation>,
}

#[derive(Debug, serde::Deserialize)]
struct CseItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default, rename = "displayLink")]
    display_link: String,
}

#[derive(Debug, serde::Deserialize)]
struct CseQueries {
    #[serde(default, rename = "nextPage")]
    next_page: Vec<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct CseSearchInformation {
    #[serde(default, rename = "totalResults")]
    total_results: Option<String>,
}

impl GoogleCseSearcher {
    pub fn new(api_key: &str, engine_id: &str, lang: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            lang: lang.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl WebSearcher for GoogleCseSearcher {
    async fn search(&self, keyword: &str, num_results: usize) -> Result<Vec<SearchHit>> {
        if num_results == 0 {
            return Ok(Vec::new());
        }
        info!(keyword, num_results, searcher = "google_cse", "Searching");

        let mut hits: Vec<SearchHit> = Vec::new();
        // CSE start index is 1-based.
        let mut start_index = 1usize;

        loop {
            let count = CSE_PAGE_SIZE.min(num_results - hits.len());
            let mut params = vec![
                ("key", self.api_key.clone()),
                ("cx", self.engine_id.clone()),
                ("q", keyword.to_string()),
                ("num", count.to_string()),
                ("start", start_index.to_string()),
            ];
            if !self.lang.is_empty() {
                params.push(("lr", self.lang.clone()));
            }

            let resp = self
                .client
                .get("https://www.googleapis.com/customsearch/v1")
                .query(&params)
                .send()
                .await
                .context("Google Custom Search request failed")?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(LinkwatchError::Provider(format!(
                    "Google Custom Search error {status}: {body}"
                ))
                .into());
            }

            let data: CseResponse = resp
                .json()
                .await
                .context("Failed to parse Google Custom Search response")?;

            if let Some(info) = &data.search_information {
                if info.total_results.as_deref() == Some("0") {
                    break;
                }
            }

            let has_next = data
                .queries
                .as_ref()
                .map(|q| !q.next_page.is_empty())
                .unwrap_or(false);

            let mut full = false;
            for item in data.items {
                let hit = SearchHit {
                    url: item.link,
                    title: item.title,
                    snippet: item.snippet,
                    display_link: item.display_link,
                };
                if push_hit(&mut hits, hit, num_results) {
                    full = true;
                    break;
                }
            }
            if full {
                break;
            }

            start_index += count;
            if start_index > MAX_OFFSET || !has_next {
                break;
            }
        }

        hits.truncate(num_results);
        info!(
            keyword,
            count = hits.len(),
            searcher = "google_cse",
            "Search complete"
        );
        Ok(hits)
    }

    fn name(&self) -> &str {
        "google_cse"
    }
}
