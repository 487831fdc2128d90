//! Page sources: the HTTP listing client and an in-memory stand-in

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::types::{Character, NamedRef, PageBatch, PageResponse};
use crate::config::Config;
use crate::gallery::{GalleryError, GalleryResult};

/// Trait for upstream paged listings
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch one 1-based page
    async fn fetch_page(&self, page: u32) -> GalleryResult<PageBatch<T>>;

    /// Get the source name, for logs
    fn name(&self) -> &str;
}

/// Listing client for `{base_url}/character?page=N`
pub struct HttpPageSource {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpPageSource {
    /// Create a new HTTP source from configuration
    pub fn new(config: &Config) -> GalleryResult<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GalleryError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    /// URL of a listing page
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/character?page={}", self.base_url, page)
    }

    async fn fetch_body(&self, page: u32) -> GalleryResult<String> {
        let url = self.page_url(page);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify(page, e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.ok().and_then(|text| error_message(&text));
            let reason = match detail {
                Some(message) => format!("{}: {}", status, message),
                None => status.to_string(),
            };
            return Err(GalleryError::FetchFailed { page, reason });
        }

        response.text().await.map_err(|e| classify(page, e, self.request_timeout))
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, page: u32) -> GalleryResult<PageBatch<T>> {
        let body = match timeout(self.request_timeout, self.fetch_body(page)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("page {} did not answer within {:?}", page, self.request_timeout);
                return Err(GalleryError::Timeout { page, after: self.request_timeout });
            }
        };

        let response: PageResponse<T> = parse_listing(page, &body)?;
        Ok(PageBatch::from_response(page, response))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Parse a listing body, distinguishing "not JSON / wrong shape" from transport errors
pub fn parse_listing<T: DeserializeOwned>(page: u32, body: &str) -> GalleryResult<PageResponse<T>> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GalleryError::SchemaMismatch {
            page,
            reason: format!("body is not JSON: {}", e),
        })?;

    for field in ["results", "info"] {
        if value.get(field).is_none() {
            return Err(GalleryError::SchemaMismatch {
                page,
                reason: format!("missing `{}`", field),
            });
        }
    }

    serde_json::from_value(value).map_err(|e| GalleryError::SchemaMismatch {
        page,
        reason: e.to_string(),
    })
}

fn classify(page: u32, error: reqwest::Error, after: Duration) -> GalleryError {
    if error.is_timeout() {
        GalleryError::Timeout { page, after }
    } else {
        GalleryError::FetchFailed { page, reason: error.to_string() }
    }
}

/// Extract `{"error": "..."}` from an upstream error body
fn error_message(text: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(text).ok()?;
    json.get("error")?.as_str().map(str::to_string)
}

/// In-process page source over a fixed item list
pub struct MemoryPageSource<T> {
    items: Vec<T>,
    page_width: usize,
    fetches: AtomicUsize,
    failing_pages: Mutex<HashSet<u32>>,
}

impl<T: Clone + Send + Sync> MemoryPageSource<T> {
    pub fn new(items: Vec<T>, page_width: usize) -> Self {
        Self {
            items,
            page_width: page_width.max(1),
            fetches: AtomicUsize::new(0),
            failing_pages: Mutex::new(HashSet::new()),
        }
    }

    /// Make fetches of `page` fail until [`Self::heal`] is called
    #[cfg(test)]
    pub fn fail_page(&self, page: u32) {
        if let Ok(mut failing) = self.failing_pages.lock() {
            failing.insert(page);
        }
    }

    #[cfg(test)]
    pub fn heal(&self) {
        if let Ok(mut failing) = self.failing_pages.lock() {
            failing.clear();
        }
    }

    /// Number of fetches served so far, including failed ones
    #[cfg(test)]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn page_count(&self) -> u32 {
        self.items.len().div_ceil(self.page_width).max(1) as u32
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageSource<T> for MemoryPageSource<T> {
    async fn fetch_page(&self, page: u32) -> GalleryResult<PageBatch<T>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let failing = self.failing_pages.lock().map(|set| set.contains(&page)).unwrap_or(false);
        if failing {
            return Err(GalleryError::FetchFailed { page, reason: "simulated failure".to_string() });
        }

        let pages = self.page_count();
        if page == 0 || page > pages {
            return Err(GalleryError::FetchFailed {
                page,
                reason: "404 Not Found: There is nothing here".to_string(),
            });
        }

        let start = (page as usize - 1) * self.page_width;
        let end = (start + self.page_width).min(self.items.len());
        Ok(PageBatch {
            page,
            items: self.items[start..end].to_vec(),
            has_more: page < pages,
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Offline dataset used by `--offline`
pub fn demo_characters() -> Vec<Character> {
    const NAMES: [&str; 12] = [
        "Rick", "Morty", "Summer", "Beth", "Jerry", "Birdperson",
        "Squanchy", "Unity", "Tammy", "Mr. Poopybutthole", "Krombopulos", "Noob-Noob",
    ];
    const STATUSES: [&str; 3] = ["Alive", "Dead", "unknown"];
    const GENDERS: [&str; 4] = ["Male", "Female", "Genderless", "unknown"];

    (1..=120u64)
        .map(|id| {
            let i = id as usize;
            let base = NAMES[i % NAMES.len()];
            let mut character = Character::new(
                id,
                &format!("{} #{}", base, id),
                STATUSES[i % STATUSES.len()],
                GENDERS[(i / 3) % GENDERS.len()],
            );
            character.location = NamedRef {
                name: "Earth (Replacement Dimension)".into(),
                url: String::new(),
            };
            character.origin = NamedRef {
                name: "Earth (C-137)".into(),
                url: String::new(),
            };
            character.episode = (1..=(i % 5 + 1))
                .map(|ep| format!("https://rickandmortyapi.com/api/episode/{}", ep * (1 + i % 2)))
                .collect();
            character
        })
        .collect()
}
