use crate::filter::apply_filter;
use crate::store::FavoritesStore;
use crate::{Country, League, Match, MatchFilter};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Where match, league and country snapshots come from.
///
/// Every call returns a fresh snapshot; callers replace what they hold
/// rather than merging.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_matches(&self) -> ApiResult<Vec<Match>>;

    /// `None` when the feed has no match with this id.
    async fn fetch_match_by_id(&self, id: &str) -> ApiResult<Option<Match>>;

    async fn fetch_leagues(&self) -> ApiResult<Vec<League>>;

    /// Countries with their leagues embedded.
    async fn fetch_countries(&self) -> ApiResult<Vec<Country>>;

    /// Fetch then filter. Sources able to filter upstream may override this,
    /// as long as the result matches [`apply_filter`] over [`fetch_matches`].
    ///
    /// [`fetch_matches`]: DataSource::fetch_matches
    async fn fetch_filtered_matches(
        &self,
        filter: &MatchFilter,
        favorites: &dyn FavoritesStore,
    ) -> ApiResult<Vec<Match>> {
        let matches = self.fetch_matches().await?;
        Ok(apply_filter(matches, filter, favorites))
    }
}

// ---------------------------------------------------------------------------
// HTTP/JSON feed
// ---------------------------------------------------------------------------

/// Remote feed serving the match shape as JSON under a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("livescore/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Other(format!("invalid feed url {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("feed url {:?} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// A 4xx answer reads as `T::default()`: empty lists, or `None` for a
    /// single match. Server errors and transport failures are errors.
    async fn get<T: Default + serde::de::DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.url(segments)?;
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_string())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        self.get(&["matches"]).await
    }

    async fn fetch_match_by_id(&self, id: &str) -> ApiResult<Option<Match>> {
        // Dot segments are dropped from a URL path, so they can never name a match.
        if matches!(id, "" | "." | "..") {
            return Ok(None);
        }
        self.get(&["matches", id]).await
    }

    async fn fetch_leagues(&self) -> ApiResult<Vec<League>> {
        self.get(&["leagues"]).await
    }

    async fn fetch_countries(&self) -> ApiResult<Vec<Country>> {
        self.get(&["countries"]).await
    }
}
