use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::OnceCell;

/// Canonical location of the component metadata schema.
pub const SCHEMA_URL: &str =
    "https://git.drupalcode.org/project/drupal/-/raw/HEAD/core/assets/schemas/v1/metadata.schema.json";

/// Freshness window for the on-disk schema cache (24 hours).
pub const SCHEMA_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-request timeout for remote schema fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// User-Agent sent with remote schema fetches.
pub const USER_AGENT: &str = concat!(
    "corbel/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/corbel-rs/corbel)"
);

/// Path of the schema inside a project checkout, joined onto each candidate root.
const SCHEMA_RELATIVE_PATH: &str = "assets/schemas/v1/metadata.schema.json";

/// Candidate roots searched (relative to cwd) for a local copy of the schema.
const LOCAL_CANDIDATE_ROOTS: [&str; 3] = ["core", "web/core", "docroot/core"];

/// Where the schema was ultimately resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// A copy shipped inside the project tree.
    Local,
    /// The disk cache, within its freshness window.
    Cache,
    /// Fetched from the canonical URL this run.
    Remote,
}

/// Trait for fetching the schema document over the network.
///
/// Both the primary and the fallback transport are expressed through this
/// trait so that callers (and tests) can swap either out.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or the response
    /// body cannot be read.
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Default transport using reqwest.
#[derive(Clone, Default)]
pub struct ReqwestTransport(reqwest::Client);

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant that ignores proxy environment variables. Used as the
    /// fallback: a misconfigured proxy is the usual reason the primary
    /// transport fails while the network itself is reachable.
    pub fn no_proxy() -> Self {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_default();
        Self(client)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let resp = self
            .0
            .get(url)
            .timeout(timeout)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}

/// Default location of the schema cache file: `<temp>/corbel/metadata.schema.json`.
///
/// The file is shared between concurrent runs; writers may overwrite each
/// other and a stale or partial read self-corrects on the next invocation
/// when the freshness window is re-checked.
pub fn default_cache_path() -> PathBuf {
    std::env::temp_dir()
        .join("corbel")
        .join("metadata.schema.json")
}

/// Resolves the canonical component metadata schema for one run.
///
/// Resolution is layered, first success wins: a local copy inside the
/// project tree, then the disk cache (accepted only within
/// [`SCHEMA_CACHE_TTL`]), then a remote fetch that tries the primary
/// transport and falls back to the secondary once. A successful remote
/// fetch is written back to the cache file before being parsed.
///
/// Every failure mode is non-fatal: a malformed document or a total fetch
/// failure yields `None` and callers degrade to structural-only
/// validation. The outcome (including `None`) is memoized so resolution
/// happens at most once per provider instance.
pub struct SchemaProvider {
    local_roots: Vec<PathBuf>,
    /// `None` disables the disk cache entirely.
    cache_path: Option<PathBuf>,
    ttl: Duration,
    primary: Arc<dyn Transport>,
    fallback: Arc<dyn Transport>,
    resolved: OnceCell<Option<(Value, SchemaSource)>>,
}

impl SchemaProvider {
    pub fn new(primary: Arc<dyn Transport>, fallback: Arc<dyn Transport>) -> Self {
        Self {
            local_roots: LOCAL_CANDIDATE_ROOTS.iter().map(PathBuf::from).collect(),
            cache_path: Some(default_cache_path()),
            ttl: SCHEMA_CACHE_TTL,
            primary,
            fallback,
            resolved: OnceCell::new(),
        }
    }

    pub fn with_cache_path(mut self, path: PathBuf) -> Self {
        self.cache_path = Some(path);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_path = None;
        self
    }

    pub fn with_local_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.local_roots = roots;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Resolve the schema, reusing the memoized result on repeat calls.
    pub async fn resolve(&self) -> Option<(Value, SchemaSource)> {
        self.resolved
            .get_or_init(|| self.resolve_uncached())
            .await
            .clone()
    }

    async fn resolve_uncached(&self) -> Option<(Value, SchemaSource)> {
        if let Some(body) = self.read_local() {
            return parse_schema(&body, SchemaSource::Local);
        }
        if let Some(body) = self.read_cache() {
            return parse_schema(&body, SchemaSource::Cache);
        }
        let body = self.fetch_remote().await?;
        self.write_cache(&body);
        parse_schema(&body, SchemaSource::Remote)
    }

    fn read_local(&self) -> Option<String> {
        for root in &self.local_roots {
            let candidate = root.join(SCHEMA_RELATIVE_PATH);
            if let Ok(body) = fs::read_to_string(&candidate) {
                tracing::debug!(path = %candidate.display(), "using local schema copy");
                return Some(body);
            }
        }
        None
    }

    fn read_cache(&self) -> Option<String> {
        let cache_path = self.cache_path.as_deref()?;
        if !self.is_fresh(cache_path) {
            return None;
        }
        let body = fs::read_to_string(cache_path).ok()?;
        tracing::debug!(path = %cache_path.display(), "using cached schema");
        Some(body)
    }

    /// Whether the cache file exists and its mtime is within the TTL.
    fn is_fresh(&self, path: &Path) -> bool {
        fs::metadata(path)
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age <= self.ttl)
    }

    async fn fetch_remote(&self) -> Option<String> {
        match self.primary.fetch(SCHEMA_URL, FETCH_TIMEOUT, USER_AGENT).await {
            Ok(body) => return Some(body),
            Err(e) => {
                tracing::warn!("primary schema fetch failed: {e}");
            }
        }
        match self.fallback.fetch(SCHEMA_URL, FETCH_TIMEOUT, USER_AGENT).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("fallback schema fetch failed: {e}");
                None
            }
        }
    }

    /// Best-effort cache write; a failure only costs a re-fetch next run.
    fn write_cache(&self, body: &str) {
        let Some(cache_path) = self.cache_path.as_deref() else {
            return;
        };
        if let Some(parent) = cache_path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            tracing::warn!("failed to create schema cache directory: {e}");
            return;
        }
        if let Err(e) = fs::write(cache_path, body) {
            tracing::warn!("failed to write schema cache: {e}");
        }
    }
}

fn parse_schema(body: &str, source: SchemaSource) -> Option<(Value, SchemaSource)> {
    match serde_json::from_str(body) {
        Ok(value) => Some((value, source)),
        Err(e) => {
            tracing::warn!("malformed schema document ({source:?}): {e}");
            None
        }
    }
}
