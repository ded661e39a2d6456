//! Article loading with fallback paths and a single-flight guard.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::article::{select_recent, Article};
use crate::render::{ArticleRenderer, Panel};

/// Locations tried, in order, for the articles document.
pub const CANDIDATE_PATHS: [&str; 3] = [
    "data/articles.json",
    "/data/articles.json",
    "./data/articles.json",
];

/// Errors that can occur while loading articles.
#[derive(Debug, thiserror::Error)]
pub enum ArticleError {
    #[error("articles.json not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in articles.json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("articles.json does not contain an array")]
    NotAnArray,

    #[error("Failed to render articles: {0}")]
    Template(#[from] minijinja::Error),
}

/// Where the articles document is fetched from.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch the raw document at `path` (one of [`CANDIDATE_PATHS`]).
    async fn fetch(&self, path: &str) -> Result<String, ArticleError>;
}

/// Serves article documents from a site directory on disk.
///
/// Relative, root-relative and dot-relative candidate paths all resolve
/// against the same root.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        self.root.join(relative)
    }
}

#[async_trait]
impl ArticleSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<String, ArticleError> {
        let file = self.resolve(path);

        match tokio::fs::read_to_string(&file).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ArticleError::NotFound {
                path: path.to_string(),
            }),
            Err(source) => Err(ArticleError::Read {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// Result of a load request.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The panel to display, articles or an inline message
    Rendered(Panel),

    /// Another load on this loader was still in flight
    Busy,
}

/// Loads and renders the blog article panel.
///
/// Only one load runs at a time per loader; overlapping calls return
/// [`LoadOutcome::Busy`] without touching the source.
pub struct ArticleLoader<S> {
    source: S,
    renderer: ArticleRenderer,
    loading: AtomicBool,
}

/// Clears the loader's in-flight flag when the load settles.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: ArticleSource> ArticleLoader<S> {
    /// Create a loader over the given source.
    pub fn new(source: S) -> Result<Self, ArticleError> {
        Ok(Self {
            source,
            renderer: ArticleRenderer::new()?,
            loading: AtomicBool::new(false),
        })
    }

    /// Whether a load is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Load, filter, sort and render the articles.
    ///
    /// Failures never propagate; they are rendered as a message panel.
    pub async fn load(&self) -> LoadOutcome {
        let Some(_in_flight) = self.begin() else {
            tracing::debug!("Article load already in flight, skipping");
            return LoadOutcome::Busy;
        };

        let panel = match self.fetch_articles().await {
            Ok(articles) => self.renderer.render_panel(&select_recent(articles)),
            Err(e) => {
                tracing::error!("Failed to load articles: {}", e);
                self.renderer.render_error(&e)
            }
        };

        LoadOutcome::Rendered(panel)
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.loading))
    }

    /// Try each candidate path in turn; the first successful fetch wins.
    async fn fetch_articles(&self) -> Result<Vec<Article>, ArticleError> {
        let mut last_error = None;

        for path in CANDIDATE_PATHS {
            match self.source.fetch(path).await {
                Ok(body) => return parse_articles(&body),
                Err(e) => {
                    tracing::debug!("Articles not available at {}: {}", path, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ArticleError::NotFound {
            path: CANDIDATE_PATHS[0].to_string(),
        }))
    }
}

/// Parse an articles document, which must be a JSON array.
///
/// Records that do not fit the article shape are skipped with a warning so the
/// rest of the panel still renders.
fn parse_articles(body: &str) -> Result<Vec<Article>, ArticleError> {
    let serde_json::Value::Array(records) = serde_json::from_str(body)? else {
        return Err(ArticleError::NotAnArray);
    };

    let articles = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(article) => Some(article),
            Err(e) => {
                tracing::warn!("Skipping article record {}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(articles)
}
