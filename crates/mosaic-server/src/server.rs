//! Preview server for a packaged site.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use mosaic_articles::{ArticleLoader, DirSource, LoadOutcome};

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Packaged site directory
    pub dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            port: 4000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Directory not found: {0}. Run 'mosaic package' first.")]
    DirectoryNotFound(String),

    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Failed to set up article loader: {0}")]
    ArticleError(String),
}

type SharedLoader = Arc<ArticleLoader<DirSource>>;

/// Serves the packaged output and a server-rendered article panel.
pub struct PreviewServer {
    config: PreviewConfig,
}

impl PreviewServer {
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Build the router: static files plus `/__articles`.
    pub fn router(&self) -> Result<Router, ServerError> {
        if !self.config.dir.is_dir() {
            return Err(ServerError::DirectoryNotFound(
                self.config.dir.display().to_string(),
            ));
        }

        let loader = ArticleLoader::new(DirSource::new(&self.config.dir))
            .map_err(|e| ServerError::ArticleError(e.to_string()))?;

        Ok(Router::new()
            .route("/__articles", get(articles_handler))
            .fallback_service(ServeDir::new(&self.config.dir))
            .with_state(Arc::new(loader)))
    }

    /// Start serving until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let app = self.router()?;

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Serving {} at http://{}", self.config.dir.display(), addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Render the article panel from the served tree's `articles.json`.
async fn articles_handler(State(loader): State<SharedLoader>) -> Response {
    match loader.load().await {
        LoadOutcome::Rendered(panel) => Html(panel.html().to_string()).into_response(),
        LoadOutcome::Busy => StatusCode::NO_CONTENT.into_response(),
    }
}
