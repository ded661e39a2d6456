//! Blog article loading and rendering.
//!
//! Loads the site's `articles.json`, keeps the published records, orders them
//! newest first and renders them as HTML cards for the blog section.

pub mod article;
pub mod loader;
pub mod render;

pub use article::{select_recent, Article, ArticleId, MAX_ARTICLES};
pub use loader::{
    ArticleError, ArticleLoader, ArticleSource, DirSource, LoadOutcome, CANDIDATE_PATHS,
};
pub use render::{ArticleRenderer, Panel};
