//! Article panel preview command.

use std::path::PathBuf;

use anyhow::Result;
use mosaic_articles::{ArticleLoader, DirSource, LoadOutcome};

use super::config::ConfigFile;

/// Run the articles command, printing the rendered panel to stdout.
pub async fn run(config: &ConfigFile, root: Option<PathBuf>) -> Result<()> {
    let root = root.unwrap_or_else(|| config.paths.output.clone());
    let loader = ArticleLoader::new(DirSource::new(root))?;

    match loader.load().await {
        LoadOutcome::Rendered(panel) => {
            tracing::info!("Rendered {} articles", panel.article_count());
            println!("{}", panel.html());
        }
        LoadOutcome::Busy => tracing::debug!("Article load already in flight, nothing rendered"),
    }

    Ok(())
}
