//! Preview server command.

use std::path::PathBuf;

use anyhow::Result;
use mosaic_server::{PreviewConfig, PreviewServer};

use super::config::ConfigFile;

/// Run the serve command.
pub async fn run(config: &ConfigFile, port: u16, dir: Option<PathBuf>, open: bool) -> Result<()> {
    let preview = PreviewConfig {
        dir: dir.unwrap_or_else(|| config.paths.output.clone()),
        port,
        open,
        ..Default::default()
    };

    PreviewServer::new(preview).start().await?;

    Ok(())
}
