//! Watch command: re-assemble on source changes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mosaic_server::{FileWatcher, RecursiveMode};
use mosaic_static::Assembler;

use super::config::ConfigFile;

/// Run the watch command.
pub async fn run(config: &ConfigFile) -> Result<()> {
    let assembler = Assembler::new(config.assemble_config());
    assembler.run().context("Initial assembly failed")?;

    let paths = assembler.config();
    let template = fs::canonicalize(&paths.template)
        .with_context(|| format!("Failed to resolve {}", paths.template.display()))?;
    let template_dir = template.parent().unwrap_or(Path::new("/")).to_path_buf();
    let components = fs::canonicalize(&paths.components_dir)
        .unwrap_or_else(|_| paths.components_dir.clone());
    let composed = fs::canonicalize(&paths.output)
        .with_context(|| format!("Failed to resolve {}", paths.output.display()))?;

    let (watcher, mut rx) = FileWatcher::new(
        &[
            (template_dir, RecursiveMode::NonRecursive),
            (components.clone(), RecursiveMode::Recursive),
        ],
        vec![composed],
    )
    .context("Failed to start file watcher")?;

    tracing::info!(
        "Watching {} and {} for changes",
        template.display(),
        components.display()
    );

    while let Some(event) = rx.recv().await {
        tracing::info!("Changed: {}", event.path().display());
        // One rebuild per burst
        while let Ok(more) = rx.try_recv() {
            tracing::info!("Changed: {}", more.path().display());
        }

        match assembler.run() {
            Ok(report) => tracing::info!("Re-assembled {} sections", report.integrated()),
            Err(e) => tracing::warn!("Assembly failed: {}", e),
        }
    }

    // Keep watcher alive until the channel closes
    drop(watcher);

    Ok(())
}
