//! Production packaging command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mosaic_static::{PackageConfig, Packager};

use super::config::ConfigFile;

/// Run the package command.
pub fn run(config: &ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Starting production build...");

    let package_config = PackageConfig {
        root: PathBuf::from("."),
        output_dir: output.unwrap_or_else(|| config.paths.output.clone()),
        assemble: config.assemble_config(),
        minify: minify.unwrap_or(config.build.minify),
        css_command: config.build.css_command.clone(),
        site_url: config.site.url.clone(),
        site_title: config.site.title.clone(),
        date: None,
    };

    let result = Packager::new(package_config)?
        .package()
        .context("Production build failed")?;

    tracing::info!(
        "Packaged {} files ({} bytes) in {}ms",
        result.files,
        result.bytes,
        result.duration_ms
    );
    tracing::info!(
        "Deploy the contents of {} to your web server.",
        result.output_dir.display()
    );

    Ok(())
}
