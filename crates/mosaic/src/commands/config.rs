//! Site configuration (site.toml).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mosaic_static::{AssembleConfig, DEFAULT_SITE_URL};
use serde::Deserialize;

/// Environment variable overriding `[site] url`.
pub const SITE_URL_ENV: &str = "SITE_URL";

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub site: SiteSettings,
    pub paths: PathSettings,
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteSettings {
    pub url: String,
    pub title: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SITE_URL.to_string(),
            title: "Dr. Mboloko Esimo Justin".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathSettings {
    /// Source template, never modified
    pub template: PathBuf,
    pub components: PathBuf,
    /// Composed document written by the assembler
    pub composed: PathBuf,
    pub output: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        let assemble = AssembleConfig::default();
        Self {
            template: assemble.template,
            components: assemble.components_dir,
            composed: assemble.output,
            output: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BuildSettings {
    pub minify: bool,
    /// External CSS build, e.g. `["npm", "run", "build:css"]`
    pub css_command: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn assemble_config(&self) -> AssembleConfig {
        AssembleConfig {
            template: self.paths.template.clone(),
            components_dir: self.paths.components.clone(),
            output: self.paths.composed.clone(),
        }
    }
}

/// Load configuration from `path` if it exists, then apply `SITE_URL`.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        config
    } else {
        ConfigFile::default()
    };

    apply_site_url(&mut config, env::var(SITE_URL_ENV).ok());

    Ok(config)
}

/// Override `[site] url` with a non-empty `SITE_URL` value.
pub fn apply_site_url(config: &mut ConfigFile, url: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!("Using {} from {}", url, SITE_URL_ENV);
        config.site.url = url;
    }
}
