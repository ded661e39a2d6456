//! Asset pipeline: HTML and CSS transforms, copying and size accounting.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

/// File count and total size of a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub files: usize,
    pub bytes: u64,
}

/// Asset pipeline utilities.
pub struct AssetPipeline;

static ROOT_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(href|src)="\./"#).expect("Invalid root path regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static BETWEEN_TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("Invalid between-tags regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid comment regex"));

impl AssetPipeline {
    /// Rewrite `href="./` and `src="./` to root-relative `/` paths.
    pub fn rewrite_root_paths(html: &str) -> String {
        ROOT_HREF_RE.replace_all(html, r#"$1="/"#).into_owned()
    }

    /// Basic HTML minification: collapse whitespace, drop it between tags,
    /// strip comments.
    pub fn minify_html(html: &str) -> String {
        let html = WHITESPACE_RE.replace_all(html, " ");
        let html = BETWEEN_TAGS_RE.replace_all(&html, "><");
        let html = COMMENT_RE.replace_all(&html, "");
        html.trim().to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Recursively copy `src` into `dest`, creating directories as needed.
    pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<TreeStats> {
        let mut stats = TreeStats::default();

        for entry in WalkDir::new(src).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                stats.bytes += fs::copy(entry.path(), &target)?;
                stats.files += 1;
            }
        }

        Ok(stats)
    }

    /// Count files and bytes under `dir`.
    pub fn tree_stats(dir: &Path) -> io::Result<TreeStats> {
        let mut stats = TreeStats::default();

        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                stats.files += 1;
                stats.bytes += entry.metadata().map_err(io::Error::other)?.len();
            }
        }

        Ok(stats)
    }

    /// Human-readable size: `512 B`, `1.50 KB`, `2.00 MB`.
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * 1024;

        if bytes < KB {
            format!("{} B", bytes)
        } else if bytes < MB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        }
    }
}
