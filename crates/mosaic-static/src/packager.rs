//! Production packager.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use mosaic_articles::Article;

use crate::artifacts::{ArtifactContext, ArtifactTemplates, GITIGNORE};
use crate::assembler::{AssembleConfig, AssembleError, Assembler, AssemblyReport};
use crate::assets::AssetPipeline;

/// Default public URL of the site.
pub const DEFAULT_SITE_URL: &str = "https://drmboloko.cmedith.com";

/// Configuration for packaging a site.
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// Site source root (holds `css/`, `js/`, `public/`, `data/`)
    pub root: PathBuf,

    /// Output directory, cleaned on every run
    pub output_dir: PathBuf,

    /// Assembler paths
    pub assemble: AssembleConfig,

    /// Minify the composed HTML and the stylesheet
    pub minify: bool,

    /// External CSS build command, run from `root`
    pub css_command: Option<Vec<String>>,

    /// Public site URL for the sitemap and robots file
    pub site_url: String,

    /// Site title for the deployment README
    pub site_title: String,

    /// Date stamped into generated files; today when unset
    pub date: Option<NaiveDate>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            assemble: AssembleConfig::default(),
            minify: false,
            css_command: None,
            site_url: DEFAULT_SITE_URL.to_string(),
            site_title: "Dr. Mboloko Esimo Justin".to_string(),
            date: None,
        }
    }
}

/// Result of a packaging run.
#[derive(Debug)]
pub struct PackageResult {
    /// Number of files in the output tree
    pub files: usize,

    /// Total size of the output tree in bytes
    pub bytes: u64,

    /// Total packaging time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,

    /// Assembler outcome
    pub assembly: AssemblyReport,
}

/// Errors that can occur while packaging.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("CSS build failed: {0}")]
    CssError(String),

    #[error("Required input not found: {0}")]
    MissingInput(String),

    #[error("Refusing to clean {output}: it contains {source_path}")]
    UnsafeOutput { output: String, source_path: String },

    #[error("Failed to read {0}")]
    ReadError(String),

    #[error("Failed to render {name}: {message}")]
    TemplateError { name: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Builds the deployable output tree.
pub struct Packager {
    config: PackageConfig,
    templates: ArtifactTemplates,
}

impl Packager {
    pub fn new(config: PackageConfig) -> Result<Self, PackageError> {
        let templates = ArtifactTemplates::new().map_err(|e| PackageError::TemplateError {
            name: "artifact templates".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { config, templates })
    }

    /// Run every packaging step in order; the first failure aborts.
    pub fn package(&self) -> Result<PackageResult, PackageError> {
        let start = Instant::now();
        let out = &self.config.output_dir;
        let date = self
            .config
            .date
            .unwrap_or_else(|| Local::now().date_naive());

        self.check_output_dir()?;
        self.clean_output()?;

        tracing::info!("Assembling HTML components...");
        let assembly = Assembler::new(self.config.assemble.clone()).run()?;

        self.compile_css()?;
        self.write_index()?;
        self.copy_styles()?;
        self.copy_scripts()?;
        self.copy_public()?;
        self.copy_data(date)?;
        self.generate_artifacts(date)?;

        let stats = AssetPipeline::tree_stats(out)
            .map_err(|e| PackageError::ReadError(format!("{}: {}", out.display(), e)))?;

        tracing::info!("Static files available in {}", out.display());
        tracing::info!("  Files: {}", stats.files);
        tracing::info!("  Total size: {}", AssetPipeline::format_size(stats.bytes));

        Ok(PackageResult {
            files: stats.files,
            bytes: stats.bytes,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: out.clone(),
            assembly,
        })
    }

    /// Refuse an output directory that is, or contains, the site sources.
    fn check_output_dir(&self) -> Result<(), PackageError> {
        // A directory that does not exist yet cannot hold any sources
        let Ok(out) = fs::canonicalize(&self.config.output_dir) else {
            return Ok(());
        };

        let sources = [
            &self.config.root,
            &self.config.assemble.template,
            &self.config.assemble.components_dir,
        ];
        for source in sources {
            let Ok(source) = fs::canonicalize(source) else {
                continue;
            };
            if source.starts_with(&out) {
                return Err(PackageError::UnsafeOutput {
                    output: self.config.output_dir.display().to_string(),
                    source_path: source.display().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Remove everything inside the output directory, or create it.
    fn clean_output(&self) -> Result<(), PackageError> {
        let out = &self.config.output_dir;

        if !out.exists() {
            fs::create_dir_all(out).map_err(|e| PackageError::WriteError(e.to_string()))?;
            tracing::info!("Created {}", out.display());
            return Ok(());
        }

        let entries = fs::read_dir(out)
            .map_err(|e| PackageError::ReadError(format!("{}: {}", out.display(), e)))?;

        for entry in entries {
            let path = entry
                .map_err(|e| PackageError::ReadError(e.to_string()))?
                .path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| PackageError::WriteError(format!("{}: {}", path.display(), e)))?;
        }

        tracing::info!("Cleaned {}", out.display());
        Ok(())
    }

    fn compile_css(&self) -> Result<(), PackageError> {
        let Some((program, args)) = self
            .config
            .css_command
            .as_deref()
            .and_then(|cmd| cmd.split_first())
        else {
            tracing::debug!("No CSS command configured, skipping CSS build");
            return Ok(());
        };

        tracing::info!("Compiling CSS: {} {}", program, args.join(" "));

        let status = Command::new(program)
            .args(args)
            .current_dir(&self.config.root)
            .status()
            .map_err(|e| PackageError::CssError(format!("{}: {}", program, e)))?;

        if !status.success() {
            return Err(PackageError::CssError(format!("{} exited with {}", program, status)));
        }

        Ok(())
    }

    /// Write the composed document with root-relative asset paths.
    fn write_index(&self) -> Result<(), PackageError> {
        let composed = &self.config.assemble.output;
        let html = fs::read_to_string(composed)
            .map_err(|e| PackageError::ReadError(format!("{}: {}", composed.display(), e)))?;

        let html = AssetPipeline::rewrite_root_paths(&html);
        let html = if self.config.minify {
            AssetPipeline::minify_html(&html)
        } else {
            html
        };

        let target = self.config.output_dir.join("index.html");
        write_file(&target, html)?;
        tracing::info!("Wrote index.html ({})", file_size(&target));
        Ok(())
    }

    fn copy_styles(&self) -> Result<(), PackageError> {
        let source = self.require(Path::new("css/main.css"))?;
        let target = self.config.output_dir.join("css").join("main.css");

        if self.config.minify {
            let css = fs::read_to_string(&source)
                .map_err(|e| PackageError::ReadError(format!("{}: {}", source.display(), e)))?;
            let css = AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Keeping unminified CSS: {}", e);
                css
            });
            write_file(&target, css)?;
        } else {
            copy_file(&source, &target)?;
        }

        tracing::info!("Copied css/main.css ({})", file_size(&target));
        Ok(())
    }

    fn copy_scripts(&self) -> Result<(), PackageError> {
        let js_dir = self.config.output_dir.join("js");

        let main = self.require(Path::new("js/main.js"))?;
        copy_file(&main, &js_dir.join("main.js"))?;
        tracing::info!("Copied js/main.js ({})", file_size(&js_dir.join("main.js")));

        let blog = self.config.root.join("js").join("blog.js");
        if blog.exists() {
            copy_file(&blog, &js_dir.join("blog.js"))?;
            tracing::info!("Copied js/blog.js ({})", file_size(&js_dir.join("blog.js")));
        } else {
            tracing::debug!("js/blog.js not found, skipping");
        }

        Ok(())
    }

    fn copy_public(&self) -> Result<(), PackageError> {
        let source = self.require(Path::new("public"))?;
        let stats = AssetPipeline::copy_dir(&source, &self.config.output_dir.join("public"))
            .map_err(|e| PackageError::WriteError(format!("public: {}", e)))?;

        tracing::info!(
            "Copied {} public files ({})",
            stats.files,
            AssetPipeline::format_size(stats.bytes)
        );
        Ok(())
    }

    /// Copy `data/`, or write a one-article default when it is absent.
    fn copy_data(&self, date: NaiveDate) -> Result<(), PackageError> {
        let source = self.config.root.join("data");
        let target = self.config.output_dir.join("data");

        if source.is_dir() {
            AssetPipeline::copy_dir(&source, &target)
                .map_err(|e| PackageError::WriteError(format!("data: {}", e)))?;
            tracing::info!("Copied data files");
            return Ok(());
        }

        tracing::warn!("data/ not found, writing default articles.json");
        let json = serde_json::to_string_pretty(&[Article::sample(date)])
            .map_err(|e| PackageError::WriteError(e.to_string()))?;
        write_file(&target.join("articles.json"), json)
    }

    fn generate_artifacts(&self, date: NaiveDate) -> Result<(), PackageError> {
        let out = &self.config.output_dir;
        let ctx = ArtifactContext {
            site_url: self.config.site_url.clone(),
            site_title: self.config.site_title.clone(),
            output_name: out
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("dist")
                .to_string(),
            date,
        };

        let rendered = [
            (".htaccess", self.templates.htaccess()),
            ("sitemap.xml", self.templates.sitemap(&ctx)),
            ("robots.txt", self.templates.robots(&ctx)),
        ];
        for (name, content) in rendered {
            let content = content.map_err(|e| PackageError::TemplateError {
                name: name.to_string(),
                message: e.to_string(),
            })?;
            write_file(&out.join(name), content)?;
            tracing::info!("Created {}", name);
        }

        let gitignore = out.join(".gitignore");
        if !gitignore.exists() {
            write_file(&gitignore, GITIGNORE)?;
        }

        let readme = self
            .templates
            .readme(&ctx)
            .map_err(|e| PackageError::TemplateError {
                name: "README.md".to_string(),
                message: e.to_string(),
            })?;
        write_file(&out.join("README.md"), readme)?;
        tracing::info!("Created README.md");

        Ok(())
    }

    /// Resolve a required input under the site root.
    fn require(&self, relative: &Path) -> Result<PathBuf, PackageError> {
        let path = self.config.root.join(relative);
        if path.exists() {
            Ok(path)
        } else {
            Err(PackageError::MissingInput(path.display().to_string()))
        }
    }
}

fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<(), PackageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PackageError::WriteError(e.to_string()))?;
    }
    fs::write(path, content)
        .map_err(|e| PackageError::WriteError(format!("{}: {}", path.display(), e)))
}

fn copy_file(source: &Path, target: &Path) -> Result<(), PackageError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| PackageError::WriteError(e.to_string()))?;
    }
    fs::copy(source, target)
        .map(|_| ())
        .map_err(|e| PackageError::WriteError(format!("{}: {}", target.display(), e)))
}

fn file_size(path: &Path) -> String {
    fs::metadata(path)
        .map(|m| AssetPipeline::format_size(m.len()))
        .unwrap_or_else(|_| "unknown size".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::{tempdir, TempDir};
    use walkdir::WalkDir;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="./css/main.css">
</head>
<body>
  <!-- Header Container -->
  <div id="header-container"></div>
  <!-- Blog Container -->
  <div id="blog-container"></div>
  <script src="js/loader.js"></script>
  <script src="./js/main.js"></script>
</body>
</html>
"#;

    fn site() -> TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();

        fs::write(root.join("index.template.html"), TEMPLATE).unwrap();
        fs::create_dir_all(root.join("components")).unwrap();
        fs::write(root.join("components/header.html"), "<header>Cabinet</header>").unwrap();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/main.css"), ".a { color: red; }\n").unwrap();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::write(root.join("js/main.js"), "console.log('main');\n").unwrap();
        fs::create_dir_all(root.join("public/img")).unwrap();
        fs::write(root.join("public/img/logo.svg"), "<svg></svg>").unwrap();

        temp
    }

    fn config(root: &Path) -> PackageConfig {
        PackageConfig {
            root: root.to_path_buf(),
            output_dir: root.join("dist"),
            assemble: AssembleConfig {
                template: root.join("index.template.html"),
                components_dir: root.join("components"),
                output: root.join("index.html"),
            },
            site_url: "https://example.com".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 20),
            ..Default::default()
        }
    }

    fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().display().to_string();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn packages_complete_tree() {
        let temp = site();
        let root = temp.path();

        let result = Packager::new(config(root)).unwrap().package().unwrap();
        let out = root.join("dist");

        for file in [
            "index.html",
            "css/main.css",
            "js/main.js",
            "public/img/logo.svg",
            "data/articles.json",
            ".htaccess",
            "sitemap.xml",
            "robots.txt",
            ".gitignore",
            "README.md",
        ] {
            assert!(out.join(file).is_file(), "missing {}", file);
        }
        assert!(!out.join("js/blog.js").exists());
        assert_eq!(result.files, 10);
        assert_eq!(result.bytes, AssetPipeline::tree_stats(&out).unwrap().bytes);
        assert_eq!(result.assembly.integrated(), 1);

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains(r#"href="/css/main.css""#));
        assert!(index.contains(r#"src="/js/main.js""#));
        assert!(index.contains("<header>Cabinet</header>"));
        assert!(!index.contains("loader.js"));

        assert_eq!(fs::read_to_string(out.join(".gitignore")).unwrap(), "*\n!.gitignore\n");
        assert!(fs::read_to_string(out.join("sitemap.xml"))
            .unwrap()
            .contains("<lastmod>2025-05-20</lastmod>"));
    }

    #[test]
    fn default_articles_has_one_published_record() {
        let temp = site();

        Packager::new(config(temp.path())).unwrap().package().unwrap();

        let json = fs::read_to_string(temp.path().join("dist/data/articles.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["published"], serde_json::Value::Bool(true));
        assert_eq!(records[0]["date"], "2025-05-20");
    }

    #[test]
    fn copies_existing_data_and_optional_blog_script() {
        let temp = site();
        let root = temp.path();
        fs::create_dir_all(root.join("data")).unwrap();
        fs::write(root.join("data/articles.json"), r#"[{"id": 9}]"#).unwrap();
        fs::write(root.join("js/blog.js"), "// blog").unwrap();

        Packager::new(config(root)).unwrap().package().unwrap();

        assert_eq!(
            fs::read_to_string(root.join("dist/data/articles.json")).unwrap(),
            r#"[{"id": 9}]"#
        );
        assert_eq!(fs::read_to_string(root.join("dist/js/blog.js")).unwrap(), "// blog");
    }

    #[test]
    fn cleans_stale_output() {
        let temp = site();
        let root = temp.path();
        fs::create_dir_all(root.join("dist/old")).unwrap();
        fs::write(root.join("dist/old/stale.html"), "stale").unwrap();
        fs::write(root.join("dist/stale.txt"), "stale").unwrap();

        Packager::new(config(root)).unwrap().package().unwrap();

        assert!(!root.join("dist/old").exists());
        assert!(!root.join("dist/stale.txt").exists());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let temp = site();
        let packager = Packager::new(config(temp.path())).unwrap();

        packager.package().unwrap();
        let first = snapshot(&temp.path().join("dist"));
        packager.package().unwrap();
        let second = snapshot(&temp.path().join("dist"));

        assert_eq!(first, second);
    }

    #[test]
    fn minify_toggle_compacts_html() {
        let temp = site();
        let mut cfg = config(temp.path());
        cfg.minify = true;

        Packager::new(cfg).unwrap().package().unwrap();

        let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert!(!index.contains('\n'));
        assert!(!index.contains("<!--"));
        let css = fs::read_to_string(temp.path().join("dist/css/main.css")).unwrap();
        assert!(!css.contains('\n'));
    }

    #[test]
    fn missing_stylesheet_aborts() {
        let temp = site();
        fs::remove_file(temp.path().join("css/main.css")).unwrap();

        let result = Packager::new(config(temp.path())).unwrap().package();

        assert!(matches!(result, Err(PackageError::MissingInput(_))));
    }

    #[test]
    fn refuses_output_that_holds_sources() {
        let temp = site();
        let root = temp.path();

        for output in [root.to_path_buf(), root.join("."), root.join("components")] {
            let mut cfg = config(root);
            cfg.output_dir = output;

            let result = Packager::new(cfg).unwrap().package();

            assert!(matches!(result, Err(PackageError::UnsafeOutput { .. })));
        }

        assert!(root.join("index.template.html").is_file());
        assert!(root.join("components/header.html").is_file());
        assert!(root.join("css/main.css").is_file());
    }

    #[test]
    fn refuses_ancestor_of_root() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp.path().join("keep.txt"), "keep").unwrap();

        let mut cfg = config(&root);
        cfg.output_dir = temp.path().to_path_buf();

        let result = Packager::new(cfg).unwrap().package();

        assert!(matches!(result, Err(PackageError::UnsafeOutput { .. })));
        assert!(temp.path().join("keep.txt").is_file());
    }

    #[test]
    fn missing_template_aborts() {
        let temp = site();
        fs::remove_file(temp.path().join("index.template.html")).unwrap();

        let result = Packager::new(config(temp.path())).unwrap().package();

        assert!(matches!(
            result,
            Err(PackageError::Assemble(AssembleError::TemplateNotFound(_)))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_css_command_aborts() {
        let temp = site();
        let mut cfg = config(temp.path());
        cfg.css_command = Some(vec!["false".to_string()]);

        let result = Packager::new(cfg).unwrap().package();

        assert!(matches!(result, Err(PackageError::CssError(_))));
    }
}
