//! Component assembler.
//!
//! Composes the single-page site from a template with named placeholder
//! containers and one HTML fragment per section. The template is never
//! modified; the composed document is written to a separate path.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// A named section of the page, filled from `<components>/<name>.html`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Header,
    Hero,
    Stats,
    About,
    Services,
    Blog,
    Expertise,
    Contact,
    Footer,
}

impl Slot {
    /// All slots, in assembly order.
    pub const ALL: [Slot; 9] = [
        Slot::Header,
        Slot::Hero,
        Slot::Stats,
        Slot::About,
        Slot::Services,
        Slot::Blog,
        Slot::Expertise,
        Slot::Contact,
        Slot::Footer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Header => "header",
            Slot::Hero => "hero",
            Slot::Stats => "stats",
            Slot::About => "about",
            Slot::Services => "services",
            Slot::Blog => "blog",
            Slot::Expertise => "expertise",
            Slot::Contact => "contact",
            Slot::Footer => "footer",
        }
    }

    /// Fragment file name inside the components directory.
    pub fn file_name(self) -> String {
        format!("{}.html", self.name())
    }

    /// Capitalized name used in the template's marker comment.
    fn label(self) -> String {
        capitalize(self.name())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a slot's placeholder is found in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// `<!-- Name Container -->` followed by the empty container div
    CommentedContainer,

    /// The empty container div on its own: `<div id="name-container"></div>`
    BareContainer,
}

impl Locator {
    /// Locators in the order they are tried.
    pub const ORDER: [Locator; 2] = [Locator::CommentedContainer, Locator::BareContainer];

    fn pattern(self, slot: Slot) -> Regex {
        let container = format!(
            r#"<div id="{}-container"></div>"#,
            regex::escape(slot.name())
        );

        let pattern = match self {
            Locator::CommentedContainer => format!(
                r"<!-- {} Container -->\s*{}",
                regex::escape(&slot.label()),
                container
            ),
            Locator::BareContainer => container,
        };

        // Both patterns are built from escaped literals.
        Regex::new(&pattern).expect("Invalid slot locator regex")
    }
}

/// What happened to a slot during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// Fragment inserted at every match of this locator
    Replaced(Locator),

    /// Fragment exists but no locator matched the template
    NoMatch,

    /// No fragment file for this slot
    Missing,
}

/// Errors that can occur during assembly.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to write composed document: {0}")]
    WriteError(String),
}

/// Paths used by the assembler.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Source template with placeholder containers
    pub template: PathBuf,

    /// Directory holding `<slot>.html` fragments
    pub components_dir: PathBuf,

    /// Composed document destination
    pub output: PathBuf,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("index.template.html"),
            components_dir: PathBuf::from("components"),
            output: PathBuf::from("index.html"),
        }
    }
}

/// Result of composing a template.
#[derive(Debug, Clone)]
pub struct Composition {
    pub html: String,
    pub outcomes: Vec<(Slot, SlotOutcome)>,
}

/// Result of an assembly run.
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    pub outcomes: Vec<(Slot, SlotOutcome)>,
    pub output_path: PathBuf,
}

impl AssemblyReport {
    /// Number of slots whose fragment was inserted.
    pub fn integrated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SlotOutcome::Replaced(_)))
            .count()
    }

    pub fn outcome(&self, slot: Slot) -> Option<SlotOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, o)| *o)
    }
}

static DATA_INJECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script id="dhws-dataInjector"[^>]*></script>"#)
        .expect("Invalid data injector regex")
});

static FRAGMENT_INJECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script id="dhws-dataInjector"[^>]*></script>\s*"#)
        .expect("Invalid fragment injector regex")
});

static LOADER_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script src="js/loader\.js"></script>\s*"#).expect("Invalid loader script regex")
});

static CONTAINER_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- \w+ Container -->\s*").expect("Invalid container comment regex")
});

/// Compose a template from the given fragments.
///
/// Slots absent from `fragments` are reported as [`SlotOutcome::Missing`] and
/// their placeholders are left for the cleanup pass.
pub fn compose(template: &str, fragments: &HashMap<Slot, String>) -> Composition {
    let mut html = template.to_string();
    let mut outcomes = Vec::with_capacity(Slot::ALL.len());

    for slot in Slot::ALL {
        let Some(fragment) = fragments.get(&slot) else {
            outcomes.push((slot, SlotOutcome::Missing));
            continue;
        };

        let content = FRAGMENT_INJECTOR_RE.replace_all(fragment, "");

        let outcome = Locator::ORDER
            .into_iter()
            .find_map(|locator| {
                let re = locator.pattern(slot);
                if !re.is_match(&html) {
                    return None;
                }
                html = re.replace_all(&html, NoExpand(&content)).into_owned();
                Some(SlotOutcome::Replaced(locator))
            })
            .unwrap_or(SlotOutcome::NoMatch);

        outcomes.push((slot, outcome));
    }

    Composition {
        html: finalize(html),
        outcomes,
    }
}

/// Drop loader scripts, keep only the last data injector before `</body>`
/// and strip leftover container comments.
fn finalize(html: String) -> String {
    let mut html = LOADER_SCRIPT_RE.replace_all(&html, "").into_owned();

    let last_injector = DATA_INJECTOR_RE
        .find_iter(&html)
        .last()
        .map(|m| m.as_str().to_string());

    if let Some(script) = last_injector {
        html = DATA_INJECTOR_RE.replace_all(&html, "").into_owned();
        if html.contains("</body>") {
            html = html.replacen("</body>", &format!("    {}\n  </body>", script), 1);
        } else {
            html.push_str(&script);
        }
    }

    CONTAINER_COMMENT_RE.replace_all(&html, "").into_owned()
}

/// Reads the template and fragments from disk and writes the composed page.
pub struct Assembler {
    config: AssembleConfig,
}

impl Assembler {
    pub fn new(config: AssembleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssembleConfig {
        &self.config
    }

    /// Assemble the composed document.
    pub fn run(&self) -> Result<AssemblyReport, AssembleError> {
        let template_path = &self.config.template;
        if !template_path.exists() {
            return Err(AssembleError::TemplateNotFound(
                template_path.display().to_string(),
            ));
        }
        if template_path == &self.config.output {
            tracing::warn!(
                "Template and output are the same file; a second run will find no placeholders"
            );
        }

        let template = fs::read_to_string(template_path).map_err(|e| AssembleError::ReadError {
            path: template_path.display().to_string(),
            message: e.to_string(),
        })?;

        let fragments = self.load_fragments()?;
        let composition = compose(&template, &fragments);

        for (slot, outcome) in &composition.outcomes {
            match outcome {
                SlotOutcome::Replaced(locator) => {
                    tracing::info!("Integrated {} ({:?})", slot.file_name(), locator);
                }
                SlotOutcome::NoMatch => {
                    tracing::info!("Integrated {} (no placeholder in template)", slot.file_name());
                }
                SlotOutcome::Missing => {}
            }
        }

        if let Some(parent) = self.config.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| AssembleError::WriteError(e.to_string()))?;
            }
        }

        fs::write(&self.config.output, &composition.html)
            .map_err(|e| AssembleError::WriteError(e.to_string()))?;

        tracing::info!("Assembled {}", self.config.output.display());

        Ok(AssemblyReport {
            outcomes: composition.outcomes,
            output_path: self.config.output.clone(),
        })
    }

    /// Read every fragment that exists; missing ones only warn.
    fn load_fragments(&self) -> Result<HashMap<Slot, String>, AssembleError> {
        let mut fragments = HashMap::new();

        for slot in Slot::ALL {
            let path = self.config.components_dir.join(slot.file_name());
            if !path.exists() {
                tracing::warn!("{} not found, skipping", slot.file_name());
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| AssembleError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            fragments.insert(slot, content);
        }

        Ok(fragments)
    }
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const INJECTOR: &str = r#"<script id="dhws-dataInjector" src="https://cdn.example/inject.js"></script>"#;

    fn template_with_all_slots() -> String {
        let mut body = String::new();
        for slot in Slot::ALL {
            body.push_str(&format!(
                "  <!-- {} Container -->\n  <div id=\"{}-container\"></div>\n",
                slot.label(),
                slot.name()
            ));
        }
        format!(
            "<html>\n<body>\n{}  <script src=\"js/loader.js\"></script>\n  <script src=\"js/main.js\"></script>\n</body>\n</html>\n",
            body
        )
    }

    fn all_fragments() -> HashMap<Slot, String> {
        Slot::ALL
            .into_iter()
            .map(|slot| (slot, format!("<section id=\"{}\">{}</section>", slot, slot)))
            .collect()
    }

    #[test]
    fn replaces_every_slot() {
        let composition = compose(&template_with_all_slots(), &all_fragments());

        for slot in Slot::ALL {
            assert!(composition
                .html
                .contains(&format!("<section id=\"{}\">{}</section>", slot, slot)));
            assert!(!composition
                .html
                .contains(&format!("<div id=\"{}-container\"></div>", slot)));
            assert!(!composition
                .html
                .contains(&format!("<!-- {} Container -->", slot.label())));
        }
        assert!(composition
            .outcomes
            .iter()
            .all(|(_, o)| *o == SlotOutcome::Replaced(Locator::CommentedContainer)));
        assert!(!composition.html.contains("js/loader.js"));
        assert!(composition.html.contains("js/main.js"));
    }

    #[test]
    fn missing_fragment_keeps_container_and_drops_comment() {
        let mut fragments = all_fragments();
        fragments.remove(&Slot::Blog);

        let composition = compose(&template_with_all_slots(), &fragments);

        assert!(composition.html.contains(r#"<div id="blog-container"></div>"#));
        assert!(!composition.html.contains("<!-- Blog Container -->"));
        assert_eq!(
            composition.outcomes.iter().find(|(s, _)| *s == Slot::Blog),
            Some(&(Slot::Blog, SlotOutcome::Missing))
        );
    }

    #[test]
    fn falls_back_to_bare_container() {
        let template = "<body>\n<div id=\"hero-container\"></div>\n</body>";
        let fragments = HashMap::from([(Slot::Hero, "<h1>Hero</h1>".to_string())]);

        let composition = compose(template, &fragments);

        assert_eq!(composition.html, "<body>\n<h1>Hero</h1>\n</body>");
        assert_eq!(
            composition.outcomes[1],
            (Slot::Hero, SlotOutcome::Replaced(Locator::BareContainer))
        );
    }

    #[test]
    fn reports_no_match_when_template_lacks_placeholder() {
        let fragments = HashMap::from([(Slot::Footer, "<footer></footer>".to_string())]);

        let composition = compose("<body></body>", &fragments);

        assert!(!composition.html.contains("<footer>"));
        assert_eq!(
            composition.outcomes.last(),
            Some(&(Slot::Footer, SlotOutcome::NoMatch))
        );
    }

    #[test]
    fn inserts_fragment_literally() {
        let template = r#"<div id="contact-container"></div>"#;
        let fragments = HashMap::from([(Slot::Contact, "<p>Fee: $1 or $$</p>".to_string())]);

        let composition = compose(template, &fragments);

        assert_eq!(composition.html, "<p>Fee: $1 or $$</p>");
    }

    #[test]
    fn collapses_data_injectors_to_last_before_body() {
        let template = format!(
            "<body>\n{}\n<div id=\"header-container\"></div>\n<script id=\"dhws-dataInjector\" data-v=\"2\"></script>\n{}\n</body>",
            INJECTOR, INJECTOR
        );
        let fragments = HashMap::from([(
            Slot::Header,
            format!("<header></header>\n{}\n", INJECTOR),
        )]);

        let composition = compose(&template, &fragments);

        assert_eq!(composition.html.matches("dhws-dataInjector").count(), 1);
        assert!(composition
            .html
            .ends_with(&format!("    {}\n  </body>", INJECTOR)));
    }

    #[test]
    fn keeps_last_injector_variant() {
        let template = "<body>\n<script id=\"dhws-dataInjector\" data-v=\"1\"></script>\n<script id=\"dhws-dataInjector\" data-v=\"2\"></script>\n</body>";

        let composition = compose(template, &HashMap::new());

        assert!(composition.html.contains(r#"data-v="2""#));
        assert!(!composition.html.contains(r#"data-v="1""#));
    }

    #[test]
    fn assembler_writes_separate_output_and_keeps_template() {
        let temp = tempdir().unwrap();
        let components = temp.path().join("components");
        fs::create_dir_all(&components).unwrap();

        let template_path = temp.path().join("index.template.html");
        let template = template_with_all_slots();
        fs::write(&template_path, &template).unwrap();
        fs::write(components.join("header.html"), "<header>Top</header>").unwrap();
        fs::write(components.join("footer.html"), "<footer>Bottom</footer>").unwrap();

        let assembler = Assembler::new(AssembleConfig {
            template: template_path.clone(),
            components_dir: components,
            output: temp.path().join("index.html"),
        });

        let first = assembler.run().unwrap();
        let composed = fs::read_to_string(temp.path().join("index.html")).unwrap();

        assert_eq!(first.integrated(), 2);
        assert_eq!(first.outcome(Slot::Hero), Some(SlotOutcome::Missing));
        assert!(composed.contains("<header>Top</header>"));
        assert!(composed.contains("<footer>Bottom</footer>"));
        assert_eq!(fs::read_to_string(&template_path).unwrap(), template);

        // A second run rebuilds from the untouched template
        let second = assembler.run().unwrap();
        assert_eq!(second.integrated(), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("index.html")).unwrap(),
            composed
        );
    }

    #[test]
    fn assembler_requires_template() {
        let temp = tempdir().unwrap();

        let assembler = Assembler::new(AssembleConfig {
            template: temp.path().join("missing.html"),
            components_dir: temp.path().join("components"),
            output: temp.path().join("index.html"),
        });

        assert!(matches!(
            assembler.run(),
            Err(AssembleError::TemplateNotFound(_))
        ));
    }
}
