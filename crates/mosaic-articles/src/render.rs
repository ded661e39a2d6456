//! HTML rendering for the blog article panel.

use chrono::{Datelike, NaiveDate};
use minijinja::{context, Environment, HtmlEscape};

use crate::article::Article;
use crate::loader::ArticleError;

/// Icon used when an article names no icon or an unknown one.
const DEFAULT_ICON: &str = "heart-pulse";

/// SVG path data for the icons articles may reference.
const ICONS: &[(&str, &str)] = &[
    (
        "heart-pulse",
        r#"<path d="M19 14c1.49-1.46 3-3.21 3-5.5A5.5 5.5 0 0 0 16.5 3c-1.76 0-3 .5-4.5 2-1.5-1.5-2.74-2-4.5-2A5.5 5.5 0 0 0 2 8.5c0 2.29 1.51 4.04 3 5.5l7 7Z"></path><path d="M3.22 12H9.5l.5-1 2 4.5 2-7 1.5 3.5h5.27"></path>"#,
    ),
    (
        "dna",
        r#"<path d="M2 12c6-6 10-6 14 0"></path><path d="M2 12c6 6 10 6 14 0"></path><path d="M8 12h8"></path>"#,
    ),
    (
        "clipboard-list",
        r#"<rect width="8" height="4" x="8" y="2" rx="1" ry="1"></rect><path d="M16 4h2a2 2 0 0 1 2 2v14a2 2 0 0 1-2 2H6a2 2 0 0 1-2-2V6a2 2 0 0 1 2-2h2"></path><path d="M12 11h4"></path><path d="M12 16h4"></path><path d="M8 11h.01"></path><path d="M8 16h.01"></path>"#,
    ),
    (
        "microscope",
        r#"<path d="M6 18h8"></path><path d="M3 22h18"></path><path d="M14 22a7 7 0 1 0 0-14h-1"></path><path d="M9 14h2"></path><path d="M9 12a2 2 0 0 1-2-2V6h6v4a2 2 0 0 1-2 2Z"></path><path d="M12 6V3a1 1 0 0 0-1-1H9a1 1 0 0 0-1 1v3"></path>"#,
    ),
    (
        "stethoscope",
        r#"<path d="M11 2v2"></path><path d="M5 2v2"></path><path d="M5 3H4a2 2 0 0 0-2 2v4a6 6 0 0 0 12 0V5a2 2 0 0 0-2-2h-1"></path><path d="M8 15a6 6 0 0 0 12 0v-3"></path><circle cx="20" cy="10" r="2"></circle>"#,
    ),
    (
        "hormone",
        r#"<path d="M22 12h-4l-3 9L9 3l-3 9H2"></path><circle cx="12" cy="12" r="2"></circle>"#,
    ),
    (
        "book-open",
        r#"<path d="M2 3h6a4 4 0 0 1 4 4v14a3 3 0 0 0-3-3H2z"></path><path d="M22 3h-6a4 4 0 0 0-4 4v14a3 3 0 0 1 3-3h7z"></path>"#,
    ),
    (
        "baby-bottle",
        r#"<path d="M9 2v2"></path><path d="M9 4v2"></path><path d="M9 6h6v2a4 4 0 0 1-4 4v8a2 2 0 0 1-2 2H9a2 2 0 0 1-2-2v-8a4 4 0 0 1-4-4V6h6"></path>"#,
    ),
];

const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// Look up icon path data, falling back to the default icon.
pub fn icon_paths(key: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(name, _)| *name == key)
        .or_else(|| ICONS.iter().find(|(name, _)| *name == DEFAULT_ICON))
        .map(|(_, paths)| *paths)
        .unwrap_or_default()
}

/// Format a date the way the site displays it: `1 janv. 2024`.
pub fn format_date_fr(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_FR[date.month0() as usize],
        date.year()
    )
}

/// Rendered content for the articles container.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    /// Article cards
    Articles { count: usize, html: String },

    /// Inline message shown instead of articles
    Message { html: String },
}

impl Panel {
    pub fn html(&self) -> &str {
        match self {
            Panel::Articles { html, .. } | Panel::Message { html } => html,
        }
    }

    pub fn article_count(&self) -> usize {
        match self {
            Panel::Articles { count, .. } => *count,
            Panel::Message { .. } => 0,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Panel::Message { .. })
    }
}

/// Renders article cards and status messages.
pub struct ArticleRenderer {
    env: Environment<'static>,
}

impl ArticleRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("article.html", ARTICLE_TEMPLATE)?;
        env.add_template("message.html", MESSAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the selected articles, or the empty-state message.
    pub fn render_panel(&self, articles: &[Article]) -> Panel {
        if articles.is_empty() {
            return self.message(
                "text-stone-400",
                "Aucun article disponible pour le moment.",
                Some("Assurez-vous que les articles ont \"published\": true dans articles.json"),
            );
        }

        let html: String = articles
            .iter()
            .enumerate()
            .map(|(index, article)| {
                self.render_article(article, index).unwrap_or_else(|e| {
                    tracing::error!("Failed to render article {:?}: {}", article.id, e);
                    fallback_card(article)
                })
            })
            .collect();

        Panel::Articles {
            count: articles.len(),
            html,
        }
    }

    /// Render a load failure as an inline message.
    pub fn render_error(&self, error: &ArticleError) -> Panel {
        match error {
            ArticleError::NotAnArray => self.message(
                "text-red-400",
                "Erreur: Format de données invalide dans articles.json",
                None,
            ),
            other => self.message(
                "text-stone-400",
                "❌ Erreur lors du chargement des articles",
                Some(&other.to_string()),
            ),
        }
    }

    /// Render one article card.
    pub fn render_article(
        &self,
        article: &Article,
        index: usize,
    ) -> Result<String, minijinja::Error> {
        let icon_name = article.icon.as_deref().unwrap_or(DEFAULT_ICON);
        let date = article.parsed_date().map(format_date_fr).unwrap_or_default();

        self.env.get_template("article.html")?.render(context! {
            id => article.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            delay => index * 100,
            icon_name => icon_name,
            icon_svg => icon_paths(icon_name),
            category => article.category.as_deref().unwrap_or("Article"),
            title => article.title.as_deref().unwrap_or_default(),
            excerpt => article.excerpt.as_deref().unwrap_or_default(),
            date => date,
        })
    }

    fn message(&self, tone: &str, text: &str, detail: Option<&str>) -> Panel {
        let html = self
            .env
            .get_template("message.html")
            .and_then(|t| t.render(context! { tone => tone, text => text, detail => detail }))
            .unwrap_or_else(|e| {
                tracing::error!("Failed to render message panel: {}", e);
                format!(
                    r#"<div class="col-span-full text-center py-12 {}"><p>{}</p></div>"#,
                    HtmlEscape(tone),
                    HtmlEscape(text)
                )
            });

        Panel::Message { html }
    }
}

/// Minimal card used when the full template fails.
fn fallback_card(article: &Article) -> String {
    format!(
        r#"<article class="p-8 bg-white/10 rounded-2xl border border-white/10"><h3 class="text-white text-xl mb-4">{}</h3><p class="text-stone-400">{}</p></article>"#,
        HtmlEscape(article.title.as_deref().unwrap_or("Article")),
        HtmlEscape(article.excerpt.as_deref().unwrap_or_default())
    )
}

const ARTICLE_TEMPLATE: &str = r##"<article class="group relative p-8 rounded-2xl border-2 border-white/10 bg-white/[0.02] hover:border-teal-500/40 transition-all duration-500 hover:-translate-y-2 animate-on-scroll overflow-hidden cursor-pointer" style="transition-delay: {{ delay }}ms" data-article-id="{{ id }}">
<div class="relative z-10">
<div class="flex items-center justify-between mb-6">
<div class="w-12 h-12 rounded-xl bg-gradient-to-br from-teal-500/20 to-teal-600/10 border border-teal-500/30 flex items-center justify-center">
<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="lucide lucide-{{ icon_name }} text-teal-400">{{ icon_svg | safe }}</svg>
</div>
<span class="inline-block py-1.5 px-3 rounded-lg text-[10px] uppercase tracking-wider text-teal-400 bg-teal-500/10 border border-teal-500/20 font-geist font-medium">{{ category }}</span>
</div>
<h3 class="text-xl lg:text-2xl font-semibold mb-4 font-geist text-white group-hover:text-teal-300 transition-colors leading-tight">{{ title }}</h3>
<p class="text-sm text-stone-400 leading-relaxed font-geist line-clamp-3 mb-6">{{ excerpt }}</p>
<div class="flex items-center justify-between pt-4 border-t border-white/5">
<div class="flex items-center gap-2 text-xs text-stone-500 font-geist">
<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="lucide lucide-calendar"><path d="M8 2v4"></path><path d="M16 2v4"></path><rect width="18" height="18" x="3" y="4" rx="2"></rect><path d="M3 10h18"></path></svg>
<span>{{ date }}</span>
</div>
<div class="flex items-center gap-1 text-teal-400 text-xs font-medium font-geist">
<span>Lire</span>
<svg xmlns="http://www.w3.org/2000/svg" width="14" height="14" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="lucide lucide-arrow-right"><path d="M5 12h14"></path><path d="m12 5 7 7-7 7"></path></svg>
</div>
</div>
</div>
</article>
"##;

const MESSAGE_TEMPLATE: &str = r##"<div class="col-span-full text-center py-12 {{ tone }}">
  <p>{{ text }}</p>
  {% if detail %}<p class="text-xs text-stone-500 mt-2">{{ detail }}</p>{% endif %}
</div>
"##;
