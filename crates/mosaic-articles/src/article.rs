//! Article records and selection.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of articles shown in the blog section.
pub const MAX_ARTICLES: usize = 6;

/// Article identifier, numeric or textual in the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::Number(n) => write!(f, "{}", n),
            ArticleId::Text(s) => f.write_str(s),
        }
    }
}

/// A blog article as stored in `articles.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Article {
    #[serde(default)]
    pub id: Option<ArticleId>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    /// Icon key, looked up in the renderer's icon table
    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub excerpt: Option<String>,

    /// ISO date (`2024-03-01`) or RFC 3339 timestamp
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    /// Only an explicit `false` hides the article
    #[serde(
        default,
        deserialize_with = "boolean_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub published: Option<bool>,
}

/// Keep a flag only when it is a JSON boolean; `"false"`, `0` and friends read as unset.
fn boolean_or_none<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_bool())
}

impl Article {
    /// Whether the article should be listed.
    pub fn is_published(&self) -> bool {
        self.published != Some(false)
    }

    /// Calendar date shown on the card, as written in the source.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }

        // Local timestamps without offset ("2024-03-01T10:00:00")
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }

    /// Instant used for ordering. Offsets are normalised to UTC; dates and
    /// local timestamps without an offset are read as UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Ok(local) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
            return Some(local.and_utc());
        }

        self.parsed_date()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
    }

    /// The placeholder record written when a site ships without a data directory.
    pub fn sample(date: NaiveDate) -> Self {
        Self {
            id: Some(ArticleId::Number(1)),
            title: Some("Comprendre l'infertilité du couple".to_string()),
            category: Some("Fertilité".to_string()),
            icon: Some("heart-pulse".to_string()),
            excerpt: Some(
                "Les causes de l'infertilité peuvent être multiples. Découvrez les facteurs à \
                 prendre en compte et les solutions disponibles pour les couples."
                    .to_string(),
            ),
            date: Some(date.format("%Y-%m-%d").to_string()),
            author: Some("Dr. Mboloko Esimo Justin".to_string()),
            content: Some("Contenu complet de l'article...".to_string()),
            published: Some(true),
        }
    }
}

/// Keep published articles, newest first, at most [`MAX_ARTICLES`].
///
/// Articles without a parseable date sort after dated ones; ties keep their
/// input order.
pub fn select_recent(articles: Vec<Article>) -> Vec<Article> {
    let mut published: Vec<Article> = articles.into_iter().filter(Article::is_published).collect();

    published.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    published.truncate(MAX_ARTICLES);
    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Vec<Article> {
        serde_json::from_str(json).unwrap()
    }

    fn ids(articles: &[Article]) -> Vec<String> {
        articles
            .iter()
            .map(|a| a.id.as_ref().map(|id| id.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn filters_unpublished_and_sorts_newest_first() {
        let articles = parse(
            r#"[
                {"id": 1, "date": "2024-01-01", "published": true},
                {"id": 2, "date": "2024-06-01", "published": false},
                {"id": 3, "date": "2024-03-01"}
            ]"#,
        );

        let selected = select_recent(articles);

        assert_eq!(ids(&selected), vec!["3", "1"]);
    }

    #[test]
    fn truncates_to_six() {
        let json = format!(
            "[{}]",
            (1..=9)
                .map(|i| format!(r#"{{"id": {}, "date": "2024-01-0{}"}}"#, i, i))
                .collect::<Vec<_>>()
                .join(",")
        );

        let selected = select_recent(parse(&json));

        assert_eq!(selected.len(), MAX_ARTICLES);
        assert_eq!(ids(&selected), vec!["9", "8", "7", "6", "5", "4"]);
    }

    #[test]
    fn undated_articles_sort_last() {
        let articles = parse(
            r#"[
                {"id": "a"},
                {"id": "b", "date": "not a date"},
                {"id": "c", "date": "2023-05-10T08:30:00Z"}
            ]"#,
        );

        let selected = select_recent(articles);

        assert_eq!(ids(&selected), vec!["c", "a", "b"]);
    }

    #[test]
    fn same_day_timestamps_sort_by_time() {
        let articles = parse(
            r#"[
                {"id": 1, "date": "2024-03-01T08:00:00Z"},
                {"id": 2, "date": "2024-03-01T18:00:00Z"},
                {"id": 3, "date": "2024-03-01T20:00:00+04:00"},
                {"id": 4, "date": "2024-03-01"}
            ]"#,
        );

        let selected = select_recent(articles);

        // 20:00+04:00 is 16:00 UTC; a bare date is midnight
        assert_eq!(ids(&selected), vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn non_boolean_published_counts_as_published() {
        let articles = parse(
            r#"[
                {"id": 1, "published": "false"},
                {"id": 2, "published": 0},
                {"id": 3, "published": null},
                {"id": 4, "published": false}
            ]"#,
        );

        assert_eq!(articles[0].published, None);
        assert_eq!(ids(&select_recent(articles)), vec!["1", "2", "3"]);
    }

    #[test]
    fn parses_date_variants() {
        let mut article = Article {
            date: Some("2024-02-29".to_string()),
            ..Default::default()
        };
        assert_eq!(article.parsed_date(), NaiveDate::from_ymd_opt(2024, 2, 29));

        article.date = Some("2024-02-29T23:00:00".to_string());
        assert_eq!(article.parsed_date(), NaiveDate::from_ymd_opt(2024, 2, 29));

        article.date = Some("2024-02-29T23:30:00-02:00".to_string());
        assert_eq!(article.parsed_date(), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(
            article.timestamp(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(1, 30, 0))
                .map(|dt| dt.and_utc())
        );

        article.date = None;
        assert_eq!(article.parsed_date(), None);
        assert_eq!(article.timestamp(), None);
    }

    #[test]
    fn sample_is_published() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let sample = Article::sample(date);

        assert!(sample.is_published());
        assert_eq!(sample.date.as_deref(), Some("2025-01-15"));
        assert_eq!(sample.id, Some(ArticleId::Number(1)));
    }
}
