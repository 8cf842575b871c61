//! Article cleaning and validation
//!
//! Turns untrusted [`RawArticle`] records into validated [`Article`]s or
//! rejects them with a structured reason. Each article is processed
//! independently; one bad record never aborts the batch.

use crate::config::CleaningConfig;
use crate::error::{CleanRejection, Error, Result};
use crate::types::{Article, RawArticle};
use chrono::{DateTime, Utc};
use regex::Regex;

/// Author values treated as absent even when the feed sends them
const AUTHOR_PLACEHOLDERS: &[&str] = &["unknown", "null", "none", "n/a", "-"];

/// Emoji ranges stripped from text fields
///
/// Covers emoticons, pictographs, transport symbols, flags, dingbats,
/// and enclosed characters. The ranges become literal characters inside
/// a regex class, so matching is a plain codepoint comparison.
const EMOJI_PATTERN: &str = "[\u{1F600}-\u{1F64F}\u{1F300}-\u{1F5FF}\u{1F680}-\u{1F6FF}\u{1F1E0}-\u{1F1FF}\u{2702}-\u{27B0}\u{24C2}-\u{1F251}]+";

/// HTML entities: named, decimal numeric, and hex numeric
const ENTITY_PATTERN: &str = r"&[a-zA-Z]+;|&#\d+;|&#x[0-9a-fA-F]+;";

/// Control characters other than the whitespace ones (\t \n \x0B \x0C \r),
/// which the whitespace pass collapses instead
const CONTROL_PATTERN: &str = r"[\x00-\x08\x0E-\x1F\x7F]";

/// Result of cleaning a batch of raw articles
///
/// Rejections are counted per reason; `articles` preserves input order.
#[derive(Debug, Default)]
pub struct CleanOutcome {
    /// Articles that passed every rule
    pub articles: Vec<Article>,

    /// Articles dropped for a missing or empty title
    pub rejected_missing_title: usize,

    /// Articles dropped for a missing or empty URL
    pub rejected_missing_url: usize,
}

impl CleanOutcome {
    /// Total rejected articles across all reasons
    pub fn rejected(&self) -> usize {
        self.rejected_missing_title + self.rejected_missing_url
    }
}

/// Cleans and validates raw articles
///
/// Holds the compiled patterns and length limits; construct once per run
/// and reuse across the batch.
pub struct Cleaner {
    config: CleaningConfig,
    emoji: Regex,
    entities: Regex,
    control: Regex,
    whitespace: Regex,
    url_prefix: Regex,
}

impl Cleaner {
    /// Create a cleaner with compiled patterns
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a pattern fails to compile.
    pub fn new(config: CleaningConfig) -> Result<Self> {
        Ok(Self {
            config,
            emoji: compile(EMOJI_PATTERN)?,
            entities: compile(ENTITY_PATTERN)?,
            control: compile(CONTROL_PATTERN)?,
            whitespace: compile(r"\s+")?,
            url_prefix: compile(r"^https?://\S+")?,
        })
    }

    /// Clean every article in a batch, counting rejections per reason
    ///
    /// `fetched_at` is stamped onto each article so a whole run shares one
    /// ingestion timestamp.
    pub fn clean_batch(&self, raw: Vec<RawArticle>, fetched_at: DateTime<Utc>) -> CleanOutcome {
        let total = raw.len();
        let mut outcome = CleanOutcome::default();

        for article in raw {
            match self.clean(&article, fetched_at) {
                Ok(cleaned) => outcome.articles.push(cleaned),
                Err(CleanRejection::MissingTitle) => {
                    tracing::debug!(
                        url = article.url.as_deref().unwrap_or("<none>"),
                        "rejecting article with missing title"
                    );
                    outcome.rejected_missing_title += 1;
                }
                Err(CleanRejection::MissingUrl) => {
                    tracing::debug!(
                        title = article.title.as_deref().unwrap_or("<none>"),
                        "rejecting article with missing url"
                    );
                    outcome.rejected_missing_url += 1;
                }
            }
        }

        tracing::info!(
            cleaned = outcome.articles.len(),
            rejected = outcome.rejected(),
            total = total,
            "Cleaned article batch"
        );

        outcome
    }

    /// Clean a single raw article or reject it
    ///
    /// Rules apply in a fixed order: validate title/url presence, sanitize
    /// text fields, truncate, default author/source, extract the URL, and
    /// parse the publication timestamp (falling back to `fetched_at` when
    /// missing or malformed).
    pub fn clean(
        &self,
        raw: &RawArticle,
        fetched_at: DateTime<Utc>,
    ) -> std::result::Result<Article, CleanRejection> {
        let raw_title = raw.title.as_deref().map(str::trim).unwrap_or("");
        if raw_title.is_empty() {
            return Err(CleanRejection::MissingTitle);
        }

        let raw_url = raw.url.as_deref().map(str::trim).unwrap_or("");
        if raw_url.is_empty() {
            return Err(CleanRejection::MissingUrl);
        }

        let title = self.clean_text(raw_title, self.config.max_title_length);
        // Sanitizing can empty a title that was all emoji or entities
        if title.is_empty() {
            return Err(CleanRejection::MissingTitle);
        }

        let description = raw
            .description
            .as_deref()
            .map(|d| self.clean_text(d, self.config.max_description_length))
            .unwrap_or_default();

        let author = self.clean_author(raw.author.as_deref());
        let source = self.clean_source(raw.source.as_ref().and_then(|s| s.name.as_deref()));
        let url = self.clean_url(raw_url);
        let published_date = self.parse_published(raw.published_at.as_deref(), &url, fetched_at);

        Ok(Article {
            title,
            source,
            author,
            description,
            url,
            published_date,
            fetched_at,
        })
    }

    /// Sanitize a text field: strip entities, emoji, and control characters,
    /// collapse whitespace runs, trim, and truncate to `max_len` characters
    fn clean_text(&self, text: &str, max_len: usize) -> String {
        let text = self.entities.replace_all(text, "");
        let text = self.emoji.replace_all(&text, "");
        let text = self.control.replace_all(&text, "");
        let text = self.whitespace.replace_all(&text, " ");
        truncate_chars(text.trim(), max_len)
    }

    /// Clean the author byline, substituting the default for anything
    /// missing, empty after cleaning, or a known placeholder
    fn clean_author(&self, author: Option<&str>) -> String {
        let Some(author) = author else {
            return self.config.default_author.clone();
        };

        let cleaned = self.clean_text(author, self.config.max_author_length);
        if cleaned.is_empty()
            || AUTHOR_PLACEHOLDERS
                .iter()
                .any(|p| cleaned.eq_ignore_ascii_case(p))
        {
            return self.config.default_author.clone();
        }

        cleaned
    }

    /// Clean the publisher name, substituting the default when missing
    /// or empty after cleaning
    fn clean_source(&self, source: Option<&str>) -> String {
        let Some(source) = source else {
            return self.config.default_author.clone();
        };

        let cleaned = self.entities.replace_all(source, "");
        let cleaned = self.whitespace.replace_all(&cleaned, " ");
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            self.config.default_author.clone()
        } else {
            cleaned.to_string()
        }
    }

    /// Extract the leading URL, dropping anything appended after it
    fn clean_url(&self, url: &str) -> String {
        match self.url_prefix.find(url) {
            Some(m) => m.as_str().to_string(),
            None => url.to_string(),
        }
    }

    /// Parse a publication timestamp, substituting the fetch time for
    /// missing or malformed values
    fn parse_published(
        &self,
        published_at: Option<&str>,
        url: &str,
        fetched_at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let Some(value) = published_at.map(str::trim).filter(|v| !v.is_empty()) else {
            return fetched_at;
        };

        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                tracing::warn!(
                    url = url,
                    published_at = value,
                    "Unparseable publishedAt, substituting fetch time"
                );
                fetched_at
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config {
        message: format!("invalid cleaning pattern: {e}"),
        key: Some("cleaning".to_string()),
    })
}

/// Truncate to at most `max` characters, trimming any whitespace the cut
/// exposes at the end
///
/// Counts characters rather than bytes so multi-byte text never splits
/// mid-codepoint.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let cut: String = text.chars().take(max).collect();
    cut.trim_end().to_string()
}
