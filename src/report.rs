//! Daily CSV report generation
//!
//! Renders the articles stored by a run into a dated CSV artifact and can
//! summarize an artifact after the fact. One file per calendar day; a rerun
//! on the same day overwrites that day's file.

use crate::config::ReportConfig;
use crate::db::StoredArticle;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Fixed column order of every report artifact
const CSV_HEADER: [&str; 8] = [
    "id",
    "title",
    "source",
    "author",
    "published_date",
    "description",
    "url",
    "fetched_at",
];

/// Aggregate view of a written report artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Data rows in the file (header excluded)
    pub article_count: usize,
    /// Distinct publisher names
    pub unique_sources: usize,
    /// Distinct author bylines
    pub unique_authors: usize,
    /// Artifact size on disk
    pub file_size_bytes: u64,
}

/// Writes and inspects CSV report artifacts
pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    /// Create a report writer for the configured output directory
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Path of the artifact for a given report date
    fn report_path(&self, date: NaiveDate) -> PathBuf {
        let filename = format!(
            "{}_{}.csv",
            self.config.file_prefix,
            date.format("%Y_%m_%d")
        );
        self.config.reports_dir.join(filename)
    }

    /// Write the report artifact for `date` from the given stored rows
    ///
    /// Creates the output directory when missing. Timestamps are rendered
    /// as RFC 3339; quoting and escaping follow RFC 4180 via the csv crate.
    pub fn generate(&self, articles: &[StoredArticle], date: NaiveDate) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config.reports_dir)?;

        let path = self.report_path(date);
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(CSV_HEADER)?;
        for article in articles {
            writer.write_record([
                article.id.to_string().as_str(),
                &article.title,
                &article.source,
                &article.author,
                &article.published_date.to_rfc3339(),
                &article.description,
                &article.url,
                &article.fetched_at.to_rfc3339(),
            ])?;
        }
        writer.flush()?;

        tracing::info!(
            path = %path.display(),
            articles = articles.len(),
            "Wrote CSV report"
        );

        Ok(path)
    }

    /// Summarize a previously written artifact by reading it back
    pub fn summarize(&self, path: &Path) -> Result<ReportSummary> {
        let file_size_bytes = std::fs::metadata(path)?.len();

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let source_idx = column_index(&headers, "source")?;
        let author_idx = column_index(&headers, "author")?;

        let mut article_count = 0;
        let mut sources = std::collections::HashSet::new();
        let mut authors = std::collections::HashSet::new();

        for record in reader.records() {
            let record = record?;
            article_count += 1;
            if let Some(source) = record.get(source_idx) {
                sources.insert(source.to_string());
            }
            if let Some(author) = record.get(author_idx) {
                authors.insert(author.to_string());
            }
        }

        Ok(ReportSummary {
            article_count,
            unique_sources: sources.len(),
            unique_authors: authors.len(),
            file_size_bytes,
        })
    }

    /// Find the newest artifact in the reports directory
    ///
    /// Filenames embed the date as `YYYY_MM_DD`, so lexicographic order is
    /// chronological order and the maximum filename is the latest report.
    pub fn latest_report(&self) -> Result<Option<PathBuf>> {
        if !self.config.reports_dir.is_dir() {
            return Ok(None);
        }

        let prefix = format!("{}_", self.config.file_prefix);
        let mut latest: Option<PathBuf> = None;

        for entry in std::fs::read_dir(&self.config.reports_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(&prefix) || !name.ends_with(".csv") {
                continue;
            }
            if latest
                .as_ref()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .is_none_or(|current| name > current)
            {
                latest = Some(path);
            }
        }

        Ok(latest)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::Report(format!("report is missing the '{name}' column")))
}
