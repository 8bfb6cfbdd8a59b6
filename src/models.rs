//! Data models for scraped news articles.
//!
//! This module defines the core data structures shared across the pipeline:
//! - [`Region`] and [`Category`]: the two partitions of the source catalog
//! - [`Article`]: one scraped article in its normalized output shape
//!
//! The JSON field names of [`Article`] are a compatibility contract: the
//! downstream clustering and summarization tools consume the output file
//! keyed on these exact names, so renaming a field is a breaking change.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic partition of the source catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Region {
    NorthAmerica,
    Europe,
    Asia,
}

impl Region {
    /// All regions in the order a full run visits them.
    pub const ALL: [Region; 3] = [Region::NorthAmerica, Region::Europe, Region::Asia];

    /// The snake_case name used in output files and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "north_america",
            Region::Europe => "europe",
            Region::Asia => "asia",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editorial category of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Category {
    Technology,
    Business,
    Investing,
}

impl Category {
    /// All categories, used to seed zeroed report counters.
    pub const ALL: [Category; 3] = [
        Category::Technology,
        Category::Business,
        Category::Investing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Investing => "investing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped article, normalized into the common output shape.
///
/// Produced by the extractor on a successful parse and immutable afterwards.
/// `content_length` is always computed from `content`, never trusted from
/// any field on the page, and `scraped_at` is stamped when extraction
/// completes (RFC 3339).
///
/// Within one run's output file, `url` is unique: duplicates are dropped
/// with first-seen-wins semantics before an article is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Human-readable name of the source outlet.
    pub source: String,
    pub category: Category,
    pub region: Region,
    /// Absolute URL the article was scraped from.
    pub url: String,
    pub title: String,
    /// Byline text, or `""` when the page carries none.
    pub author: String,
    /// Meta description, or `""` when the page carries none.
    pub description: String,
    pub content: String,
    /// Publication date as printed on the page, or `""` when absent.
    pub date: String,
    /// Always `content.len()`.
    pub content_length: usize,
    /// RFC 3339 timestamp of when extraction completed.
    pub scraped_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> Article {
        Article {
            source: "TechCrunch".to_string(),
            category: Category::Technology,
            region: Region::NorthAmerica,
            url: "https://techcrunch.com/post".to_string(),
            title: "A headline".to_string(),
            author: "Jane Doe".to_string(),
            description: "A description".to_string(),
            content: "Body text".to_string(),
            date: "2025-03-01".to_string(),
            content_length: 9,
            scraped_at: "2025-03-01T12:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_article_json_contract_field_names() {
        let json = serde_json::to_value(sample_article()).unwrap();
        let obj = json.as_object().unwrap();
        for field in [
            "source",
            "category",
            "region",
            "url",
            "title",
            "author",
            "description",
            "content",
            "date",
            "content_length",
            "scraped_at",
        ] {
            assert!(obj.contains_key(field), "missing contract field {field}");
        }
        assert_eq!(obj.len(), 11);
    }

    #[test]
    fn test_region_serializes_snake_case() {
        let json = serde_json::to_string(&Region::NorthAmerica).unwrap();
        assert_eq!(json, r#""north_america""#);
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Region::NorthAmerica);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::Investing).unwrap();
        assert_eq!(json, r#""investing""#);
    }

    #[test]
    fn test_article_roundtrip() {
        let article = sample_article();
        let json = serde_json::to_string(&article).unwrap();
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back, article);
    }

    #[test]
    fn test_display_names_match_serde() {
        assert_eq!(Region::NorthAmerica.to_string(), "north_america");
        assert_eq!(Category::Technology.to_string(), "technology");
    }
}
