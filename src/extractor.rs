//! Selector-rule driven article extraction.
//!
//! Given the raw markup of an article page and the owning source's
//! [`FieldRules`], [`extract`] produces a normalized [`Article`] or a
//! typed [`ExtractionError`]. Title and content are required; author,
//! description and date degrade to the empty string so a sparse page
//! still yields a usable record.
//!
//! Each field is tried with the source's own rule first, then with a
//! generic fallback chain — real-world markup drifts, and the fallbacks
//! keep a stale rule from discarding an otherwise extractable page.
//!
//! Extraction never touches run state: identical markup and rules give
//! an identical record apart from the `scraped_at` stamp, which is taken
//! at extraction time.

use crate::error::ExtractionError;
use crate::models::Article;
use crate::sources::SourceDescriptor;
use chrono::Utc;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static TITLE_FALLBACK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, .headline, .article-title, .title").unwrap());
static CONTENT_FALLBACK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".article-body, .content, .entry-content, article").unwrap());
static DATE_FALLBACK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time, .date, .timestamp").unwrap());
static AUTHOR_FALLBACK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".author, [rel=\"author\"], [itemprop=\"author\"], .byline").unwrap()
});
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name=\"description\"]").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Extract an [`Article`] from raw markup using the source's field rules.
///
/// # Errors
///
/// [`ExtractionError::MissingField`] when the page yields no title or no
/// content text; [`ExtractionError::BadSelector`] when a rule in the
/// source catalog does not parse (a catalog bug, caught by unit tests).
pub fn extract(
    body: &str,
    url: &str,
    source: &SourceDescriptor,
) -> Result<Article, ExtractionError> {
    let document = Html::parse_document(body);

    let title = first_text(&document, source.rules.title, &TITLE_FALLBACK)?
        .ok_or(ExtractionError::MissingField("title"))?;

    let content = first_element(&document, source.rules.content, &CONTENT_FALLBACK)?
        .map(|el| paragraph_text(el))
        .unwrap_or_default();
    if content.is_empty() {
        return Err(ExtractionError::MissingField("content"));
    }

    let date = first_text(&document, source.rules.date, &DATE_FALLBACK)?.unwrap_or_default();

    let author = match source.rules.author {
        Some(rule) => first_text(&document, rule, &AUTHOR_FALLBACK)?,
        None => document
            .select(&AUTHOR_FALLBACK)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty()),
    }
    .unwrap_or_default();

    let description = match source.rules.description {
        Some(rule) => first_text(&document, rule, &META_DESCRIPTION)?,
        None => meta_description(&document),
    }
    .unwrap_or_default();

    debug!(%url, source = source.name, title = %title, bytes = content.len(), "Extracted article");

    Ok(Article {
        source: source.name.to_string(),
        category: source.category,
        region: source.region,
        url: url.to_string(),
        title,
        author,
        description,
        content_length: content.len(),
        content,
        date,
        scraped_at: Utc::now().to_rfc3339(),
    })
}

/// First non-empty text for the source rule, falling back to the generic
/// selector chain when the rule matches nothing.
fn first_text(
    document: &Html,
    rule: &str,
    fallback: &Selector,
) -> Result<Option<String>, ExtractionError> {
    let selector =
        Selector::parse(rule).map_err(|_| ExtractionError::BadSelector(rule.to_string()))?;
    let text = document
        .select(&selector)
        .map(element_text)
        .find(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(fallback)
                .map(element_text)
                .find(|t| !t.is_empty())
        });
    Ok(text)
}

fn first_element<'a>(
    document: &'a Html,
    rule: &str,
    fallback: &Selector,
) -> Result<Option<ElementRef<'a>>, ExtractionError> {
    let selector =
        Selector::parse(rule).map_err(|_| ExtractionError::BadSelector(rule.to_string()))?;
    Ok(document
        .select(&selector)
        .next()
        .or_else(|| document.select(fallback).next()))
}

/// Body text of a content container: its paragraphs joined with single
/// spaces, or the container's own text when it holds no `<p>` elements.
fn paragraph_text(element: ElementRef<'_>) -> String {
    let joined = element
        .select(&PARAGRAPH)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        element_text(element)
    } else {
        joined
    }
}

/// Whitespace-normalized text of one element.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn meta_description(document: &Html) -> Option<String> {
    document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Region};
    use crate::sources::FieldRules;

    fn test_source() -> SourceDescriptor {
        SourceDescriptor {
            name: "Test Wire",
            region: Region::Europe,
            category: Category::Technology,
            index_url: "https://news.test/",
            link_selector: "article",
            rules: FieldRules {
                title: "h1.story-title",
                content: ".story-body",
                date: "time",
                author: None,
                description: None,
            },
        }
    }

    const FULL_PAGE: &str = r#"
        <html><head>
          <meta name="description" content="A short teaser.">
        </head><body>
          <h1 class="story-title">Chips are down</h1>
          <div class="byline">By Ada Writer</div>
          <time>2025-02-03</time>
          <div class="story-body">
            <p>First paragraph.</p>
            <p>Second   paragraph.</p>
          </div>
        </body></html>"#;

    #[test]
    fn test_extracts_all_fields() {
        let article = extract(FULL_PAGE, "https://news.test/chips", &test_source()).unwrap();
        assert_eq!(article.title, "Chips are down");
        assert_eq!(article.content, "First paragraph. Second paragraph.");
        assert_eq!(article.author, "By Ada Writer");
        assert_eq!(article.description, "A short teaser.");
        assert_eq!(article.date, "2025-02-03");
        assert_eq!(article.source, "Test Wire");
        assert_eq!(article.region, Region::Europe);
        assert_eq!(article.category, Category::Technology);
        assert_eq!(article.url, "https://news.test/chips");
    }

    #[test]
    fn test_content_length_is_computed() {
        let article = extract(FULL_PAGE, "https://news.test/chips", &test_source()).unwrap();
        assert_eq!(article.content_length, article.content.len());
    }

    #[test]
    fn test_scraped_at_is_rfc3339() {
        let article = extract(FULL_PAGE, "https://news.test/chips", &test_source()).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&article.scraped_at).is_ok());
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let page = r#"<html><body><div class="story-body"><p>Text.</p></div></body></html>"#;
        let err = extract(page, "https://news.test/x", &test_source()).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField("title"));
    }

    #[test]
    fn test_missing_content_is_an_error() {
        let page = r#"<html><body><h1 class="story-title">Only a title</h1></body></html>"#;
        let err = extract(page, "https://news.test/x", &test_source()).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField("content"));
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let page = r#"<html><body>
            <h1 class="story-title">Bare bones</h1>
            <div class="story-body"><p>Some text.</p></div>
        </body></html>"#;
        let article = extract(page, "https://news.test/x", &test_source()).unwrap();
        assert_eq!(article.author, "");
        assert_eq!(article.description, "");
        assert_eq!(article.date, "");
    }

    #[test]
    fn test_title_fallback_chain() {
        // Source rule matches nothing; a plain h1 still works.
        let page = r#"<html><body>
            <h1>Fallback headline</h1>
            <div class="story-body"><p>Text.</p></div>
        </body></html>"#;
        let article = extract(page, "https://news.test/x", &test_source()).unwrap();
        assert_eq!(article.title, "Fallback headline");
    }

    #[test]
    fn test_content_without_paragraphs_uses_container_text() {
        let page = r#"<html><body>
            <h1 class="story-title">T</h1>
            <div class="story-body">Inline text only</div>
        </body></html>"#;
        let article = extract(page, "https://news.test/x", &test_source()).unwrap();
        assert_eq!(article.content, "Inline text only");
    }

    #[test]
    fn test_deterministic_apart_from_timestamp() {
        let a = extract(FULL_PAGE, "https://news.test/chips", &test_source()).unwrap();
        let b = extract(FULL_PAGE, "https://news.test/chips", &test_source()).unwrap();
        assert_eq!((a.title, a.content, a.date), (b.title, b.content, b.date));
    }
}
