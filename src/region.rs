//! Per-region orchestration of the scraping pipeline.
//!
//! A [`RegionScraper`] walks one region's sources in catalog order. Per
//! source: fetch the index page, discover article links with the source's
//! link rule, then fetch and extract each article. The load-bearing
//! guarantee is partial-failure isolation — a dead index page fails that
//! source only, and a bad article page skips that article only. Nothing
//! short of a fatal configuration error aborts a run.
//!
//! After every source completes (or fails) the shared [`RunState`] is
//! flushed through the [`StateSink`], and the cancel token is checked
//! before each new source begins.

use crate::error::ExtractionError;
use crate::extractor;
use crate::fetcher::PageFetcher;
use crate::models::{Category, Region};
use crate::outputs::json::StateSink;
use crate::sources::SourceDescriptor;
use crate::state::{RunState, Stage};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use url::Url;

/// Index pages routinely list hundreds of teasers; this bounds how many
/// links one source may contribute even without an explicit `--articles`.
const MAX_LINKS_PER_SOURCE: usize = 15;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Cooperative stop flag, honored at source-boundary granularity: the
/// in-flight fetch may complete, but no new source begins after it fires.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scrapes all sources of one region into a shared [`RunState`].
pub struct RegionScraper<'a> {
    fetcher: &'a dyn PageFetcher,
    region: Region,
    category: Option<Category>,
    max_articles: Option<usize>,
}

impl<'a> RegionScraper<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        region: Region,
        category: Option<Category>,
        max_articles: Option<usize>,
    ) -> Self {
        Self {
            fetcher,
            region,
            category,
            max_articles,
        }
    }

    /// Process `sources` in order, flushing state after each one.
    pub async fn scrape(
        &self,
        sources: &[&SourceDescriptor],
        state: &mut RunState,
        sink: &dyn StateSink,
        cancel: &CancelToken,
    ) {
        for source in sources {
            if cancel.is_cancelled() {
                info!(
                    region = %self.region,
                    "Cancellation requested; not starting further sources"
                );
                break;
            }

            info!(source = source.name, region = %self.region, "Processing source");
            state.sources_attempted += 1;
            let before = state.articles.len();
            self.scrape_source(source, state).await;
            info!(
                source = source.name,
                accepted = state.articles.len() - before,
                "Completed source"
            );

            if let Err(e) = sink.flush(state).await {
                warn!(source = source.name, error = %e, "Incremental flush failed");
            }
        }
    }

    async fn scrape_source(&self, source: &SourceDescriptor, state: &mut RunState) {
        let index = match self.fetcher.fetch(source.index_url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(source = source.name, kind = ?e.kind, error = %e, "Index fetch failed; skipping source");
                state.sources_failed += 1;
                state.record_error(source.name, None, Stage::Index, e.to_string());
                return;
            }
        };

        let cap = self.max_articles.unwrap_or(MAX_LINKS_PER_SOURCE).min(MAX_LINKS_PER_SOURCE);
        let links = match discover_links(&index.body, source, cap) {
            Ok(links) => links,
            Err(e) => {
                warn!(source = source.name, error = %e, "Link discovery failed; skipping source");
                state.sources_failed += 1;
                state.record_error(source.name, None, Stage::Index, e.to_string());
                return;
            }
        };
        info!(source = source.name, count = links.len(), "Discovered article links");

        for link in links {
            if state.has_seen(&link) {
                continue;
            }

            let page = match self.fetcher.fetch(&link).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(source = source.name, url = %link, kind = ?e.kind, error = %e, "Article fetch failed; skipping");
                    state.record_error(source.name, Some(&link), Stage::Fetch, e.to_string());
                    continue;
                }
            };

            let article = match extractor::extract(&page.body, &link, source) {
                Ok(article) => article,
                Err(e) => {
                    warn!(source = source.name, url = %link, error = %e, "Extraction failed; skipping");
                    state.record_error(source.name, Some(&link), Stage::Extract, e.to_string());
                    continue;
                }
            };

            // Catalog filtering already narrowed the source list, but the
            // accept path re-checks so a mixed batch can never leak through.
            if self.category.is_some_and(|want| article.category != want)
                || article.region != self.region
            {
                continue;
            }

            state.add_article(article);
        }

        state.sources_succeeded += 1;
    }
}

/// Discover article links on an index page.
///
/// For each element matching the source's link rule, take the element's
/// own `href` when it is itself an anchor, otherwise its first descendant
/// anchor. Relative hrefs are resolved against the index URL; fragment
/// stubs and repeats are dropped; discovery order is preserved.
pub fn discover_links(
    body: &str,
    source: &SourceDescriptor,
    cap: usize,
) -> Result<Vec<String>, ExtractionError> {
    let selector = Selector::parse(source.link_selector)
        .map_err(|_| ExtractionError::BadSelector(source.link_selector.to_string()))?;
    let Ok(base) = Url::parse(source.index_url) else {
        // Catalog URLs are unit-tested; an unparseable one yields nothing.
        return Ok(Vec::new());
    };

    let document = Html::parse_document(body);
    let mut links: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        if links.len() >= cap {
            break;
        }
        let href = if element.value().name() == "a" {
            element.value().attr("href")
        } else {
            element
                .select(&ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
        };
        let Some(href) = href else { continue };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let resolved = resolved.to_string();
        if resolved.ends_with('#') || links.contains(&resolved) {
            continue;
        }
        links.push(resolved);
    }
    Ok(links)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{FailureKind, FetchError};
    use crate::fetcher::FetchedPage;
    use crate::models::{Category, Region};
    use crate::outputs::json::NullSink;
    use crate::sources::FieldRules;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves canned pages from a map; everything else fails permanently.
    pub(crate) struct MockFetcher {
        pages: HashMap<String, String>,
    }

    impl MockFetcher {
        pub(crate) fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        pub(crate) fn page(mut self, url: &str, body: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), body.into());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    body: body.clone(),
                    status: 200,
                }),
                None => Err(FetchError {
                    url: url.to_string(),
                    kind: FailureKind::Retryable,
                    attempts: 4,
                    message: "scripted outage".to_string(),
                }),
            }
        }
    }

    pub(crate) fn source(
        name: &'static str,
        index_url: &'static str,
        category: Category,
    ) -> SourceDescriptor {
        SourceDescriptor {
            name,
            region: Region::Europe,
            category,
            index_url,
            link_selector: ".teaser",
            rules: FieldRules {
                title: "h1",
                content: ".body",
                date: "time",
                author: None,
                description: None,
            },
        }
    }

    pub(crate) fn index_page(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|l| format!(r#"<div class="teaser"><a href="{l}">teaser</a></div>"#))
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    pub(crate) fn article_page(title: &str) -> String {
        format!(
            r#"<html><body><h1>{title}</h1><div class="body"><p>Text of {title}.</p></div></body></html>"#
        )
    }

    #[tokio::test]
    async fn test_two_links_yield_two_articles_in_discovery_order() {
        let fetcher = MockFetcher::new()
            .page("https://wire.test/", &index_page(&["/a", "/b"]))
            .page("https://wire.test/a", article_page("A"))
            .page("https://wire.test/b", article_page("B"));
        let src = source("Wire", "https://wire.test/", Category::Technology);
        let scraper = RegionScraper::new(&fetcher, Region::Europe, None, None);
        let mut state = RunState::new();

        scraper
            .scrape(&[&src], &mut state, &NullSink, &CancelToken::new())
            .await;

        let titles: Vec<_> = state.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(state.sources_succeeded, 1);
    }

    #[tokio::test]
    async fn test_failed_source_does_not_poison_the_rest() {
        let fetcher = MockFetcher::new()
            .page("https://one.test/", &index_page(&["/a"]))
            .page("https://one.test/a", article_page("One A"))
            // two.test index is absent: every fetch of it fails
            .page("https://three.test/", &index_page(&["/c"]))
            .page("https://three.test/c", article_page("Three C"));
        let sources = [
            source("One", "https://one.test/", Category::Technology),
            source("Two", "https://two.test/", Category::Technology),
            source("Three", "https://three.test/", Category::Technology),
        ];
        let refs: Vec<&SourceDescriptor> = sources.iter().collect();
        let scraper = RegionScraper::new(&fetcher, Region::Europe, None, None);
        let mut state = RunState::new();

        scraper
            .scrape(&refs, &mut state, &NullSink, &CancelToken::new())
            .await;

        let titles: Vec<_> = state.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["One A", "Three C"]);
        assert_eq!(state.sources_failed, 1);
        let index_failures: Vec<_> = state
            .errors
            .iter()
            .filter(|e| e.source == "Two" && e.stage == Stage::Index)
            .collect();
        assert_eq!(index_failures.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_article_page_is_skipped_not_fatal() {
        let fetcher = MockFetcher::new()
            .page("https://wire.test/", &index_page(&["/good", "/bad"]))
            .page("https://wire.test/good", article_page("Good"))
            .page("https://wire.test/bad", "<html><body>no structure</body></html>");
        let src = source("Wire", "https://wire.test/", Category::Technology);
        let scraper = RegionScraper::new(&fetcher, Region::Europe, None, None);
        let mut state = RunState::new();

        scraper
            .scrape(&[&src], &mut state, &NullSink, &CancelToken::new())
            .await;

        assert_eq!(state.articles.len(), 1);
        assert_eq!(state.articles_skipped(), 1);
        assert_eq!(state.sources_succeeded, 1);
    }

    #[tokio::test]
    async fn test_category_filter_applied_on_accept() {
        let fetcher = MockFetcher::new()
            .page("https://biz.test/", &index_page(&["/x"]))
            .page("https://biz.test/x", article_page("Biz X"));
        let src = source("Biz", "https://biz.test/", Category::Business);
        let scraper =
            RegionScraper::new(&fetcher, Region::Europe, Some(Category::Technology), None);
        let mut state = RunState::new();

        scraper
            .scrape(&[&src], &mut state, &NullSink, &CancelToken::new())
            .await;

        assert!(state.articles.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_urls_across_sources_dropped() {
        let shared = "https://wire.test/shared";
        let fetcher = MockFetcher::new()
            .page("https://wire.test/", &index_page(&["/shared"]))
            .page("https://mirror.test/", &index_page(&[shared]))
            .page(shared, article_page("Shared"));
        let sources = [
            source("Wire", "https://wire.test/", Category::Technology),
            source("Mirror", "https://mirror.test/", Category::Technology),
        ];
        let refs: Vec<&SourceDescriptor> = sources.iter().collect();
        let scraper = RegionScraper::new(&fetcher, Region::Europe, None, None);
        let mut state = RunState::new();

        scraper
            .scrape(&refs, &mut state, &NullSink, &CancelToken::new())
            .await;

        assert_eq!(state.articles.len(), 1);
        assert_eq!(state.articles[0].source, "Wire");
    }

    #[tokio::test]
    async fn test_cancellation_stops_before_next_source() {
        let fetcher = MockFetcher::new()
            .page("https://one.test/", &index_page(&["/a"]))
            .page("https://one.test/a", article_page("One A"));
        let sources = [
            source("One", "https://one.test/", Category::Technology),
            source("Two", "https://two.test/", Category::Technology),
        ];
        let refs: Vec<&SourceDescriptor> = sources.iter().collect();
        let scraper = RegionScraper::new(&fetcher, Region::Europe, None, None);
        let mut state = RunState::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        scraper.scrape(&refs, &mut state, &NullSink, &cancel).await;

        assert_eq!(state.sources_attempted, 0);
        assert!(state.articles.is_empty());
    }

    #[test]
    fn test_discover_links_resolves_and_caps() {
        let src = source("Wire", "https://wire.test/section/", Category::Technology);
        let body = index_page(&["/abs", "relative", "https://other.test/full", "/abs"]);
        let links = discover_links(&body, &src, 10).unwrap();
        assert_eq!(
            links,
            vec![
                "https://wire.test/abs",
                "https://wire.test/section/relative",
                "https://other.test/full",
            ]
        );

        let capped = discover_links(&body, &src, 2).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_discover_links_skips_fragment_stubs() {
        let src = source("Wire", "https://wire.test/", Category::Technology);
        let body = index_page(&["/real", "#"]);
        let links = discover_links(&body, &src, 10).unwrap();
        assert_eq!(links, vec!["https://wire.test/real"]);
    }

    #[test]
    fn test_discover_links_element_itself_an_anchor() {
        let mut src = source("Wire", "https://wire.test/", Category::Technology);
        src.link_selector = "a.tout";
        let body = r#"<html><body><a class="tout" href="/direct">x</a></body></html>"#;
        let links = discover_links(body, &src, 10).unwrap();
        assert_eq!(links, vec!["https://wire.test/direct"]);
    }
}
