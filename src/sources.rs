//! The source registry: a static, human-curated catalog of news outlets.
//!
//! Every outlet lays out its markup differently, so each entry carries its
//! own declarative selector rules: where article links live on the index
//! page, and where the title/content/date live on an article page. One
//! generic extractor dispatches over these rules instead of one scraper
//! type per site.
//!
//! The catalog is config data. It is never mutated at runtime; runs only
//! narrow it with [`select`].

use crate::models::{Category, Region};

/// CSS selector rules for pulling [`Article`] fields out of one source's
/// article pages. `author` and `description` are optional because most
/// outlets are covered by the extractor's generic fallback chains.
///
/// [`Article`]: crate::models::Article
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub title: &'static str,
    pub content: &'static str,
    pub date: &'static str,
    pub author: Option<&'static str>,
    pub description: Option<&'static str>,
}

/// Immutable description of one news outlet.
#[derive(Debug, Clone, Copy)]
pub struct SourceDescriptor {
    pub name: &'static str,
    pub region: Region,
    pub category: Category,
    /// The index page article links are discovered from.
    pub index_url: &'static str,
    /// Selector matching the index-page elements that contain article links.
    pub link_selector: &'static str,
    pub rules: FieldRules,
}

const fn rules(
    title: &'static str,
    content: &'static str,
    date: &'static str,
) -> FieldRules {
    FieldRules {
        title,
        content,
        date,
        author: None,
        description: None,
    }
}

static REGISTRY: &[SourceDescriptor] = &[
    // North America
    SourceDescriptor {
        name: "TechCrunch",
        region: Region::NorthAmerica,
        category: Category::Technology,
        index_url: "https://techcrunch.com/",
        link_selector: "article",
        rules: rules("h1", ".article-content", "time"),
    },
    SourceDescriptor {
        name: "CNBC",
        region: Region::NorthAmerica,
        category: Category::Investing,
        index_url: "https://www.cnbc.com/technology/",
        link_selector: "div.Card-standardBreakerCard",
        rules: rules("h1", ".ArticleBody-articleBody", "time"),
    },
    SourceDescriptor {
        name: "Ars Technica",
        region: Region::NorthAmerica,
        category: Category::Technology,
        index_url: "https://arstechnica.com/",
        link_selector: "article",
        rules: rules("h1", ".article-content", "time"),
    },
    SourceDescriptor {
        name: "VentureBeat",
        region: Region::NorthAmerica,
        category: Category::Technology,
        index_url: "https://venturebeat.com/",
        link_selector: "article",
        rules: rules("h1.article-title", ".article-content", "time"),
    },
    SourceDescriptor {
        name: "Business Insider",
        region: Region::NorthAmerica,
        category: Category::Business,
        index_url: "https://www.businessinsider.com/tech",
        link_selector: ".tout-title-link",
        rules: rules("h1", ".content-lock-content", "time"),
    },
    SourceDescriptor {
        name: "MarketWatch",
        region: Region::NorthAmerica,
        category: Category::Investing,
        index_url: "https://www.marketwatch.com/investing",
        link_selector: ".article__content",
        rules: rules("h1", ".article__body", "time"),
    },
    // Europe
    SourceDescriptor {
        name: "The Register",
        region: Region::Europe,
        category: Category::Technology,
        index_url: "https://www.theregister.com/",
        link_selector: "article",
        rules: rules("h1", ".article_copy", "time"),
    },
    SourceDescriptor {
        name: "The Guardian Tech",
        region: Region::Europe,
        category: Category::Technology,
        index_url: "https://www.theguardian.com/technology",
        link_selector: ".fc-item__container",
        rules: rules("h1", ".article-body-commercial-selector", "time"),
    },
    SourceDescriptor {
        name: "BBC Technology",
        region: Region::Europe,
        category: Category::Technology,
        index_url: "https://www.bbc.com/news/technology",
        link_selector: ".gs-c-promo",
        rules: rules("h1", ".ssrcss-11r1m41-RichTextComponentWrapper", "time"),
    },
    SourceDescriptor {
        name: "Handelsblatt",
        region: Region::Europe,
        category: Category::Technology,
        index_url: "https://www.handelsblatt.com/technik/",
        link_selector: ".o-teaser",
        rules: rules("h1, .c-headline", ".c-article-text", "time"),
    },
    SourceDescriptor {
        name: "Les Echos",
        region: Region::Europe,
        category: Category::Business,
        index_url: "https://www.lesechos.fr/tech-medias",
        link_selector: "article",
        rules: rules("h1", ".post-content", "time"),
    },
    SourceDescriptor {
        name: "El País Tecnología",
        region: Region::Europe,
        category: Category::Technology,
        index_url: "https://elpais.com/tecnologia/",
        link_selector: "article",
        rules: rules("h1", ".articulo__contenedor", "time"),
    },
    SourceDescriptor {
        name: "Börse Online",
        region: Region::Europe,
        category: Category::Investing,
        index_url: "https://www.boerse-online.de/nachrichten/themen/technologie",
        link_selector: ".row article",
        rules: rules("h1", ".article-body", "time"),
    },
    // Asia
    SourceDescriptor {
        name: "Nikkei Asia",
        region: Region::Asia,
        category: Category::Technology,
        index_url: "https://asia.nikkei.com/Business/Technology",
        link_selector: ".card-article",
        rules: rules("h1", ".ezrichtext-field", "time"),
    },
    SourceDescriptor {
        name: "South China Morning Post Tech",
        region: Region::Asia,
        category: Category::Technology,
        index_url: "https://www.scmp.com/tech",
        link_selector: ".article-title",
        rules: rules("h1", ".article-body-container", "time"),
    },
    SourceDescriptor {
        name: "The Economic Times Tech",
        region: Region::Asia,
        category: Category::Technology,
        index_url: "https://economictimes.indiatimes.com/tech",
        link_selector: ".article",
        rules: rules("h1", ".artText", "time"),
    },
    SourceDescriptor {
        name: "Tech in Asia",
        region: Region::Asia,
        category: Category::Technology,
        index_url: "https://www.techinasia.com/",
        link_selector: "article",
        rules: rules("h1", ".post-content", "time"),
    },
    SourceDescriptor {
        name: "Nikkan Kogyo",
        region: Region::Asia,
        category: Category::Technology,
        index_url: "https://www.nikkan.co.jp/category/ai",
        link_selector: ".news-list-item",
        rules: rules("h1", ".news-body", "time"),
    },
    SourceDescriptor {
        name: "Nikkei Stock",
        region: Region::Asia,
        category: Category::Investing,
        index_url: "https://www.nikkei.com/markets/kabu/",
        link_selector: ".k-card",
        rules: rules("h1", ".article-body", "time"),
    },
    SourceDescriptor {
        name: "The Business Times Singapore",
        region: Region::Asia,
        category: Category::Technology,
        index_url: "https://www.businesstimes.com.sg/technology",
        link_selector: ".card",
        rules: rules("h1.field-title", ".field-body", "time"),
    },
    SourceDescriptor {
        name: "Shanghai Securities News",
        region: Region::Asia,
        category: Category::Investing,
        index_url: "https://www.cnstock.com/v_technology/",
        link_selector: ".newslist li",
        rules: rules("h1", ".content", "time"),
    },
];

/// The full catalog, in the order a full run visits it.
pub fn registry() -> &'static [SourceDescriptor] {
    REGISTRY
}

/// Narrow the catalog for one run.
///
/// `max_per_region` caps how many sources are taken from each region
/// (limits are per-region, matching the one-process-per-region shape of
/// the original regional scrapers). Catalog order is preserved.
pub fn select(
    region: Option<Region>,
    category: Option<Category>,
    max_per_region: Option<usize>,
) -> Vec<&'static SourceDescriptor> {
    let mut selected = Vec::new();
    for r in Region::ALL {
        if region.is_some_and(|want| want != r) {
            continue;
        }
        let per_region = registry()
            .iter()
            .filter(|s| s.region == r)
            .filter(|s| category.is_none_or(|want| s.category == want))
            .take(max_per_region.unwrap_or(usize::MAX));
        selected.extend(per_region);
    }
    selected
}
