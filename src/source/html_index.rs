//! HTML-index adapter: scans paginated article listing pages.
//!
//! Index pages are a soup of anchor elements; article permalinks are told
//! apart from navigation chrome by a path marker in the href and a minimum
//! headline length. Markup varies across page templates, so the headline and
//! date are located by fuzzy class-token rules rather than exact selectors.

use chrono::{Local, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::config::HtmlSource;
use crate::model::{canonical_url, RawCandidate, MIN_TITLE_LEN};
use crate::source::client::{self, FetchError};

/// A fuzzy element-matching rule: matches any element carrying a class token
/// that contains one of the hint fragments, case-insensitively.
///
/// Kompas templates use `articleTitle`, `article__title`, `most__title` and
/// friends interchangeably; substring matching covers the family without
/// enumerating every template revision.
pub(crate) struct ClassRule {
    hints: &'static [&'static str],
}

/// Headline elements inside an article anchor.
pub(crate) const TITLE_RULE: ClassRule = ClassRule {
    hints: &["title", "articletitle"],
};

/// Raw-date elements inside an article anchor.
pub(crate) const DATE_RULE: ClassRule = ClassRule {
    hints: &["date", "articledate"],
};

impl ClassRule {
    fn matches(&self, element: &scraper::node::Element) -> bool {
        element.classes().any(|class| {
            let class = class.to_ascii_lowercase();
            self.hints.iter().any(|hint| class.contains(hint))
        })
    }

    /// First descendant of `root` matching the rule, as collapsed text.
    pub(crate) fn find_in(&self, root: ElementRef<'_>) -> Option<String> {
        root.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.id() != root.id())
            .find(|el| self.matches(el.value()))
            .map(collapsed_text)
    }
}

/// Element text with runs of whitespace collapsed to single spaces.
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn page_url(template: &str, page: u32) -> String {
    template.replace("{page}", &page.to_string())
}

/// Extract article candidates from one index page payload.
///
/// A candidate is accepted only if its href contains the source's path
/// marker and its headline exceeds [`MIN_TITLE_LEN`] characters. The
/// headline comes from a title-classed descendant when one exists, falling
/// back to the anchor's own text; the raw date is taken from a date-classed
/// descendant when present.
pub(crate) fn extract_candidates(
    html: &str,
    src: &HtmlSource,
    scraped_at: NaiveDateTime,
) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");

    let mut candidates = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(&src.article_path_marker) {
            continue;
        }

        let title = TITLE_RULE
            .find_in(anchor)
            .unwrap_or_else(|| collapsed_text(anchor));
        if title.chars().count() <= MIN_TITLE_LEN {
            continue;
        }

        candidates.push(RawCandidate {
            source: src.name.clone(),
            title,
            url: canonical_url(href),
            raw_date: DATE_RULE.find_in(anchor),
            scraped_at,
        });
    }
    candidates
}

/// Fetch and scan all configured index pages for one source.
///
/// Pages are fetched sequentially with a fixed delay between them. A failed
/// page (fetch error, non-2xx status) is logged and skipped; it never aborts
/// the remaining pages or the run.
pub async fn extract(
    client: &reqwest::Client,
    src: &HtmlSource,
    page_delay: Duration,
) -> Vec<RawCandidate> {
    let scraped_at = Local::now().naive_local();
    let mut candidates = Vec::new();

    for page in 1..=src.pages {
        let url = page_url(&src.index_url, page);
        match client::fetch_bytes(client, &url).await {
            Ok(bytes) => {
                let html = String::from_utf8_lossy(&bytes);
                let found = extract_candidates(&html, src, scraped_at);
                tracing::debug!(
                    source = %src.name,
                    page = page,
                    candidates = found.len(),
                    "Scanned index page"
                );
                candidates.extend(found);
            }
            Err(FetchError::HttpStatus(status)) => {
                tracing::warn!(source = %src.name, page = page, status = status, "Index page returned non-success status, skipping");
            }
            Err(e) => {
                tracing::warn!(source = %src.name, page = page, error = %e, "Index page fetch failed, skipping");
            }
        }

        if page < src.pages {
            tokio::time::sleep(page_delay).await;
        }
    }

    tracing::info!(
        source = %src.name,
        candidates = candidates.len(),
        "Index extraction complete"
    );
    candidates
}
