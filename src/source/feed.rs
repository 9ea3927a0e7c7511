//! Feed adapter: RSS and Atom payloads.
//!
//! Entries are walked as raw XML events rather than through a typed feed
//! model: the publication date must survive as the literal text found in the
//! payload (several sources emit Indonesian-language dates that no feed
//! library will parse), and normalization happens downstream. Dialect
//! detection is by presence: `<item>` elements win, `<entry>` elements are
//! the fallback. Payloads that are not well-formed XML are reparsed
//! leniently as HTML markup before the source is given up on.

use chrono::{Local, NaiveDateTime};
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{ElementRef, Html, Selector};

use crate::config::FeedSource;
use crate::model::{canonical_url, RawCandidate};
use crate::source::client;

/// One item/entry as found in the payload, fields still unvalidated.
#[derive(Debug, Default)]
struct FeedEntry {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    raw_date: Option<String>,
}

impl FeedEntry {
    /// Resolve the entry's article link: `<link>` text, an Atom `href`
    /// attribute when the element carried no text, then `<guid>`/`<id>`.
    fn resolved_link(&self) -> Option<&str> {
        self.link
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.guid.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Extract article candidates from one feed payload.
///
/// An entry becomes a candidate only if both title and link are present and
/// non-empty; entries missing either are skipped without affecting the rest
/// of the feed.
pub(crate) fn extract_candidates(
    payload: &str,
    source: &str,
    scraped_at: NaiveDateTime,
) -> Vec<RawCandidate> {
    let entries = match parse_strict(payload) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(source = %source, error = %e, "Strict XML parse failed, reparsing leniently");
            parse_lenient(payload)
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
            let link = entry.resolved_link()?;
            Some(RawCandidate {
                source: source.to_string(),
                title: title.to_string(),
                url: canonical_url(link.trim()),
                raw_date: entry.raw_date.clone(),
                scraped_at,
            })
        })
        .collect()
}

/// Walk the payload as XML events, collecting `<item>` and `<entry>`
/// elements separately; items win when both are present.
fn parse_strict(payload: &str) -> Result<Vec<FeedEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(payload);
    reader.config_mut().trim_text(true);

    let mut items: Vec<FeedEntry> = Vec::new();
    let mut entries: Vec<FeedEntry> = Vec::new();

    let mut buf = Vec::new();
    let mut current: Option<FeedEntry> = None;
    // Depth below the item/entry element; fields are captured only at depth
    // 1 so that nested structures (e.g. Atom <source><title>) don't bleed in.
    let mut depth: usize = 0;
    let mut field: Option<&'static str> = None;
    let mut is_atom_entry = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let name = name.as_ref();
                match name {
                    b"item" | b"entry" if current.is_none() => {
                        current = Some(FeedEntry::default());
                        is_atom_entry = name == b"entry";
                        depth = 0;
                        field = None;
                    }
                    _ if current.is_some() => {
                        depth += 1;
                        if depth == 1 {
                            field = field_for(name);
                            if name == b"link" {
                                capture_link_href(&e, &reader, current.as_mut());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                // Atom link elements are usually self-closing with an href
                if current.is_some() && depth == 0 && e.name().as_ref() == b"link" {
                    capture_link_href(&e, &reader, current.as_mut());
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    // Unrecognized entities make the text unusable; skip it
                    if let Ok(text) = t.unescape() {
                        append_field(entry, field, &text);
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    let text = String::from_utf8_lossy(&t).into_owned();
                    append_field(entry, field, &text);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let name = name.as_ref();
                match name {
                    b"item" | b"entry" if current.is_some() && depth == 0 => {
                        let entry = current.take().unwrap_or_default();
                        if is_atom_entry {
                            entries.push(entry);
                        } else {
                            items.push(entry);
                        }
                    }
                    _ if current.is_some() => {
                        if depth == 1 {
                            field = None;
                        }
                        depth = depth.saturating_sub(1);
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e),
            _ => {}
        }
        buf.clear();
    }

    Ok(if items.is_empty() { entries } else { items })
}

/// Field name mapping: RSS children first, Atom fallbacks after.
fn field_for(name: &[u8]) -> Option<&'static str> {
    match name {
        b"title" => Some("title"),
        b"link" => Some("link"),
        b"guid" | b"id" => Some("guid"),
        b"pubDate" => Some("date"),
        b"published" => Some("date"),
        _ => None,
    }
}

fn append_field(entry: &mut FeedEntry, field: &'static str, text: &str) {
    let slot = match field {
        "title" => &mut entry.title,
        "link" => &mut entry.link,
        "guid" => &mut entry.guid,
        "date" => &mut entry.raw_date,
        _ => return,
    };
    match slot {
        // First element of a kind wins; later siblings are ignored
        Some(existing) if !existing.is_empty() => {}
        _ => *slot = Some(text.trim().to_string()),
    }
}

/// Take the `href` attribute of a `<link>` element when no link text has
/// been captured yet (Atom's `<link href="..."/>` form).
fn capture_link_href(
    e: &quick_xml::events::BytesStart<'_>,
    reader: &Reader<&[u8]>,
    entry: Option<&mut FeedEntry>,
) {
    let Some(entry) = entry else { return };
    if entry.link.as_deref().is_some_and(|l| !l.is_empty()) {
        return;
    }
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"href" {
            if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                entry.link = Some(value.trim().to_string());
            }
        }
    }
}

/// Lenient fallback: parse the payload as HTML markup and apply the same
/// item/entry extraction. The HTML parser treats `<link>` as a void element
/// with no text, so link-less entries resolve through the guid fallback,
/// which is the best a malformed feed offers.
fn parse_lenient(payload: &str) -> Vec<FeedEntry> {
    let document = Html::parse_document(payload);
    let item_sel = Selector::parse("item").expect("static selector");
    let entry_sel = Selector::parse("entry").expect("static selector");

    let mut elements: Vec<ElementRef> = document.select(&item_sel).collect();
    if elements.is_empty() {
        elements = document.select(&entry_sel).collect();
    }

    elements
        .into_iter()
        .map(|el| FeedEntry {
            title: child_text(el, "title"),
            link: child_text(el, "link").or_else(|| child_href(el, "link")),
            guid: child_text(el, "guid").or_else(|| child_text(el, "id")),
            raw_date: child_text(el, "pubdate").or_else(|| child_text(el, "published")),
        })
        .collect()
}

fn child_text(parent: ElementRef<'_>, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    parent
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn child_href(parent: ElementRef<'_>, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    parent
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Fetch one feed and extract its candidates.
///
/// Any fetch failure is logged and yields zero candidates; a single source's
/// failure degrades output completeness but never aborts the run.
pub async fn extract(client: &reqwest::Client, src: &FeedSource) -> Vec<RawCandidate> {
    let scraped_at = Local::now().naive_local();

    let bytes = match client::fetch_bytes(client, &src.url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(source = %src.name, url = %src.url, error = %e, "Feed fetch failed, skipping source");
            return Vec::new();
        }
    };

    let payload = String::from_utf8_lossy(&bytes);
    let candidates = extract_candidates(&payload, &src.name, scraped_at);
    tracing::info!(
        source = %src.name,
        candidates = candidates.len(),
        "Feed extraction complete"
    );
    candidates
}
