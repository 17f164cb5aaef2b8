//! Page-to-candidate extraction strategies.
//!
//! Source markup is uncontrolled, so extraction is heuristic and never fails:
//! the worst case is an empty list. Each [`Strategy`] maps to one
//! [`PageExtractor`] so a quirky source can get its own logic without touching
//! the shared pipeline.
//!
//! # Generic strategy
//!
//! | Order | Selector | Cap |
//! |-------|----------|-----|
//! | 1 | `article` | 10 |
//! | 2 | `[class*="article"]` | 10 |
//! | 3 | `[class*="news"]` | 10 |
//! | 4 | `[class*="post"]` | 10 |
//! | 5 | `[class*="story"]` | 10 |
//! | 6 | `[class*="item"]` | 10 |
//! | fallback | `a[href]` | 20 |

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::models::{Candidate, Strategy};
use crate::utils::collapse_whitespace;

const MAX_BLOCKS: usize = 10;
const MAX_ANCHORS: usize = 20;

static BLOCK_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        r#"[class*="article"]"#,
        r#"[class*="news"]"#,
        r#"[class*="post"]"#,
        r#"[class*="story"]"#,
        r#"[class*="item"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, .title, .headline").unwrap());
static SUMMARY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, .excerpt, .summary, .description").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Turns a page into candidate records.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Vec<Candidate>;
}

/// Ordered generic selectors, falling back to the page's anchors.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericExtractor;

impl PageExtractor for GenericExtractor {
    fn extract(&self, html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);

        for selector in BLOCK_SELECTORS.iter() {
            let blocks: Vec<ElementRef> = document.select(selector).take(MAX_BLOCKS).collect();
            if !blocks.is_empty() {
                debug!(count = blocks.len(), "Matched article blocks");
                return blocks.into_iter().map(block_candidate).collect();
            }
        }

        let anchors: Vec<Candidate> = document
            .select(&ANCHOR)
            .take(MAX_ANCHORS)
            .map(block_candidate)
            .collect();
        debug!(count = anchors.len(), "No article blocks; fell back to anchors");
        anchors
    }
}

/// A source-specific item selector; falls back to [`GenericExtractor`] when
/// the selector is invalid or matches nothing.
#[derive(Debug, Clone)]
pub struct CssExtractor {
    selector: Option<Selector>,
}

impl CssExtractor {
    pub fn new(item_selector: &str) -> Self {
        let selector = match Selector::parse(item_selector) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!(selector = item_selector, error = %e, "Invalid item selector; using generic extraction");
                None
            }
        };
        Self { selector }
    }
}

impl PageExtractor for CssExtractor {
    fn extract(&self, html: &str) -> Vec<Candidate> {
        if let Some(selector) = &self.selector {
            let document = Html::parse_document(html);
            let found: Vec<Candidate> = document
                .select(selector)
                .take(MAX_BLOCKS)
                .map(block_candidate)
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        GenericExtractor.extract(html)
    }
}

/// The extractor for a configured strategy.
pub fn extractor_for(strategy: &Strategy) -> Box<dyn PageExtractor> {
    match strategy {
        Strategy::Generic => Box::new(GenericExtractor),
        Strategy::Css(selector) => Box::new(CssExtractor::new(selector)),
    }
}

fn text_of(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn first_text(element: ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(text_of)
        .find(|text| !text.is_empty())
}

/// Read title, text, link and image out of one block (or a bare anchor).
fn block_candidate(element: ElementRef) -> Candidate {
    let is_anchor = element.value().name() == "a";
    let anchor = if is_anchor {
        Some(element)
    } else {
        element.select(&ANCHOR).next()
    };

    let title = first_text(element, &HEADING)
        .or_else(|| anchor.map(text_of).filter(|t| !t.is_empty()))
        .or_else(|| element.value().attr("title").map(collapse_whitespace))
        .unwrap_or_default();

    let text = first_text(element, &SUMMARY).unwrap_or_else(|| text_of(element));

    let link = anchor
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let image = element
        .select(&IMAGE)
        .find_map(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
        })
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty());

    Candidate {
        title,
        text,
        link,
        image,
    }
}
