//! Candidate normalization into the persisted row shape.

use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use tracing::debug;
use url::Url;

use crate::models::{Candidate, Category, ScrapedArticle, Source};
use crate::utils::{sanitize_title, truncate_with_ellipsis};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 1000;
pub const MAX_EXCERPT_CHARS: usize = 200;
/// Titles this short or shorter are navigation noise, not stories.
pub const MIN_TITLE_CHARS: usize = 10;

/// Build a row from a candidate, or `None` when the title is too short or
/// the article link does not resolve to an http(s) URL.
pub fn normalize(
    candidate: &Candidate,
    source: &Source,
    base: &Url,
    category: Category,
    now: DateTime<Utc>,
) -> Option<ScrapedArticle> {
    let title = sanitize_title(&candidate.title, MAX_TITLE_CHARS);
    if title.chars().count() <= MIN_TITLE_CHARS {
        return None;
    }

    let url = match candidate.link.as_deref() {
        Some(link) => match resolve(base, link) {
            Some(url) => url,
            None => {
                debug!(%link, "Discarding candidate with unresolvable link");
                return None;
            }
        },
        None => base.to_string(),
    };

    let image_url = match candidate.image.as_deref() {
        Some(image) => resolve(base, image),
        None => Some(placeholder_image(now)),
    };

    let body = if candidate.text.trim().is_empty() {
        candidate.title.trim()
    } else {
        candidate.text.trim()
    };
    let content = truncate_with_ellipsis(body, MAX_CONTENT_CHARS);
    let excerpt = truncate_with_ellipsis(&content, MAX_EXCERPT_CHARS);

    let mut rng = rng();
    Some(ScrapedArticle {
        title,
        content,
        excerpt,
        source: source.name.clone(),
        url,
        category,
        published_at: now,
        image_url,
        views: rng.random_range(100..=5000),
        comments: rng.random_range(0..=100),
    })
}

/// Resolve a possibly-relative reference against `base`, keeping only http(s) results.
fn resolve(base: &Url, reference: &str) -> Option<String> {
    let resolved = base.join(reference).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Stock image seeded by the scrape time rather than the content.
pub fn placeholder_image(now: DateTime<Utc>) -> String {
    format!(
        "https://picsum.photos/seed/{}/800/450",
        now.timestamp_millis()
    )
}
