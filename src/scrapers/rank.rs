//! Batch deduplication and priority ordering.

use itertools::Itertools;
use rand::rng;
use rand::seq::SliceRandom;

use crate::models::ScrapedArticle;

/// Drop repeated titles (exact, case-insensitive, first seen wins), then put
/// tier 1 ahead of tier 2 with a random order inside each tier.
///
/// Near-duplicates that differ by more than letter case are kept.
pub fn dedupe_and_rank(articles: Vec<ScrapedArticle>) -> Vec<ScrapedArticle> {
    let unique: Vec<ScrapedArticle> = articles
        .into_iter()
        .unique_by(|a| a.title.to_lowercase())
        .collect();

    let mut rng = rng();
    let (mut first, mut rest): (Vec<_>, Vec<_>) =
        unique.into_iter().partition(|a| a.category.tier() == 1);
    first.shuffle(&mut rng);
    rest.shuffle(&mut rng);
    first.extend(rest);
    first
}
