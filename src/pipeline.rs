//! The ingestion pass behind the scrape trigger.
//!
//! One pass is strictly sequential: primary (political) sources in shuffled
//! order, then secondary (education) sources in shuffled order, with a
//! politeness pause after each source. Results are accumulated, deduplicated
//! and ranked once, then persisted in fixed-size batches followed by a single
//! retention call.
//!
//! Failures never abort the pass. A source that cannot be fetched contributes
//! nothing; a batch that cannot be inserted is skipped; a failed retention
//! call leaves the inserted rows in place. Nothing guards against two passes
//! running at once, and deduplication only looks at the current pass.

use chrono::Utc;
use rand::rng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::BoxError;
use crate::config::Settings;
use crate::models::{Category, ScrapeReport, ScrapeStats, ScrapedArticle, Source};
use crate::scrapers::extract::extractor_for;
use crate::scrapers::fetch::PageFetcher;
use crate::scrapers::normalize::normalize;
use crate::scrapers::rank::dedupe_and_rank;
use crate::scrapers::relevance::RelevanceFilter;
use crate::store::NewsStore;

/// Run one full scrape-and-persist pass.
///
/// # Errors
///
/// Only when no sources are configured at all; every other failure is
/// logged and absorbed into the report.
#[instrument(level = "info", skip_all)]
pub async fn run_scrape<F, S>(
    fetcher: &F,
    store: &S,
    settings: &Settings,
) -> Result<ScrapeReport, BoxError>
where
    F: PageFetcher,
    S: NewsStore,
{
    if settings.primary_sources.is_empty() && settings.secondary_sources.is_empty() {
        return Err("no sources configured".into());
    }

    let filter = RelevanceFilter::new(&settings.keywords);
    let tiers = [
        (
            shuffled(&settings.primary_sources),
            Category::Politics,
            settings.primary_delay(),
        ),
        (
            shuffled(&settings.secondary_sources),
            Category::Education,
            settings.secondary_delay(),
        ),
    ];

    let mut collected: Vec<ScrapedArticle> = Vec::new();
    for (sources, category, delay) in tiers {
        for source in &sources {
            let articles = scrape_source(fetcher, source, category, &filter).await;
            collected.extend(articles);
            pause(delay).await;
        }
    }

    let total_scraped = collected.len();
    if total_scraped == 0 {
        warn!("No articles found during scraping");
        return Ok(ScrapeReport {
            stats: ScrapeStats::default(),
            articles: Vec::new(),
        });
    }

    let ranked = dedupe_and_rank(collected);
    info!(
        total = total_scraped,
        unique = ranked.len(),
        "Deduplicated scraped articles"
    );

    let inserted = persist(store, &ranked, settings.batch_size, settings.keep_count).await;

    Ok(ScrapeReport {
        stats: ScrapeStats {
            total_scraped,
            unique_articles: ranked.len(),
            inserted,
        },
        articles: ranked,
    })
}

fn shuffled(sources: &[Source]) -> Vec<Source> {
    let mut sources = sources.to_vec();
    sources.shuffle(&mut rng());
    sources
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

/// Fetch, extract, normalize and filter a single source.
#[instrument(level = "info", skip_all, fields(source = %source.name, url = %source.url))]
async fn scrape_source<F: PageFetcher>(
    fetcher: &F,
    source: &Source,
    category: Category,
    filter: &RelevanceFilter,
) -> Vec<ScrapedArticle> {
    let base = match Url::parse(&source.url) {
        Ok(base) => base,
        Err(e) => {
            error!(error = %e, "Invalid source URL; skipping");
            return Vec::new();
        }
    };

    let Some(html) = fetcher.fetch(&source.url).await else {
        warn!("No markup for source; contributing zero articles");
        return Vec::new();
    };

    let candidates = extractor_for(&source.strategy).extract(&html);
    let now = Utc::now();
    let articles: Vec<ScrapedArticle> = candidates
        .iter()
        .filter_map(|candidate| normalize(candidate, source, &base, category, now))
        .filter(|article| filter.is_relevant(&format!("{} {}", article.title, article.excerpt)))
        .collect();

    info!(
        candidates = candidates.len(),
        kept = articles.len(),
        "Scraped source"
    );
    articles
}

/// Insert `articles` in batches of `batch_size`, then cap the table at `keep` rows.
///
/// Returns the number of rows inserted; failed batches are logged and skipped.
#[instrument(level = "info", skip(store, articles), fields(count = articles.len()))]
pub async fn persist<S: NewsStore>(
    store: &S,
    articles: &[ScrapedArticle],
    batch_size: usize,
    keep: usize,
) -> usize {
    let mut inserted = 0;
    for (index, batch) in articles.chunks(batch_size.max(1)).enumerate() {
        match store.insert_news(batch).await {
            Ok(count) => {
                inserted += count;
                info!(batch = index, count, "Inserted batch");
            }
            Err(e) => {
                error!(batch = index, size = batch.len(), error = %e, "Batch insert failed; skipping");
            }
        }
    }

    match store.retain_latest(keep).await {
        Ok(()) => info!(keep, "Applied retention"),
        Err(e) => error!(keep, error = %e, "Retention failed; inserted rows kept"),
    }

    inserted
}
