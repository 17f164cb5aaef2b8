//! Scrape settings, loaded from an optional YAML file.
//!
//! Every field has a default, so a missing or partial file is valid:
//!
//! ```yaml
//! request_timeout_secs: 10
//! keep_count: 100
//! primary_sources:
//!   - name: Gov Wire
//!     url: https://example.gov/newsroom
//!     strategy:
//!       css: "div.press-release"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

use crate::BoxError;
use crate::models::Source;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Matched as plain substrings, so short stems that are also common word
/// fragments ("law" in "lawn", "state" in "estate") are spelled out in full.
const DEFAULT_KEYWORDS: &[&str] = &[
    "politic",
    "government",
    "election",
    "minister",
    "parliament",
    "senate",
    "congress",
    "president",
    "governor",
    "mayor",
    "legislat",
    "policy",
    "vote",
    "campaign",
    "party",
    "court",
    "lawmaker",
    "bill to",
    "budget",
    "federal",
    "statehouse",
    "state legislature",
    "nationwide",
    "county",
    "district",
    "province",
    "region",
    "education",
    "school",
    "university",
    "student",
];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause after each primary source.
    pub primary_delay_ms: u64,
    /// Pause after each secondary source.
    pub secondary_delay_ms: u64,
    pub batch_size: usize,
    pub keep_count: usize,
    pub news_table: String,
    pub retention_procedure: String,
    pub admins_table: String,
    pub sessions_table: String,
    pub session_ttl_hours: i64,
    pub keywords: Vec<String>,
    pub primary_sources: Vec<Source>,
    pub secondary_sources: Vec<Source>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            primary_delay_ms: 1000,
            secondary_delay_ms: 2000,
            batch_size: 10,
            keep_count: 100,
            news_table: "news_articles".to_string(),
            retention_procedure: "cleanup_old_news".to_string(),
            admins_table: "admin_users".to_string(),
            sessions_table: "admin_sessions".to_string(),
            session_ttl_hours: 8,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            primary_sources: vec![
                Source::new("AP Politics", "https://apnews.com/hub/politics"),
                Source::new("Politico", "https://www.politico.com/politics"),
                Source::new("The Hill", "https://thehill.com/homenews/"),
                Source::new("NPR Politics", "https://www.npr.org/sections/politics/"),
            ],
            secondary_sources: vec![
                Source::new("Education Week", "https://www.edweek.org/policy-politics"),
                Source::new("Inside Higher Ed", "https://www.insidehighered.com/news"),
            ],
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn primary_delay(&self) -> Duration {
        Duration::from_millis(self.primary_delay_ms)
    }

    pub fn secondary_delay(&self) -> Duration {
        Duration::from_millis(self.secondary_delay_ms)
    }

    /// Session lifetime, kept within `1..=MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, BoxError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&settings.session_ttl_hours) {
            return Err(format!(
                "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
                settings.session_ttl_hours
            )
            .into());
        }
        Ok(settings)
    }

    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, BoxError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = fs::read_to_string(path).await?;
        let settings = Self::from_yaml(&yaml)?;
        info!(
            primary = settings.primary_sources.len(),
            secondary = settings.secondary_sources.len(),
            keywords = settings.keywords.len(),
            "Loaded settings"
        );
        Ok(settings)
    }
}
