//! Data models for scraped news rows and admin accounts.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Source`]: A configured page to scrape, with its extraction strategy
//! - [`Candidate`]: A tentative article pulled out of markup
//! - [`ScrapedArticle`]: A normalized row ready for the `news_articles` table
//! - [`ScrapeReport`]: The outcome of one ingestion pass
//! - Admin types: [`AdminRecord`], [`AdminProfile`], [`AdminSession`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the article blocks of a source page are located.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Ordered list of generic selectors with an anchor fallback.
    #[default]
    Generic,
    /// A source-specific item selector.
    Css(String),
}

/// A configured external page that is scraped for content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    /// Display name, stored in the `source` column.
    pub name: String,
    /// Page URL, also the base for resolving relative links.
    pub url: String,
    /// `generic`, or `css: "<selector>"` in YAML.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub strategy: Strategy,
}

impl Source {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            strategy: Strategy::Generic,
        }
    }
}

/// Category label, assigned by which source list an article came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Education,
}

impl Category {
    /// Insertion priority: political sources first.
    pub fn tier(self) -> u8 {
        match self {
            Category::Politics => 1,
            Category::Education => 2,
        }
    }
}

/// A tentative article extracted from markup before filtering/normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub text: String,
    pub link: Option<String>,
    pub image: Option<String>,
}

/// A normalized news row, written as-is into the hosted table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrapedArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub source: String,
    pub url: String,
    pub category: Category,
    /// Scrape time, not the original publication time.
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub views: u32,
    pub comments: u32,
}

/// Counters returned by the scrape trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScrapeStats {
    pub total_scraped: usize,
    pub unique_articles: usize,
    pub inserted: usize,
}

/// The outcome of one ingestion pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub stats: ScrapeStats,
    pub articles: Vec<ScrapedArticle>,
}

/// A row of the `admin_users` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub login_attempts: i32,
}

fn default_active() -> bool {
    true
}

impl AdminRecord {
    /// The client-facing view of this admin, without the password hash.
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            last_login: self.last_login,
        }
    }
}

/// Sanitized admin fields returned to clients.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A row of the `admin_sessions` table. Insert-only; expiry is enforced on read.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdminSession {
    pub admin_id: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Body of the admin login function. Fields are optional so that missing
/// values surface as a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful admin login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub session_token: String,
    pub admin: AdminProfile,
    pub expires_at: DateTime<Utc>,
}
