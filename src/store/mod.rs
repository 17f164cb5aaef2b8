//! Persistence seams for the hosted database.
//!
//! The hosted platform owns the tables; this crate only talks to it through
//! these two traits:
//!
//! | Trait | Tables / procedures |
//! |-------|---------------------|
//! | [`NewsStore`] | `news_articles`, `cleanup_old_news(keep_count)` |
//! | [`AdminStore`] | `admin_users`, `admin_sessions` |
//!
//! [`supabase::SupabaseStore`] implements both over PostgREST.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;

use crate::BoxError;
use crate::models::{AdminRecord, AdminSession, ScrapedArticle};

#[cfg(test)]
pub mod memory;
pub mod supabase;

pub use supabase::SupabaseStore;

pub trait NewsStore: Send + Sync {
    /// Insert one batch; returns the number of rows written.
    fn insert_news(
        &self,
        rows: &[ScrapedArticle],
    ) -> impl Future<Output = Result<usize, BoxError>> + Send;

    /// Delete all but the `keep` most recent rows.
    fn retain_latest(&self, keep: usize) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Newest rows first, passed through untyped.
    fn latest_news(&self, limit: usize)
    -> impl Future<Output = Result<Vec<Value>, BoxError>> + Send;
}

pub trait AdminStore: Send + Sync {
    /// Case-insensitive match on `email`.
    fn find_admin_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<AdminRecord>, BoxError>> + Send;

    fn find_admin_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<AdminRecord>, BoxError>> + Send;

    fn create_session(
        &self,
        session: &AdminSession,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    fn find_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<AdminSession>, BoxError>> + Send;

    /// Stamp `last_login` and reset `login_attempts`.
    fn record_login(
        &self,
        admin_id: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}
