//! PostgREST-backed store for a Supabase project.

use chrono::{DateTime, Utc};
use postgrest::Postgrest;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::{AdminStore, NewsStore};
use crate::BoxError;
use crate::config::Settings;
use crate::models::{AdminRecord, AdminSession, ScrapedArticle};
use crate::utils::truncate_for_log;

#[derive(Clone)]
pub struct SupabaseStore {
    client: Postgrest,
    news_table: String,
    retention_procedure: String,
    admins_table: String,
    sessions_table: String,
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("news_table", &self.news_table)
            .field("admins_table", &self.admins_table)
            .field("sessions_table", &self.sessions_table)
            .finish()
    }
}

impl SupabaseStore {
    /// Connect with the service-role key; table names come from `settings`.
    pub fn new(project_url: &str, service_key: &str, settings: &Settings) -> Self {
        let client = Postgrest::new(format!("{}/rest/v1", project_url.trim_end_matches('/')))
            .insert_header("apikey", service_key)
            .insert_header("Authorization", format!("Bearer {service_key}"));
        Self {
            client,
            news_table: settings.news_table.clone(),
            retention_procedure: settings.retention_procedure.clone(),
            admins_table: settings.admins_table.clone(),
            sessions_table: settings.sessions_table.clone(),
        }
    }
}

/// Turn a PostgREST reply into its body, treating non-2xx as an error.
fn check(status: u16, body: String, what: &str) -> Result<String, BoxError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(format!("{what} failed with status {status}: {}", truncate_for_log(&body, 300)).into())
    }
}

fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, BoxError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(body)?)
}

/// `ilike` treats `_` and `%` as wildcards, so the rows it returns are
/// narrowed to an exact case-insensitive match here.
fn same_email(rows: Vec<AdminRecord>, email: &str) -> Option<AdminRecord> {
    let email = email.to_lowercase();
    rows.into_iter().find(|row| row.email.to_lowercase() == email)
}

impl NewsStore for SupabaseStore {
    #[instrument(level = "info", skip_all, fields(table = %self.news_table, rows = rows.len()))]
    async fn insert_news(&self, rows: &[ScrapedArticle]) -> Result<usize, BoxError> {
        let payload = serde_json::to_string(rows)?;
        let response = self
            .client
            .from(&self.news_table)
            .insert(payload)
            .execute()
            .await?;
        let status = response.status().as_u16();
        check(status, response.text().await?, "news insert")?;
        Ok(rows.len())
    }

    #[instrument(level = "info", skip(self), fields(procedure = %self.retention_procedure))]
    async fn retain_latest(&self, keep: usize) -> Result<(), BoxError> {
        let params = json!({ "keep_count": keep }).to_string();
        let response = self
            .client
            .rpc(&self.retention_procedure, params)
            .execute()
            .await?;
        let status = response.status().as_u16();
        check(status, response.text().await?, "retention")?;
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn latest_news(&self, limit: usize) -> Result<Vec<Value>, BoxError> {
        let response = self
            .client
            .from(&self.news_table)
            .select("*")
            .order("published_at.desc")
            .limit(limit)
            .execute()
            .await?;
        let status = response.status().as_u16();
        let body = check(status, response.text().await?, "news query")?;
        parse_rows(&body)
    }
}

impl AdminStore for SupabaseStore {
    #[instrument(level = "info", skip_all)]
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminRecord>, BoxError> {
        let response = self
            .client
            .from(&self.admins_table)
            .select("*")
            .ilike("email", email)
            .execute()
            .await?;
        let status = response.status().as_u16();
        let body = check(status, response.text().await?, "admin lookup")?;
        let rows: Vec<AdminRecord> = parse_rows(&body)?;
        let admin = same_email(rows, email);
        debug!(found = admin.is_some(), "Admin lookup by email");
        Ok(admin)
    }

    #[instrument(level = "info", skip(self))]
    async fn find_admin_by_id(&self, id: &str) -> Result<Option<AdminRecord>, BoxError> {
        let response = self
            .client
            .from(&self.admins_table)
            .select("*")
            .eq("id", id)
            .limit(1)
            .execute()
            .await?;
        let status = response.status().as_u16();
        let body = check(status, response.text().await?, "admin lookup")?;
        let mut rows: Vec<AdminRecord> = parse_rows(&body)?;
        Ok(rows.pop())
    }

    #[instrument(level = "info", skip_all, fields(admin_id = %session.admin_id))]
    async fn create_session(&self, session: &AdminSession) -> Result<(), BoxError> {
        let payload = serde_json::to_string(session)?;
        let response = self
            .client
            .from(&self.sessions_table)
            .insert(payload)
            .execute()
            .await?;
        let status = response.status().as_u16();
        check(status, response.text().await?, "session insert")?;
        Ok(())
    }

    #[instrument(level = "info", skip_all)]
    async fn find_session(&self, token: &str) -> Result<Option<AdminSession>, BoxError> {
        let response = self
            .client
            .from(&self.sessions_table)
            .select("*")
            .eq("session_token", token)
            .limit(1)
            .execute()
            .await?;
        let status = response.status().as_u16();
        let body = check(status, response.text().await?, "session lookup")?;
        let mut rows: Vec<AdminSession> = parse_rows(&body)?;
        Ok(rows.pop())
    }

    #[instrument(level = "info", skip(self))]
    async fn record_login(&self, admin_id: &str, at: DateTime<Utc>) -> Result<(), BoxError> {
        let payload = json!({ "last_login": at, "login_attempts": 0 }).to_string();
        let response = self
            .client
            .from(&self.admins_table)
            .eq("id", admin_id)
            .update(payload)
            .execute()
            .await?;
        let status = response.status().as_u16();
        check(status, response.text().await?, "admin update")?;
        Ok(())
    }
}
