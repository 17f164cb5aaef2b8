//! In-memory store used by the test suite.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

use super::{AdminStore, NewsStore};
use crate::BoxError;
use crate::models::{AdminRecord, AdminSession, ScrapedArticle};

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub news: Mutex<Vec<ScrapedArticle>>,
    pub admins: Mutex<Vec<AdminRecord>>,
    pub sessions: Mutex<Vec<AdminSession>>,
    /// Zero-based insert calls that should fail.
    pub failing_batches: HashSet<usize>,
    pub fail_retention: bool,
    pub fail_sessions: bool,
    pub insert_calls: Mutex<usize>,
    pub retention_calls: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn with_admin(admin: AdminRecord) -> Self {
        let store = Self::default();
        store.admins.lock().unwrap().push(admin);
        store
    }
}

impl NewsStore for MemoryStore {
    async fn insert_news(&self, rows: &[ScrapedArticle]) -> Result<usize, BoxError> {
        let call = {
            let mut calls = self.insert_calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if self.failing_batches.contains(&call) {
            return Err(format!("batch {call} rejected").into());
        }
        self.news.lock().unwrap().extend_from_slice(rows);
        Ok(rows.len())
    }

    async fn retain_latest(&self, keep: usize) -> Result<(), BoxError> {
        self.retention_calls.lock().unwrap().push(keep);
        if self.fail_retention {
            return Err("retention procedure missing".into());
        }
        let mut news = self.news.lock().unwrap();
        news.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        news.truncate(keep);
        Ok(())
    }

    async fn latest_news(&self, limit: usize) -> Result<Vec<Value>, BoxError> {
        let mut news = self.news.lock().unwrap().clone();
        news.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        news.truncate(limit);
        Ok(news
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?)
    }
}

impl AdminStore for MemoryStore {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminRecord>, BoxError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn find_admin_by_id(&self, id: &str) -> Result<Option<AdminRecord>, BoxError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create_session(&self, session: &AdminSession) -> Result<(), BoxError> {
        if self.fail_sessions {
            return Err("sessions table unavailable".into());
        }
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<AdminSession>, BoxError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.session_token == token)
            .cloned())
    }

    async fn record_login(&self, admin_id: &str, at: DateTime<Utc>) -> Result<(), BoxError> {
        if let Some(admin) = self
            .admins
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == admin_id)
        {
            admin.last_login = Some(at);
            admin.login_attempts = 0;
        }
        Ok(())
    }
}
