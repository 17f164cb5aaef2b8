//! Admin login and session checks.
//!
//! Every credential failure (unknown email, inactive account, unreadable
//! stored hash, wrong password) produces the same 401 body, so a caller
//! cannot tell which one happened. There is no lockout: `login_attempts` is
//! only ever reset, on success.

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::BoxError;
use crate::error::ApiError;
use crate::models::{AdminProfile, AdminSession, LoginRequest, LoginResponse};
use crate::store::AdminStore;
use crate::utils::random_token;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INVALID_SESSION: &str = "Invalid or expired session";
const TOKEN_LEN: usize = 64;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Who is logging in, as far as the request headers tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
            .or_else(|| header("x-real-ip"));
        Self {
            ip_address,
            user_agent: header("user-agent"),
        }
    }
}

/// Successful session check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub admin: AdminProfile,
    pub expires_at: DateTime<Utc>,
}

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, BoxError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("Hashing failed: {e}"))?
        .to_string();
    Ok(hash)
}

/// Check `password` against a stored PHC string. An unparsable hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Validate credentials and open a session lasting `ttl`.
#[instrument(level = "info", skip_all, fields(ip = ?meta.ip_address))]
pub async fn login<S: AdminStore>(
    store: &S,
    request: LoginRequest,
    meta: ClientMeta,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<LoginResponse, ApiError> {
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    let email = email.to_lowercase();

    let admin = match store.find_admin_by_email(&email).await {
        Ok(Some(admin)) if admin.is_active => admin,
        Ok(Some(_)) => {
            info!("Login for inactive admin");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(None) => {
            info!("Login for unknown email");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        Err(e) => {
            error!(error = %e, "Admin lookup failed");
            return Err(ApiError::internal("Internal server error"));
        }
    };

    if !verify_password(password, &admin.password_hash) {
        info!(admin_id = %admin.id, "Password mismatch");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let session = AdminSession {
        admin_id: admin.id.clone(),
        session_token: random_token(TOKEN_LEN),
        expires_at: now + ttl,
        ip_address: meta.ip_address,
        user_agent: meta.user_agent,
        created_at: now,
    };
    if let Err(e) = store.create_session(&session).await {
        error!(admin_id = %admin.id, error = %e, "Failed to create session");
        return Err(ApiError::internal("Failed to create session"));
    }

    if let Err(e) = store.record_login(&admin.id, now).await {
        warn!(admin_id = %admin.id, error = %e, "Failed to record login; session still valid");
    }

    info!(admin_id = %admin.id, expires_at = %session.expires_at, "Admin logged in");
    let mut profile = admin.profile();
    profile.last_login = Some(now);
    Ok(LoginResponse {
        success: true,
        session_token: session.session_token,
        admin: profile,
        expires_at: session.expires_at,
    })
}

/// Resolve a session token to its admin, if the session is still live.
#[instrument(level = "info", skip_all)]
pub async fn verify_session<S: AdminStore>(
    store: &S,
    token: &str,
    now: DateTime<Utc>,
) -> Result<SessionResponse, ApiError> {
    if token.is_empty() {
        return Err(ApiError::unauthorized(INVALID_SESSION));
    }

    let session = match store.find_session(token).await {
        Ok(Some(session)) if !session.is_expired(now) => session,
        Ok(_) => return Err(ApiError::unauthorized(INVALID_SESSION)),
        Err(e) => {
            error!(error = %e, "Session lookup failed");
            return Err(ApiError::internal("Internal server error"));
        }
    };

    match store.find_admin_by_id(&session.admin_id).await {
        Ok(Some(admin)) if admin.is_active => Ok(SessionResponse {
            success: true,
            admin: admin.profile(),
            expires_at: session.expires_at,
        }),
        Ok(_) => Err(ApiError::unauthorized(INVALID_SESSION)),
        Err(e) => {
            error!(error = %e, "Admin lookup failed");
            Err(ApiError::internal("Internal server error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdminRecord;
    use crate::store::memory::MemoryStore;
    use axum::http::{HeaderValue, StatusCode};

    const PASSWORD: &str = "correct horse battery staple";
    static HASH: Lazy<String> = Lazy::new(|| hash_password(PASSWORD).unwrap());

    fn admin(active: bool) -> AdminRecord {
        AdminRecord {
            id: "admin-1".to_string(),
            email: "editor@example.com".to_string(),
            password_hash: HASH.clone(),
            name: Some("Editor".to_string()),
            role: Some("admin".to_string()),
            is_active: active,
            last_login: None,
            login_attempts: 4,
        }
    }

    fn request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    async fn attempt(store: &MemoryStore, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        login(store, req, ClientMeta::default(), Duration::hours(8), Utc::now()).await
    }

    #[test]
    fn test_hash_and_verify() {
        assert!(HASH.starts_with("$argon2id$"));
        assert!(verify_password(PASSWORD, &HASH));
        assert!(!verify_password("wrong", &HASH));
        assert!(!verify_password(PASSWORD, "not-a-phc-string"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn test_client_meta_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert("user-agent", HeaderValue::from_static("Browser/1.0"));
        let meta = ClientMeta::from_headers(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(meta.user_agent.as_deref(), Some("Browser/1.0"));

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(ClientMeta::from_headers(&headers).ip_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(ClientMeta::from_headers(&HeaderMap::new()), ClientMeta::default());
    }

    #[tokio::test]
    async fn test_successful_login() {
        let store = MemoryStore::with_admin(admin(true));
        let now = Utc::now();
        let meta = ClientMeta {
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("Browser/1.0".to_string()),
        };
        let response = login(&store, request(" Editor@Example.com ", PASSWORD), meta, Duration::hours(8), now)
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.session_token.len(), TOKEN_LEN);
        assert_eq!(response.expires_at, now + Duration::hours(8));
        assert_eq!(response.admin.email, "editor@example.com");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["admin"].get("password_hash").is_none());
        assert!(!json.to_string().contains("$argon2"));

        let sessions = store.sessions.lock().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].admin_id, "admin-1");
        assert_eq!(sessions[0].session_token, response.session_token);
        assert_eq!(sessions[0].ip_address.as_deref(), Some("203.0.113.9"));

        let admins = store.admins.lock().unwrap();
        assert_eq!(admins[0].login_attempts, 0);
        assert_eq!(admins[0].last_login, Some(now));
    }

    #[tokio::test]
    async fn test_wrong_password_matches_unknown_email() {
        let store = MemoryStore::with_admin(admin(true));
        let wrong = attempt(&store, request("editor@example.com", "guess")).await.unwrap_err();
        let unknown = attempt(&store, request("nobody@example.com", PASSWORD)).await.unwrap_err();

        assert_eq!(wrong.code, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.code, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.body.0, unknown.body.0);
        assert_eq!(wrong.message(), INVALID_CREDENTIALS);
        assert!(store.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_case_stored_email_can_log_in() {
        let mut stored = admin(true);
        stored.email = "Editor@Example.COM".to_string();
        let store = MemoryStore::with_admin(stored);
        let response = attempt(&store, request("editor@example.com", PASSWORD)).await.unwrap();
        assert_eq!(response.admin.id, "admin-1");
        assert_eq!(response.admin.email, "Editor@Example.COM");
    }

    #[tokio::test]
    async fn test_inactive_admin_is_rejected() {
        let store = MemoryStore::with_admin(admin(false));
        let err = attempt(&store, request("editor@example.com", PASSWORD)).await.unwrap_err();
        assert_eq!(err.code, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let store = MemoryStore::with_admin(admin(true));

        let missing = attempt(&store, LoginRequest::default()).await.unwrap_err();
        assert_eq!(missing.code, StatusCode::BAD_REQUEST);
        assert_eq!(missing.message(), "Email and password are required");

        let blank = attempt(&store, request("editor@example.com", "")).await.unwrap_err();
        assert_eq!(blank.code, StatusCode::BAD_REQUEST);

        let malformed = attempt(&store, request("editor.example.com", PASSWORD)).await.unwrap_err();
        assert_eq!(malformed.code, StatusCode::BAD_REQUEST);
        assert_eq!(malformed.message(), "Invalid email format");
    }

    #[tokio::test]
    async fn test_session_failure_is_internal_error() {
        let mut store = MemoryStore::with_admin(admin(true));
        store.fail_sessions = true;
        let err = attempt(&store, request("editor@example.com", PASSWORD)).await.unwrap_err();
        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_verify_session() {
        let store = MemoryStore::with_admin(admin(true));
        let now = Utc::now();
        let response = login(&store, request("editor@example.com", PASSWORD), ClientMeta::default(), Duration::hours(8), now)
            .await
            .unwrap();

        let live = verify_session(&store, &response.session_token, now + Duration::hours(7))
            .await
            .unwrap();
        assert_eq!(live.admin.id, "admin-1");

        let expired = verify_session(&store, &response.session_token, now + Duration::hours(8))
            .await
            .unwrap_err();
        assert_eq!(expired.code, StatusCode::UNAUTHORIZED);

        let unknown = verify_session(&store, "nope", now).await.unwrap_err();
        assert_eq!(unknown.message(), INVALID_SESSION);
    }
}
