//! Session management: login, JWT claim decoding, and role-gated access
//!
//! The client is not the token issuer, so tokens are decoded without
//! signature verification; the backend re-validates the token on every
//! authorized call. The persisted key-value store is the sole source of
//! truth for session state across independent screen activations.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

use common::KeyValueStore;

use crate::api::{ApiClient, LoginResponseParts};
use crate::error::{AuthError, GENERIC_AUTH_MESSAGE};

/// Storage key for the raw token
pub const TOKEN_KEY: &str = "token";
/// Storage key for the expiry (epoch seconds, decimal string)
pub const EXP_KEY: &str = "exp";
/// Storage key for the derived role name
pub const ROLE_KEY: &str = "role";
/// Storage key for the decoded claims JSON
pub const TOKEN_DECODED_KEY: &str = "tokenDecoded";
/// Storage key for the backend user id
pub const USER_ID_KEY: &str = "userId";

/// Authorization role derived from the token's authority claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    MisStaff,
    Student,
    Employee,
    /// Unrecognized authority; never authorizes protected access
    Unknown,
}

impl Role {
    /// Map a raw backend authority string to a role
    ///
    /// The web backend double-prefixes its authorities (`ROLE_ROLE_*`),
    /// the mobile login returns the single-prefix form; both are accepted.
    pub fn from_authority(authority: &str) -> Self {
        match authority {
            "ROLE_ROLE_ADMIN" | "ROLE_ADMIN" => Role::Admin,
            "ROLE_ROLE_MISSTAFF" | "ROLE_MISSTAFF" => Role::MisStaff,
            "ROLE_ROLE_STUDENT" | "ROLE_STUDENT" => Role::Student,
            "ROLE_ROLE_EMPLOYEE" | "ROLE_EMPLOYEE" => Role::Employee,
            _ => Role::Unknown,
        }
    }

    /// Stable name used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::MisStaff => "misStaff",
            Role::Student => "student",
            Role::Employee => "employee",
            Role::Unknown => "unknown",
        }
    }

    /// Parse a persisted role name back into a role
    pub fn from_name(name: &str) -> Self {
        match name {
            "admin" => Role::Admin,
            "misStaff" => Role::MisStaff,
            "student" => Role::Student,
            "employee" => Role::Employee,
            _ => Role::Unknown,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Role::Unknown)
    }
}

/// Authenticated session produced by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    /// Expiry as epoch seconds, taken from the `exp` claim
    pub expires_at: u64,
    pub role: Role,
    /// Full decoded claim set
    pub claims: Value,
}

/// Minimal session view handed to protected screens
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub token: String,
    pub role: Role,
}

/// Session manager: authenticates, persists, and gates access
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    store: KeyValueStore,
}

impl SessionManager {
    /// Create a new session manager over the injected store
    pub fn new(api: ApiClient, store: KeyValueStore) -> Self {
        Self { api, store }
    }

    /// Authenticate against `POST /user/login` and persist the session
    ///
    /// Nothing is written to the store unless the whole response
    /// interprets cleanly into a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        info!("Login attempt for user: {}", username);

        let parts = self.api.login(username, password).await.map_err(|e| {
            error!("Login request failed: {}", e);
            AuthError::Rejected(GENERIC_AUTH_MESSAGE.to_string())
        })?;

        let user_id = parts
            .body
            .get("userId")
            .filter(|value| !value.is_null())
            .cloned();
        let session = interpret_login(&parts)?;
        self.persist(&session, user_id).await;

        info!(
            "Login succeeded for user: {} (role: {})",
            username,
            session.role.as_str()
        );
        Ok(session)
    }

    async fn persist(&self, session: &Session, user_id: Option<Value>) {
        self.store.set(TOKEN_KEY, &session.token).await;
        self.store.set(EXP_KEY, &session.expires_at.to_string()).await;
        self.store.set(ROLE_KEY, session.role.as_str()).await;
        self.store
            .set(TOKEN_DECODED_KEY, &session.claims.to_string())
            .await;

        if let Some(id) = user_id {
            let id = match id {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.store.set(USER_ID_KEY, &id).await;
        }
    }

    /// True iff a token is stored, its role is recognized, and it has not
    /// expired. A missing or garbled expiry counts as expired.
    pub async fn is_session_valid(&self) -> bool {
        if !self.store.contains(TOKEN_KEY).await {
            return false;
        }

        let role = match self.store.get(ROLE_KEY).await {
            Some(name) => Role::from_name(&name),
            None => return false,
        };
        if !role.is_recognized() {
            return false;
        }

        match self.store.get(EXP_KEY).await {
            Some(raw) => match raw.parse::<u64>() {
                Ok(expires_at) => now_epoch() < expires_at,
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Clear every persisted session key; safe to call repeatedly
    pub async fn logout(&self) {
        info!("Logging out; clearing session store");
        self.store.clear().await;
    }

    /// Protected-screen activation guard
    ///
    /// Returns the session when valid; otherwise clears the store and
    /// returns `None`, and the caller must redirect to the login entry
    /// point before rendering any protected content.
    pub async fn require_session(&self) -> Option<SessionSnapshot> {
        if !self.is_session_valid().await {
            warn!("Session missing or expired; clearing store");
            self.store.clear().await;
            return None;
        }

        let token = self.store.get(TOKEN_KEY).await?;
        let role = Role::from_name(&self.store.get(ROLE_KEY).await?);
        Some(SessionSnapshot { token, role })
    }
}

/// Interpret a login response into a session
///
/// Pure with respect to the store: callers persist only on `Ok`.
fn interpret_login(parts: &LoginResponseParts) -> Result<Session, AuthError> {
    if !parts.status.is_success() {
        let message = parts
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(GENERIC_AUTH_MESSAGE)
            .to_string();
        return Err(AuthError::Rejected(message));
    }

    let token = extract_token(parts)?;
    let claims = decode_claims(&token)?;

    let expires_at = claims
        .get("exp")
        .and_then(|value| value.as_u64().or_else(|| value.as_f64().map(|f| f as u64)))
        .ok_or(AuthError::InvalidToken)?;

    let role = extract_authorities(&claims)
        .iter()
        .map(|authority| Role::from_authority(authority))
        .find(Role::is_recognized)
        .unwrap_or(Role::Unknown);

    Ok(Session {
        token,
        expires_at,
        role,
        claims,
    })
}

/// Locate the identity token in a login response
///
/// Checked in order: `Authorization` header (with or without a `Bearer `
/// prefix), `Jwt-Token` header, body `token` field.
fn extract_token(parts: &LoginResponseParts) -> Result<String, AuthError> {
    let raw = parts
        .auth_header
        .as_deref()
        .or(parts.jwt_header.as_deref())
        .or_else(|| parts.body.get("token").and_then(Value::as_str))
        .ok_or(AuthError::MissingToken)?;

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token.to_string())
}

/// Decode a JWT's claims without verifying its signature or expiry
///
/// Expiry gating happens against the stored `exp`, not at decode time, so
/// an already-expired token still decodes.
fn decode_claims(token: &str) -> Result<Value, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    // Accept whatever algorithm the issuer used; only the payload matters here
    validation.algorithms = vec![
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::EdDSA,
    ];

    let data = decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|_| AuthError::InvalidToken)?;
    Ok(data.claims)
}

/// Collect the authority strings from a claim set
///
/// `authorities` is normally an array of strings; a scalar `role` or
/// `authority` claim is accepted as a fallback.
fn extract_authorities(claims: &Value) -> Vec<String> {
    if let Some(list) = claims.get("authorities").and_then(Value::as_array) {
        return list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    for key in ["authorities", "role", "authority"] {
        if let Some(value) = claims.get(key).and_then(Value::as_str) {
            return vec![value.to_string()];
        }
    }

    Vec::new()
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
