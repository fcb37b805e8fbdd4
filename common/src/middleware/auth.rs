//! Authentication middleware.
//!
//! Resolves `Authorization: Bearer <token>` against the `sessions` table and
//! attaches the caller as a [`CurrentUser`] request extension. Handlers opt
//! in to authentication by taking a [`CurrentUser`] or [`AdminUser`]
//! argument.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::{AppError, AppResult};
use crate::utils::token::{generate_token, hash_token};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub is_admin: bool,
}

/// An authenticated caller whose profile carries the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

/// Session lookups backed by the shared database.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    ttl_hours: i64,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl_hours: i64) -> Self {
        Self { pool, ttl_hours }
    }

    /// Issues a session for `user_id` and returns the raw token.
    ///
    /// The services never log users in themselves; this is the write path
    /// for whatever owns sign-in (the identity platform, seed tooling,
    /// router tests). Only the token hash is stored, with an expiry of
    /// `ttl_hours` from now.
    pub async fn issue(&self, user_id: &str) -> AppResult<String> {
        let token = generate_token();
        let now = Utc::now().timestamp();
        let expires_at = now + self.ttl_hours * 60 * 60;

        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Resolves a raw token to its user. Unknown, expired and revoked
    /// sessions resolve to `None`.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<CurrentUser>> {
        let row: Option<(String, bool)> = sqlx::query_as(
            "SELECT p.id, p.is_admin
             FROM sessions s
             JOIN profiles p ON p.id = s.user_id
             WHERE s.token_hash = ?
               AND s.expires_at > ?
               AND s.revoked_at IS NULL",
        )
        .bind(hash_token(token))
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, is_admin)| CurrentUser { id, is_admin }))
    }
}

/// Authentication middleware handler.
///
/// Requests without a bearer token pass through anonymously; a token that
/// does not resolve to a live session is rejected with 401.
pub async fn auth_middleware(
    State(sessions): State<SessionStore>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(&req).map(str::to_owned) else {
        return next.run(req).await;
    };

    match sessions.resolve(&token).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = %user.id, is_admin = user.is_admin, "session resolved");
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => AppError::Unauthorized.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Extract bearer token from Authorization header.
pub fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
