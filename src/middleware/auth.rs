//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Hash it and look up the owning user
//! 3. Inject the caller's identity into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! Admin rights are not checked here. Admin handlers turn the injected
//! `AuthContext` into an `AdminCapability`, which every admin service
//! function takes as an argument.

use crate::{db::DbPool, error::AppError, models::api_key::ApiKeyOwner};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// Route handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

/// Proof that the caller is an administrator.
///
/// Only `AuthContext::require_admin` can build one, so holding a value means
/// the role check already happened.
#[derive(Debug, Clone)]
pub struct AdminCapability {
    user_id: Uuid,
}

impl AdminCapability {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl AuthContext {
    /// Returns `AppError::Forbidden` for non-admin callers.
    pub fn require_admin(&self) -> Result<AdminCapability, AppError> {
        if !self.is_admin {
            tracing::warn!(user_id = %self.user_id, "Non-admin attempted admin action");
            return Err(AppError::Forbidden);
        }

        Ok(AdminCapability {
            user_id: self.user_id,
        })
    }
}

/// SHA-256 hex digest of a presented API key, as stored in `api_keys.key_hash`.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pull the key out of an `Authorization: Bearer <key>` header value.
fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(AppError::InvalidApiKey)
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Hash the `<key>` using SHA-256
/// 3. Query for an active key with that hash, joined with its user
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = bearer_token(
        request
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok()),
    )?;

    let key_hash = hash_api_key(api_key);

    let owner = sqlx::query_as::<_, ApiKeyOwner>(
        r#"
        SELECT k.id, k.user_id, u.username, u.is_admin, k.created_at
        FROM api_keys k
        JOIN users u ON u.id = k.user_id
        WHERE k.key_hash = $1 AND k.is_active = true
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| {
        tracing::warn!("Rejected unknown or inactive API key");
        AppError::InvalidApiKey
    })?;

    request.extensions_mut().insert(AuthContext {
        user_id: owner.user_id,
        username: owner.username,
        is_admin: owner.is_admin,
    });

    Ok(next.run(request).await)
}
