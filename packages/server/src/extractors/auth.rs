use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::models::auth::Role;
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Ownership and moderation checks happen in the handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    /// True when the caller is the row's owner.
    pub fn owns(&self, owner: Option<&str>) -> bool {
        owner == Some(self.user_id.as_str())
    }

    /// Owner or moderator.
    pub fn can_modify(&self, owner: Option<&str>) -> bool {
        self.owns(owner) || self.role.can_moderate()
    }

    pub fn require_moderator(&self) -> Result<(), AppError> {
        if self.role.can_moderate() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::TokenInvalid)?;
    Ok(Some(token))
}

fn resolve(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = state.jwt.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::TokenInvalid
    })?;

    Ok(AuthUser {
        role: Role::from_claim(claims.role.as_deref()),
        user_id: claims.sub,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(AppError::TokenMissing)?;
        resolve(state, token)
    }
}

/// Like [`AuthUser`] but anonymous requests are allowed. A token that is
/// present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => resolve(state, token).map(|user| MaybeAuthUser(Some(user))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
