//! Request authentication.
//!
//! The wiki core does not implement login; it only resolves the `userid`
//! session cookie to a user row and requires an active account before any
//! mutating operation runs.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::COOKIE, request::Parts},
    response::{IntoResponse, Response},
};

use crate::server::AppState;
use crate::types::User;

/// Extractor that requires an active, authenticated user. Mutating
/// handlers take this before touching the store.
pub struct RequireUser(pub User);

/// Extractor that resolves the current user if any; used by read-only
/// pages for display.
pub struct OptionalUser(pub Option<User>);

#[derive(Debug)]
pub enum AuthError {
    NotLoggedIn,
    Inactive,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::NotLoggedIn => (StatusCode::UNAUTHORIZED, "Not logged in.").into_response(),
            AuthError::Inactive => {
                (StatusCode::UNAUTHORIZED, "Not an active user.").into_response()
            }
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error.").into_response()
            }
        }
    }
}

fn cookie_user_id(parts: &Parts) -> Option<i64> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == "userid" {
            value.parse::<i64>().ok()
        } else {
            None
        }
    })
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = cookie_user_id(parts).ok_or(AuthError::NotLoggedIn)?;

        let user = state
            .store
            .user_by_id(user_id)
            .map_err(|_| AuthError::InternalError)?
            .ok_or(AuthError::NotLoggedIn)?;

        if !user.active {
            return Err(AuthError::Inactive);
        }

        Ok(RequireUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = cookie_user_id(parts)
            .and_then(|id| state.store.user_by_id(id).ok().flatten())
            .filter(|u| u.active);
        Ok(OptionalUser(user))
    }
}
