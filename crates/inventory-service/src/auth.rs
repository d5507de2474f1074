//! Authentication extractors.
//!
//! This module provides `AuthUser`, the end-user identity taken from a bearer
//! token. Tokens have the form `test-token:<user-uuid>`; issuing and verifying
//! real session tokens is handled in front of this service.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use inventory_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Prefix of the bearer token payload.
pub const TOKEN_PREFIX: &str = "test-token:";

/// An authenticated user extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
}

impl AuthUser {
    /// Parse an `Authorization` header value.
    fn from_header(value: &str) -> Option<Self> {
        let token = value.strip_prefix("Bearer ")?;
        let user_id = token.strip_prefix(TOKEN_PREFIX)?.parse::<UserId>().ok()?;
        Some(Self { user_id })
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let header = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            Self::from_header(header).ok_or(ApiError::Unauthorized)
        })
    }
}
