//! Session event handlers.
//!
//! Tokens are issued elsewhere; these endpoints only put the login and logout
//! of an authenticated user on the audit log.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use inventory_core::AuditAction;

use crate::auth::AuthUser;
use crate::state::AppState;

/// Session event response.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The authenticated user.
    pub user_id: String,
    /// `login` or `logout`.
    pub action: String,
    /// Whether the audit entry was written.
    pub recorded: bool,
}

/// Record a login.
pub async fn login(State(state): State<Arc<AppState>>, auth: AuthUser) -> Json<SessionResponse> {
    record(&state, &auth, AuditAction::Login)
}

/// Record a logout.
pub async fn logout(State(state): State<Arc<AppState>>, auth: AuthUser) -> Json<SessionResponse> {
    record(&state, &auth, AuditAction::Logout)
}

fn record(state: &AppState, auth: &AuthUser, action: AuditAction) -> Json<SessionResponse> {
    let recorded = state
        .audit
        .record(Some(auth.user_id), None, action, None, None)
        .is_some();

    tracing::info!(user_id = %auth.user_id, action = %action, "Session event");

    Json(SessionResponse {
        user_id: auth.user_id.to_string(),
        action: action.to_string(),
        recorded,
    })
}
